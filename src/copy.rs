//! The copy engine: Cheney-with-chase forwarding.
//!
//! `forward` and `chase` together implement the core data-movement step used by every stage of
//! [`collect`](crate::collector::Collector::collect): copying a live object out of a
//! generation's from-space into its to-space, installing a forwarding pointer, and returning the
//! object's new address.

use crate::generation::Generation;
use crate::object_model::ObjectModel;
use crate::wrapper::Wrapper;

/// Forwards a single pointer-sized value through `gen`.
///
/// - If `ptr` does not lie inside `gen`'s from-space, it is not a pointer this generation's
///   collection is responsible for (either a non-pointer value, or a pointer into some other
///   space entirely) and is returned unchanged.
/// - If the object at `ptr` has already been copied this cycle, its canonical (to-space) address
///   is returned directly.
/// - Otherwise [`chase`] copies it (and as much of its unforwarded descendant chain as fits) and
///   the fresh address is returned.
///
/// Returns `None` if `chase` could not allocate in to-space — to-space is full. The caller (the
/// collector driver) decides whether that is terminal or recoverable.
pub fn forward<M: ObjectModel>(gen: &mut Generation, ptr: *mut u8) -> Option<*mut u8> {
    if !gen.from_space.borrow().contains(ptr) {
        return Some(ptr);
    }

    let w: Wrapper<M> = Wrapper::from_object_addr(ptr);
    if let Some(fwd) = w.forwarded() {
        if gen.to_space.borrow().contains(fwd) {
            return Some(Wrapper::<M>::from_wrapper_addr(fwd).object_addr());
        }
    }

    if !chase::<M>(gen, w) {
        return None;
    }

    let fwd = w
        .forwarded()
        .expect("chase must install a forwarding pointer on success");
    Some(Wrapper::<M>::from_wrapper_addr(fwd).object_addr())
}

/// Iterative Cheney-with-chase copy.
///
/// Copies `w` into `gen.to_space`, then descends into at most one unforwarded child to keep
/// the recursion depth (and therefore auxiliary stack usage) bounded to O(1); any sibling
/// pointers are left for the driver's breadth-first Cheney scan loop to pick up later.
///
/// Returns `false` if to-space cannot fit the next object in the chase chain.
fn chase<M: ObjectModel>(gen: &mut Generation, mut w: Wrapper<M>) -> bool {
    loop {
        let size = w.size();
        let q: Wrapper<M> = match gen.to_space.borrow_mut().alloc(size) {
            Some(q) => q,
            None => return false,
        };

        q.set_header(w.header());

        let mut next: Option<Wrapper<M>> = None;
        let field_count = w.field_count();
        for i in 0..field_count {
            let value = w.field(i);
            q.set_field(i, value);

            let field_ptr = value as *mut u8;
            if gen.from_space.borrow().contains(field_ptr) {
                let child = Wrapper::<M>::from_object_addr(field_ptr);
                let already_in_to_space = child
                    .forwarded()
                    .map(|fwd| gen.to_space.borrow().contains(fwd))
                    .unwrap_or(false);
                if !already_in_to_space {
                    next = Some(child);
                }
            }
        }

        w.set_forwarded(q.wrapper_addr());

        match next {
            Some(child) => w = child,
            None => return true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::new_heap_handle;

    struct OneField;
    impl ObjectModel for OneField {
        fn field_count(_header: usize) -> usize {
            1
        }
    }

    #[test]
    fn forward_leaves_non_heap_pointers_untouched() {
        let from = new_heap_handle(0, 256);
        let to = new_heap_handle(0, 256);
        let mut gen = Generation::new(0, from, to);
        let bogus = 0x1234usize as *mut u8;
        assert_eq!(forward::<OneField>(&mut gen, bogus), Some(bogus));
    }

    #[test]
    fn forward_copies_and_is_idempotent() {
        let from = new_heap_handle(0, 256);
        let to = new_heap_handle(0, 256);
        let mut gen = Generation::new(0, from.clone(), to);

        let w: Wrapper<OneField> = from.borrow_mut().alloc(crate::wrapper::wrapper_size(1)).unwrap();
        w.set_header(7);
        w.set_field(0, 0);
        let object_addr = w.object_addr();

        let first = forward::<OneField>(&mut gen, object_addr).unwrap();
        let second = forward::<OneField>(&mut gen, object_addr).unwrap();
        assert_eq!(first, second);
        assert_ne!(first, object_addr);
        assert_eq!(Wrapper::<OneField>::from_object_addr(first).header(), 7);
    }
}
