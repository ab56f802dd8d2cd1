//! A generation: a pair of heaps (from-space / to-space) plus copy-scan state.

use crate::heap::Heap;
use std::cell::RefCell;
use std::rc::Rc;

pub type HeapHandle = Rc<RefCell<Heap>>;

pub fn new_heap_handle(generation_number: u32, size: usize) -> HeapHandle {
    Rc::new(RefCell::new(Heap::new(generation_number, size)))
}

/// `{ number, cycles, scan, from_space, to_space }`.
///
/// `from_space`/`to_space` are `Rc<RefCell<Heap>>` rather than owned `Heap` values because the
/// two-generation topology aliases G0's to-space to G1's from-space: both generations hold a
/// clone of the same handle, so bump allocation through either one advances the one shared
/// cursor. See the G0/G1 wiring in [`Collector::new`](crate::collector::Collector::new).
pub struct Generation {
    pub number: u32,
    pub cycles: usize,
    /// Cheney scan frontier within `to_space`, valid only during a collection.
    pub scan: *mut u8,
    pub from_space: HeapHandle,
    pub to_space: HeapHandle,
}

impl Generation {
    pub fn new(number: u32, from_space: HeapHandle, to_space: HeapHandle) -> Self {
        Self {
            number,
            cycles: 0,
            scan: std::ptr::null_mut(),
            from_space,
            to_space,
        }
    }
}
