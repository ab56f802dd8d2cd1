//! Thin wrapper over an anonymous memory mapping used as backing storage for a [`Heap`](crate::heap::Heap).
//!
//! Unlike the teacher's platform-specific `VirtualAlloc`/`libc::mmap` split, a single generation's
//! space here is small and fixed-size (kilobytes, not megabytes), so one cross-platform mapping via
//! `memmap2` is enough — the same crate the teacher already reaches for in `card_table.rs` and
//! `space_bitmap.rs`.

use memmap2::MmapMut;

pub struct Mmap {
    map: MmapMut,
}

impl Mmap {
    pub fn new(size: usize) -> Self {
        let map = MmapMut::map_anon(size).expect("failed to map anonymous memory for GC heap");
        Self { map }
    }

    pub fn start(&self) -> *mut u8 {
        self.map.as_ptr() as *mut u8
    }

    pub fn end(&self) -> *mut u8 {
        unsafe { self.start().add(self.map.len()) }
    }

    pub fn size(&self) -> usize {
        self.map.len()
    }
}
