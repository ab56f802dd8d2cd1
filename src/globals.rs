use std::mem::size_of;

/// Width of a single field slot / forwarding slot / header word, in bytes.
pub const PTR_SIZE: usize = size_of::<usize>();

/// Default byte budget for the nursery generation (G0), matching the source's `MAX_ALLOC_SIZE`.
pub const DEFAULT_G0_SIZE: usize = 4096;

/// Default byte budget for the mature generation (G1), matching the source's `G1_ALLOC_SIZE`
/// (`MAX_ALLOC_SIZE * 2`).
pub const DEFAULT_G1_SIZE: usize = DEFAULT_G0_SIZE * 2;

/// Default capacity of the root stack, matching the source's `MAX_GC_ROOTS`.
pub const DEFAULT_MAX_ROOTS: usize = 1024;

/// Default capacity of the remembered set, matching the source's `MAX_CHANGED_NODES`.
pub const DEFAULT_MAX_REMEMBERED: usize = 4096;

/// Exit code used to signal terminal out-of-memory, matching the source's `exit(137)`.
pub const OOM_EXIT_CODE: i32 = 137;
