//! Diagnostic printers: heap contents, generation state, roots, and allocation statistics.
//!
//! These mirror the original's `print_heap`/`print_gc_generation`/`print_gc_roots`/
//! `print_gc_alloc_stats` helpers, in the teacher's plain-`Display`-impl style
//! (`statistics::HeapStatistics`) rather than a logging framework — the teacher itself never
//! reaches for one, so neither do we. Every printer renders into a `String` instead of writing
//! straight to stdout, so the mutator decides where the text goes.

use crate::collector::{AllocationStats, Collector};
use crate::generation::Generation;
use crate::heap::Heap;
use crate::object_model::ObjectModel;
use crate::wrapper::Wrapper;
use std::fmt::{self, Write};

struct FormattedSize(usize);

impl fmt::Display for FormattedSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kib = self.0 as f64 / 1024.0;
        if kib < 1.0 {
            return write!(f, "{}B", self.0);
        }
        let mib = kib / 1024.0;
        if mib < 1.0 {
            return write!(f, "{:.1}K", kib);
        }
        write!(f, "{:.1}M", mib)
    }
}

/// A point-in-time snapshot of every counter the collector tracks, suitable for logging or
/// asserting against in tests.
#[derive(Clone, Copy, Debug)]
pub struct CollectorStatistics {
    pub alloc: AllocationStats,
    pub total_reads: usize,
    pub total_writes: usize,
    pub gc_roots_top: usize,
    pub gc_roots_max_size: usize,
    pub g0_cycles: usize,
    pub g1_cycles: usize,
}

impl<M: ObjectModel> Collector<M> {
    pub fn statistics(&self) -> CollectorStatistics {
        CollectorStatistics {
            alloc: self.stats(),
            total_reads: self.barriers().total_reads(),
            total_writes: self.barriers().total_writes(),
            gc_roots_top: self.roots().len(),
            gc_roots_max_size: self.roots().high_water_mark(),
            g0_cycles: self.g0().cycles,
            g1_cycles: self.g1().cycles,
        }
    }

    /// Renders the contents of `heap` the way `print_heap` does in the original: one line per
    /// live wrapper, the wrapper's address followed by each of its field values.
    pub fn format_heap(&self, heap: &Heap) -> String {
        format_heap::<M>(heap)
    }

    pub fn format_generation(&self, generation: &Generation) -> String {
        format_generation::<M>(generation)
    }

    pub fn format_roots(&self) -> String {
        let mut out = String::from("ROOTS:");
        for slot in self.roots().iter() {
            let _ = write!(out, " {:p}", unsafe { **slot });
        }
        out
    }
}

impl fmt::Display for CollectorStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Total memory allocation: {} ({} objects)",
            FormattedSize(self.alloc.total_allocated_bytes),
            self.alloc.total_allocated_objects
        )?;
        writeln!(
            f,
            "Maximum residency:       {} ({} objects)",
            FormattedSize(self.alloc.max_allocated_bytes),
            self.alloc.max_allocated_objects
        )?;
        writeln!(
            f,
            "Total memory use:        {} reads and {} writes",
            self.total_reads, self.total_writes
        )?;
        writeln!(f, "Max GC roots stack size: {} roots", self.gc_roots_max_size)?;
        writeln!(
            f,
            "GC cycles:               {} (G0) / {} (G1)",
            self.g0_cycles, self.g1_cycles
        )
    }
}

fn format_heap<M: ObjectModel>(heap: &Heap) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Heap: {} bytes, {:p}..{:p}.",
        heap.size(),
        heap.start(),
        heap.end()
    );

    let mut cursor = heap.start();
    while cursor < heap.next() {
        let w: Wrapper<M> = Wrapper::from_wrapper_addr(cursor);
        let _ = write!(out, "{:p} :", w.wrapper_addr());
        for i in 0..w.field_count() {
            let _ = write!(out, " {:#x}", w.field(i));
        }
        let _ = writeln!(out);
        cursor = unsafe { cursor.add(w.size()) };
    }
    out
}

fn format_generation<M: ObjectModel>(generation: &Generation) -> String {
    let mut out = String::new();
    let from = generation.from_space.borrow();
    let to = generation.to_space.borrow();
    let _ = writeln!(
        out,
        "Generation G{}, {} cycles",
        from.generation_number(),
        generation.cycles
    );
    let _ = write!(out, "From space. {}", format_heap::<M>(&from));
    let _ = write!(out, "To space. {}", format_heap::<M>(&to));
    let _ = writeln!(out, "Allocated: {}/{}", from.used(), from.size());
    let _ = writeln!(out, "Free: {}/{}", from.free(), from.size());
    out
}
