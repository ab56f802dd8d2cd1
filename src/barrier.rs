//! Remembered set and read/write barrier accounting.
//!
//! The remembered set records every object that has had a field store since the last G0
//! collection, so a minor collection can rescan mature (G1) objects that might hold
//! newly-written pointers into the nursery without walking all of G1.

/// `{ changed_nodes, reads, writes }` — the barrier side-tables threaded through
/// [`Collector`](crate::collector::Collector).
pub struct Barriers {
    changed_nodes: Vec<*mut u8>,
    max_remembered: usize,
    total_reads: usize,
    total_writes: usize,
}

impl Barriers {
    pub fn new(max_remembered: usize) -> Self {
        Self {
            changed_nodes: Vec::with_capacity(max_remembered.min(64)),
            max_remembered,
            total_reads: 0,
            total_writes: 0,
        }
    }

    /// No semantic effect beyond counting: reads never need to be remembered, only writes can
    /// introduce a pointer that the collector hasn't seen yet.
    pub fn read_barrier(&mut self, _object: *mut u8, _field_index: usize) {
        self.total_reads += 1;
    }

    /// Records `object` as having been written to. Does not perform the store itself — the
    /// mutator assigns the field; this only guarantees `object` is in the remembered set by the
    /// time the next collection starts.
    pub fn write_barrier(&mut self, object: *mut u8, _field_index: usize, _new_value: *mut u8) {
        self.total_writes += 1;
        assert!(
            self.changed_nodes.len() < self.max_remembered,
            "remembered set overflow: more than {} changed nodes recorded",
            self.max_remembered
        );
        self.changed_nodes.push(object);
    }

    pub fn total_reads(&self) -> usize {
        self.total_reads
    }

    pub fn total_writes(&self) -> usize {
        self.total_writes
    }

    pub fn changed_nodes(&self) -> &[*mut u8] {
        &self.changed_nodes
    }

    /// Takes ownership of every recorded entry and clears the remembered set in one step.
    ///
    /// The source this crate is built from resets `changed_nodes_pointer` to zero *inside* the
    /// per-entry loop, so only the first entry is ever fully processed before the length is
    /// zeroed out from under the loop. This is corrected here: the caller processes every
    /// returned entry, and the set is cleared exactly once, before any of them are visited (the
    /// mutator never runs concurrently with a collection, so the two orderings are equivalent).
    pub fn take_changed_nodes(&mut self) -> Vec<*mut u8> {
        std::mem::take(&mut self.changed_nodes)
    }
}
