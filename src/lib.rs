//! A generational copying garbage collector for a small managed-object runtime.
//!
//! Objects are allocated from a managed heap by a host program (the mutator) written against a
//! fixed object-header convention; this crate reclaims unreachable objects using a two-generation
//! Cheney-style copying scheme with a write barrier tracking inter-generational references.
//!
//! The mutator owns the object header's bit layout — all this crate needs from it is the number
//! of pointer-width fields following a header, via [`ObjectModel`]. Everything else (heap layout,
//! forwarding, the copy engine, roots, barriers) lives here.
//!
//! ```
//! use stella_gc::{Collector, ObjectModel};
//!
//! struct OneField;
//! impl ObjectModel for OneField {
//!     fn field_count(_header: usize) -> usize {
//!         1
//!     }
//! }
//!
//! let mut gc: Collector<OneField> = Collector::with_defaults();
//! let object = gc.alloc(2 * std::mem::size_of::<usize>());
//! ```

pub mod barrier;
pub mod collector;
pub mod copy;
pub mod diagnostics;
pub mod generation;
pub mod globals;
pub mod heap;
pub mod mmap;
pub mod object_model;
pub mod roots;
pub mod wrapper;

pub use collector::{AllocationStats, Collector, CollectorConfig};
pub use diagnostics::CollectorStatistics;
pub use object_model::ObjectModel;
