//! The one piece of the host runtime's object layout the collector is allowed to know about.

/// Supplies the collector with the number of pointer-width field slots following an object's
/// header word. Everything else about the header's bit layout — type tags, mark bits the host
/// might keep for its own purposes, and so on — is opaque to the collector.
///
/// The host runtime implements this trait once, on a zero-sized marker type, and parameterizes
/// [`Collector`](crate::collector::Collector) with it.
pub trait ObjectModel {
    /// Returns the number of pointer-width fields stored after `header`.
    fn field_count(header: usize) -> usize;
}
