//! Direction of a vector memory access.

/// Whether a faulting element was being loaded or stored.
///
/// Carried by [`VectorError::MemoryFault`](super::error::VectorError::MemoryFault)
/// and passed to [`VectorMemory`](crate::core::units::vector::memory::VectorMemory)
/// so an implementation can apply different permissions to each.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessType {
    /// Element load. Index reads from vector registers never fault.
    Read,
    /// Element store.
    Write,
}
