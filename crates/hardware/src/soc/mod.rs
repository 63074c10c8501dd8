//! System-on-Chip (SoC) Components.
//!
//! This module holds the memory-mapped devices modelled by the library and
//! the `Device` trait a system bus uses to route accesses to them.

/// Memory-mapped I/O device implementations.
pub mod devices;

/// Device trait definitions for MMIO access.
pub mod traits;
