//! Common types and constants used throughout the library.
//!
//! This module provides building blocks shared by the vector engine, the
//! SFU and the CLIC. It includes:
//! 1. **Constants:** Register counts, `vtype` fields and CLIC offsets.
//! 2. **Memory Access:** Load/store classification for fault reporting.
//! 3. **Error Handling:** Typed errors for the engine, config and controller.

/// Common constants used throughout the library.
pub mod constants;

/// Memory access type definitions.
pub mod data;

/// Error types.
pub mod error;

pub use data::AccessType;
pub use error::{ClicError, ConfigError, VectorError};
