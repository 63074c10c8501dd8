//! Error definitions.
//!
//! This module defines the error types returned by the library. It provides:
//! 1. **Vector Errors:** Illegal configurations, out-of-range register groups,
//!    and memory faults that abort an element loop.
//! 2. **Configuration Errors:** Rejected parameters and unreadable config files.
//! 3. **Controller Errors:** CLIC construction failures.
//! 4. **Matrix Errors:** Illegal `msize` shapes and out-of-range matrix
//!    register accesses.
//!
//! Floating-point exceptions are not errors; they accrue into `fflags`.

use thiserror::Error;

use super::data::AccessType;

/// Errors raised by the vector engine.
///
/// Every variant is raised before any architectural side effect, except
/// [`VectorError::MemoryFault`], which leaves the elements before the
/// faulting one written and checkpoints `vstart`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum VectorError {
    /// `vill` is set, or the instruction's SEW/LMUL/EEW combination or its
    /// register alignment is not legal.
    #[error("illegal vector configuration: {0}")]
    IllegalConfig(&'static str),

    /// A register group extends past `v31`.
    #[error("register group v{base}..v{} exceeds the register file", base + count)]
    RegisterOutOfRange {
        /// First register of the group.
        base: usize,
        /// Number of registers in the group.
        count: usize,
    },

    /// A memory access failed at element `element`.
    #[error("{access:?} fault at element {element}, address {addr:#x}")]
    MemoryFault {
        /// Index of the faulting element; `vstart` holds the same value.
        element: usize,
        /// Faulting effective address.
        addr: u64,
        /// Direction of the faulting access.
        access: AccessType,
    },
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// VLEN is not a power of two in range or is smaller than ELEN.
    #[error("invalid VLEN {vlen} (ELEN {elen})")]
    InvalidVlen {
        /// Rejected VLEN in bits.
        vlen: usize,
        /// Configured ELEN in bits.
        elen: usize,
    },

    /// ELEN is neither 32 nor 64.
    #[error("invalid ELEN {0}")]
    InvalidElen(usize),

    /// The reduction group size is neither 32 nor 64.
    #[error("invalid reduction group size {0}")]
    InvalidReductionGroup(usize),

    /// RLEN is not a power of two in 64..=4096.
    #[error("invalid RLEN {0}")]
    InvalidRlen(usize),

    /// The CLIC parameters are out of range.
    #[error(transparent)]
    Clic(#[from] ClicError),

    /// The configuration file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration text is not valid JSON for [`crate::config::Config`].
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while constructing a CLIC.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ClicError {
    /// More than 4096 interrupt sources were requested.
    #[error("num_sources {0} exceeds 4096")]
    TooManySources(usize),

    /// More than 8 implemented `clicintctl` bits were requested.
    #[error("intctl_bits {0} exceeds 8")]
    TooManyCtlBits(u8),

    /// At least one hart is required.
    #[error("num_harts must be at least 1")]
    NoHarts,
}

/// Errors raised by the matrix unit.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MatrixError {
    /// The `msize` shape or an operand does not fit the register geometry.
    #[error("illegal matrix configuration: {0}")]
    IllegalConfig(&'static str),

    /// An element lies outside the register file.
    #[error("matrix register m{reg} has no element at row {row}, byte {byte}")]
    RegisterOutOfRange {
        /// Register index.
        reg: usize,
        /// Row within the register.
        row: usize,
        /// Byte offset within the row.
        byte: usize,
    },
}
