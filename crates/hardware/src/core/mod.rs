//! Hart-side components.
//!
//! This module contains the architectural state the vector unit operates
//! on and the execution units that implement vector, floating-point and
//! SFU instructions.

/// Architectural state (vector register file, vector CSRs).
pub mod arch;

/// Execution units (FPU, SFU, vector engine).
pub mod units;
