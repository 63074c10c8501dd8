//! RISC-V vector, SFU and CLIC model library.
//!
//! This crate models four pieces of a RISC-V hart and its platform:
//! 1. **Vector Unit:** RVV 1.0 instruction semantics over a byte-addressed register file,
//!    with mask/tail policies, fixed-point rounding, soft-float arithmetic and loads/stores
//!    through a caller-supplied memory.
//! 2. **Grouped Reductions:** Bit-exact dup/compress sum, max and min over groups of narrow
//!    floats.
//! 3. **SFU:** Table-driven `exp2`, reciprocal, sigmoid and tanh with a Booth multiplier model.
//! 4. **Matrix Unit:** Integer tile operations and multiply-accumulate products over eight
//!    row-major matrix registers.
//! 5. **CLIC:** Core-local interrupt controller with WARL register semantics and sorted
//!    per-hart delivery.
//! 6. **Configuration:** JSON-loadable hardware parameters.

/// Common types and constants (errors, access types, register layouts).
pub mod common;
/// Library configuration (defaults, vector, matrix and CLIC parameters).
pub mod config;
/// Hart state and execution units (vector and matrix registers, FPU, SFU, engines).
pub mod core;
/// System-on-chip devices (CLIC, MMIO trait).
pub mod soc;

/// Root configuration type; use `Config::default()` or load from JSON.
pub use crate::config::Config;
/// Owned per-hart matrix state; borrow it as a `MatrixEngine` to execute instructions.
pub use crate::core::units::matrix::{MatrixContext, MatrixEngine};
/// Owned per-hart vector state; borrow it as a `VectorEngine` to execute instructions.
pub use crate::core::units::vector::{VectorContext, VectorEngine};
/// Interrupt controller; construct with `Clic::new`.
pub use crate::soc::devices::Clic;
