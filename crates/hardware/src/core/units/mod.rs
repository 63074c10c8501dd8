//! Execution units and functional components.
//!
//! This module contains the floating-point primitives shared by vector
//! instructions, the special function unit, the vector engine that
//! executes RVV instructions element by element, and the integer matrix
//! unit.

/// Floating-Point primitives for IEEE 754 and bfloat16 element formats.
pub mod fpu;

/// Integer matrix unit: element-wise tile ops and multiply-accumulate.
pub mod matrix;

/// Special Function Unit (exp2, reciprocal, sigmoid, tanh).
pub mod sfu;

/// Vector unit: element iteration, instruction families, grouped reductions.
pub mod vector;
