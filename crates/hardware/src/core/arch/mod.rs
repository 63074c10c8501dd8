//! RISC-V vector and matrix architectural state.
//!
//! This module contains the state a vector or matrix instruction reads and
//! writes. It includes the following modules:
//! 1. **Vector Registers:** The 32 × VLEN register file with an element accessor.
//! 2. **Vector CSRs:** `vl`, `vtype`, `vstart`, `vxrm`, `vxsat` and `vsetvl`.
//! 3. **Matrix Registers:** Eight row-major tile registers.
//! 4. **Matrix CSRs:** `msize` and `mcsr`.

/// Vector register file implementation.
pub mod vreg;

/// Vector CSR state and `vsetvl`.
pub mod vstate;

/// Matrix register file implementation.
pub mod mreg;

/// Matrix CSR state.
pub mod mstate;
