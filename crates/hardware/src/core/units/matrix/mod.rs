//! Integer Matrix Unit.
//!
//! Tile instructions over the matrix register file. Every instruction is
//! one call on [`MatrixEngine`], which checks the `msize` tile shape,
//! reads its source tiles in full, computes, and writes the destination.
//! Destinations may therefore name a source register.
//!
//! Operations are organized by family:
//! - [`elementwise`]: `.mm` and `.mv.i` add, sub, multiply, shifts and
//!   min/max at 32 and 64 bits, the `mn4clip` narrowing clips, row
//!   broadcast and nibble unpacking
//! - [`mma`]: `mmaqa` multiply-accumulate products into 32- and 64-bit
//!   accumulators

/// Element-wise tile operations.
pub mod elementwise;

/// Multiply-accumulate products.
pub mod mma;

use crate::common::constants::NUM_MREGS;
use crate::common::error::MatrixError;
use crate::config::MatrixConfig;
use crate::core::arch::mreg::MatrixRegisterFile;
use crate::core::arch::mstate::MatrixState;

/// Element width of an element-wise operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatrixWidth {
    /// 32-bit elements (`.s`).
    Word,
    /// 64-bit elements (`.d`).
    Double,
}

impl MatrixWidth {
    /// Element size in bytes.
    pub const fn esz(self) -> usize {
        match self {
            Self::Word => 4,
            Self::Double => 8,
        }
    }

    /// Mask applied to a shift amount.
    pub const fn shift_mask(self) -> u32 {
        match self {
            Self::Word => 0x1f,
            Self::Double => 0x3f,
        }
    }
}

/// First source of an element-wise operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatrixOperand {
    /// `.mm`: row `i` of the register pairs with row `i` of the other source.
    Matrix(usize),
    /// `.mv.i`: one row of the register pairs with every row.
    Row {
        /// Register holding the row.
        reg: usize,
        /// Row index.
        row: usize,
    },
}

/// Executes matrix instructions against borrowed hart state.
#[derive(Debug)]
pub struct MatrixEngine<'a> {
    /// Matrix register file.
    pub regs: &'a mut MatrixRegisterFile,
    /// `msize` and `mcsr`.
    pub state: &'a mut MatrixState,
}

impl<'a> MatrixEngine<'a> {
    /// Creates an engine over the given hart state.
    pub const fn new(regs: &'a mut MatrixRegisterFile, state: &'a mut MatrixState) -> Self {
        Self { regs, state }
    }

    /// Rejects the instruction when `msize` does not fit the registers.
    fn check_shape(&self) -> Result<(), MatrixError> {
        let result = self.state.check_shape(self.regs.mrows(), self.regs.rlenb());
        if let Err(err) = &result {
            tracing::debug!(%err, msize = self.state.msize(), "matrix instruction rejected");
        }
        result
    }

    /// Rejects register indices past `m7`.
    fn check_regs(regs: &[usize]) -> Result<(), MatrixError> {
        match regs.iter().find(|&&r| r >= NUM_MREGS) {
            Some(&reg) => Err(MatrixError::RegisterOutOfRange { reg, row: 0, byte: 0 }),
            None => Ok(()),
        }
    }

    /// Rejects a broadcast row past the last row.
    fn check_operand(&self, operand: MatrixOperand) -> Result<usize, MatrixError> {
        match operand {
            MatrixOperand::Matrix(reg) => Ok(reg),
            MatrixOperand::Row { reg, row } if row < self.regs.mrows() => Ok(reg),
            MatrixOperand::Row { .. } => Err(MatrixError::IllegalConfig("broadcast row exceeds mrows")),
        }
    }
}

/// Owned matrix state of one hart.
#[derive(Clone, Debug)]
pub struct MatrixContext {
    /// Matrix register file.
    pub regs: MatrixRegisterFile,
    /// Matrix CSRs.
    pub state: MatrixState,
}

impl MatrixContext {
    /// Creates zeroed state for the configured RLEN with the largest
    /// tile shape selected.
    pub fn new(config: &MatrixConfig) -> Self {
        let regs = MatrixRegisterFile::new(config.rlenb());
        let state = MatrixState {
            sizem: regs.mrows(),
            sizen: regs.mrows(),
            sizek: regs.rlenb(),
            ..MatrixState::default()
        };
        Self { regs, state }
    }

    /// Borrows the state as an engine.
    pub fn engine(&mut self) -> MatrixEngine<'_> {
        MatrixEngine::new(&mut self.regs, &mut self.state)
    }
}
