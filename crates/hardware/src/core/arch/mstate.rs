//! Matrix Configuration State.
//!
//! The per-hart matrix CSRs:
//! 1. **msize:** The active tile shape, `sizek << 16 | sizen << 8 | sizem`.
//!    `sizem` and `sizen` count rows, `sizek` counts bytes of a row.
//! 2. **mcsr:** The fixed-point rounding mode `mxrm` (bits 1:0) and the
//!    sticky saturation flag `mxsat` (bit 2).

use crate::common::error::MatrixError;
use crate::core::units::vector::rounding::Vxrm;

/// Matrix CSRs of one hart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatrixState {
    /// Active rows of the destination and of the first source.
    pub sizem: usize,
    /// Active rows of the second source (columns of a product).
    pub sizen: usize,
    /// Active bytes of each source row.
    pub sizek: usize,
    /// Fixed-point rounding mode.
    pub mxrm: Vxrm,
    /// Some element saturated.
    pub mxsat: bool,
}

impl MatrixState {
    /// Reads `msize`.
    pub const fn msize(&self) -> u64 {
        ((self.sizek as u64) << 16) | ((self.sizen as u64) << 8) | self.sizem as u64
    }

    /// Writes `msize`.
    pub const fn set_msize(&mut self, val: u64) {
        self.sizem = (val & 0xff) as usize;
        self.sizen = ((val >> 8) & 0xff) as usize;
        self.sizek = ((val >> 16) & 0xffff) as usize;
    }

    /// Reads `mcsr` (`mxsat << 2 | mxrm`).
    pub const fn mcsr(&self) -> u64 {
        ((self.mxsat as u64) << 2) | self.mxrm as u64
    }

    /// Writes `mcsr`.
    pub const fn set_mcsr(&mut self, val: u64) {
        self.mxrm = Vxrm::from_bits(val as u8);
        self.mxsat = (val >> 2) & 1 != 0;
    }

    /// Checks the tile shape against a register of `mrows` rows of
    /// `rlenb` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::IllegalConfig`] when a dimension is zero or
    /// larger than the register.
    pub const fn check_shape(&self, mrows: usize, rlenb: usize) -> Result<(), MatrixError> {
        if self.sizem == 0 || self.sizem > mrows {
            return Err(MatrixError::IllegalConfig("sizem must be in 1..=mrows"));
        }
        if self.sizen == 0 || self.sizen > mrows {
            return Err(MatrixError::IllegalConfig("sizen must be in 1..=mrows"));
        }
        if self.sizek == 0 || self.sizek > rlenb {
            return Err(MatrixError::IllegalConfig("sizek must be in 1..=rlenb"));
        }
        Ok(())
    }
}
