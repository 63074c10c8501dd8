//! Matrix Register File.
//!
//! Eight registers of `mrows × rlenb` bytes each, stored as one
//! little-endian arena. Row `i` of register `m[r]` starts at byte
//! `r·mlenb + i·rlenb`, and element `j` of width `esz` sits at byte
//! `j·esz` of its row. Packed 4-bit elements put even indices in the low
//! nibble of a byte and odd indices in the high nibble.

use crate::common::constants::{MATRIX_MACC_BITS, NUM_MREGS};
use crate::common::error::MatrixError;

/// Matrix register file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatrixRegisterFile {
    rlenb: usize,
    mrows: usize,
    bytes: Vec<u8>,
}

impl MatrixRegisterFile {
    /// Creates a zeroed register file with rows of `rlenb` bytes.
    pub fn new(rlenb: usize) -> Self {
        let mrows = rlenb * 8 / MATRIX_MACC_BITS;
        Self { rlenb, mrows, bytes: vec![0; NUM_MREGS * mrows * rlenb] }
    }

    /// Row width in bytes.
    #[inline]
    pub const fn rlenb(&self) -> usize {
        self.rlenb
    }

    /// Rows per register.
    #[inline]
    pub const fn mrows(&self) -> usize {
        self.mrows
    }

    /// Register size in bytes.
    #[inline]
    pub const fn mlenb(&self) -> usize {
        self.mrows * self.rlenb
    }

    /// Whole arena, register 0 first.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    fn offset(&self, reg: usize, row: usize, byte: usize, len: usize) -> Result<usize, MatrixError> {
        if reg >= NUM_MREGS || row >= self.mrows || byte + len > self.rlenb {
            return Err(MatrixError::RegisterOutOfRange { reg, row, byte });
        }
        Ok(reg * self.mlenb() + row * self.rlenb + byte)
    }

    /// Reads element `col` of width `esz` bytes from row `row`,
    /// zero-extended.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::RegisterOutOfRange`] when the element lies
    /// outside the register.
    #[inline]
    pub fn read(&self, reg: usize, row: usize, col: usize, esz: usize) -> Result<u64, MatrixError> {
        let start = self.offset(reg, row, col * esz, esz)?;
        let mut buf = [0u8; 8];
        buf[..esz].copy_from_slice(&self.bytes[start..start + esz]);
        Ok(u64::from_le_bytes(buf))
    }

    /// Reads element `col` sign-extended to 64 bits.
    ///
    /// # Errors
    ///
    /// See [`MatrixRegisterFile::read`].
    #[inline]
    pub fn read_signed(&self, reg: usize, row: usize, col: usize, esz: usize) -> Result<i64, MatrixError> {
        let raw = self.read(reg, row, col, esz)?;
        let shift = 64 - 8 * esz as u32;
        Ok(((raw << shift) as i64) >> shift)
    }

    /// Writes the low `esz` bytes of `val` to element `col` of row `row`.
    ///
    /// # Errors
    ///
    /// See [`MatrixRegisterFile::read`].
    #[inline]
    pub fn write(&mut self, reg: usize, row: usize, col: usize, esz: usize, val: u64) -> Result<(), MatrixError> {
        let start = self.offset(reg, row, col * esz, esz)?;
        self.bytes[start..start + esz].copy_from_slice(&val.to_le_bytes()[..esz]);
        Ok(())
    }

    /// Reads packed 4-bit element `idx` of row `row`, zero-extended.
    ///
    /// # Errors
    ///
    /// See [`MatrixRegisterFile::read`].
    pub fn read_nibble(&self, reg: usize, row: usize, idx: usize) -> Result<u8, MatrixError> {
        let byte = self.bytes[self.offset(reg, row, idx / 2, 1)?];
        Ok(if idx % 2 == 1 { byte >> 4 } else { byte & 0x0f })
    }

    /// Writes the low four bits of `val` to packed element `idx`, keeping
    /// the other nibble of the byte.
    ///
    /// # Errors
    ///
    /// See [`MatrixRegisterFile::read`].
    pub fn write_nibble(&mut self, reg: usize, row: usize, idx: usize, val: u8) -> Result<(), MatrixError> {
        let at = self.offset(reg, row, idx / 2, 1)?;
        let byte = &mut self.bytes[at];
        *byte = if idx % 2 == 1 { (*byte & 0x0f) | (val << 4) } else { (*byte & 0xf0) | (val & 0x0f) };
        Ok(())
    }

    /// Bytes of one row.
    ///
    /// # Errors
    ///
    /// See [`MatrixRegisterFile::read`].
    pub fn row(&self, reg: usize, row: usize) -> Result<&[u8], MatrixError> {
        let start = self.offset(reg, row, 0, self.rlenb)?;
        Ok(&self.bytes[start..start + self.rlenb])
    }

    /// Overwrites one row with `data`, which must be `rlenb` bytes long.
    ///
    /// # Errors
    ///
    /// See [`MatrixRegisterFile::read`].
    pub fn set_row(&mut self, reg: usize, row: usize, data: &[u8]) -> Result<(), MatrixError> {
        let start = self.offset(reg, row, 0, data.len())?;
        self.bytes[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }
}
