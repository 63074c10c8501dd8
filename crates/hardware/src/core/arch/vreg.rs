//! RISC-V Vector Register File.
//!
//! This module implements the vector register file as a single little-endian
//! byte arena of `32 × vlenb` bytes. It performs the following:
//! 1. **Storage:** Register `v[r]` occupies bytes `r·vlenb .. (r+1)·vlenb`;
//!    a register group is simply the contiguous run of its members.
//! 2. **Element Access:** Every element read and write goes through one
//!    `(register, element index, element size)` accessor that bounds-checks
//!    against the arena.
//! 3. **Mask Access:** Mask bit `i` of a register lives in byte `i / 8`,
//!    bit `i % 8`.

use crate::common::constants::NUM_VREGS;
use crate::common::error::VectorError;

/// Vector register file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VectorRegisterFile {
    vlenb: usize,
    bytes: Vec<u8>,
}

impl VectorRegisterFile {
    /// Creates a zeroed register file for a VLEN of `vlenb × 8` bits.
    pub fn new(vlenb: usize) -> Self {
        Self { vlenb, bytes: vec![0; NUM_VREGS * vlenb] }
    }

    /// Register width in bytes.
    #[inline]
    pub const fn vlenb(&self) -> usize {
        self.vlenb
    }

    /// Whole arena, register 0 first.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    fn offset(&self, reg: usize, idx: usize, esz: usize) -> Result<usize, VectorError> {
        let start = reg * self.vlenb + idx * esz;
        if reg >= NUM_VREGS || start + esz > self.bytes.len() {
            return Err(VectorError::RegisterOutOfRange { base: reg, count: (idx * esz) / self.vlenb + 1 });
        }
        Ok(start)
    }

    /// Reads element `idx` of width `esz` bytes from the group based at `reg`,
    /// zero-extended to 64 bits.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::RegisterOutOfRange`] if the element lies past
    /// `v31`.
    #[inline]
    pub fn read(&self, reg: usize, idx: usize, esz: usize) -> Result<u64, VectorError> {
        let start = self.offset(reg, idx, esz)?;
        let mut buf = [0u8; 8];
        buf[..esz].copy_from_slice(&self.bytes[start..start + esz]);
        Ok(u64::from_le_bytes(buf))
    }

    /// Reads element `idx` sign-extended to 64 bits.
    ///
    /// # Errors
    ///
    /// See [`VectorRegisterFile::read`].
    #[inline]
    pub fn read_signed(&self, reg: usize, idx: usize, esz: usize) -> Result<i64, VectorError> {
        let raw = self.read(reg, idx, esz)?;
        let shift = 64 - 8 * esz as u32;
        Ok(((raw << shift) as i64) >> shift)
    }

    /// Writes the low `esz` bytes of `val` to element `idx`.
    ///
    /// # Errors
    ///
    /// See [`VectorRegisterFile::read`].
    #[inline]
    pub fn write(&mut self, reg: usize, idx: usize, esz: usize, val: u64) -> Result<(), VectorError> {
        let start = self.offset(reg, idx, esz)?;
        self.bytes[start..start + esz].copy_from_slice(&val.to_le_bytes()[..esz]);
        Ok(())
    }

    /// Sets every bit of element `idx` (the agnostic fill pattern).
    ///
    /// # Errors
    ///
    /// See [`VectorRegisterFile::read`].
    pub fn fill_ones(&mut self, reg: usize, idx: usize, esz: usize) -> Result<(), VectorError> {
        self.write(reg, idx, esz, u64::MAX)
    }

    /// Returns mask bit `i` of register `reg`.
    ///
    /// Bits past the register read as 0.
    #[inline]
    pub fn mask_bit(&self, reg: usize, i: usize) -> bool {
        self.bytes
            .get(reg * self.vlenb + i / 8)
            .is_some_and(|byte| (byte >> (i % 8)) & 1 != 0)
    }

    /// Writes mask bit `i` of register `reg`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::RegisterOutOfRange`] if `i` lies past the
    /// register.
    #[inline]
    pub fn set_mask_bit(&mut self, reg: usize, i: usize, val: bool) -> Result<(), VectorError> {
        if reg >= NUM_VREGS || i >= self.vlenb * 8 {
            return Err(VectorError::RegisterOutOfRange { base: reg, count: 1 });
        }
        let byte = &mut self.bytes[reg * self.vlenb + i / 8];
        if val {
            *byte |= 1 << (i % 8);
        } else {
            *byte &= !(1 << (i % 8));
        }
        Ok(())
    }

    /// Bytes of the `count` registers starting at `reg`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::RegisterOutOfRange`] if the group runs past
    /// `v31`.
    pub fn group(&self, reg: usize, count: usize) -> Result<&[u8], VectorError> {
        if reg + count > NUM_VREGS {
            return Err(VectorError::RegisterOutOfRange { base: reg, count });
        }
        Ok(&self.bytes[reg * self.vlenb..(reg + count) * self.vlenb])
    }

    /// Mutable bytes of the `count` registers starting at `reg`.
    ///
    /// # Errors
    ///
    /// See [`VectorRegisterFile::group`].
    pub fn group_mut(&mut self, reg: usize, count: usize) -> Result<&mut [u8], VectorError> {
        if reg + count > NUM_VREGS {
            return Err(VectorError::RegisterOutOfRange { base: reg, count });
        }
        Ok(&mut self.bytes[reg * self.vlenb..(reg + count) * self.vlenb])
    }
}
