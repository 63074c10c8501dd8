//! Element iteration under the mask predicate.
//!
//! The iterator walks `[vstart, vl)`, runs a kernel for every active
//! element and applies the agnostic fill policy to inactive and tail
//! elements. It is the only place that decides which elements of a
//! destination an instruction touches.

use crate::common::error::VectorError;
use crate::config::VectorConfig;
use crate::core::arch::vreg::VectorRegisterFile;

use super::descriptor::VectorDescriptor;

/// Where an instruction writes its results.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Destination {
    /// A register group of `esz`-byte elements with EMUL `emul`.
    Elements {
        /// Base register.
        reg: usize,
        /// Element size in bytes.
        esz: usize,
        /// Signed log2 EMUL.
        emul: i32,
    },
    /// `nf` consecutive register groups, one per segment field.
    Segments {
        /// Base register of field 0.
        reg: usize,
        /// Element size in bytes.
        esz: usize,
        /// Signed log2 EMUL of each field.
        emul: i32,
        /// Number of fields.
        nf: usize,
    },
    /// One mask bit per element.
    Mask {
        /// Destination register.
        reg: usize,
    },
    /// No register destination (stores, scalar results).
    None,
}

impl Destination {
    /// Element destination at SEW and LMUL of `desc`.
    #[inline]
    pub const fn sew(desc: &VectorDescriptor, reg: usize) -> Self {
        Self::Elements { reg, esz: desc.esz(), emul: desc.lmul }
    }

    /// Element destination at twice SEW.
    #[inline]
    pub const fn wide(desc: &VectorDescriptor, reg: usize) -> Self {
        Self::Elements { reg, esz: desc.esz() * 2, emul: desc.lmul + 1 }
    }

    /// Field groups `(base register, esz, emul)` of an element destination.
    fn fields(self) -> impl Iterator<Item = (usize, usize, i32)> {
        let (reg, esz, emul, nf) = match self {
            Self::Elements { reg, esz, emul } => (reg, esz, emul, 1),
            Self::Segments { reg, esz, emul, nf } => (reg, esz, emul, nf),
            Self::Mask { .. } | Self::None => (0, 1, 0, 0),
        };
        let stride = VectorDescriptor::regs_for(emul);
        (0..nf).map(move |f| (reg + f * stride, esz, emul))
    }
}

/// Walks the active elements of one instruction.
#[derive(Debug)]
pub struct ElementIterator<'a> {
    desc: &'a VectorDescriptor,
    config: &'a VectorConfig,
}

impl<'a> ElementIterator<'a> {
    /// Creates an iterator for `desc` under the agnostic policy of `config`.
    pub const fn new(desc: &'a VectorDescriptor, config: &'a VectorConfig) -> Self {
        Self { desc, config }
    }

    /// Returns true if element `i` is active under the mask in `v0`.
    #[inline]
    pub fn is_active(&self, regs: &VectorRegisterFile, i: usize) -> bool {
        self.desc.vm || regs.mask_bit(0, i)
    }

    /// Runs `kernel` for every active element of `[vstart, vl)` and fills
    /// inactive and tail elements of `dest`.
    ///
    /// The mask is sampled before the first kernel call, so a kernel that
    /// writes `v0` does not change which elements are active.
    ///
    /// # Errors
    ///
    /// Stops at the first kernel error and returns it. Elements before the
    /// failing one keep their results; nothing past it is written.
    pub fn run<F>(&self, regs: &mut VectorRegisterFile, dest: Destination, mut kernel: F) -> Result<(), VectorError>
    where
        F: FnMut(&mut VectorRegisterFile, usize) -> Result<(), VectorError>,
    {
        let desc = self.desc;
        let mask: Option<Vec<u8>> = if desc.vm { None } else { Some(regs.group(0, 1)?.to_vec()) };
        let active = |i: usize| mask.as_ref().is_none_or(|m| m.get(i / 8).is_some_and(|b| (b >> (i % 8)) & 1 != 0));

        for i in desc.vstart..desc.vl {
            if active(i) {
                kernel(regs, i)?;
            } else if desc.vma && self.config.mask_agnostic_ones {
                fill_one(regs, dest, i)?;
            }
        }

        self.fill_tail(regs, dest)
    }

    /// Applies the tail policy to `dest` for `[vl, total)`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::RegisterOutOfRange`] if the destination does
    /// not fit the register file.
    pub fn fill_tail(&self, regs: &mut VectorRegisterFile, dest: Destination) -> Result<(), VectorError> {
        if !self.config.tail_agnostic_ones {
            return Ok(());
        }
        let desc = self.desc;
        let start = desc.vl.max(desc.vstart);
        if let Destination::Mask { reg } = dest {
            for i in start..desc.vlenb * 8 {
                regs.set_mask_bit(reg, i, true)?;
            }
        } else if desc.vta {
            for (reg, esz, emul) in dest.fields() {
                for i in start..desc.total_elems(emul, esz) {
                    regs.fill_ones(reg, i, esz)?;
                }
            }
        }
        Ok(())
    }
}

fn fill_one(regs: &mut VectorRegisterFile, dest: Destination, i: usize) -> Result<(), VectorError> {
    if let Destination::Mask { reg } = dest {
        return regs.set_mask_bit(reg, i, true);
    }
    for (reg, esz, _) in dest.fields() {
        regs.fill_ones(reg, i, esz)?;
    }
    Ok(())
}
