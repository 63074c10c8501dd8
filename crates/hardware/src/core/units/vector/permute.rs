//! Permutation instructions.
//!
//! Slides, register gathers and compress move elements between indices,
//! so their destination must not overlap the source group. Scalar moves
//! touch element 0 only.

use super::descriptor::VectorDescriptor;
use super::float::float_format;
use super::iter::{Destination, ElementIterator};
use super::{Operand, VectorEngine, sign_extend};
use crate::common::error::VectorError;
use crate::core::units::fpu::nan_handling::{nan_box, unbox};

/// Slide amount and direction.
///
/// The `1` forms shift by one element and insert a scalar; for
/// `vfslide1up`/`vfslide1down` pass the unboxed float bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slide {
    /// `vslideup`: `vd[i + offset] = vs2[i]`; lower elements are untouched.
    Up(u64),
    /// `vslidedown`: `vd[i] = vs2[i + offset]`, zero past VLMAX.
    Down(u64),
    /// `vslide1up`: `vd[0] = x`, `vd[i] = vs2[i - 1]`.
    Up1(u64),
    /// `vslide1down`: `vd[vl - 1] = x`, `vd[i] = vs2[i + 1]`.
    Down1(u64),
}

/// Returns true if two register groups share a register.
pub const fn overlaps(a: usize, a_emul: i32, b: usize, b_emul: i32) -> bool {
    let a_end = a + VectorDescriptor::regs_for(a_emul);
    let b_end = b + VectorDescriptor::regs_for(b_emul);
    a < b_end && b < a_end
}

impl VectorEngine<'_> {
    /// Executes one slide form.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] when `vd` overlaps `vs2` for
    /// the up forms, for misaligned groups or a masked write to `v0`.
    pub fn slide(&mut self, slide: Slide, vd: usize, vs2: usize, vm: bool) -> Result<(), VectorError> {
        let desc = self.descriptor(vm)?;
        desc.check_group(vd, desc.lmul)?;
        desc.check_group(vs2, desc.lmul)?;
        desc.check_mask_overlap(vd)?;
        if matches!(slide, Slide::Up(_) | Slide::Up1(_)) && overlaps(vd, desc.lmul, vs2, desc.lmul) {
            return Err(VectorError::IllegalConfig("slideup destination overlaps source"));
        }
        let esz = desc.esz();
        let vlmax = desc.vlmax() as u64;
        let vl = desc.vl;
        let mut body = desc;
        if let Slide::Up(offset) = slide {
            body.vstart = usize::try_from(offset).map_or(vl, |off| desc.vstart.max(off).min(vl));
        }
        self.execute(&body, Destination::sew(&desc, vd), |regs, i, _| {
            let v = match slide {
                Slide::Up(offset) => regs.read(vs2, i - offset as usize, esz)?,
                Slide::Down(offset) => {
                    let src = (i as u64).saturating_add(offset);
                    if src < vlmax { regs.read(vs2, src as usize, esz)? } else { 0 }
                }
                Slide::Up1(x) if i == 0 => x,
                Slide::Up1(_) => regs.read(vs2, i - 1, esz)?,
                Slide::Down1(x) if i + 1 == vl => x,
                Slide::Down1(_) => regs.read(vs2, i + 1, esz)?,
            };
            regs.write(vd, i, esz, v)
        })
    }

    /// `vrgather.vv`, `.vx` and `.vi`: `vd[i] = vs2[index[i]]`, zero when the
    /// index is at or past VLMAX.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] when `vd` overlaps a source,
    /// for misaligned groups or a masked write to `v0`.
    pub fn gather(&mut self, vd: usize, vs2: usize, index: Operand, vm: bool) -> Result<(), VectorError> {
        let desc = self.descriptor(vm)?;
        self.gather_with(&desc, vd, vs2, index, desc.esz(), desc.lmul)
    }

    /// `vrgatherei16.vv`: as [`VectorEngine::gather`] with 16-bit indices.
    ///
    /// # Errors
    ///
    /// See [`VectorEngine::gather`].
    pub fn gather_ei16(&mut self, vd: usize, vs2: usize, vs1: usize, vm: bool) -> Result<(), VectorError> {
        let desc = self.descriptor(vm)?;
        let emul = desc.emul_for(16);
        self.gather_with(&desc, vd, vs2, Operand::Vector(vs1), 2, emul)
    }

    fn gather_with(
        &mut self,
        desc: &VectorDescriptor,
        vd: usize,
        vs2: usize,
        index: Operand,
        index_esz: usize,
        index_emul: i32,
    ) -> Result<(), VectorError> {
        desc.check_group(vd, desc.lmul)?;
        desc.check_group(vs2, desc.lmul)?;
        index.check(desc, index_emul)?;
        desc.check_mask_overlap(vd)?;
        let index_overlap = matches!(index, Operand::Vector(r) if overlaps(vd, desc.lmul, r, index_emul));
        if overlaps(vd, desc.lmul, vs2, desc.lmul) || index_overlap {
            return Err(VectorError::IllegalConfig("vrgather destination overlaps source"));
        }
        let esz = desc.esz();
        let vlmax = desc.vlmax() as u64;
        self.execute(desc, Destination::sew(desc, vd), |regs, i, _| {
            let idx = match index {
                Operand::Vector(reg) => regs.read(reg, i, index_esz)?,
                Operand::Scalar(x) => x,
                Operand::Imm(imm) => imm as u64,
            };
            let v = if idx < vlmax { regs.read(vs2, idx as usize, esz)? } else { 0 };
            regs.write(vd, i, esz, v)
        })
    }

    /// `vcompress.vm`: packs the elements of `vs2` selected by mask `vs1`
    /// into the low elements of `vd`. Elements past the packed count are
    /// tail.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] when `vstart` is nonzero or
    /// `vd` overlaps a source.
    pub fn compress(&mut self, vd: usize, vs2: usize, vs1: usize) -> Result<(), VectorError> {
        self.require_vstart_zero()?;
        let desc = self.descriptor(true)?;
        desc.check_group(vd, desc.lmul)?;
        desc.check_group(vs2, desc.lmul)?;
        desc.check_group(vs1, 0)?;
        if overlaps(vd, desc.lmul, vs2, desc.lmul) || overlaps(vd, desc.lmul, vs1, 0) {
            return Err(VectorError::IllegalConfig("vcompress destination overlaps source"));
        }
        let esz = desc.esz();
        let mut packed = 0usize;
        self.execute(&desc, Destination::None, |regs, i, _| {
            if regs.mask_bit(vs1, i) {
                let v = regs.read(vs2, i, esz)?;
                regs.write(vd, packed, esz, v)?;
                packed += 1;
            }
            Ok(())
        })?;
        let tail = VectorDescriptor { vl: packed, ..desc };
        ElementIterator::new(&tail, self.config).fill_tail(self.regs, Destination::sew(&desc, vd))
    }

    /// `vmv.x.s`: element 0 sign-extended to XLEN.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] while `vill` is set.
    pub fn mv_x_s(&mut self, vs2: usize) -> Result<u64, VectorError> {
        let desc = self.descriptor(true)?;
        desc.check_group(vs2, 0)?;
        let v = self.regs.read(vs2, 0, desc.esz())?;
        self.state.vstart = 0;
        Ok(sign_extend(v, desc.esz()) as u64)
    }

    /// `vmv.s.x`: writes element 0 when `vstart < vl`; the rest of `vd` is
    /// tail.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] while `vill` is set.
    pub fn mv_s_x(&mut self, vd: usize, x: u64) -> Result<(), VectorError> {
        let desc = self.descriptor(true)?;
        desc.check_group(vd, 0)?;
        let esz = desc.esz();
        let scalar = VectorDescriptor { vl: desc.vl.min(1), lmul: desc.lmul.min(0), ..desc };
        self.execute(&scalar, Destination::Elements { reg: vd, esz, emul: 0 }, |regs, i, _| {
            regs.write(vd, i, esz, x)
        })
    }

    /// `vfmv.f.s`: element 0 NaN-boxed to 64 bits.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] for SEW=8 or while `vill` is
    /// set.
    pub fn fmv_f_s(&mut self, vs2: usize) -> Result<u64, VectorError> {
        let desc = self.descriptor(true)?;
        let fmt = float_format(&desc)?;
        desc.check_group(vs2, 0)?;
        let v = self.regs.read(vs2, 0, fmt.bytes())?;
        self.state.vstart = 0;
        Ok(nan_box(fmt, v))
    }

    /// `vfmv.s.f`: unboxes `f` and writes it to element 0.
    ///
    /// # Errors
    ///
    /// See [`VectorEngine::fmv_f_s`].
    pub fn fmv_s_f(&mut self, vd: usize, f: u64) -> Result<(), VectorError> {
        let desc = self.descriptor(true)?;
        let fmt = float_format(&desc)?;
        self.mv_s_x(vd, unbox(fmt, f))
    }

    /// `vmv<nr>r.v`: copies `nr` whole registers, independent of `vtype`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] unless `nr` is 1, 2, 4 or 8 and
    /// both groups are aligned to it.
    pub fn mv_whole(&mut self, vd: usize, vs2: usize, nr: usize) -> Result<(), VectorError> {
        if !matches!(nr, 1 | 2 | 4 | 8) || vd % nr != 0 || vs2 % nr != 0 {
            return Err(VectorError::IllegalConfig("whole-register move needs an aligned power-of-two count"));
        }
        let src = self.regs.group(vs2, nr)?.to_vec();
        self.regs.group_mut(vd, nr)?.copy_from_slice(&src);
        self.state.vstart = 0;
        Ok(())
    }
}
