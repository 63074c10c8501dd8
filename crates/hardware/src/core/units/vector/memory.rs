//! Vector loads and stores.
//!
//! The engine does not own memory; callers supply a [`VectorMemory`] that
//! performs (or refuses) each element access. Accesses run in element
//! order, fields of one segment before the next element. A refused access
//! aborts the instruction with [`VectorError::MemoryFault`] and leaves
//! `vstart` at the faulting element, except for fault-only-first loads,
//! which trim `vl` when the fault is past element 0.

use super::{Effects, VectorEngine};
use super::descriptor::VectorDescriptor;
use super::iter::{Destination, ElementIterator};
use crate::common::constants::NUM_VREGS;
use crate::common::data::AccessType;
use crate::common::error::VectorError;
use crate::core::arch::vreg::VectorRegisterFile;

/// Memory seen by vector loads and stores.
pub trait VectorMemory {
    /// Reads `size` bytes (1, 2, 4 or 8) little-endian at `addr`.
    ///
    /// Returns `None` if the access faults.
    fn load(&mut self, addr: u64, size: usize) -> Option<u64>;

    /// Writes the low `size` bytes of `val` at `addr`.
    ///
    /// Returns `None` if the access faults.
    fn store(&mut self, addr: u64, size: usize, val: u64) -> Option<()>;
}

/// Address generation of a load or store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Addressing {
    /// Consecutive elements (`vle`/`vse`, `vlseg`/`vsseg`).
    UnitStride,
    /// Constant byte stride (`vlse`/`vsse`).
    Strided(i64),
    /// Byte offsets taken from an index register group (`vluxei`/`vloxei`).
    Indexed {
        /// Base of the index register group.
        index: usize,
        /// Ordered (`vloxei`) or unordered (`vluxei`); both run in order.
        ordered: bool,
    },
}

/// A load or store instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemOp {
    /// Base address (`rs1`).
    pub base: u64,
    /// Address generation.
    pub addressing: Addressing,
    /// Encoded EEW in bits: the data width for unit-stride and strided
    /// forms, the index width for indexed forms.
    pub eew: usize,
    /// Fields per segment (1 for non-segment forms).
    pub nf: usize,
}

impl MemOp {
    /// Unit-stride access of `eew`-bit elements.
    pub const fn unit(base: u64, eew: usize) -> Self {
        Self { base, addressing: Addressing::UnitStride, eew, nf: 1 }
    }

    /// Strided access of `eew`-bit elements.
    pub const fn strided(base: u64, stride: i64, eew: usize) -> Self {
        Self { base, addressing: Addressing::Strided(stride), eew, nf: 1 }
    }

    /// Indexed access with `index_eew`-bit offsets in `index`.
    pub const fn indexed(base: u64, index: usize, index_eew: usize, ordered: bool) -> Self {
        Self { base, addressing: Addressing::Indexed { index, ordered }, eew: index_eew, nf: 1 }
    }

    /// The same access with `nf` fields per segment.
    #[must_use]
    pub const fn segments(mut self, nf: usize) -> Self {
        self.nf = nf;
        self
    }
}

/// Resolved element geometry of a [`MemOp`].
#[derive(Clone, Copy, Debug)]
struct Layout {
    data_esz: usize,
    data_emul: i32,
    field_stride: usize,
}

fn eew_ok(eew: usize) -> Result<(), VectorError> {
    if matches!(eew, 8 | 16 | 32 | 64) {
        Ok(())
    } else {
        Err(VectorError::IllegalConfig("EEW must be 8, 16, 32 or 64"))
    }
}

impl MemOp {
    fn layout(&self, desc: &VectorDescriptor, reg: usize) -> Result<Layout, VectorError> {
        eew_ok(self.eew)?;
        if !(1..=8).contains(&self.nf) {
            return Err(VectorError::IllegalConfig("NFIELDS must be 1..=8"));
        }
        let (data_esz, data_emul) = match self.addressing {
            Addressing::UnitStride | Addressing::Strided(_) => (self.eew / 8, desc.emul_for(self.eew)),
            Addressing::Indexed { index, .. } => {
                desc.check_group(index, desc.emul_for(self.eew))?;
                (desc.esz(), desc.lmul)
            }
        };
        let field_stride = VectorDescriptor::regs_for(data_emul);
        if self.nf * field_stride > 8 {
            return Err(VectorError::IllegalConfig("EMUL * NFIELDS exceeds 8"));
        }
        desc.check_group(reg, data_emul)?;
        if reg + self.nf * field_stride > NUM_VREGS {
            return Err(VectorError::RegisterOutOfRange { base: reg, count: self.nf * field_stride });
        }
        Ok(Layout { data_esz, data_emul, field_stride })
    }

    /// Effective address of field `f` of element `i`.
    fn address(
        &self,
        regs: &VectorRegisterFile,
        layout: &Layout,
        i: usize,
        f: usize,
    ) -> Result<u64, VectorError> {
        let field = (f * layout.data_esz) as u64;
        let offset = match self.addressing {
            Addressing::UnitStride => ((i * self.nf) * layout.data_esz) as u64,
            Addressing::Strided(stride) => (i as i64).wrapping_mul(stride) as u64,
            Addressing::Indexed { index, .. } => regs.read(index, i, self.eew / 8)?,
        };
        Ok(self.base.wrapping_add(offset).wrapping_add(field))
    }
}

impl VectorEngine<'_> {
    /// Executes a unit-stride, strided or indexed load, segment forms
    /// included.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::MemoryFault`] for the first refused access
    /// and [`VectorError::IllegalConfig`] for an illegal EEW, EMUL or
    /// register layout.
    pub fn load<M: VectorMemory + ?Sized>(&mut self, op: MemOp, vd: usize, vm: bool, mem: &mut M) -> Result<(), VectorError> {
        let desc = self.descriptor(vm)?;
        let layout = op.layout(&desc, vd)?;
        desc.check_mask_overlap(vd)?;
        let dest = Destination::Segments { reg: vd, esz: layout.data_esz, emul: layout.data_emul, nf: op.nf };
        self.execute(&desc, dest, |regs, i, _| {
            for f in 0..op.nf {
                let addr = op.address(regs, &layout, i, f)?;
                let v = mem.load(addr, layout.data_esz).ok_or(VectorError::MemoryFault {
                    element: i,
                    addr,
                    access: AccessType::Read,
                })?;
                regs.write(vd + f * layout.field_stride, i, layout.data_esz, v)?;
            }
            Ok(())
        })
    }

    /// Executes a unit-stride, strided or indexed store, segment forms
    /// included.
    ///
    /// # Errors
    ///
    /// See [`VectorEngine::load`].
    pub fn store<M: VectorMemory + ?Sized>(&mut self, op: MemOp, vs3: usize, vm: bool, mem: &mut M) -> Result<(), VectorError> {
        let desc = self.descriptor(vm)?;
        let layout = op.layout(&desc, vs3)?;
        self.execute(&desc, Destination::None, |regs, i, _| {
            for f in 0..op.nf {
                let addr = op.address(regs, &layout, i, f)?;
                let v = regs.read(vs3 + f * layout.field_stride, i, layout.data_esz)?;
                mem.store(addr, layout.data_esz, v).ok_or(VectorError::MemoryFault {
                    element: i,
                    addr,
                    access: AccessType::Write,
                })?;
            }
            Ok(())
        })
    }

    /// Fault-only-first unit-stride load (`vle<eew>ff`, `vlseg<nf>e<eew>ff`).
    ///
    /// A fault on element 0 traps like a normal load; a fault on a later
    /// element sets `vl` to that element's index and completes normally.
    ///
    /// # Errors
    ///
    /// See [`VectorEngine::load`].
    pub fn load_first_fault<M: VectorMemory + ?Sized>(
        &mut self,
        op: MemOp,
        vd: usize,
        vm: bool,
        mem: &mut M,
    ) -> Result<(), VectorError> {
        if op.addressing != Addressing::UnitStride {
            return Err(VectorError::IllegalConfig("fault-only-first loads are unit-stride"));
        }
        match self.load(op, vd, vm, mem) {
            Err(VectorError::MemoryFault { element, addr, .. }) if element > 0 => {
                tracing::debug!(element, addr, "fault-only-first load trimmed vl");
                self.state.vl = element;
                self.state.vstart = 0;
                let desc = self.descriptor(vm)?;
                let layout = op.layout(&desc, vd)?;
                let dest = Destination::Segments { reg: vd, esz: layout.data_esz, emul: layout.data_emul, nf: op.nf };
                ElementIterator::new(&desc, self.config).fill_tail(self.regs, dest)
            }
            result => result,
        }
    }

    /// Whole-register load (`vl<nreg>re<eew>`). Ignores `vtype` and `vl`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] unless `nreg` is 1, 2, 4 or 8
    /// and `vd` is aligned to it, and [`VectorError::MemoryFault`] for a
    /// refused access.
    pub fn load_whole<M: VectorMemory + ?Sized>(
        &mut self,
        vd: usize,
        base: u64,
        nreg: usize,
        eew: usize,
        mem: &mut M,
    ) -> Result<(), VectorError> {
        let (esz, evl) = self.whole_layout(vd, nreg, eew)?;
        for i in self.state.vstart..evl {
            let addr = base.wrapping_add((i * esz) as u64);
            let Some(v) = mem.load(addr, esz) else {
                self.state.vstart = i;
                return Err(VectorError::MemoryFault { element: i, addr, access: AccessType::Read });
            };
            self.regs.write(vd, i, esz, v)?;
        }
        self.state.vstart = 0;
        Ok(())
    }

    /// Whole-register store (`vs<nreg>r`).
    ///
    /// # Errors
    ///
    /// See [`VectorEngine::load_whole`].
    pub fn store_whole<M: VectorMemory + ?Sized>(&mut self, vs3: usize, base: u64, nreg: usize, mem: &mut M) -> Result<(), VectorError> {
        let (esz, evl) = self.whole_layout(vs3, nreg, 8)?;
        for i in self.state.vstart..evl {
            let addr = base.wrapping_add((i * esz) as u64);
            let v = self.regs.read(vs3, i, esz)?;
            if mem.store(addr, esz, v).is_none() {
                self.state.vstart = i;
                return Err(VectorError::MemoryFault { element: i, addr, access: AccessType::Write });
            }
        }
        self.state.vstart = 0;
        Ok(())
    }

    fn whole_layout(&self, reg: usize, nreg: usize, eew: usize) -> Result<(usize, usize), VectorError> {
        eew_ok(eew)?;
        if !matches!(nreg, 1 | 2 | 4 | 8) || reg % nreg != 0 {
            return Err(VectorError::IllegalConfig("whole-register access needs an aligned power-of-two count"));
        }
        if reg + nreg > NUM_VREGS {
            return Err(VectorError::RegisterOutOfRange { base: reg, count: nreg });
        }
        let esz = eew / 8;
        Ok((esz, nreg * self.regs.vlenb() / esz))
    }

    /// `vlm.v`: loads `ceil(vl / 8)` mask bytes. The rest of `vd` is tail.
    ///
    /// # Errors
    ///
    /// See [`VectorEngine::load`].
    pub fn load_mask<M: VectorMemory + ?Sized>(&mut self, vd: usize, base: u64, mem: &mut M) -> Result<(), VectorError> {
        let desc = self.mask_descriptor()?;
        desc.check_group(vd, 0)?;
        let dest = Destination::Elements { reg: vd, esz: 1, emul: 0 };
        let result = ElementIterator::new(&desc, self.config).run(self.regs, dest, |regs, i| {
            let addr = base.wrapping_add(i as u64);
            let v = mem.load(addr, 1).ok_or(VectorError::MemoryFault { element: i, addr, access: AccessType::Read })?;
            regs.write(vd, i, 1, v)
        });
        self.commit(Effects::default(), &result);
        result
    }

    /// `vsm.v`: stores `ceil(vl / 8)` mask bytes.
    ///
    /// # Errors
    ///
    /// See [`VectorEngine::load`].
    pub fn store_mask<M: VectorMemory + ?Sized>(&mut self, vs3: usize, base: u64, mem: &mut M) -> Result<(), VectorError> {
        let desc = self.mask_descriptor()?;
        desc.check_group(vs3, 0)?;
        let result = ElementIterator::new(&desc, self.config).run(self.regs, Destination::None, |regs, i| {
            let addr = base.wrapping_add(i as u64);
            let v = regs.read(vs3, i, 1)?;
            mem.store(addr, 1, v).ok_or(VectorError::MemoryFault { element: i, addr, access: AccessType::Write })
        });
        self.commit(Effects::default(), &result);
        result
    }

    /// Descriptor of a mask transfer: EEW=8, `evl = ceil(vl / 8)`, unmasked
    /// and tail agnostic.
    fn mask_descriptor(&self) -> Result<VectorDescriptor, VectorError> {
        let desc = self.descriptor(true)?;
        Ok(VectorDescriptor { vl: desc.vl.div_ceil(8), sew: 8, lmul: 0, vta: true, ..desc })
    }
}
