//! RISC-V Vector Unit (RVV 1.0).
//!
//! This module implements the vector instruction semantics used by the
//! execute stage. Every instruction is one call on [`VectorEngine`], which
//! validates the register groups, walks the elements through the
//! [`iter::ElementIterator`], runs a scalar kernel per active element and
//! folds the sticky `vxsat` and `fflags` side effects back into the hart
//! state before returning.
//!
//! Operations are organized into submodules by family:
//! - [`integer`]:      Add, logic, shifts, min/max, multiply, divide, carries
//! - [`fixed_point`]:  Saturating, averaging and scaling ops, `vnclip`
//! - [`widening`]:     `vw*` integer arithmetic and multiply-add
//! - [`compare`]:      Integer and float compares into a mask
//! - [`mask`]:         Mask logic, `vcpop`, `vfirst`, `vms*f`, `viota`, `vid`
//! - [`permute`]:      Slides, gathers, compress and scalar moves
//! - [`reduction`]:    Single-result integer and float reductions
//! - [`float`]:        Float arithmetic, fused multiply-add, sqrt and class
//! - [`convert`]:      Float/int and float/float conversions
//! - [`memory`]:       Loads and stores through [`memory::VectorMemory`]
//! - [`group_reduce`]: Grouped dup/compress float reductions
//! - [`sfu`]:          Element-wise SFU instructions

/// Integer fixed-point rounding unit.
pub mod rounding;

/// Per-instruction configuration snapshot.
pub mod descriptor;

/// Element iteration with mask and tail policies.
pub mod iter;

/// Single-width integer arithmetic.
pub mod integer;

/// Fixed-point arithmetic.
pub mod fixed_point;

/// Widening integer arithmetic.
pub mod widening;

/// Mask-producing compares.
pub mod compare;

/// Mask register operations.
pub mod mask;

/// Permutation instructions.
pub mod permute;

/// Single-result reductions.
pub mod reduction;

/// Floating-point arithmetic.
pub mod float;

/// Floating-point conversions.
pub mod convert;

/// Vector loads and stores.
pub mod memory;

/// Grouped floating-point reductions.
pub mod group_reduce;

/// Element-wise SFU instructions.
pub mod sfu;

use rustc_apfloat::Status;

use self::descriptor::VectorDescriptor;
use self::iter::{Destination, ElementIterator};
use crate::common::error::VectorError;
use crate::config::VectorConfig;
use crate::core::arch::vreg::VectorRegisterFile;
use crate::core::arch::vstate::VectorState;
use crate::core::units::fpu::FloatEnv;
use crate::core::units::fpu::exception_flags::FpFlags;

/// Second source operand of a vector instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    /// `.vv`: a vector register group.
    Vector(usize),
    /// `.vx` / `.vf`: a scalar register value, truncated to the element.
    Scalar(u64),
    /// `.vi`: a sign-extended 5-bit immediate.
    Imm(i64),
}

impl Operand {
    /// Reads element `i` of width `esz` bytes, zero-extended.
    ///
    /// # Errors
    ///
    /// Propagates register file range errors for vector operands.
    #[inline]
    pub fn read(self, regs: &VectorRegisterFile, i: usize, esz: usize) -> Result<u64, VectorError> {
        match self {
            Self::Vector(reg) => regs.read(reg, i, esz),
            Self::Scalar(x) => Ok(x & width_mask(esz)),
            Self::Imm(imm) => Ok(imm as u64 & width_mask(esz)),
        }
    }

    /// Reads element `i` sign-extended to 64 bits.
    ///
    /// # Errors
    ///
    /// Propagates register file range errors for vector operands.
    #[inline]
    pub fn read_signed(self, regs: &VectorRegisterFile, i: usize, esz: usize) -> Result<i64, VectorError> {
        Ok(sign_extend(self.read(regs, i, esz)?, esz))
    }

    /// Validates a vector operand as a group of EMUL `emul`.
    ///
    /// # Errors
    ///
    /// See [`VectorDescriptor::check_group`].
    pub fn check(self, desc: &VectorDescriptor, emul: i32) -> Result<(), VectorError> {
        match self {
            Self::Vector(reg) => desc.check_group(reg, emul),
            Self::Scalar(_) | Self::Imm(_) => Ok(()),
        }
    }
}

/// Mask covering the low `esz` bytes.
#[inline]
pub const fn width_mask(esz: usize) -> u64 {
    if esz >= 8 { u64::MAX } else { (1u64 << (esz * 8)) - 1 }
}

/// Sign-extends the low `esz` bytes of `v`.
#[inline]
pub const fn sign_extend(v: u64, esz: usize) -> i64 {
    let shift = 64 - 8 * esz as u32;
    ((v << shift) as i64) >> shift
}

/// Sticky side effects accumulated while an instruction runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Effects {
    /// Some element saturated.
    pub vxsat: bool,
    /// Accrued floating-point exceptions.
    pub flags: FpFlags,
}

impl Effects {
    /// Records a saturation.
    #[inline]
    pub const fn saturate(&mut self) {
        self.vxsat = true;
    }

    /// Accrues a soft-float status.
    #[inline]
    pub fn raise(&mut self, status: Status) {
        if status != Status::OK {
            self.flags |= FpFlags::from_status(status);
        }
    }
}

/// Executes vector instructions against borrowed hart state.
///
/// The engine holds no state of its own; construct one per instruction or
/// per basic block from a [`VectorContext`] or from the caller's own
/// register storage.
#[derive(Debug)]
pub struct VectorEngine<'a> {
    /// Vector register file.
    pub regs: &'a mut VectorRegisterFile,
    /// `vl`, `vtype`, `vstart` and the fixed-point CSRs.
    pub state: &'a mut VectorState,
    /// Dynamic rounding mode and accrued flags.
    pub fenv: &'a mut FloatEnv,
    /// Hardware parameters.
    pub config: &'a VectorConfig,
}

impl<'a> VectorEngine<'a> {
    /// Creates an engine over the given hart state.
    pub const fn new(
        regs: &'a mut VectorRegisterFile,
        state: &'a mut VectorState,
        fenv: &'a mut FloatEnv,
        config: &'a VectorConfig,
    ) -> Self {
        Self { regs, state, fenv, config }
    }

    /// Snapshot of the current configuration for one instruction.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] while `vill` is set.
    pub fn descriptor(&self, vm: bool) -> Result<VectorDescriptor, VectorError> {
        VectorDescriptor::from_state(self.state, vm, self.regs.vlenb())
    }

    /// Executes `vsetvl` and returns the new `vl`.
    pub fn vsetvl(&mut self, avl: u64, raw_vtype: u64, rd_is_x0: bool, rs1_is_x0: bool) -> usize {
        self.state.vsetvl(avl, raw_vtype, rd_is_x0, rs1_is_x0, self.regs.vlenb(), self.config.elen)
    }

    /// Runs `kernel` over the active elements of `desc` and commits the
    /// instruction's side effects.
    ///
    /// `vxsat` and `fflags` are OR-ed in even when the loop stops early.
    /// `vstart` returns to 0 on success and holds the faulting element after
    /// a memory fault.
    fn execute<F>(&mut self, desc: &VectorDescriptor, dest: Destination, mut kernel: F) -> Result<(), VectorError>
    where
        F: FnMut(&mut VectorRegisterFile, usize, &mut Effects) -> Result<(), VectorError>,
    {
        let mut fx = Effects::default();
        let iter = ElementIterator::new(desc, self.config);
        let result = iter.run(self.regs, dest, |regs, i| kernel(regs, i, &mut fx));
        self.commit(fx, &result);
        result
    }

    /// Folds sticky effects into the hart and settles `vstart`.
    fn commit(&mut self, fx: Effects, result: &Result<(), VectorError>) {
        self.state.vxsat |= fx.vxsat;
        self.fenv.raise(fx.flags);
        match result {
            Ok(()) => self.state.vstart = 0,
            Err(VectorError::MemoryFault { element, addr, access }) => {
                tracing::debug!(element, addr, ?access, "vector memory fault");
                self.state.vstart = *element;
            }
            Err(err) => tracing::debug!(%err, "vector instruction aborted"),
        }
    }

    /// Rejects instructions that cannot restart from a nonzero `vstart`.
    fn require_vstart_zero(&self) -> Result<(), VectorError> {
        if self.state.vstart != 0 {
            return Err(VectorError::IllegalConfig("vstart must be zero"));
        }
        Ok(())
    }
}

/// Owned vector state of one hart.
///
/// Convenience wrapper for callers (and tests) that do not keep their own
/// register storage.
#[derive(Clone, Debug)]
pub struct VectorContext {
    /// Vector register file.
    pub regs: VectorRegisterFile,
    /// Vector CSRs.
    pub state: VectorState,
    /// Floating-point environment.
    pub fenv: FloatEnv,
    /// Hardware parameters.
    pub config: VectorConfig,
}

impl VectorContext {
    /// Creates reset state for `config`.
    pub fn new(config: VectorConfig) -> Self {
        Self {
            regs: VectorRegisterFile::new(config.vlenb()),
            state: VectorState::new(),
            fenv: FloatEnv::new(),
            config,
        }
    }

    /// Borrows the context as an engine.
    pub fn engine(&mut self) -> VectorEngine<'_> {
        VectorEngine::new(&mut self.regs, &mut self.state, &mut self.fenv, &self.config)
    }
}
