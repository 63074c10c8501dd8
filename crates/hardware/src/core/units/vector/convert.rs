//! Float/int and float/float conversions.
//!
//! A conversion is a [`ConvertKind`] at one of three widths: single-width,
//! widening (destination is 2·SEW) and narrowing (source is 2·SEW). The
//! `rtz` kinds ignore `frm`; `rod` narrows with round-to-odd.

use rustc_apfloat::Round;

use super::iter::Destination;
use super::VectorEngine;
use crate::common::error::VectorError;
use crate::core::units::fpu::FloatFormat;
use crate::core::units::fpu::soft;

/// Width relation between source and destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConvertShape {
    /// Both SEW (`vfcvt`).
    Single,
    /// SEW to 2·SEW (`vfwcvt`).
    Widen,
    /// 2·SEW to SEW (`vfncvt`).
    Narrow,
}

/// What a conversion converts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConvertKind {
    /// `.xu.f`: float to unsigned.
    FloatToUnsigned,
    /// `.x.f`: float to signed.
    FloatToSigned,
    /// `.rtz.xu.f`
    FloatToUnsignedRtz,
    /// `.rtz.x.f`
    FloatToSignedRtz,
    /// `.f.xu`: unsigned to float.
    UnsignedToFloat,
    /// `.f.x`: signed to float.
    SignedToFloat,
    /// `.f.f`: between IEEE formats.
    FloatToFloat,
    /// `vfncvt.rod.f.f`
    FloatToFloatRod,
    /// `vfwcvtbf16.f.f` / `vfncvtbf16.f.f`: bfloat16 and single.
    BFloat16,
}

/// A conversion instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConvertOp {
    /// Width relation.
    pub shape: ConvertShape,
    /// Conversion performed.
    pub kind: ConvertKind,
}

impl ConvertOp {
    /// Creates a conversion.
    pub const fn new(shape: ConvertShape, kind: ConvertKind) -> Self {
        Self { shape, kind }
    }
}

/// Element endpoint of a conversion.
#[derive(Clone, Copy, Debug)]
enum End {
    Int { bits: usize, signed: bool },
    Float(FloatFormat),
}

fn ieee(bits: usize) -> Result<FloatFormat, VectorError> {
    FloatFormat::from_sew_bits(bits).ok_or(VectorError::IllegalConfig("no float format at this width"))
}

/// Resolves the source and destination endpoints for `op` at `sew` bits.
fn endpoints(op: ConvertOp, sew: usize) -> Result<(End, End), VectorError> {
    let (src_bits, dst_bits) = match op.shape {
        ConvertShape::Single => (sew, sew),
        ConvertShape::Widen => (sew, sew * 2),
        ConvertShape::Narrow => (sew * 2, sew),
    };
    let to_int = |signed| -> Result<(End, End), VectorError> {
        Ok((End::Float(ieee(src_bits)?), End::Int { bits: dst_bits, signed }))
    };
    let from_int = |signed| -> Result<(End, End), VectorError> {
        Ok((End::Int { bits: src_bits, signed }, End::Float(ieee(dst_bits)?)))
    };
    match (op.kind, op.shape) {
        (ConvertKind::FloatToUnsigned | ConvertKind::FloatToUnsignedRtz, _) => to_int(false),
        (ConvertKind::FloatToSigned | ConvertKind::FloatToSignedRtz, _) => to_int(true),
        (ConvertKind::UnsignedToFloat, _) => from_int(false),
        (ConvertKind::SignedToFloat, _) => from_int(true),
        (ConvertKind::FloatToFloat, ConvertShape::Widen | ConvertShape::Narrow)
        | (ConvertKind::FloatToFloatRod, ConvertShape::Narrow) => {
            Ok((End::Float(ieee(src_bits)?), End::Float(ieee(dst_bits)?)))
        }
        (ConvertKind::BFloat16, ConvertShape::Widen) if sew == 16 => {
            Ok((End::Float(FloatFormat::BFloat16), End::Float(FloatFormat::Single)))
        }
        (ConvertKind::BFloat16, ConvertShape::Narrow) if sew == 16 => {
            Ok((End::Float(FloatFormat::Single), End::Float(FloatFormat::BFloat16)))
        }
        _ => Err(VectorError::IllegalConfig("unsupported conversion")),
    }
}

impl End {
    const fn bytes(self) -> usize {
        match self {
            Self::Int { bits, .. } => bits / 8,
            Self::Float(fmt) => fmt.bytes(),
        }
    }
}

impl VectorEngine<'_> {
    /// Executes one `vfcvt`, `vfwcvt` or `vfncvt` form.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] when either endpoint has no
    /// format at the current SEW, when 2·SEW exceeds ELEN, for misaligned
    /// groups or a masked write to `v0`.
    pub fn convert(&mut self, op: ConvertOp, vd: usize, vs2: usize, vm: bool) -> Result<(), VectorError> {
        let desc = self.descriptor(vm)?;
        let (src, dst) = endpoints(op, desc.sew)?;
        let (src_emul, dst_emul) = match op.shape {
            ConvertShape::Single => (desc.lmul, desc.lmul),
            ConvertShape::Widen => (desc.lmul, desc.lmul + 1),
            ConvertShape::Narrow => (desc.lmul + 1, desc.lmul),
        };
        if op.shape != ConvertShape::Single {
            desc.check_widen(self.config.elen)?;
        }
        desc.check_group(vd, dst_emul)?;
        desc.check_group(vs2, src_emul)?;
        desc.check_mask_overlap(vd)?;
        let round = match op.kind {
            ConvertKind::FloatToUnsignedRtz | ConvertKind::FloatToSignedRtz => Round::TowardZero,
            _ => self.fenv.frm.to_round(),
        };
        let rod = op.kind == ConvertKind::FloatToFloatRod;
        let dest = Destination::Elements { reg: vd, esz: dst.bytes(), emul: dst_emul };
        self.execute(&desc, dest, |regs, i, fx| {
            let a = regs.read(vs2, i, src.bytes())?;
            let r = match (src, dst) {
                (End::Float(from), End::Int { bits, signed }) => soft::to_int(from, a, bits, signed, round),
                (End::Int { bits, signed }, End::Float(to)) => soft::from_int(to, a, bits, signed, round),
                (End::Float(from), End::Float(to)) if rod => soft::convert_round_odd(from, to, a),
                (End::Float(from), End::Float(to)) => soft::convert(from, to, a, round),
                (End::Int { .. }, End::Int { .. }) => return Err(VectorError::IllegalConfig("integer conversion")),
            };
            fx.raise(r.status);
            regs.write(vd, i, dst.bytes(), r.value)
        })
    }
}
