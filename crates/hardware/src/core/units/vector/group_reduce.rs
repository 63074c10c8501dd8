//! Grouped floating-point reductions.
//!
//! A [`ReductionEngine`] reduces fixed-size groups (32 or 64 elements) of a
//! narrow float format to one value per group. Sums are bit-exact to the
//! hardware datapath: every element is widened to a 38-bit fixed-point
//! fraction, aligned to the group's largest exponent with a sticky jam bit,
//! added as signed integers and rounded once at the end, either with `frm`
//! or to odd. Max and min fold
//! with `maximumNumber`/`minimumNumber`.
//!
//! The "dup" shape broadcasts each group's value to every lane of the group;
//! "compress" packs one value per group. Both produce identical values.

use super::descriptor::VectorDescriptor;
use super::iter::{Destination, ElementIterator};
use super::{Effects, VectorEngine};
use crate::common::constants::REDUCTION_FRACTION_BITS;
use crate::common::error::VectorError;
use crate::core::units::fpu::FloatFormat;
use crate::core::units::fpu::exception_flags::FpFlags;
use crate::core::units::fpu::nan_handling::{canonical_nan, is_nan, is_signaling_nan};
use crate::core::units::fpu::rounding_modes::RoundingMode;
use crate::core::units::fpu::soft;

/// Position of the hidden bit in the extended fraction.
const LEAD: u32 = REDUCTION_FRACTION_BITS - 1;

/// Group reduction operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GroupOp {
    /// Single-rounding sum.
    Sum,
    /// `maximumNumber` fold.
    Max,
    /// `minimumNumber` fold.
    Min,
}

/// Output layout of a grouped reduction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GroupShape {
    /// Every lane of a group receives the group value.
    Dup,
    /// Group `g` writes element `g`.
    Compress,
}

/// Bit-exact grouped reducer for one float format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReductionEngine {
    /// Element format (half, bfloat16 or single).
    pub fmt: FloatFormat,
    /// Elements per group (32 or 64).
    pub group: usize,
    /// Rounding mode of the final sum.
    pub round: RoundingMode,
    /// Round sums to odd instead of with `round`: truncate and set the
    /// LSB when any discarded bit is nonzero.
    pub round_odd: bool,
    /// Saturate overflowing results to the largest finite value.
    pub utn_sat: bool,
}

/// Scan of one group for special values.
#[derive(Debug, Default)]
struct Specials {
    nan: bool,
    signaling: bool,
    pos_inf: bool,
    neg_inf: bool,
}

impl Specials {
    fn scan(fmt: FloatFormat, elems: &[u64]) -> Self {
        let inf = fmt.infinity();
        let mut s = Self::default();
        for &e in elems {
            let mag = e & !fmt.sign_mask() & fmt.value_mask();
            if is_nan(fmt, e) {
                s.nan = true;
                s.signaling |= is_signaling_nan(fmt, e);
            } else if mag == inf {
                if e & fmt.sign_mask() == 0 {
                    s.pos_inf = true;
                } else {
                    s.neg_inf = true;
                }
            }
        }
        s
    }
}

impl ReductionEngine {
    /// Creates a round-to-nearest-even engine without saturation.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] for double precision or a
    /// group size other than 32 or 64.
    pub fn new(fmt: FloatFormat, group: usize) -> Result<Self, VectorError> {
        if fmt == FloatFormat::Double {
            return Err(VectorError::IllegalConfig("grouped reduction supports 16- and 32-bit formats"));
        }
        if group != 32 && group != 64 {
            return Err(VectorError::IllegalConfig("reduction group must be 32 or 64 elements"));
        }
        Ok(Self { fmt, group, round: RoundingMode::Rne, round_odd: false, utn_sat: false })
    }

    /// Sets the rounding mode of sums.
    #[must_use]
    pub const fn with_rounding(mut self, round: RoundingMode) -> Self {
        self.round = round;
        self
    }

    /// Selects round-to-odd for sums, overriding the rounding mode.
    #[must_use]
    pub const fn with_round_to_odd(mut self, round_odd: bool) -> Self {
        self.round_odd = round_odd;
        self
    }

    /// Enables or disables saturation on overflow.
    #[must_use]
    pub const fn with_saturation(mut self, utn_sat: bool) -> Self {
        self.utn_sat = utn_sat;
        self
    }

    /// Reduces one group.
    ///
    /// # Examples
    ///
    /// ```
    /// use vxsim_core::core::units::fpu::FloatFormat;
    /// use vxsim_core::core::units::vector::group_reduce::{GroupOp, ReductionEngine};
    ///
    /// let engine = ReductionEngine::new(FloatFormat::Half, 32).unwrap();
    /// let mut group = vec![0u64; 32];
    /// group[0] = 0x3c00; // 1.0
    /// group[1] = 0xbc00; // -1.0
    /// let (value, flags) = engine.reduce_group(GroupOp::Sum, &group);
    /// assert_eq!(value, 0);
    /// assert!(flags.is_empty());
    /// ```
    pub fn reduce_group(&self, op: GroupOp, elems: &[u64]) -> (u64, FpFlags) {
        let fmt = self.fmt;
        let Some(&first) = elems.first() else {
            return (0, FpFlags::NONE);
        };
        let specials = Specials::scan(fmt, elems);
        if specials.nan {
            let flags = if specials.signaling { FpFlags::NV } else { FpFlags::NONE };
            return (canonical_nan(fmt), flags);
        }
        match op {
            GroupOp::Sum if specials.pos_inf && specials.neg_inf => (canonical_nan(fmt), FpFlags::NV),
            GroupOp::Sum if specials.pos_inf => (fmt.infinity(), FpFlags::NONE),
            GroupOp::Sum if specials.neg_inf => (fmt.infinity() | fmt.sign_mask(), FpFlags::NONE),
            GroupOp::Sum => self.sum(elems),
            GroupOp::Max | GroupOp::Min => {
                let fold = if op == GroupOp::Max { soft::max } else { soft::min };
                let value = elems.iter().skip(1).fold(first & fmt.value_mask(), |acc, &e| fold(fmt, acc, e).value);
                (self.saturate_infinity(value), FpFlags::NONE)
            }
        }
    }

    /// Reduces `input` group by group. The last group may be short.
    ///
    /// Returns the output lanes (one per input element for
    /// [`GroupShape::Dup`], one per group for [`GroupShape::Compress`]) and
    /// the union of every group's flags.
    pub fn reduce(&self, op: GroupOp, shape: GroupShape, input: &[u64]) -> (Vec<u64>, FpFlags) {
        let mut flags = FpFlags::NONE;
        let mut out = Vec::with_capacity(match shape {
            GroupShape::Dup => input.len(),
            GroupShape::Compress => input.len().div_ceil(self.group),
        });
        for chunk in input.chunks(self.group) {
            let (value, f) = self.reduce_group(op, chunk);
            flags |= f;
            match shape {
                GroupShape::Dup => out.extend(std::iter::repeat_n(value, chunk.len())),
                GroupShape::Compress => out.push(value),
            }
        }
        (out, flags)
    }

    fn saturate_infinity(&self, value: u64) -> u64 {
        let fmt = self.fmt;
        if self.utn_sat && value & !fmt.sign_mask() == fmt.infinity() {
            (value & fmt.sign_mask()) | fmt.largest_finite()
        } else {
            value
        }
    }

    /// Unpacks a finite nonzero element to `(biased exponent, extended
    /// fraction)` with the leading one at bit `LEAD`.
    fn unpack(&self, bits: u64) -> Option<(i32, u64)> {
        let fmt = self.fmt;
        let fb = fmt.frac_bits();
        let exp = ((bits >> fb) & fmt.exp_mask()) as i32;
        let frac = bits & fmt.frac_mask();
        if exp == 0 && frac == 0 {
            return None;
        }
        if exp == 0 {
            let m = frac << (LEAD - fb);
            let lz = m.leading_zeros() - (64 - REDUCTION_FRACTION_BITS);
            Some((1 - lz as i32, m << lz))
        } else {
            Some((exp, ((1 << fb) | frac) << (LEAD - fb)))
        }
    }

    fn sum(&self, elems: &[u64]) -> (u64, FpFlags) {
        let fmt = self.fmt;
        let sign_mask = fmt.sign_mask();
        let unpacked: Vec<(bool, i32, u64)> = elems
            .iter()
            .filter_map(|&e| self.unpack(e).map(|(exp, m)| (e & sign_mask != 0, exp, m)))
            .collect();

        let all_negative_zero = unpacked.is_empty() && elems.iter().all(|&e| e & sign_mask != 0);
        let max_exp = unpacked.iter().map(|&(_, exp, _)| exp).max().unwrap_or(0);

        let mut sum = 0i64;
        for &(negative, exp, m) in &unpacked {
            let shift = (max_exp - exp) as u32;
            let aligned = if shift >= 64 {
                u64::from(m != 0)
            } else {
                let jam = m & ((1u64 << shift) - 1) != 0;
                (m >> shift) | u64::from(jam)
            };
            let term = aligned as i64;
            sum += if negative { -term } else { term };
        }

        if sum == 0 {
            let rdn = !self.round_odd && self.round == RoundingMode::Rdn;
            let negative = all_negative_zero || (rdn && !unpacked.is_empty());
            return (if negative { sign_mask } else { 0 }, FpFlags::NONE);
        }

        let negative = sum < 0;
        let mag = sum.unsigned_abs();
        self.round_pack(negative, max_exp, mag)
    }

    /// Normalizes and rounds `mag · 2^(exp - bias - LEAD)` into the format.
    fn round_pack(&self, negative: bool, exp: i32, mag: u64) -> (u64, FpFlags) {
        let fmt = self.fmt;
        let fb = fmt.frac_bits() as i32;
        let msb = 63 - mag.leading_zeros() as i32;
        let biased = exp + (msb - LEAD as i32);
        let tiny = biased <= 0;
        let shift = msb - fb + if tiny { 1 - biased } else { 0 };

        let (kept, round_bit, sticky) = if shift <= 0 {
            (mag << shift.unsigned_abs(), false, false)
        } else {
            let shift = shift.min(100) as u32;
            let wide = u128::from(mag);
            let kept = (wide >> shift) as u64;
            let round_bit = (wide >> (shift - 1)) & 1 != 0;
            let sticky = wide & ((1u128 << (shift - 1)) - 1) != 0;
            (kept, round_bit, sticky)
        };

        let inexact = round_bit || sticky;
        let (kept, increment) = if self.round_odd {
            (kept | u64::from(inexact), false)
        } else {
            (kept, self.nearest_or_directed_increment(negative, kept, round_bit, sticky))
        };

        let exp_field = if tiny { 0 } else { (biased - 1) as u64 };
        let magnitude = (exp_field << fb) + kept + u64::from(increment);
        let sign = if negative { fmt.sign_mask() } else { 0 };

        if magnitude >= fmt.infinity() {
            let toward_zero = self.round_odd
                || match self.round {
                    RoundingMode::Rtz => true,
                    RoundingMode::Rdn => !negative,
                    RoundingMode::Rup => negative,
                    RoundingMode::Rne | RoundingMode::Rmm => false,
                };
            let value = if toward_zero || self.utn_sat { fmt.largest_finite() } else { fmt.infinity() };
            return (sign | value, FpFlags::OF | FpFlags::NX);
        }

        let mut flags = FpFlags::NONE;
        if inexact {
            flags |= FpFlags::NX;
            if tiny {
                flags |= FpFlags::UF;
            }
        }
        (sign | magnitude, flags)
    }

    const fn nearest_or_directed_increment(
        &self,
        negative: bool,
        kept: u64,
        round_bit: bool,
        sticky: bool,
    ) -> bool {
        let inexact = round_bit || sticky;
        match self.round {
            RoundingMode::Rne => round_bit && (sticky || kept & 1 != 0),
            RoundingMode::Rmm => round_bit,
            RoundingMode::Rtz => false,
            RoundingMode::Rdn => inexact && negative,
            RoundingMode::Rup => inexact && !negative,
        }
    }
}

impl VectorEngine<'_> {
    /// Grouped reduction of `vs2[0..vl)` into `vd`.
    ///
    /// SEW must match the width of `fmt`; BFloat16 is selected explicitly
    /// since SEW alone cannot tell it from half precision. Sums round with
    /// the dynamic `frm`, and overflow saturates when `utn_sat` is set.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::IllegalConfig`] for a nonzero `vstart`, a SEW
    /// that does not match `fmt`, a double-precision format or misaligned
    /// groups.
    pub fn group_reduce(
        &mut self,
        op: GroupOp,
        shape: GroupShape,
        fmt: FloatFormat,
        vd: usize,
        vs2: usize,
    ) -> Result<(), VectorError> {
        self.require_vstart_zero()?;
        let desc = self.descriptor(true)?;
        if fmt.bits() as usize != desc.sew {
            return Err(VectorError::IllegalConfig("SEW does not match the reduction format"));
        }
        desc.check_group(vd, desc.lmul)?;
        desc.check_group(vs2, desc.lmul)?;
        let engine = ReductionEngine::new(fmt, self.config.reduction_group)?
            .with_rounding(self.fenv.frm)
            .with_saturation(self.state.utn_sat);

        let esz = desc.esz();
        let input = (0..desc.vl).map(|i| self.regs.read(vs2, i, esz)).collect::<Result<Vec<_>, _>>()?;
        let (out, flags) = engine.reduce(op, shape, &input);
        for (i, &v) in out.iter().enumerate() {
            self.regs.write(vd, i, esz, v)?;
        }

        let written = VectorDescriptor { vl: out.len(), ..desc };
        let result = ElementIterator::new(&written, self.config).fill_tail(self.regs, Destination::sew(&desc, vd));
        self.commit(Effects { vxsat: false, flags }, &result);
        result
    }
}
