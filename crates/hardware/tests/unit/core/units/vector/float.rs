//! Floating-point arithmetic and conversion tests.

use crate::common::harness::VectorHarness;
use pretty_assertions::assert_eq;
use rstest::rstest;
use vxsim_core::core::units::fpu::FloatFormat;
use vxsim_core::core::units::fpu::exception_flags::FpFlags;
use vxsim_core::core::units::fpu::nan_handling::nan_box;
use vxsim_core::core::units::fpu::rounding_modes::RoundingMode;
use vxsim_core::core::units::vector::Operand;
use vxsim_core::core::units::vector::convert::{ConvertKind, ConvertOp, ConvertShape};
use vxsim_core::core::units::vector::float::{FloatOp, FloatUnary, FmaOp, WideFloatOp};

fn f32s(values: &[f32]) -> Vec<u64> {
    values.iter().map(|f| u64::from(f.to_bits())).collect()
}

fn single(f: f32) -> Operand {
    Operand::Scalar(nan_box(FloatFormat::Single, u64::from(f.to_bits())))
}

// ══════════════════════════════════════════════════════════
// 1. Arithmetic
// ══════════════════════════════════════════════════════════

#[test]
fn test_vfadd_vf() {
    let mut h = VectorHarness::new();
    let _ = h.configure(32, 0, 2, 0);
    h.fill(2, 4, &f32s(&[1.5, -0.0]));
    h.engine().float_binary(FloatOp::Add, 1, 2, single(2.5), true).unwrap();
    assert_eq!(h.dump(1, 4, 2), f32s(&[4.0, 2.5]));
    assert!(h.ctx.fenv.fflags.is_empty());
}

#[rstest]
#[case(RoundingMode::Rne, 0x3eaa_aaab)]
#[case(RoundingMode::Rdn, 0x3eaa_aaaa)]
#[case(RoundingMode::Rup, 0x3eaa_aaab)]
#[case(RoundingMode::Rtz, 0x3eaa_aaaa)]
fn test_division_follows_frm(#[case] frm: RoundingMode, #[case] expected: u64) {
    let mut h = VectorHarness::new();
    let _ = h.configure(32, 0, 1, 0);
    h.ctx.fenv.frm = frm;
    h.fill(2, 4, &f32s(&[1.0]));
    h.engine().float_binary(FloatOp::Div, 1, 2, single(3.0), true).unwrap();
    assert_eq!(h.dump(1, 4, 1), vec![expected]);
    assert_eq!(h.ctx.fenv.fflags, FpFlags::NX);
}

#[test]
fn test_flags_accrue_across_instructions() {
    let mut h = VectorHarness::new();
    let _ = h.configure(32, 0, 2, 0);
    h.fill(2, 4, &f32s(&[1.0, 0.0]));
    h.fill(3, 4, &f32s(&[0.0, 0.0]));
    h.engine().float_binary(FloatOp::Div, 1, 2, Operand::Vector(3), true).unwrap();
    assert_eq!(h.dump(1, 4, 2), vec![0x7f80_0000, 0x7fc0_0000]);
    assert_eq!(h.ctx.fenv.fflags, FpFlags::DZ | FpFlags::NV);

    h.engine().float_binary(FloatOp::Add, 1, 2, Operand::Vector(3), true).unwrap();
    assert_eq!(h.ctx.fenv.fflags, FpFlags::DZ | FpFlags::NV, "flags are sticky");
}

#[test]
fn test_masked_elements_raise_nothing() {
    let mut h = VectorHarness::new();
    let _ = h.configure(32, 0, 2, 0);
    h.fill(2, 4, &f32s(&[1.0, 1.0]));
    h.fill(3, 4, &f32s(&[0.0, 1.0]));
    h.set_mask(2, |i| i == 1);
    h.engine().float_binary(FloatOp::Div, 1, 2, Operand::Vector(3), false).unwrap();
    assert!(h.ctx.fenv.fflags.is_empty());
}

#[test]
fn test_sign_injection() {
    let mut h = VectorHarness::new();
    let _ = h.configure(32, 0, 2, 0);
    h.fill(2, 4, &f32s(&[1.0, -2.0]));
    h.engine().float_binary(FloatOp::Sgnjn, 1, 2, single(1.0), true).unwrap();
    assert_eq!(h.dump(1, 4, 2), f32s(&[-1.0, -2.0]));
    h.engine().float_binary(FloatOp::Sgnjx, 1, 2, single(-1.0), true).unwrap();
    assert_eq!(h.dump(1, 4, 2), f32s(&[-1.0, 2.0]));
}

#[test]
fn test_fused_multiply_add_forms() {
    let mut h = VectorHarness::new();
    let _ = h.configure(32, 0, 1, 0);
    h.fill(1, 4, &f32s(&[1.0]));
    h.fill(2, 4, &f32s(&[3.0]));
    h.engine().float_mul_add(FmaOp::Macc, 1, single(2.0), 2, true).unwrap();
    assert_eq!(h.dump(1, 4, 1), f32s(&[7.0]));
    h.engine().float_mul_add(FmaOp::Nmacc, 1, single(2.0), 2, true).unwrap();
    assert_eq!(h.dump(1, 4, 1), f32s(&[-13.0]));
    h.engine().float_mul_add(FmaOp::Madd, 1, single(2.0), 2, true).unwrap();
    assert_eq!(h.dump(1, 4, 1), f32s(&[-23.0]));
}

#[test]
fn test_fma_rounds_once() {
    let mut h = VectorHarness::new();
    let _ = h.configure(32, 0, 1, 0);
    // (1 + 2^-12)^2 - 1 = 2^-11 + 2^-24; a separate multiply would lose the low term.
    let x = f32::from_bits(0x3f80_0800);
    h.fill(1, 4, &f32s(&[-1.0]));
    h.fill(2, 4, &f32s(&[x]));
    h.engine().float_mul_add(FmaOp::Macc, 1, single(x), 2, true).unwrap();
    let got = f32::from_bits(h.ctx.regs.read(1, 0, 4).unwrap() as u32);
    assert_eq!(f64::from(got), 2f64.powi(-11) + 2f64.powi(-24));
}

#[test]
fn test_sqrt_and_class() {
    let mut h = VectorHarness::new();
    let _ = h.configure(16, 0, 3, 0);
    h.fill(2, 2, &[0x4400, 0xfc00, 0x7e00]);
    h.engine().float_unary(FloatUnary::Sqrt, 1, 2, true).unwrap();
    assert_eq!(h.dump(1, 2, 3), vec![0x4000, 0x7e00, 0x7e00]);
    assert_eq!(h.ctx.fenv.fflags, FpFlags::NV);

    h.engine().float_unary(FloatUnary::Class, 1, 2, true).unwrap();
    assert_eq!(h.dump(1, 2, 3), vec![1 << 6, 1 << 0, 1 << 9]);
}

#[test]
fn test_sew8_has_no_float_format() {
    let mut h = VectorHarness::new();
    let _ = h.configure(8, 0, 1, 0);
    assert!(h.engine().float_binary(FloatOp::Add, 1, 2, Operand::Vector(3), true).is_err());
}

// ══════════════════════════════════════════════════════════
// 2. Widening
// ══════════════════════════════════════════════════════════

#[test]
fn test_widening_add_is_exact_in_wide_format() {
    let mut h = VectorHarness::new();
    let _ = h.configure(16, 0, 2, 0);
    // 2048 + 1 is not representable in binary16 but is in binary32.
    h.fill(1, 2, &[0x6800, 0x3c00]);
    let one = Operand::Scalar(nan_box(FloatFormat::Half, 0x3c00));
    h.engine().float_widen_binary(WideFloatOp::Add, 2, 1, one, false, true).unwrap();
    assert_eq!(h.dump(2, 4, 2), f32s(&[2049.0, 2.0]));

    h.engine().float_widen_binary(WideFloatOp::Sub, 4, 2, one, true, true).unwrap();
    assert_eq!(h.dump(4, 4, 2), f32s(&[2048.0, 1.0]));
}

#[test]
fn test_widening_fma_forms() {
    let mut h = VectorHarness::new();
    let _ = h.configure(16, 0, 1, 0);
    h.fill(1, 2, &[0x4000]);
    h.fill(2, 4, &f32s(&[0.5]));
    let three = Operand::Scalar(nan_box(FloatFormat::Half, 0x4200));
    h.engine().float_widen_mul_add(FmaOp::Msac, 2, three, 1, true).unwrap();
    assert_eq!(h.dump(2, 4, 1), f32s(&[5.5]));
    assert!(h.engine().float_widen_mul_add(FmaOp::Madd, 2, three, 1, true).is_err());
    assert!(h.engine().float_widen_binary(WideFloatOp::Mul, 2, 4, three, true, true).is_err());
}

// ══════════════════════════════════════════════════════════
// 3. Conversions
// ══════════════════════════════════════════════════════════

#[test]
fn test_float_to_int() {
    let mut h = VectorHarness::new();
    let _ = h.configure(32, 0, 3, 0);
    h.fill(2, 4, &[u64::from(1.5f32.to_bits()), u64::from((-1.5f32).to_bits()), 0x7fc0_0000]);
    h.engine().convert(ConvertOp::new(ConvertShape::Single, ConvertKind::FloatToSigned), 1, 2, true).unwrap();
    assert_eq!(h.dump(1, 4, 3), vec![2, 0xffff_fffe, 0x7fff_ffff]);
    assert!(h.ctx.fenv.fflags.contains(FpFlags::NV));

    h.engine().convert(ConvertOp::new(ConvertShape::Single, ConvertKind::FloatToSignedRtz), 1, 2, true).unwrap();
    assert_eq!(h.dump(1, 4, 2), vec![1, 0xffff_ffff]);
}

#[test]
fn test_widening_int_to_float() {
    let mut h = VectorHarness::new();
    let _ = h.configure(16, 0, 2, 0);
    h.fill(1, 2, &[0xfffd, 7]);
    h.engine().convert(ConvertOp::new(ConvertShape::Widen, ConvertKind::SignedToFloat), 2, 1, true).unwrap();
    assert_eq!(h.dump(2, 4, 2), f32s(&[-3.0, 7.0]));
}

#[test]
fn test_narrowing_round_to_odd() {
    let mut h = VectorHarness::new();
    let _ = h.configure(32, 0, 1, 0);
    h.fill(2, 8, &[0x3ff0_0000_0400_0000]);
    h.engine().convert(ConvertOp::new(ConvertShape::Narrow, ConvertKind::FloatToFloatRod), 1, 2, true).unwrap();
    assert_eq!(h.dump(1, 4, 1), vec![0x3f80_0001]);

    h.engine().convert(ConvertOp::new(ConvertShape::Narrow, ConvertKind::FloatToFloat), 1, 2, true).unwrap();
    assert_eq!(h.dump(1, 4, 1), vec![0x3f80_0000]);
}

#[test]
fn test_bfloat16_widening() {
    let mut h = VectorHarness::new();
    let _ = h.configure(16, 0, 1, 0);
    h.fill(1, 2, &[0x3fc0]);
    h.engine().convert(ConvertOp::new(ConvertShape::Widen, ConvertKind::BFloat16), 2, 1, true).unwrap();
    assert_eq!(h.dump(2, 4, 1), f32s(&[1.5]));
}

#[test]
fn test_unsupported_conversion_rejected() {
    let mut h = VectorHarness::new();
    let _ = h.configure(32, 0, 1, 0);
    let op = ConvertOp::new(ConvertShape::Single, ConvertKind::FloatToFloat);
    assert!(h.engine().convert(op, 1, 2, true).is_err());
}
