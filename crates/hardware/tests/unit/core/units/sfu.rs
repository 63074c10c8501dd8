//! # Special Function Unit Tests
//!
//! Golden results for the evaluated ranges, continuity at every range-table
//! edge, the special-range table for each function and ULP-bounded accuracy
//! sweeps against the host libm.

use proptest::prelude::*;
use rstest::rstest;
use vxsim_core::core::units::fpu::exception_flags::FpFlags;
use vxsim_core::core::units::sfu::{SfuOp, evaluate, evaluate_with_reference, sfu_exp2, sfu_rcp, sfu_sigmoid, sfu_tanh};

const QNAN: u32 = 0x7fc0_0000;
const SNAN: u32 = 0x7f80_0001;

// ══════════════════════════════════════════════════════════
// 1. Golden values
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::exp2_half(SfuOp::Exp2, 0x3f00_0000, 0x3fb5_04f4)]
#[case::rcp_one_and_half(SfuOp::Rcp, 0x3fc0_0000, 0x3f2a_aaab)]
#[case::tanh_half(SfuOp::Tanh, 0x3f00_0000, 0x3eec_9aa1)]
#[case::sigmoid_half(SfuOp::Sigmoid, 0x3f00_0000, 0x3f1f_597f)]
fn test_golden(#[case] op: SfuOp, #[case] input: u32, #[case] expected: u32) {
    let out = evaluate(op, input);
    assert_eq!(out.result, expected, "{op}({input:#010x}) = {:#010x}", out.result);
    assert!(out.flags.is_empty());
}

#[test]
fn test_named_entry_points_match_evaluate() {
    let x = 0x3f00_0000;
    assert_eq!(sfu_exp2(x), evaluate(SfuOp::Exp2, x));
    assert_eq!(sfu_rcp(x), evaluate(SfuOp::Rcp, x));
    assert_eq!(sfu_sigmoid(x), evaluate(SfuOp::Sigmoid, x));
    assert_eq!(sfu_tanh(x), evaluate(SfuOp::Tanh, x));
}

#[test]
fn test_evaluated_range_reports_accumulator() {
    assert_ne!(evaluate(SfuOp::Exp2, 0x3f00_0000).booth_debug, 0);
    assert_eq!(evaluate(SfuOp::Exp2, 0xff80_0000).booth_debug, 0);
}

// ══════════════════════════════════════════════════════════
// 2. Sigmoid boundaries
// ══════════════════════════════════════════════════════════

#[test]
fn test_sigmoid_continuous_at_two_pow_minus_nine() {
    let below = evaluate(SfuOp::Sigmoid, 0x3aff_ffff).result;
    let at = evaluate(SfuOp::Sigmoid, 0x3b00_0000).result;
    assert_eq!(below, 0x3f00_1fff);
    assert_eq!(at, 0x3f00_2000);
    assert!(at.abs_diff(below) <= 1);
}

/// binary32 ULP of a normal magnitude.
fn ulp(v: f64) -> f64 {
    f64::from_bits(v.abs().to_bits() & 0x7ff0_0000_0000_0000) * 2f64.powi(-23)
}

/// Results at `edge` and at the next float toward zero.
fn around(op: SfuOp, edge: f32) -> (f64, f64) {
    let bits = edge.to_bits();
    let below = f64::from(evaluate(op, bits - 1).value());
    let at = f64::from(evaluate(op, bits).value());
    (below, at)
}

// Negative inputs are formed as `1 - sigmoid(|x|)` in fixed point, so the
// step is measured against the larger of the two complements.
#[rstest]
fn test_sigmoid_continuous_at_table_edges(
    #[values(0.001_953_125, 0.5, 1.0, 2.0, 4.0, 8.0, 16.0)] edge: f32,
    #[values(1.0, -1.0)] sign: f32,
) {
    let (below, at) = around(SfuOp::Sigmoid, sign * edge);
    let scale = below.max(at).max(1.0 - below).max(1.0 - at);
    assert!(
        (at - below).abs() <= ulp(scale),
        "sigmoid steps by {} ULP at {}",
        (at - below).abs() / ulp(scale),
        sign * edge
    );
}

#[rstest]
fn test_tanh_continuous_at_table_edges(
    #[values(
        0.000_976_562_5,
        0.001_953_125,
        0.003_906_25,
        0.007_812_5,
        0.015_625,
        0.031_25,
        0.062_5,
        0.125,
        0.25,
        0.5,
        1.0,
        2.0,
        4.0
    )]
    edge: f32,
    #[values(1.0, -1.0)] sign: f32,
) {
    let (below, at) = around(SfuOp::Tanh, sign * edge);
    let scale = below.abs().max(at.abs());
    assert!(
        (at - below).abs() <= ulp(scale),
        "tanh steps by {} ULP at {}",
        (at - below).abs() / ulp(scale),
        sign * edge
    );
}

#[test]
fn test_tanh_half_meets_sigmoid_table() {
    // tanh(0.5) comes from 2 * sigmoid(1) - 1; the float below it from the
    // last tanh segment.
    let (below, at) = around(SfuOp::Tanh, 0.5);
    assert_eq!(at, f64::from(f32::from_bits(0x3eec_9aa1)));
    assert!((at - 0.5f64.tanh()).abs() <= 3.0 * ulp(at));
    assert!((below - 0.5f64.tanh()).abs() <= 3.0 * ulp(at));
}

#[test]
fn test_sigmoid_fixed_points() {
    assert_eq!(evaluate(SfuOp::Sigmoid, 0x0000_0000).result, 0x3f00_0000);
    assert_eq!(evaluate(SfuOp::Sigmoid, 0x8000_0000).result, 0x3f00_0000);
    assert_eq!(evaluate(SfuOp::Sigmoid, 0x7f80_0000).result, 0x3f80_0000);
    assert_eq!(evaluate(SfuOp::Sigmoid, 0xff80_0000).result, 0);
    assert_eq!(evaluate(SfuOp::Sigmoid, 16f32.to_bits()).result, 0x3f80_0000);
}

#[rstest]
fn test_negative_sigmoid_complements_positive(#[values(1.0, 1.5, 3.0, 7.25, 12.0, 15.9)] x: f32) {
    let pos = f64::from(evaluate(SfuOp::Sigmoid, x.to_bits()).value());
    let neg = f64::from(evaluate(SfuOp::Sigmoid, (-x).to_bits()).value());
    assert!(neg > 0.0 && neg < 0.5);
    assert!((neg - (1.0 - pos)).abs() <= 3.0 * ulp(pos), "sigmoid({}) is not 1 - sigmoid({x})", -x);
}

#[test]
fn test_sigmoid_tiny_negative_below_half() {
    let r = evaluate(SfuOp::Sigmoid, (-1e-4f32).to_bits()).value();
    assert!(r < 0.5 && r > 0.4999);
}

// ══════════════════════════════════════════════════════════
// 3. Special ranges
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::exp2_neg_inf(SfuOp::Exp2, 0xff80_0000, 0, FpFlags::NONE)]
#[case::exp2_pos_inf(SfuOp::Exp2, 0x7f80_0000, 0x7f80_0000, FpFlags::NONE)]
#[case::exp2_overflow(SfuOp::Exp2, 0x4300_0000, 0x7f80_0000, FpFlags::OF)]
#[case::exp2_underflow(SfuOp::Exp2, 0xc320_0000, 0, FpFlags::NONE)]
#[case::exp2_denormal(SfuOp::Exp2, 0x0000_0001, 0x3f80_0000, FpFlags::NONE)]
#[case::exp2_tiny(SfuOp::Exp2, 0x3000_0000, 0x3f80_0000, FpFlags::NONE)]
#[case::rcp_pos_zero(SfuOp::Rcp, 0x0000_0000, 0x7f80_0000, FpFlags::DZ)]
#[case::rcp_neg_zero(SfuOp::Rcp, 0x8000_0000, 0xff80_0000, FpFlags::DZ)]
#[case::rcp_pos_inf(SfuOp::Rcp, 0x7f80_0000, 0, FpFlags::NONE)]
#[case::rcp_neg_inf(SfuOp::Rcp, 0xff80_0000, 0x8000_0000, FpFlags::NONE)]
#[case::rcp_denormal(SfuOp::Rcp, 0x000a_e398, 0x7f80_0000, FpFlags::OF)]
#[case::rcp_neg_denormal(SfuOp::Rcp, 0x800a_e398, 0xff7f_ffff, FpFlags::OF)]
#[case::tanh_large(SfuOp::Tanh, 0x4100_0000, 0x3f80_0000, FpFlags::NONE)]
#[case::tanh_neg_large(SfuOp::Tanh, 0xc100_0000, 0xbf80_0000, FpFlags::NONE)]
#[case::tanh_tiny(SfuOp::Tanh, 0x3a00_0000, 0x3a00_0000, FpFlags::NONE)]
#[case::tanh_neg_zero(SfuOp::Tanh, 0x8000_0000, 0x8000_0000, FpFlags::NONE)]
fn test_special_ranges(#[case] op: SfuOp, #[case] input: u32, #[case] result: u32, #[case] flags: FpFlags) {
    let out = evaluate(op, input);
    assert_eq!(out.result, result, "{op}({input:#010x})");
    assert_eq!(out.flags, flags, "{op}({input:#010x})");
}

#[rstest]
fn test_nan_inputs(#[values(SfuOp::Exp2, SfuOp::Rcp, SfuOp::Sigmoid, SfuOp::Tanh)] op: SfuOp) {
    let quiet = evaluate(op, QNAN);
    assert_eq!(quiet.result, QNAN);
    assert!(quiet.flags.is_empty());

    let signaling = evaluate(op, SNAN);
    assert_eq!(signaling.result, QNAN);
    assert_eq!(signaling.flags, FpFlags::NV);
}

#[test]
fn test_rcp_near_denormal_is_prescaled() {
    // 2^-127 lies in the prescaled window; its reciprocal is 2^127.
    let out = evaluate(SfuOp::Rcp, 0x0040_0000);
    assert!(out.flags.is_empty());
    let want = 2f64.powi(127);
    assert!((f64::from(out.value()) - want).abs() / want < 1e-6);
}

// ══════════════════════════════════════════════════════════
// 4. Accuracy
// ══════════════════════════════════════════════════════════

#[test]
fn test_reference_error_is_zero_for_exact_specials() {
    let out = evaluate_with_reference(SfuOp::Exp2, 0x7f80_0000);
    assert_eq!(out.error_estimate, 0.0);
    let out = evaluate_with_reference(SfuOp::Rcp, 0x7f80_0000);
    assert_eq!(out.error_estimate, 0.0);
    let out = evaluate_with_reference(SfuOp::Rcp, 0x0000_0000);
    assert_eq!(out.error_estimate, 0.0);
}

fn ulp_error(op: SfuOp, x: f32) -> f32 {
    evaluate_with_reference(op, x.to_bits()).error_estimate
}

/// Sigmoid error in ULPs of `max(s, 1 - s)`, the magnitude the tables hold.
fn sigmoid_error(x: f32) -> f64 {
    let got = f64::from(evaluate(SfuOp::Sigmoid, x.to_bits()).value());
    let want = SfuOp::Sigmoid.reference(f64::from(x));
    (got - want).abs() / ulp(want.max(1.0 - want))
}

proptest! {
    #[test]
    fn prop_exp2_within_four_ulp(x in -20.0f32..20.0) {
        prop_assert!(ulp_error(SfuOp::Exp2, x) <= 4.0);
    }

    #[test]
    fn prop_rcp_within_two_ulp(x in 1e-3f32..1e3) {
        prop_assert!(ulp_error(SfuOp::Rcp, x) <= 2.0);
        prop_assert!(ulp_error(SfuOp::Rcp, -x) <= 2.0);
    }

    #[test]
    fn prop_tanh_table_range(x in 0.000_976_562_5f32..0.5) {
        prop_assert!(ulp_error(SfuOp::Tanh, x) <= 26.0);
        prop_assert!(ulp_error(SfuOp::Tanh, -x) <= 26.0);
    }

    #[test]
    fn prop_tanh_folded_range(x in 0.5f32..8.0) {
        prop_assert!(ulp_error(SfuOp::Tanh, x) <= 68.0);
        prop_assert!(ulp_error(SfuOp::Tanh, -x) <= 68.0);
    }

    #[test]
    fn prop_sigmoid_whole_line(x in -100.0f32..100.0) {
        prop_assert!(sigmoid_error(x) <= 36.0, "{x}: {}", sigmoid_error(x));
    }
}
