//! Fixed-point instruction tests: saturation, `vxsat` and `vnclip`.

use crate::common::harness::VectorHarness;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use vxsim_core::core::units::vector::Operand;
use vxsim_core::core::units::vector::fixed_point::{FixedOp, fixed_op};
use vxsim_core::core::units::vector::rounding::Vxrm;

// ══════════════════════════════════════════════════════════
// 1. Kernels
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(FixedOp::Saddu, 0xf0, 0x20, (0xff, true))]
#[case(FixedOp::Ssubu, 0x10, 0x20, (0x00, true))]
#[case(FixedOp::Sadd, 0x7f, 0x01, (0x7f, true))]
#[case(FixedOp::Sadd, 0x80, 0xff, (0x80, true))]
#[case(FixedOp::Ssub, 0x80, 0x01, (0x80, true))]
#[case(FixedOp::Sadd, 0x10, 0x20, (0x30, false))]
#[case(FixedOp::Aadd, 0x7f, 0x7f, (0x7f, false))]
#[case(FixedOp::Aaddu, 0xff, 0xff, (0xff, false))]
#[case(FixedOp::Ssrl, 0x03, 0x01, (0x02, false))]
#[case(FixedOp::Ssra, 0x80, 0x07, (0xff, false))]
fn test_fixed_op_rnu(#[case] op: FixedOp, #[case] a: u64, #[case] b: u64, #[case] expected: (u64, bool)) {
    assert_eq!(fixed_op(op, a, b, 1, Vxrm::Rnu), expected);
}

#[test]
fn test_smul_at_sew64() {
    let min = 1u64 << 63;
    assert_eq!(fixed_op(FixedOp::Smul, min, min, 8, Vxrm::Rnu), (i64::MAX as u64, true));
    // -1.0 * 0.5 = -0.5 in Q63.
    assert_eq!(fixed_op(FixedOp::Smul, min, 1 << 62, 8, Vxrm::Rnu), (0xc000_0000_0000_0000, false));
}

// ══════════════════════════════════════════════════════════
// 2. Engine: vxsat is sticky
// ══════════════════════════════════════════════════════════

#[test]
fn test_vxsat_set_by_any_element() {
    let mut h = VectorHarness::new();
    let _ = h.configure(16, 0, 4, 0);
    h.fill(2, 2, &[1, 2, 0x7fff, 4]);
    h.engine().fixed_binary(FixedOp::Sadd, 1, 2, Operand::Imm(1), true).unwrap();
    assert_eq!(h.dump(1, 2, 4), vec![2, 3, 0x7fff, 5]);
    assert!(h.ctx.state.vxsat);

    h.engine().fixed_binary(FixedOp::Sadd, 1, 2, Operand::Imm(0), true).unwrap();
    assert!(h.ctx.state.vxsat, "an in-range result must not clear vxsat");
}

#[test]
fn test_masked_off_saturation_ignored() {
    let mut h = VectorHarness::new();
    let _ = h.configure(8, 0, 2, 0);
    h.fill(2, 1, &[0x7f, 0x01]);
    h.set_mask(2, |i| i == 1);
    h.engine().fixed_binary(FixedOp::Sadd, 1, 2, Operand::Imm(1), false).unwrap();
    assert!(!h.ctx.state.vxsat);
    assert_eq!(h.ctx.regs.read(1, 1, 1).unwrap(), 2);
}

#[test]
fn test_averaging_uses_vxrm() {
    let mut h = VectorHarness::new();
    let _ = h.configure(8, 0, 1, 0);
    h.fill(2, 1, &[1]);
    h.ctx.state.vxrm = Vxrm::Rdn;
    h.engine().fixed_binary(FixedOp::Aaddu, 1, 2, Operand::Imm(2), true).unwrap();
    assert_eq!(h.dump(1, 1, 1), vec![1]);
    h.ctx.state.vxrm = Vxrm::Rnu;
    h.engine().fixed_binary(FixedOp::Aaddu, 1, 2, Operand::Imm(2), true).unwrap();
    assert_eq!(h.dump(1, 1, 1), vec![2]);
}

#[test]
fn test_nclip_narrows_and_saturates() {
    let mut h = VectorHarness::new();
    let _ = h.configure(8, 0, 4, 0);
    h.fill(2, 2, &[0x0100, 0x7fff, 0x8000, 0x0003]);
    h.engine().nclip(true, 1, 2, Operand::Imm(1), true).unwrap();
    // 0x0003 >> 1 = 1.5 rounds up under RNU.
    assert_eq!(h.dump(1, 1, 4), vec![0x7f, 0x7f, 0x80, 0x02]);
    assert!(h.ctx.state.vxsat);

    h.ctx.state.vxsat = false;
    h.engine().nclip(false, 1, 2, Operand::Imm(8), true).unwrap();
    assert_eq!(h.dump(1, 1, 4), vec![0x01, 0x80, 0x80, 0x00]);
    assert!(!h.ctx.state.vxsat);
}

#[test]
fn test_nclip_rejects_sew64() {
    let mut h = VectorHarness::new();
    let _ = h.configure(64, 0, 2, 0);
    assert!(h.engine().nclip(true, 1, 2, Operand::Imm(0), true).is_err());
}

// ══════════════════════════════════════════════════════════
// 3. Properties
// ══════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn prop_vsadd_i8_clamps(pairs in proptest::collection::vec((any::<i8>(), any::<i8>()), 16), preset in any::<bool>()) {
        let mut h = VectorHarness::new();
        prop_assert_eq!(h.configure(8, 0, 16, 0), 16);
        let a: Vec<u64> = pairs.iter().map(|&(a, _)| u64::from(a as u8)).collect();
        let b: Vec<u64> = pairs.iter().map(|&(_, b)| u64::from(b as u8)).collect();
        h.fill(2, 1, &a);
        h.fill(3, 1, &b);
        h.ctx.state.vxsat = preset;

        h.engine().fixed_binary(FixedOp::Sadd, 1, 2, Operand::Vector(3), true).unwrap();

        let mut any_sat = false;
        for (i, &(x, y)) in pairs.iter().enumerate() {
            let exact = i16::from(x) + i16::from(y);
            let clamped = exact.clamp(i16::from(i8::MIN), i16::from(i8::MAX));
            any_sat |= exact != clamped;
            prop_assert_eq!(h.ctx.regs.read(1, i, 1).unwrap(), u64::from(clamped as i8 as u8));
        }
        prop_assert_eq!(h.ctx.state.vxsat, preset || any_sat);
    }

    #[test]
    fn prop_vsaddu_never_wraps(a in any::<u16>(), b in any::<u16>()) {
        let (r, sat) = fixed_op(FixedOp::Saddu, u64::from(a), u64::from(b), 2, Vxrm::Rnu);
        let exact = u32::from(a) + u32::from(b);
        prop_assert_eq!(r, u64::from(exact.min(0xffff)));
        prop_assert_eq!(sat, exact > 0xffff);
    }
}
