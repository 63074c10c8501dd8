//! Slide, gather, compress and move tests.

use crate::common::harness::{VTA, VectorHarness};
use pretty_assertions::assert_eq;
use vxsim_core::common::error::VectorError;
use vxsim_core::core::units::vector::Operand;
use vxsim_core::core::units::vector::permute::Slide;

fn sequential(h: &mut VectorHarness, reg: usize, esz: usize, count: u64) {
    let values: Vec<u64> = (1..=count).map(|v| v * 10).collect();
    h.fill(reg, esz, &values);
}

// ══════════════════════════════════════════════════════════
// 1. Slides
// ══════════════════════════════════════════════════════════

#[test]
fn test_slideup_leaves_low_elements() {
    let mut h = VectorHarness::new();
    let _ = h.configure(8, 0, 6, 0);
    sequential(&mut h, 2, 1, 6);
    h.fill(1, 1, &[7; 6]);
    h.engine().slide(Slide::Up(2), 1, 2, true).unwrap();
    assert_eq!(h.dump(1, 1, 6), vec![7, 7, 10, 20, 30, 40]);
}

#[test]
fn test_slideup_offset_past_vl_writes_nothing() {
    let mut h = VectorHarness::new();
    let _ = h.configure(8, 0, 4, 0);
    sequential(&mut h, 2, 1, 4);
    h.fill(1, 1, &[7; 4]);
    h.engine().slide(Slide::Up(u64::MAX), 1, 2, true).unwrap();
    assert_eq!(h.dump(1, 1, 4), vec![7; 4]);
}

#[test]
fn test_slidedown_zero_past_vlmax() {
    let mut h = VectorHarness::new();
    assert_eq!(h.configure(8, 0, 4, 0), 4);
    sequential(&mut h, 2, 1, 16);
    h.engine().slide(Slide::Down(14), 1, 2, true).unwrap();
    assert_eq!(h.dump(1, 1, 4), vec![150, 160, 0, 0]);
}

#[test]
fn test_slide1_forms() {
    let mut h = VectorHarness::new();
    let _ = h.configure(16, 0, 4, 0);
    sequential(&mut h, 2, 2, 4);
    h.engine().slide(Slide::Up1(99), 1, 2, true).unwrap();
    assert_eq!(h.dump(1, 2, 4), vec![99, 10, 20, 30]);
    h.engine().slide(Slide::Down1(99), 1, 2, true).unwrap();
    assert_eq!(h.dump(1, 2, 4), vec![20, 30, 40, 99]);
}

#[test]
fn test_slideup_overlap_rejected() {
    let mut h = VectorHarness::new();
    let _ = h.configure(8, 0, 4, 0);
    let err = h.engine().slide(Slide::Up(1), 2, 2, true).unwrap_err();
    assert!(matches!(err, VectorError::IllegalConfig(_)));
    // Slidedown may write its own source.
    assert!(h.engine().slide(Slide::Down(1), 2, 2, true).is_ok());
}

// ══════════════════════════════════════════════════════════
// 2. Gathers
// ══════════════════════════════════════════════════════════

#[test]
fn test_gather_out_of_range_reads_zero() {
    let mut h = VectorHarness::new();
    let _ = h.configure(8, 0, 4, 0);
    sequential(&mut h, 2, 1, 4);
    h.fill(3, 1, &[3, 0, 99, 1]);
    h.engine().gather(1, 2, Operand::Vector(3), true).unwrap();
    assert_eq!(h.dump(1, 1, 4), vec![40, 10, 0, 20]);

    h.engine().gather(1, 2, Operand::Scalar(2), true).unwrap();
    assert_eq!(h.dump(1, 1, 4), vec![30; 4]);
}

#[test]
fn test_gather_ei16_uses_wide_indices() {
    let mut h = VectorHarness::new();
    let _ = h.configure(8, 0, 4, 0);
    sequential(&mut h, 8, 1, 16);
    // 257 is out of range; truncated to a byte it would select element 1.
    h.fill(4, 2, &[15, 0, 257, 1]);
    h.engine().gather_ei16(1, 8, 4, true).unwrap();
    assert_eq!(h.dump(1, 1, 4), vec![160, 10, 0, 20]);
}

#[test]
fn test_gather_overlap_rejected() {
    let mut h = VectorHarness::new();
    let _ = h.configure(8, 0, 4, 0);
    assert!(h.engine().gather(2, 2, Operand::Vector(3), true).is_err());
    assert!(h.engine().gather(3, 2, Operand::Vector(3), true).is_err());
}

// ══════════════════════════════════════════════════════════
// 3. Compress
// ══════════════════════════════════════════════════════════

#[test]
fn test_compress_packs_and_tail_fills() {
    let mut h = VectorHarness::new();
    let _ = h.configure(8, 0, 5, VTA);
    sequential(&mut h, 2, 1, 5);
    for (i, b) in [true, false, true, false, true].into_iter().enumerate() {
        h.ctx.regs.set_mask_bit(3, i, b).unwrap();
    }
    h.engine().compress(1, 2, 3).unwrap();
    assert_eq!(h.dump(1, 1, 5), vec![10, 30, 50, 0xff, 0xff]);
}

#[test]
fn test_compress_requires_vstart_zero_and_no_overlap() {
    let mut h = VectorHarness::new();
    let _ = h.configure(8, 0, 5, 0);
    assert!(h.engine().compress(2, 2, 3).is_err());
    assert!(h.engine().compress(3, 2, 3).is_err());
    h.ctx.state.vstart = 1;
    assert!(h.engine().compress(1, 2, 3).is_err());
}

// ══════════════════════════════════════════════════════════
// 4. Scalar and whole-register moves
// ══════════════════════════════════════════════════════════

#[test]
fn test_scalar_moves() {
    let mut h = VectorHarness::new();
    let _ = h.configure(16, 0, 4, 0);
    h.fill(2, 2, &[0x8000, 1]);
    assert_eq!(h.engine().mv_x_s(2).unwrap(), 0xffff_ffff_ffff_8000);

    h.fill(1, 2, &[5, 6, 7, 8]);
    h.engine().mv_s_x(1, 0x1_2345).unwrap();
    assert_eq!(h.dump(1, 2, 4), vec![0x2345, 6, 7, 8]);
}

#[test]
fn test_float_scalar_moves_box() {
    let mut h = VectorHarness::new();
    let _ = h.configure(32, 0, 4, 0);
    h.fill(2, 4, &[0x3f80_0000]);
    assert_eq!(h.engine().fmv_f_s(2).unwrap(), 0xffff_ffff_3f80_0000);

    h.engine().fmv_s_f(1, 0x4000_0000).unwrap();
    assert_eq!(h.ctx.regs.read(1, 0, 4).unwrap(), 0x7fc0_0000, "an unboxed scalar reads as NaN");
}

#[test]
fn test_whole_register_move() {
    let mut h = VectorHarness::new();
    let _ = h.configure(64, 0, 2, 0);
    h.fill(2, 8, &[1, 2, 3, 4]);
    h.engine().mv_whole(4, 2, 2).unwrap();
    assert_eq!(h.dump(4, 8, 4), vec![1, 2, 3, 4]);
    assert!(h.engine().mv_whole(4, 2, 3).is_err());
    assert!(h.engine().mv_whole(5, 2, 2).is_err());
}
