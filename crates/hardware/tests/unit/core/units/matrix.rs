//! Integer matrix unit tests: element-wise tiles, narrowing clips and
//! multiply-accumulate products.
//!
//! Every test runs at the default RLEN of 128: four rows of 16 bytes per
//! register.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use vxsim_core::common::error::MatrixError;
use vxsim_core::config::MatrixConfig;
use vxsim_core::core::units::matrix::elementwise::{MatrixOp, apply, narrow_clip};
use vxsim_core::core::units::matrix::mma::Signedness;
use vxsim_core::core::units::matrix::{MatrixOperand, MatrixWidth};
use vxsim_core::core::units::vector::rounding::Vxrm;
use vxsim_core::MatrixContext;

const ROWS: usize = 4;
const RLENB: usize = 16;

fn ctx() -> MatrixContext {
    MatrixContext::new(&MatrixConfig::default())
}

/// Writes `rows[i][k]` as element `k` of row `i`.
fn fill(ctx: &mut MatrixContext, reg: usize, esz: usize, rows: &[&[i64]]) {
    for (i, row) in rows.iter().enumerate() {
        for (k, &v) in row.iter().enumerate() {
            ctx.regs.write(reg, i, k, esz, v as u64).unwrap();
        }
    }
}

/// Writes the same row into every row of `reg`.
fn fill_all(ctx: &mut MatrixContext, reg: usize, esz: usize, row: &[i64]) {
    fill(ctx, reg, esz, &[row; ROWS]);
}

fn dump(ctx: &MatrixContext, reg: usize, esz: usize) -> Vec<Vec<i64>> {
    (0..ROWS)
        .map(|i| (0..RLENB / esz).map(|k| ctx.regs.read_signed(reg, i, k, esz).unwrap()).collect())
        .collect()
}

// ══════════════════════════════════════════════════════════
// 1. Element kernels
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::add(MatrixOp::Add, MatrixWidth::Word, 5, -7, Vxrm::Rnu, -2)]
#[case::sub_is_ms2_minus_ms1(MatrixOp::Sub, MatrixWidth::Word, 5, 7, Vxrm::Rnu, -2)]
#[case::mulh_word(MatrixOp::Mulh, MatrixWidth::Word, 0x4000_0000, 8, Vxrm::Rnu, 2)]
#[case::mulh_double(MatrixOp::Mulh, MatrixWidth::Double, i64::MIN, 2, Vxrm::Rnu, -1)]
#[case::sra_rnu(MatrixOp::Sra, MatrixWidth::Word, 5, 1, Vxrm::Rnu, 3)]
#[case::sra_rdn(MatrixOp::Sra, MatrixWidth::Word, 5, 1, Vxrm::Rdn, 2)]
#[case::sra_negative(MatrixOp::Sra, MatrixWidth::Word, -5, 1, Vxrm::Rnu, -2)]
#[case::srl_word_zero_fills(MatrixOp::Srl, MatrixWidth::Word, -1, 4, Vxrm::Rnu, 0x1000_0000)]
#[case::srl_word_truncates(MatrixOp::Srl, MatrixWidth::Word, -1, 4, Vxrm::Rdn, 0x0fff_ffff)]
#[case::sll_masks_shamt(MatrixOp::Sll, MatrixWidth::Word, 3, 33, Vxrm::Rnu, 6)]
#[case::max(MatrixOp::Max, MatrixWidth::Word, -1, 1, Vxrm::Rnu, 1)]
#[case::min(MatrixOp::Min, MatrixWidth::Word, -1, 1, Vxrm::Rnu, -1)]
#[case::maxu(MatrixOp::Maxu, MatrixWidth::Word, -1, 1, Vxrm::Rnu, 0xffff_ffff)]
#[case::minu(MatrixOp::Minu, MatrixWidth::Word, -1, 1, Vxrm::Rnu, 1)]
fn test_apply(
    #[case] op: MatrixOp,
    #[case] width: MatrixWidth,
    #[case] a: i64,
    #[case] b: i64,
    #[case] mxrm: Vxrm,
    #[case] expected: i64,
) {
    assert_eq!(apply(op, width, a, b, mxrm), expected);
}

#[rstest]
#[case::in_range(MatrixWidth::Word, true, -5, 0, Vxrm::Rnu, (-5, false))]
#[case::signed_high(MatrixWidth::Word, true, 300, 0, Vxrm::Rnu, (127, true))]
#[case::signed_low(MatrixWidth::Word, true, -300, 0, Vxrm::Rnu, (-128, true))]
#[case::rounding_overflows(MatrixWidth::Word, true, 0xff, 1, Vxrm::Rnu, (127, true))]
#[case::truncation_fits(MatrixWidth::Word, true, 0xff, 1, Vxrm::Rdn, (127, false))]
#[case::unsigned_reads_raw_bits(MatrixWidth::Word, false, -1, 0, Vxrm::Rnu, (255, true))]
#[case::unsigned_fits(MatrixWidth::Word, false, 0x1fe, 1, Vxrm::Rdn, (255, false))]
#[case::double_clips_to_16(MatrixWidth::Double, true, 70_000, 0, Vxrm::Rnu, (32_767, true))]
fn test_narrow_clip_kernel(
    #[case] width: MatrixWidth,
    #[case] signed: bool,
    #[case] value: i64,
    #[case] shamt: u32,
    #[case] mxrm: Vxrm,
    #[case] expected: (i64, bool),
) {
    assert_eq!(narrow_clip(width, signed, value, shamt, mxrm), expected);
}

// ══════════════════════════════════════════════════════════
// 2. Element-wise tiles
// ══════════════════════════════════════════════════════════

#[test]
fn test_mm_zeroes_outside_tile() {
    let mut c = ctx();
    c.state.set_msize(8 << 16 | 4 << 8 | 2);
    fill_all(&mut c, 1, 4, &[1, 2, 3, 4]);
    fill_all(&mut c, 2, 4, &[10, 20, 30, 40]);
    fill_all(&mut c, 0, 4, &[99; 4]);

    c.engine().elementwise(MatrixOp::Add, MatrixWidth::Word, 0, MatrixOperand::Matrix(1), 2).unwrap();

    assert_eq!(dump(&c, 0, 4), vec![vec![11, 22, 0, 0], vec![11, 22, 0, 0], vec![0; 4], vec![0; 4]]);
}

#[test]
fn test_word_mul_keeps_low_half() {
    let mut c = ctx();
    fill_all(&mut c, 1, 4, &[0x1_0000; 4]);
    fill_all(&mut c, 2, 4, &[0x1_0003; 4]);

    c.engine().elementwise(MatrixOp::Mul, MatrixWidth::Word, 0, MatrixOperand::Matrix(1), 2).unwrap();
    c.engine().elementwise(MatrixOp::Mulh, MatrixWidth::Word, 3, MatrixOperand::Matrix(1), 2).unwrap();

    assert_eq!(dump(&c, 0, 4)[0], vec![0x3_0000; 4]);
    assert_eq!(dump(&c, 3, 4)[0], vec![1; 4]);
}

#[test]
fn test_mv_broadcasts_source_row() {
    let mut c = ctx();
    fill_all(&mut c, 1, 4, &[100; 4]);
    fill(&mut c, 1, 4, &[&[], &[], &[1, 2, 3, 4]]);
    fill_all(&mut c, 2, 4, &[10, 20, 30, 40]);

    c.engine()
        .elementwise(MatrixOp::Sub, MatrixWidth::Word, 3, MatrixOperand::Row { reg: 1, row: 2 }, 2)
        .unwrap();

    assert_eq!(dump(&c, 3, 4), vec![vec![9, 18, 27, 36]; ROWS]);
}

#[test]
fn test_mv_destination_may_be_row_source() {
    let mut c = ctx();
    fill_all(&mut c, 1, 4, &[7; 4]);
    fill(&mut c, 1, 4, &[&[1, 2, 3, 4]]);
    fill_all(&mut c, 2, 4, &[10; 4]);

    c.engine()
        .elementwise(MatrixOp::Add, MatrixWidth::Word, 1, MatrixOperand::Row { reg: 1, row: 0 }, 2)
        .unwrap();

    assert_eq!(dump(&c, 1, 4), vec![vec![11, 12, 13, 14]; ROWS], "every row sees the row before it was written");
}

#[test]
fn test_double_shift_rounds_with_mcsr() {
    let mut c = ctx();
    fill_all(&mut c, 1, 8, &[2, 65]);
    fill_all(&mut c, 2, 8, &[-9, 16]);

    c.engine().elementwise(MatrixOp::Sra, MatrixWidth::Double, 0, MatrixOperand::Matrix(1), 2).unwrap();
    assert_eq!(dump(&c, 0, 8), vec![vec![-2, 8]; ROWS]);

    c.state.set_mcsr(Vxrm::Rdn as u64);
    c.engine().elementwise(MatrixOp::Sra, MatrixWidth::Double, 0, MatrixOperand::Matrix(1), 2).unwrap();
    assert_eq!(dump(&c, 0, 8), vec![vec![-3, 8]; ROWS]);
}

#[test]
fn test_broadcast_row() {
    let mut c = ctx();
    let row: Vec<u8> = (0..RLENB as u8).collect();
    c.regs.set_row(1, 2, &row).unwrap();

    c.engine().broadcast_row(0, 1, 2).unwrap();

    for i in 0..ROWS {
        assert_eq!(c.regs.row(0, i).unwrap(), row.as_slice());
    }
    assert_eq!(
        c.engine().broadcast_row(0, 1, ROWS),
        Err(MatrixError::IllegalConfig("broadcast row exceeds mrows"))
    );
}

#[rstest]
#[case::low_signed(false, true, [0xff, 0xf9, 0x00])]
#[case::low_unsigned(false, false, [0x0f, 0x09, 0x00])]
#[case::high_signed(true, true, [0x01, 0x02, 0xf8])]
fn test_unpack_nibbles(#[case] high: bool, #[case] signed: bool, #[case] expected: [u8; 3]) {
    let mut c = ctx();
    fill_all(&mut c, 1, 1, &[0x9f, 0, 0, 0, 0, 0, 0, 0, 0x21, 0x08]);

    c.engine().unpack_nibbles(0, 1, high, signed).unwrap();

    for i in 0..ROWS {
        assert_eq!(&c.regs.row(0, i).unwrap()[..3], &expected);
    }
}

// ══════════════════════════════════════════════════════════
// 3. Narrowing clips
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::low(false, 0)]
#[case::high(true, 4)]
fn test_clip_places_quarter_and_sets_mxsat(#[case] high: bool, #[case] at: usize) {
    let mut c = ctx();
    fill_all(&mut c, 2, 4, &[300, -5, 100, 0x7f]);
    fill_all(&mut c, 0, 1, &[0xaa; RLENB]);

    c.engine().narrow_clip(MatrixWidth::Word, true, high, 0, MatrixOperand::Matrix(1), 2).unwrap();

    let mut expected = [0xaa_u8; RLENB];
    expected[at..at + 4].copy_from_slice(&[0x7f, 0xfb, 0x64, 0x7f]);
    for i in 0..ROWS {
        assert_eq!(c.regs.row(0, i).unwrap(), &expected);
    }
    assert!(c.state.mxsat);
}

#[test]
fn test_clip_in_range_leaves_mxsat() {
    let mut c = ctx();
    fill_all(&mut c, 2, 4, &[1, 2, 3, 4]);

    c.engine().narrow_clip(MatrixWidth::Word, false, false, 0, MatrixOperand::Matrix(1), 2).unwrap();

    assert_eq!(&c.regs.row(0, 0).unwrap()[..4], &[1_u8, 2, 3, 4]);
    assert!(!c.state.mxsat);
}

#[rstest]
#[case::mm_keeps(MatrixOperand::Matrix(1), 0xaa)]
#[case::mv_zeroes(MatrixOperand::Row { reg: 1, row: 0 }, 0x00)]
fn test_clip_inactive_elements(#[case] ms1: MatrixOperand, #[case] inactive: u8) {
    let mut c = ctx();
    c.state.set_msize(8 << 16 | 4 << 8 | 4);
    fill_all(&mut c, 2, 4, &[5, 6, 7, 8]);
    fill_all(&mut c, 0, 1, &[0xaa; RLENB]);

    c.engine().narrow_clip(MatrixWidth::Word, true, false, 0, ms1, 2).unwrap();

    let row = c.regs.row(0, 0).unwrap();
    assert_eq!(&row[..4], &[5, 6, inactive, inactive]);
    assert_eq!(&row[4..], &[0xaa_u8; RLENB - 4], "bytes past the quarter are untouched");
}

// ══════════════════════════════════════════════════════════
// 4. Multiply-accumulate products
// ══════════════════════════════════════════════════════════

#[test]
fn test_mmaqa_b_accumulates_outer_product() {
    let mut c = ctx();
    fill(&mut c, 1, 1, &[&[1], &[2], &[3], &[4]]);
    fill(&mut c, 2, 1, &[&[1], &[2], &[3], &[4]]);
    fill_all(&mut c, 0, 4, &[100; 4]);

    c.engine().mmaqa_b(Signedness::Ss, 0, 1, 2).unwrap();

    let expected: Vec<Vec<i64>> = (1..=4).map(|i| (1..=4).map(|j| 100 + i * j).collect()).collect();
    assert_eq!(dump(&c, 0, 4), expected);
}

#[rstest]
#[case::ss(Signedness::Ss, 2)]
#[case::uu(Signedness::Uu, 64_770)]
#[case::us(Signedness::Us, -510)]
#[case::su(Signedness::Su, -254)]
fn test_mmaqa_b_signedness(#[case] sign: Signedness, #[case] expected: i64) {
    let mut c = ctx();
    fill_all(&mut c, 1, 1, &[0xff]);
    fill_all(&mut c, 2, 1, &[0xfe]);

    c.engine().mmaqa_b(sign, 0, 1, 2).unwrap();

    assert_eq!(dump(&c, 0, 4), vec![vec![expected; 4]; ROWS]);
}

#[test]
fn test_mmaqa_zeroes_outside_tile() {
    let mut c = ctx();
    c.state.set_msize(16 << 16 | 3 << 8 | 2);
    fill_all(&mut c, 1, 1, &[1; RLENB]);
    fill_all(&mut c, 2, 1, &[2; RLENB]);
    fill_all(&mut c, 0, 4, &[100; 4]);

    c.engine().mmaqa_b(Signedness::Ss, 0, 1, 2).unwrap();

    let active = vec![132, 132, 132, 0];
    assert_eq!(dump(&c, 0, 4), vec![active.clone(), active, vec![0; 4], vec![0; 4]]);
}

#[test]
fn test_sizek_limits_products() {
    let mut c = ctx();
    c.state.set_msize(1 << 16 | 4 << 8 | 4);
    fill_all(&mut c, 1, 1, &[3, 50, 50]);
    fill_all(&mut c, 2, 1, &[5, 50, 50]);

    c.engine().mmaqa_b(Signedness::Uu, 0, 1, 2).unwrap();

    assert_eq!(dump(&c, 0, 4)[0], vec![15; 4]);
}

#[rstest]
#[case::ss_small(Signedness::Ss, 0x21, 5)]
#[case::ss_negative_high(Signedness::Ss, 0xf1, 2)]
#[case::uu_negative_high(Signedness::Uu, 0xf1, 226)]
fn test_pmmaqa_b(#[case] sign: Signedness, #[case] byte: i64, #[case] expected: i64) {
    let mut c = ctx();
    fill_all(&mut c, 1, 1, &[byte]);
    fill_all(&mut c, 2, 1, &[byte]);

    c.engine().pmmaqa_b(sign, 0, 1, 2).unwrap();

    assert_eq!(dump(&c, 0, 4)[0], vec![expected; 4]);
}

#[test]
fn test_mmaqa_h_spills_into_register_pair() {
    let mut c = ctx();
    fill(&mut c, 1, 2, &[&[1], &[2], &[3], &[4]]);
    fill(&mut c, 2, 2, &[&[-1], &[-2], &[-3], &[-4]]);

    c.engine().mmaqa_h(Signedness::Ss, 4, 1, 2).unwrap();

    let low: Vec<Vec<i64>> = (1..=4).map(|i| vec![-i, -2 * i]).collect();
    let high: Vec<Vec<i64>> = (1..=4).map(|i| vec![-3 * i, -4 * i]).collect();
    assert_eq!(dump(&c, 4, 8), low);
    assert_eq!(dump(&c, 5, 8), high);
}

#[test]
fn test_mmaqa_h_pair_past_last_register() {
    let mut c = ctx();
    assert_eq!(
        c.engine().mmaqa_h(Signedness::Ss, 7, 1, 2),
        Err(MatrixError::RegisterOutOfRange { reg: 8, row: 0, byte: 0 })
    );
}

#[rstest]
#[case::first_half(Signedness::Ss, 0, 16)]
#[case::second_half_signed(Signedness::Ss, 1, -16)]
#[case::second_half_unsigned(Signedness::Uu, 1, 240)]
fn test_mmacc_bp_selects_nibble_half(#[case] sign: Signedness, #[case] half: usize, #[case] expected: i64) {
    let mut c = ctx();
    fill_all(&mut c, 1, 1, &[1; RLENB]);
    let mut packed = [0x11; RLENB];
    packed[RLENB / 2..].fill(0xff);
    for j in 0..ROWS {
        c.regs.set_row(2, j, &packed).unwrap();
    }

    c.engine().mmacc_bp(sign, 0, 1, 2, half).unwrap();

    assert_eq!(dump(&c, 0, 4)[0], vec![expected; 4]);
}

#[test]
fn test_mmacc_bp_rejects_half_two() {
    let mut c = ctx();
    assert!(matches!(c.engine().mmacc_bp(Signedness::Ss, 0, 1, 2, 2), Err(MatrixError::IllegalConfig(_))));
}

// ══════════════════════════════════════════════════════════
// 5. Rejected instructions
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::zero_shape(0)]
#[case::k_past_row(17 << 16 | 4 << 8 | 4)]
fn test_illegal_msize_leaves_destination(#[case] msize: u64) {
    let mut c = ctx();
    fill_all(&mut c, 0, 4, &[42; 4]);
    c.state.set_msize(msize);

    let result = c.engine().elementwise(MatrixOp::Add, MatrixWidth::Word, 0, MatrixOperand::Matrix(1), 2);

    assert!(matches!(result, Err(MatrixError::IllegalConfig(_))));
    assert!(c.engine().mmaqa_b(Signedness::Ss, 0, 1, 2).is_err());
    assert_eq!(dump(&c, 0, 4), vec![vec![42; 4]; ROWS]);
}

#[test]
fn test_register_past_m7() {
    let mut c = ctx();
    assert_eq!(
        c.engine().elementwise(MatrixOp::Add, MatrixWidth::Word, 0, MatrixOperand::Matrix(1), 8),
        Err(MatrixError::RegisterOutOfRange { reg: 8, row: 0, byte: 0 })
    );
}

// ══════════════════════════════════════════════════════════
// 6. Products against a reference
// ══════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn prop_mmaqa_b_matches_dot_products(
        a in proptest::collection::vec(any::<i8>(), ROWS * RLENB),
        b in proptest::collection::vec(any::<i8>(), ROWS * RLENB),
    ) {
        let mut c = ctx();
        let bytes = |m: &[i8], i: usize| m[i * RLENB..(i + 1) * RLENB].iter().map(|&x| x as u8).collect::<Vec<_>>();
        for i in 0..ROWS {
            c.regs.set_row(1, i, &bytes(&a, i)).unwrap();
            c.regs.set_row(2, i, &bytes(&b, i)).unwrap();
        }

        c.engine().mmaqa_b(Signedness::Ss, 0, 1, 2).unwrap();

        for i in 0..ROWS {
            for j in 0..ROWS {
                let dot: i64 = (0..RLENB).map(|k| i64::from(a[i * RLENB + k]) * i64::from(b[j * RLENB + k])).sum();
                prop_assert_eq!(c.regs.read_signed(0, i, j, 4).unwrap(), dot);
            }
        }
    }
}
