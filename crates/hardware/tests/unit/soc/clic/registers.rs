//! Global and per-IRQ register behavior.

use super::{ATTR, CTL, IE, IP, geometry, int_offset, read_int, recorded, write_int};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::sync::Arc;
use vxsim_core::common::error::ClicError;
use vxsim_core::config::ClicConfig;
use vxsim_core::soc::devices::{Clic, HartLines};

// ══════════════════════════════════════════════════════════
// 1. Construction
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(geometry(0, 16, 8), ClicError::NoHarts)]
#[case(geometry(1, 4097, 8), ClicError::TooManySources(4097))]
#[case(geometry(1, 16, 9), ClicError::TooManyCtlBits(9))]
fn test_rejected_geometry(#[case] config: ClicConfig, #[case] expected: ClicError) {
    let err = Clic::new(config, Arc::new(HartLines::new(1))).unwrap_err();
    assert_eq!(err, expected);
}

#[test]
fn test_region_size() {
    let (clic, _) = recorded(geometry(2, 16, 8));
    assert_eq!(clic.size(), 2 * (16 * 4 + 0x1000));
    assert_eq!(clic.num_lines(), 32);
}

// ══════════════════════════════════════════════════════════
// 2. Global registers
// ══════════════════════════════════════════════════════════

#[test]
fn test_cliccfg_warl() {
    let (clic, _) = recorded(ClicConfig::default());
    assert_eq!(clic.read(0, 0, 1), 0);

    clic.write(0, 0, 1, 8 << 1);
    assert_eq!(clic.read(0, 0, 1), 0x10);

    // nlbits above eight and nonzero nmbits are not legal.
    clic.write(0, 0, 1, (9 << 1) | (1 << 5));
    assert_eq!(clic.read(0, 0, 1), 0x10);

    // Only byte lane zero is implemented.
    clic.write(0, 1, 1, 0xff);
    assert_eq!(clic.read(0, 1, 1), 0);
    assert_eq!(clic.read(0, 0, 1), 0x10);
}

#[test]
fn test_cliccfg_reports_vectoring() {
    let (clic, _) = recorded(ClicConfig { vectored: true, ..ClicConfig::default() });
    assert_eq!(clic.read(0, 0, 1) & 1, 1);
}

#[test]
fn test_clicinfo_is_read_only() {
    let (clic, _) = recorded(geometry(1, 256, 8));
    let info = (8 << 21) | 256;
    assert_eq!(clic.read(0, 4, 4), info);
    assert_eq!(clic.read(0, 5, 1), 0x01);
    clic.write(0, 4, 4, 0);
    assert_eq!(clic.read(0, 4, 4), info);
}

#[test]
fn test_mintthresh_byte_lanes() {
    let (clic, _) = recorded(ClicConfig::default());
    clic.write(0, 8, 4, 0x1234_5678);
    assert_eq!(clic.read(0, 8, 4), 0x1234_5678);

    clic.write(0, 9, 1, 0xab);
    assert_eq!(clic.read(0, 8, 4), 0x1234_ab78);
    assert_eq!(clic.read(0, 0xa, 2), 0x1234);
}

#[rstest]
#[case(8, 1, 0x5a, 0x1234_565a)]
#[case(0xb, 1, 0x5a, 0x5a34_5678)]
#[case(0xa, 2, 0xbeef, 0xbeef_5678)]
#[case(8, 2, 0xbeef, 0x1234_beef)]
fn test_mintthresh_subword_write_lands_in_its_lane(
    #[case] offset: u64,
    #[case] size: usize,
    #[case] value: u64,
    #[case] expected: u64,
) {
    let (clic, _) = recorded(ClicConfig::default());
    clic.write(0, 8, 4, 0x1234_5678);
    clic.write(0, offset, size, value);
    assert_eq!(clic.read(0, 8, 4), expected);
    assert_eq!(clic.read(0, offset, size), value, "a lane reads back what was stored to it");
}

#[test]
fn test_global_registers_are_per_hart() {
    let (clic, _) = recorded(geometry(2, 16, 8));
    clic.write(1, 8, 4, 0x40);
    clic.write(1, 0, 1, 4 << 1);
    assert_eq!(clic.read(1, 8, 4), 0x40);
    assert_eq!(clic.read(0, 8, 4), 0);
    assert_eq!(clic.read(0, 0, 1), 0);
    assert_eq!(clic.read(2, 8, 4), 0, "unknown hart reads zero");
}

#[test]
fn test_unmapped_global_reads_zero() {
    let (clic, _) = recorded(ClicConfig::default());
    clic.write(0, 0xc, 4, 0xffff_ffff);
    assert_eq!(clic.read(0, 0xc, 4), 0);
}

// ══════════════════════════════════════════════════════════
// 3. Per-IRQ registers
// ══════════════════════════════════════════════════════════

#[test]
fn test_attr_mode_is_machine() {
    let (clic, _) = recorded(geometry(1, 16, 8));
    assert_eq!(read_int(&clic, 0, 3, ATTR), 0xc0);

    write_int(&clic, 0, 3, ATTR, 0x02);
    assert_eq!(read_int(&clic, 0, 3, ATTR), 0xc2);

    // Reserved bits 5:3 read as zero.
    write_int(&clic, 0, 3, ATTR, 0x3f);
    assert_eq!(read_int(&clic, 0, 3, ATTR), 0xc7);
}

#[rstest]
#[case(8, 0xa5, 0xa5)]
#[case(4, 0xa5, 0xaf)]
#[case(0, 0x00, 0xff)]
fn test_ctl_pads_unimplemented_bits(#[case] bits: u8, #[case] written: u64, #[case] read: u64) {
    let (clic, _) = recorded(geometry(1, 16, bits));
    write_int(&clic, 0, 1, CTL, written);
    assert_eq!(read_int(&clic, 0, 1, CTL), read);
}

#[test]
fn test_enable_is_single_bit() {
    let (clic, _) = recorded(geometry(1, 16, 8));
    write_int(&clic, 0, 2, IE, 0x7);
    assert_eq!(read_int(&clic, 0, 2, IE), 1);
    write_int(&clic, 0, 2, IE, 0);
    assert_eq!(read_int(&clic, 0, 2, IE), 0);
}

#[test]
fn test_block_reads_combine_lanes() {
    let (clic, _) = recorded(geometry(1, 16, 8));
    write_int(&clic, 0, 5, IE, 1);
    write_int(&clic, 0, 5, CTL, 0x80);
    assert_eq!(clic.read(0, int_offset(&clic, 0, 5, IP), 4), 0x80c0_0100);
}

#[test]
fn test_out_of_range_irq_is_ignored() {
    let (clic, _) = recorded(geometry(1, 16, 8));
    // Source 16 lands in the padding of hart zero's window.
    let offset = int_offset(&clic, 0, 16, CTL);
    clic.write(0, offset, 1, 0x55);
    assert_eq!(clic.read(0, offset, 1), 0);
}
