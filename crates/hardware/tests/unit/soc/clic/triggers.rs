//! Trigger types and pending-bit updates.

use super::{ATTR, IP, NEGATIVE_EDGE, NEGATIVE_LEVEL, POSITIVE_EDGE, geometry, read_int, recorded, write_int};
use pretty_assertions::assert_eq;
use rstest::rstest;
use vxsim_core::soc::devices::clic::{Trigger, decode_exccode, is_clic_mode};

#[rstest]
#[case(0xc0, Trigger::PositiveLevel, false)]
#[case(0xc2, Trigger::PositiveEdge, true)]
#[case(0xc4, Trigger::NegativeLevel, false)]
#[case(0xc7, Trigger::NegativeEdge, true)]
fn test_trigger_decoding(#[case] attr: u8, #[case] trigger: Trigger, #[case] edge: bool) {
    assert_eq!(Trigger::from_attr(attr), trigger);
    assert_eq!(trigger.is_edge(), edge);
}

#[test]
fn test_exccode_fields() {
    assert_eq!(decode_exccode(super::exccode(37, 0xc0)), (37, 3, 0xc0));
    assert!(is_clic_mode(0x8000_0003));
    assert!(!is_clic_mode(0x8000_0001));
}

/// Drives one line through `levels` and returns `clicintip` after each.
fn pending_trace(attr: u64, levels: &[bool]) -> Vec<u64> {
    let (clic, _) = recorded(geometry(1, 8, 8));
    write_int(&clic, 0, 4, ATTR, attr);
    levels
        .iter()
        .map(|&level| {
            clic.set_irq(4, level);
            read_int(&clic, 0, 4, IP)
        })
        .collect()
}

#[test]
fn test_positive_level_follows_line() {
    assert_eq!(pending_trace(0, &[true, true, false]), vec![1, 1, 0]);
}

#[test]
fn test_negative_level_inverts_line() {
    assert_eq!(pending_trace(NEGATIVE_LEVEL, &[false, true]), vec![1, 0]);
}

#[test]
fn test_edges_latch() {
    assert_eq!(pending_trace(POSITIVE_EDGE, &[true, false]), vec![1, 1]);
    assert_eq!(pending_trace(NEGATIVE_EDGE, &[true, false, true]), vec![0, 1, 1]);
}

#[test]
fn test_level_triggered_pending_is_not_writable() {
    let (clic, _) = recorded(geometry(1, 8, 8));
    write_int(&clic, 0, 2, IP, 1);
    assert_eq!(read_int(&clic, 0, 2, IP), 0);
    clic.set_irq(2, true);
    write_int(&clic, 0, 2, IP, 0);
    assert_eq!(read_int(&clic, 0, 2, IP), 1);
    assert!(!clic.is_edge_triggered(0, 2));
}

#[test]
fn test_edge_triggered_pending_is_writable() {
    let (clic, _) = recorded(geometry(1, 8, 8));
    write_int(&clic, 0, 2, ATTR, POSITIVE_EDGE);
    write_int(&clic, 0, 2, IP, 0x80);
    assert_eq!(read_int(&clic, 0, 2, IP), 1);
    write_int(&clic, 0, 2, IP, 0);
    assert_eq!(read_int(&clic, 0, 2, IP), 0);
    assert!(clic.is_edge_triggered(0, 2));
}

#[test]
fn test_lines_map_to_harts() {
    let (clic, _) = recorded(geometry(2, 8, 8));
    clic.set_irq(8 + 3, true);
    assert_eq!(read_int(&clic, 1, 3, IP), 1);
    assert_eq!(read_int(&clic, 0, 3, IP), 0);
    // Past the last hart.
    clic.set_irq(16, true);
}

#[test]
fn test_selective_vectoring_needs_config() {
    let (plain, _) = recorded(geometry(1, 8, 8));
    write_int(&plain, 0, 1, ATTR, 1);
    assert!(!plain.is_shv(0, 1));

    let config = vxsim_core::config::ClicConfig { vectored: true, ..geometry(1, 8, 8) };
    let (vectored, _) = recorded(config);
    write_int(&vectored, 0, 1, ATTR, 1);
    assert!(vectored.is_shv(0, 1));
    assert!(!vectored.is_shv(0, 2));
}
