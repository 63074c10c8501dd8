//! Global Constants.
//!
//! This module defines constants shared across the library. It includes:
//! 1. **Vector Constants:** Register count, `vtype` fields and limits.
//! 2. **CLIC Constants:** Register offsets and field layouts of the
//!    interrupt controller.
//! 3. **Reduction Constants:** Extended fraction geometry of the grouped
//!    reduction engine.
//! 4. **Matrix Constants:** Register count and row-length bounds of the
//!    matrix unit.

/// Number of architectural vector registers.
pub const NUM_VREGS: usize = 32;

/// Largest VLEN accepted by configuration, in bits.
pub const MAX_VLEN: usize = 65536;

/// Smallest VLEN accepted by configuration, in bits.
pub const MIN_VLEN: usize = 64;

/// `vtype.vill` bit position (XLEN - 1).
pub const VTYPE_VILL_BIT: u32 = 63;

/// `vtype.vlmul` field mask.
pub const VTYPE_VLMUL_MASK: u64 = 0x7;

/// `vtype.vsew` field shift.
pub const VTYPE_VSEW_SHIFT: u32 = 3;

/// `vtype.vta` bit position.
pub const VTYPE_VTA_BIT: u32 = 6;

/// `vtype.vma` bit position.
pub const VTYPE_VMA_BIT: u32 = 7;

/// Bits of `vtype` that must be zero (everything above `vma`).
pub const VTYPE_RESERVED_MASK: u64 = !0xff & !(1 << VTYPE_VILL_BIT);

/// Offset of `cliccfg`.
pub const CLIC_CFG: u64 = 0x0000;

/// Offset of `clicinfo` (read-only).
pub const CLIC_INFO: u64 = 0x0004;

/// Offset of the byte-laned `mintthresh` register.
pub const CLIC_MINTTHRESH: u64 = 0x0008;

/// Offset of the first per-hart interrupt register window.
pub const CLIC_INT_BASE: u64 = 0x1000;

/// Padding between per-hart interrupt register windows.
pub const CLIC_HART_STRIDE_PAD: u64 = 0x1000;

/// Largest number of interrupt sources a CLIC may be built with.
pub const CLIC_MAX_SOURCES: usize = 4096;

/// Largest number of implemented `clicintctl` bits.
pub const CLIC_MAX_INTCTL_BITS: u8 = 8;

/// Mode field value for machine mode.
pub const CLIC_MODE_MACHINE: u16 = 3;

/// Width of the extended fraction the reduction engine accumulates in.
pub const REDUCTION_FRACTION_BITS: u32 = 38;

/// Number of architectural matrix registers.
pub const NUM_MREGS: usize = 8;

/// Accumulator width in bits; a matrix register has `RLEN / 32` rows.
pub const MATRIX_MACC_BITS: usize = 32;

/// Smallest RLEN accepted by configuration, in bits.
pub const MIN_RLEN: usize = 64;

/// Largest RLEN accepted by configuration, in bits.
pub const MAX_RLEN: usize = 4096;
