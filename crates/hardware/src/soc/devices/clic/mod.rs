//! Core-Local Interrupt Controller (CLIC).
//!
//! The CLIC gives each hart its own set of interrupt sources with
//! per-source pending, enable, attribute and level/priority registers.
//! Enabled sources are kept in a per-hart list sorted by mode, level and
//! priority; every configuration change or line transition re-runs
//! resolution, which delivers the best pending source above the hart's
//! threshold to the [`ClicTarget`].
//!
//! # Memory Map
//!
//! * `0x0000`: `cliccfg` (nvbits, nlbits, nmbits)
//! * `0x0004`: `clicinfo` (read-only: intctl bits, number of sources)
//! * `0x0008`: `mintthresh`
//! * `0x1000 + hart * (num_sources * 4 + 0x1000) + irq * 4`: `clicintip`,
//!   `clicintie`, `clicintattr`, `clicintctl` (one byte each)
//!
//! Global registers belong to the accessing hart. Only machine mode is
//! implemented: `clicintattr.mode` always reads `0b11`.
//!
//! Malformed guest accesses are logged under the `clic` target and
//! otherwise ignored; reads return zero.

/// Sorted per-hart list of enabled interrupts.
pub mod active;

/// Delivery targets.
pub mod target;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use self::active::ActiveList;
pub use self::target::{ClicTarget, HartLines};
use crate::common::constants::{
    CLIC_CFG, CLIC_HART_STRIDE_PAD, CLIC_INFO, CLIC_INT_BASE, CLIC_MINTTHRESH, CLIC_MODE_MACHINE,
};
use crate::common::error::ClicError;
use crate::config::ClicConfig;
use crate::soc::traits::Device;

/// Trigger type from `clicintattr.trig`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Level, active high.
    PositiveLevel,
    /// Rising edge.
    PositiveEdge,
    /// Level, active low.
    NegativeLevel,
    /// Falling edge.
    NegativeEdge,
}

impl Trigger {
    /// Decodes bits 2:1 of `clicintattr`.
    pub const fn from_attr(attr: u8) -> Self {
        match (attr >> 1) & 0x3 {
            0 => Self::PositiveLevel,
            1 => Self::PositiveEdge,
            2 => Self::NegativeLevel,
            _ => Self::NegativeEdge,
        }
    }

    /// Returns true for the edge-triggered types.
    pub const fn is_edge(self) -> bool {
        matches!(self, Self::PositiveEdge | Self::NegativeEdge)
    }

    /// New pending value for a line at `level`, or `None` if the
    /// transition does not touch the pending bit.
    const fn pending_for(self, level: bool) -> Option<bool> {
        match (self, level) {
            (Self::PositiveLevel, l) => Some(l),
            (Self::PositiveEdge, true) => Some(true),
            (Self::NegativeLevel | Self::NegativeEdge, false) => Some(true),
            (Self::NegativeLevel, true) => Some(false),
            (Self::PositiveEdge, false) | (Self::NegativeEdge, true) => None,
        }
    }
}

/// Splits an `exccode` into `(irq, mode, level)`.
pub const fn decode_exccode(exccode: u32) -> (u16, u8, u8) {
    ((exccode & 0xfff) as u16, ((exccode >> 12) & 0x3) as u8, ((exccode >> 14) & 0xff) as u8)
}

/// Returns true if `xtvec` selects CLIC mode (low two bits `0b11`).
pub const fn is_clic_mode(xtvec: u64) -> bool {
    xtvec & 0x3 == 0x3
}

/// Registers and active list of one hart.
#[derive(Debug)]
struct HartState {
    nlbits: u8,
    nmbits: u8,
    mintthresh: u32,
    /// Mirror of `mintstatus.mil`.
    mil: u8,
    ip: Vec<u8>,
    ie: Vec<u8>,
    attr: Vec<u8>,
    ctl: Vec<u8>,
    /// Ones in the `clicintctl` bits below `intctl_bits`.
    ctl_padding: u8,
    active: ActiveList,
}

impl HartState {
    fn new(num_sources: usize, intctl_bits: u8) -> Self {
        Self {
            nlbits: 0,
            nmbits: 0,
            mintthresh: 0,
            mil: 0,
            ip: vec![0; num_sources],
            ie: vec![0; num_sources],
            attr: vec![0xc0; num_sources],
            ctl: vec![0; num_sources],
            ctl_padding: ((1u16 << (8 - intctl_bits)) - 1) as u8,
            active: ActiveList::with_capacity(num_sources),
        }
    }

    /// Level with the unimplemented low bits padded to ones.
    const fn level(&self, intctl: u8) -> u8 {
        let nl = self.nlbits as u32;
        let mask = (((1u16 << nl) - 1) << (8 - nl)) as u8;
        let padding = ((1u16 << (8 - nl)) - 1) as u8;
        (intctl & mask) | padding
    }

    /// Priority with the unimplemented low bits padded to ones.
    const fn priority(&self, intctl: u8, ctlbits: u8) -> u8 {
        if ctlbits < self.nlbits {
            return u8::MAX;
        }
        let np = (ctlbits - self.nlbits) as u32;
        let mask = (((1u16 << np) - 1) << (8 - np)) as u8;
        let padding = ((1u16 << (8 - np)) - 1) as u8;
        (intctl & mask) | padding
    }

    /// `clicintctl` as software reads it back.
    fn intctl(&self, irq: usize) -> u8 {
        self.ctl[irq] | self.ctl_padding
    }

    fn intcfg(&self, irq: usize) -> u16 {
        (CLIC_MODE_MACHINE << 8) | u16::from(self.intctl(irq))
    }
}

/// Register of a per-IRQ block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum IntReg {
    Ip,
    Ie,
    Attr,
    Ctl,
}

impl IntReg {
    const fn from_lane(lane: u64) -> Self {
        match lane & 3 {
            0 => Self::Ip,
            1 => Self::Ie,
            2 => Self::Attr,
            _ => Self::Ctl,
        }
    }
}

/// The interrupt controller.
///
/// Each hart's registers sit behind their own lock, so configuration
/// writes and resolution for one hart are serialized while different
/// harts proceed independently.
pub struct Clic {
    config: ClicConfig,
    stride: u64,
    harts: Vec<Mutex<HartState>>,
    target: Arc<dyn ClicTarget>,
}

impl std::fmt::Debug for Clic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clic").field("config", &self.config).field("stride", &self.stride).finish_non_exhaustive()
    }
}

impl Clic {
    /// Builds a controller that delivers interrupts to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ClicError`] when the geometry in `config` is out of range.
    pub fn new(config: ClicConfig, target: Arc<dyn ClicTarget>) -> Result<Self, ClicError> {
        config.validate()?;
        let stride = config.num_sources as u64 * 4 + CLIC_HART_STRIDE_PAD;
        let harts = (0..config.num_harts).map(|_| Mutex::new(HartState::new(config.num_sources, config.intctl_bits))).collect();
        tracing::debug!(
            target: "clic",
            harts = config.num_harts,
            sources = config.num_sources,
            intctl_bits = config.intctl_bits,
            "controller created"
        );
        Ok(Self { config, stride, harts, target })
    }

    /// Controller geometry.
    pub const fn config(&self) -> &ClicConfig {
        &self.config
    }

    /// Size of the MMIO region in bytes.
    pub const fn size(&self) -> u64 {
        self.config.num_harts as u64 * self.stride
    }

    /// Number of GPIO input lines (`num_harts * num_sources`).
    pub const fn num_lines(&self) -> usize {
        self.config.num_harts * self.config.num_sources
    }

    fn lock(&self, hart: usize) -> Option<MutexGuard<'_, HartState>> {
        self.harts.get(hart).map(|m| m.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Reads `size` bytes (1, 2 or 4) at `offset` on behalf of `hart`.
    pub fn read(&self, hart: usize, offset: u64, size: usize) -> u64 {
        if offset < CLIC_INT_BASE {
            return self.read_global(hart, offset, size);
        }
        (0..size as u64).rev().fold(0, |acc, k| (acc << 8) | u64::from(self.read_int(offset + k)))
    }

    /// Writes the low `size` bytes of `value` at `offset` on behalf of
    /// `hart`.
    pub fn write(&self, hart: usize, offset: u64, size: usize, value: u64) {
        if offset < CLIC_INT_BASE {
            self.write_global(hart, offset, size, value);
            return;
        }
        for k in 0..size as u64 {
            self.write_int(offset + k, (value >> (k * 8)) as u8);
        }
    }

    fn read_global(&self, hart: usize, offset: u64, size: usize) -> u64 {
        let Some(state) = self.lock(hart) else {
            tracing::warn!(target: "clic", hart, "global read from unknown hart");
            return 0;
        };
        let lane = offset & 3;
        let bits = size as u64 * 8;
        let extract = |reg: u64| (reg >> (lane * 8)) & if bits >= 64 { u64::MAX } else { (1 << bits) - 1 };
        match offset & !3 {
            CLIC_CFG if offset == CLIC_CFG => {
                u64::from(self.config.vectored) | u64::from(state.nlbits) << 1 | u64::from(state.nmbits) << 5
            }
            CLIC_CFG => 0,
            CLIC_INFO => {
                let info = ((u64::from(self.config.intctl_bits) << 21) | self.config.num_sources as u64) & 0x1ff_ffff;
                extract(info)
            }
            CLIC_MINTTHRESH => extract(u64::from(state.mintthresh)),
            _ => {
                tracing::warn!(target: "clic", offset, "invalid read");
                0
            }
        }
    }

    fn write_global(&self, hart: usize, offset: u64, size: usize, value: u64) {
        let Some(mut state) = self.lock(hart) else {
            tracing::warn!(target: "clic", hart, "global write from unknown hart");
            return;
        };
        let lane = offset & 3;
        match offset & !3 {
            CLIC_CFG => {
                if lane != 0 {
                    return;
                }
                let nlbits = ((value >> 1) & 0xf) as u8;
                let nmbits = ((value >> 5) & 0x3) as u8;
                if nlbits <= 8 {
                    state.nlbits = nlbits;
                }
                if nmbits == 0 {
                    state.nmbits = 0;
                }
            }
            CLIC_INFO => tracing::warn!(target: "clic", "write to read-only clicinfo"),
            CLIC_MINTTHRESH => {
                let width = (size as u64 * 8).min(32);
                let mask = (((1u64 << width) - 1) << (lane * 8)) as u32;
                // Sub-word stores carry the value in their own low bytes, as reads return it.
                let shifted = (value << (lane * 8)) as u32;
                state.mintthresh = (state.mintthresh & !mask) | (shifted & mask);
            }
            _ => tracing::warn!(target: "clic", offset, "invalid write"),
        }
    }

    /// Decodes a per-IRQ byte address into `(hart, irq, register)`.
    fn decode_int(&self, offset: u64) -> Option<(usize, usize, IntReg)> {
        let rel = offset - CLIC_INT_BASE;
        let hart = (rel / self.stride) as usize;
        let within = rel % self.stride;
        let irq = (within / 4) as usize;
        if hart >= self.config.num_harts || irq >= self.config.num_sources {
            tracing::warn!(target: "clic", offset, hart, irq, "invalid irq access");
            return None;
        }
        Some((hart, irq, IntReg::from_lane(within)))
    }

    fn read_int(&self, offset: u64) -> u8 {
        let Some((hart, irq, reg)) = self.decode_int(offset) else {
            return 0;
        };
        let Some(state) = self.lock(hart) else {
            return 0;
        };
        match reg {
            IntReg::Ip => state.ip[irq],
            IntReg::Ie => state.ie[irq],
            IntReg::Attr => state.attr[irq] & !0x38,
            IntReg::Ctl => state.intctl(irq),
        }
    }

    fn write_int(&self, offset: u64, value: u8) {
        let Some((hart, irq, reg)) = self.decode_int(offset) else {
            return;
        };
        let Some(mut state) = self.lock(hart) else {
            return;
        };
        let state = &mut *state;
        match reg {
            IntReg::Ip => {
                if !Trigger::from_attr(state.attr[irq]).is_edge() {
                    tracing::debug!(target: "clic", hart, irq, "pending write ignored: level-triggered");
                    return;
                }
                if state.ip[irq] == value {
                    return;
                }
                state.ip[irq] = u8::from(value != 0);
            }
            IntReg::Ie => {
                if state.ie[irq] == value {
                    return;
                }
                let was = state.ie[irq] != 0;
                let now = value != 0;
                state.ie[irq] = u8::from(now);
                let intcfg = state.intcfg(irq);
                if now && !was {
                    state.active.insert(irq as u16, intcfg);
                } else if was && !now {
                    state.active.remove(irq as u16);
                }
            }
            IntReg::Attr => {
                if state.attr[irq] == value {
                    return;
                }
                let mut value = value;
                if state.nmbits == 2 && (value >> 6) == 0b10 {
                    value = (value & 0x3f) | (state.attr[irq] & 0xc0);
                }
                state.attr[irq] = (value & 0x3f) | 0xc0;
            }
            IntReg::Ctl => {
                if state.ctl[irq] == value {
                    return;
                }
                state.ctl[irq] = value;
                let intcfg = state.intcfg(irq);
                state.active.rekey(irq as u16, intcfg);
            }
        }
        self.resolve(hart, state);
    }

    /// Drives GPIO input `line` (`hart * num_sources + irq`) to `level`.
    pub fn set_irq(&self, line: usize, level: bool) {
        let sources = self.config.num_sources.max(1);
        let (hart, irq) = (line / sources, line % sources);
        let Some(mut state) = self.lock(hart) else {
            tracing::warn!(target: "clic", line, "set_irq on unknown line");
            return;
        };
        if irq >= self.config.num_sources {
            return;
        }
        let trigger = Trigger::from_attr(state.attr[irq]);
        if let Some(pending) = trigger.pending_for(level) {
            state.ip[irq] = u8::from(pending);
            self.resolve(hart, &state);
        }
    }

    /// Updates the mirrored `mintstatus.mil` of `hart` and re-resolves.
    pub fn set_interrupt_level(&self, hart: usize, mil: u8) {
        if let Some(mut state) = self.lock(hart) {
            state.mil = mil;
            self.resolve(hart, &state);
        }
    }

    /// Re-runs resolution for `hart`.
    pub fn next_interrupt(&self, hart: usize) {
        if let Some(state) = self.lock(hart) {
            self.resolve(hart, &state);
        }
    }

    /// Clears the pending bit of `irq` on `hart` (core accept path).
    pub fn accept(&self, hart: usize, irq: usize) {
        if let Some(mut state) = self.lock(hart)
            && let Some(ip) = state.ip.get_mut(irq)
        {
            *ip = 0;
        }
    }

    /// Returns true if `irq` on `hart` is edge-triggered.
    pub fn is_edge_triggered(&self, hart: usize, irq: usize) -> bool {
        self.lock(hart)
            .and_then(|s| s.attr.get(irq).copied())
            .is_some_and(|attr| Trigger::from_attr(attr).is_edge())
    }

    /// Returns true if `irq` on `hart` uses selective hardware vectoring.
    pub fn is_shv(&self, hart: usize, irq: usize) -> bool {
        self.config.vectored
            && self.lock(hart).and_then(|s| s.attr.get(irq).copied()).is_some_and(|attr| attr & 1 != 0)
    }

    /// Delivers the first pending interrupt above the hart's threshold.
    fn resolve(&self, hart: usize, state: &HartState) {
        let threshold = u32::from(state.mil).max(state.mintthresh);
        for entry in state.active.iter() {
            let intctl = (entry.intcfg & 0xff) as u8;
            let level = state.level(intctl);
            if u32::from(level) <= threshold {
                break;
            }
            let irq = usize::from(entry.irq);
            if state.ip[irq] != 0 {
                let mode = u32::from(entry.intcfg >> 8);
                let exccode = u32::from(entry.irq) | (mode << 12) | (u32::from(level) << 14);
                tracing::debug!(
                    target: "clic",
                    hart,
                    irq,
                    level,
                    priority = state.priority(intctl, self.config.intctl_bits),
                    exccode,
                    "interrupt delivered"
                );
                self.target.signal(hart, exccode);
                return;
            }
        }
    }

    /// Device view of the controller for accesses made by `hart`.
    pub fn port(self: &Arc<Self>, hart: usize) -> ClicPort {
        ClicPort { clic: Arc::clone(self), hart }
    }
}

/// Memory-mapped view of a shared [`Clic`] from one hart.
#[derive(Debug, Clone)]
pub struct ClicPort {
    clic: Arc<Clic>,
    hart: usize,
}

impl ClicPort {
    /// The shared controller.
    pub const fn clic(&self) -> &Arc<Clic> {
        &self.clic
    }

    /// Hart on whose behalf global registers are accessed.
    pub const fn hart(&self) -> usize {
        self.hart
    }
}

impl Device for ClicPort {
    fn name(&self) -> &str {
        "CLIC"
    }

    fn address_range(&self) -> (u64, u64) {
        (self.clic.config.base, self.clic.size())
    }

    fn read_u8(&mut self, offset: u64) -> u8 {
        self.clic.read(self.hart, offset, 1) as u8
    }

    fn read_u16(&mut self, offset: u64) -> u16 {
        self.clic.read(self.hart, offset, 2) as u16
    }

    fn read_u32(&mut self, offset: u64) -> u32 {
        self.clic.read(self.hart, offset, 4) as u32
    }

    fn write_u8(&mut self, offset: u64, val: u8) {
        self.clic.write(self.hart, offset, 1, u64::from(val));
    }

    fn write_u16(&mut self, offset: u64, val: u16) {
        self.clic.write(self.hart, offset, 2, u64::from(val));
    }

    fn write_u32(&mut self, offset: u64, val: u32) {
        self.clic.write(self.hart, offset, 4, u64::from(val));
    }
}
