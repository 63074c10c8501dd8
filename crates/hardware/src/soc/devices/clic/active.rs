//! Sorted list of enabled interrupts for one hart.
//!
//! Entries are kept ordered by descending `intcfg` (mode, then level and
//! priority bits) with ascending IRQ number as the tie-break, so resolution
//! is a linear scan that stops at the first entry below the threshold.
//! The list is re-sorted whenever an entry is added or re-keyed.

use std::cmp::Ordering;

/// Mode field (bits 8..10) plus `clicintctl` (bits 0..8).
const INTCFG_KEY_MASK: u16 = 0x3ff;

/// One enabled interrupt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveEntry {
    /// `mode << 8 | clicintctl`, with the unimplemented low bits set.
    pub intcfg: u16,
    /// Interrupt number.
    pub irq: u16,
}

impl ActiveEntry {
    fn order(a: &Self, b: &Self) -> Ordering {
        (b.intcfg & INTCFG_KEY_MASK)
            .cmp(&(a.intcfg & INTCFG_KEY_MASK))
            .then(a.irq.cmp(&b.irq))
    }
}

/// Enabled interrupts of one hart in delivery order.
#[derive(Clone, Debug, Default)]
pub struct ActiveList {
    entries: Vec<ActiveEntry>,
}

impl ActiveList {
    /// Creates an empty list with room for `capacity` sources.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity) }
    }

    /// Adds `irq` with configuration `intcfg`.
    pub fn insert(&mut self, irq: u16, intcfg: u16) {
        self.entries.push(ActiveEntry { intcfg, irq });
        self.entries.sort_by(ActiveEntry::order);
    }

    /// Removes `irq` if present.
    pub fn remove(&mut self, irq: u16) {
        self.entries.retain(|e| e.irq != irq);
    }

    /// Changes the configuration of `irq` if present.
    pub fn rekey(&mut self, irq: u16, intcfg: u16) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.irq == irq) {
            entry.intcfg = intcfg;
            self.entries.sort_by(ActiveEntry::order);
        }
    }

    /// Entries in delivery order.
    pub fn iter(&self) -> impl Iterator<Item = &ActiveEntry> {
        self.entries.iter()
    }

    /// Number of enabled interrupts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no interrupt is enabled.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
