//! Interrupt delivery targets.
//!
//! The controller does not own the cores it interrupts. Resolution hands
//! the selected `exccode` to a [`ClicTarget`]; [`HartLines`] is a ready
//! made target that latches the code per hart until the core takes it.

use std::sync::atomic::{AtomicU32, Ordering};

/// Receiver of delivered interrupts.
///
/// Called with the hart's lock held; implementations must not call back
/// into the controller for the same hart.
pub trait ClicTarget: Send + Sync {
    /// Raises the CLIC interrupt line of `hart` with `exccode`.
    fn signal(&self, hart: usize, exccode: u32);
}

/// Latch marking a slot as holding a code.
const PENDING: u32 = 1 << 31;

/// One latched interrupt line per hart.
#[derive(Debug)]
pub struct HartLines {
    lines: Vec<AtomicU32>,
}

impl HartLines {
    /// Creates `num_harts` lowered lines.
    pub fn new(num_harts: usize) -> Self {
        Self { lines: (0..num_harts).map(|_| AtomicU32::new(0)).collect() }
    }

    /// Takes the latched code of `hart`, lowering the line.
    pub fn take(&self, hart: usize) -> Option<u32> {
        let raw = self.lines.get(hart)?.swap(0, Ordering::AcqRel);
        (raw & PENDING != 0).then_some(raw & !PENDING)
    }

    /// Returns the latched code of `hart` without lowering the line.
    pub fn peek(&self, hart: usize) -> Option<u32> {
        let raw = self.lines.get(hart)?.load(Ordering::Acquire);
        (raw & PENDING != 0).then_some(raw & !PENDING)
    }
}

impl ClicTarget for HartLines {
    fn signal(&self, hart: usize, exccode: u32) {
        if let Some(line) = self.lines.get(hart) {
            line.store(exccode | PENDING, Ordering::Release);
        }
    }
}
