//! Memory-Mapped IO Devices.
//!
//! This module contains the interrupt controller found in the SoC: the
//! Core-Local Interrupt Controller (CLIC), which delivers per-hart
//! prioritized interrupts.

/// Core-Local Interrupt Controller.
pub mod clic;

pub use clic::{Clic, ClicPort, ClicTarget, HartLines};

pub use crate::soc::traits::Device;
