//! # Unit Components
//!
//! This module organizes the unit tests by the library module they cover:
//! configuration, the hart-side units and the SoC devices.
