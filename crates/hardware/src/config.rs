//! Configuration for the vector engine and the interrupt controller.
//!
//! This module defines the configuration structures used to parameterize
//! the library. It provides:
//! 1. **Defaults:** Baseline hardware constants (VLEN, ELEN, RLEN, CLIC geometry).
//! 2. **Structures:** Sections for the vector unit, the matrix unit and the CLIC.
//! 3. **Validation:** Range checks run by every loading entry point.
//!
//! Configuration is supplied as JSON (`Config::from_json`, `Config::from_file`)
//! or built with `Config::default()`.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::constants::{
    CLIC_MAX_INTCTL_BITS, CLIC_MAX_SOURCES, MATRIX_MACC_BITS, MAX_RLEN, MAX_VLEN, MIN_RLEN, MIN_VLEN,
};
use crate::common::error::{ClicError, ConfigError};

/// Default configuration constants.
///
/// These values define the baseline hardware when a field is not
/// explicitly overridden in the JSON configuration.
mod defaults {
    /// Vector register width in bits.
    pub const VLEN: usize = 128;

    /// Widest supported element in bits.
    pub const ELEN: usize = 64;

    /// Elements per reduction group.
    pub const REDUCTION_GROUP: usize = 32;

    /// Matrix row length in bits.
    pub const RLEN: usize = 128;

    /// Base address of the CLIC MMIO region.
    pub const CLIC_BASE: u64 = 0x0800_0000;

    /// Number of harts served by the CLIC.
    pub const CLIC_HARTS: usize = 1;

    /// Interrupt sources per hart.
    pub const CLIC_SOURCES: usize = 256;

    /// Implemented `clicintctl` bits.
    pub const CLIC_INTCTL_BITS: u8 = 8;
}

/// Root configuration structure.
///
/// Every section is optional in JSON; missing fields take their defaults.
///
/// # Examples
///
/// ```
/// use vxsim_core::config::Config;
///
/// let json = r#"{
///     "vector": { "vlen": 256, "reduction_group": 64 },
///     "clic": { "num_harts": 2, "num_sources": 64 }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.vector.vlen, 256);
/// assert_eq!(config.vector.elen, 64);
/// assert_eq!(config.clic.num_harts, 2);
/// assert_eq!(config.clic.base, 0x0800_0000);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Vector unit parameters
    #[serde(default)]
    pub vector: VectorConfig,
    /// Matrix unit parameters
    #[serde(default)]
    pub matrix: MatrixConfig,
    /// Interrupt controller parameters
    #[serde(default)]
    pub clic: ClicConfig,
}

impl Config {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed text and the matching
    /// range error when a parameter is out of bounds.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise
    /// whatever [`Config::from_json`] returns.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Checks every parameter against its legal range.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.vector.validate()?;
        self.matrix.validate()?;
        self.clic.validate()?;
        Ok(())
    }
}

/// Vector unit configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct VectorConfig {
    /// Register width in bits (power of two, 64..=65536)
    #[serde(default = "VectorConfig::default_vlen")]
    pub vlen: usize,

    /// Widest element in bits (32 or 64)
    #[serde(default = "VectorConfig::default_elen")]
    pub elen: usize,

    /// Tail-agnostic elements are overwritten with ones rather than left
    /// undisturbed. Mask destinations always follow this policy.
    #[serde(default = "VectorConfig::default_true")]
    pub tail_agnostic_ones: bool,

    /// Mask-agnostic elements are overwritten with ones rather than left
    /// undisturbed.
    #[serde(default = "VectorConfig::default_true")]
    pub mask_agnostic_ones: bool,

    /// Elements per grouped reduction (32 or 64)
    #[serde(default = "VectorConfig::default_reduction_group")]
    pub reduction_group: usize,
}

impl VectorConfig {
    /// Returns the default VLEN.
    fn default_vlen() -> usize {
        defaults::VLEN
    }

    /// Returns the default ELEN.
    fn default_elen() -> usize {
        defaults::ELEN
    }

    fn default_true() -> bool {
        true
    }

    /// Returns the default reduction group size.
    fn default_reduction_group() -> usize {
        defaults::REDUCTION_GROUP
    }

    /// VLEN in bytes.
    pub const fn vlenb(&self) -> usize {
        self.vlen / 8
    }

    /// Checks VLEN, ELEN and the reduction group size.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.elen != 32 && self.elen != 64 {
            return Err(ConfigError::InvalidElen(self.elen));
        }
        let in_range = (MIN_VLEN..=MAX_VLEN).contains(&self.vlen);
        if !self.vlen.is_power_of_two() || !in_range || self.vlen < self.elen {
            return Err(ConfigError::InvalidVlen { vlen: self.vlen, elen: self.elen });
        }
        if self.reduction_group != 32 && self.reduction_group != 64 {
            return Err(ConfigError::InvalidReductionGroup(self.reduction_group));
        }
        Ok(())
    }
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            vlen: defaults::VLEN,
            elen: defaults::ELEN,
            tail_agnostic_ones: true,
            mask_agnostic_ones: true,
            reduction_group: defaults::REDUCTION_GROUP,
        }
    }
}

/// Matrix unit configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MatrixConfig {
    /// Row length in bits (power of two, 64..=4096)
    #[serde(default = "MatrixConfig::default_rlen")]
    pub rlen: usize,
}

impl MatrixConfig {
    fn default_rlen() -> usize {
        defaults::RLEN
    }

    /// Row length in bytes.
    pub const fn rlenb(&self) -> usize {
        self.rlen / 8
    }

    /// Rows per matrix register.
    pub const fn mrows(&self) -> usize {
        self.rlen / MATRIX_MACC_BITS
    }

    /// Checks RLEN.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRlen`] when RLEN is out of range.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if !self.rlen.is_power_of_two() || self.rlen < MIN_RLEN || self.rlen > MAX_RLEN {
            return Err(ConfigError::InvalidRlen(self.rlen));
        }
        Ok(())
    }
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self { rlen: defaults::RLEN }
    }
}

/// Interrupt controller configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClicConfig {
    /// MMIO base address
    #[serde(default = "ClicConfig::default_base")]
    pub base: u64,

    /// Selective hardware vectoring is implemented (`cliccfg.nvbits`
    /// becomes writable)
    #[serde(default)]
    pub vectored: bool,

    /// Number of harts
    #[serde(default = "ClicConfig::default_num_harts")]
    pub num_harts: usize,

    /// Interrupt sources per hart (at most 4096)
    #[serde(default = "ClicConfig::default_num_sources")]
    pub num_sources: usize,

    /// Implemented `clicintctl` bits (at most 8)
    #[serde(default = "ClicConfig::default_intctl_bits")]
    pub intctl_bits: u8,
}

impl ClicConfig {
    /// Returns the default MMIO base address.
    fn default_base() -> u64 {
        defaults::CLIC_BASE
    }

    /// Returns the default hart count.
    fn default_num_harts() -> usize {
        defaults::CLIC_HARTS
    }

    /// Returns the default number of interrupt sources.
    fn default_num_sources() -> usize {
        defaults::CLIC_SOURCES
    }

    /// Returns the default number of implemented `clicintctl` bits.
    fn default_intctl_bits() -> u8 {
        defaults::CLIC_INTCTL_BITS
    }

    /// Checks the controller geometry.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub const fn validate(&self) -> Result<(), ClicError> {
        if self.num_harts == 0 {
            return Err(ClicError::NoHarts);
        }
        if self.num_sources > CLIC_MAX_SOURCES {
            return Err(ClicError::TooManySources(self.num_sources));
        }
        if self.intctl_bits > CLIC_MAX_INTCTL_BITS {
            return Err(ClicError::TooManyCtlBits(self.intctl_bits));
        }
        Ok(())
    }
}

impl Default for ClicConfig {
    fn default() -> Self {
        Self {
            base: defaults::CLIC_BASE,
            vectored: false,
            num_harts: defaults::CLIC_HARTS,
            num_sources: defaults::CLIC_SOURCES,
            intctl_bits: defaults::CLIC_INTCTL_BITS,
        }
    }
}
