//! Tunables for cube assembly and encoding.
//!
//! Both configs have sensible defaults and can be overridden from the
//! environment with `MINICUBER_*` variables.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{MinicuberError, Result};
use crate::retry::RetryPolicy;

/// Configuration for the cube assembler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblerConfig {
    /// Padding of the provider query box, in grid cells per side.
    pub padding_cells: f64,

    /// Minimum length of a time chunk in days.
    pub min_chunk_days: i64,

    /// Warn when a build spans more chunks than this.
    pub chunk_warning_threshold: usize,

    /// Retry policy applied at every provider call.
    pub retry: RetryPolicy,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            padding_cells: 6.0,
            min_chunk_days: 15,
            chunk_warning_threshold: 12,
            retry: RetryPolicy::default(),
        }
    }
}

impl AssemblerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("MINICUBER_PADDING_CELLS") {
            if let Ok(cells) = val.parse() {
                config.padding_cells = cells;
            }
        }

        if let Ok(val) = std::env::var("MINICUBER_MIN_CHUNK_DAYS") {
            if let Ok(days) = val.parse() {
                config.min_chunk_days = days;
            }
        }

        if let Ok(val) = std::env::var("MINICUBER_CHUNK_WARNING_THRESHOLD") {
            if let Ok(n) = val.parse() {
                config.chunk_warning_threshold = n;
            }
        }

        if let Ok(val) = std::env::var("MINICUBER_RETRY_MAX_ATTEMPTS") {
            if let Ok(n) = val.parse() {
                config.retry.max_attempts = n;
            }
        }

        if let Ok(val) = std::env::var("MINICUBER_RETRY_INITIAL_DELAY_MS") {
            if let Ok(ms) = val.parse() {
                config.retry.initial_delay = Duration::from_millis(ms);
            }
        }

        if let Ok(val) = std::env::var("MINICUBER_RETRY_MAX_DELAY_MS") {
            if let Ok(ms) = val.parse() {
                config.retry.max_delay = Duration::from_millis(ms);
            }
        }

        if let Ok(val) = std::env::var("MINICUBER_RETRY_JITTER") {
            config.retry.jitter = val.to_lowercase() == "true" || val == "1";
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.padding_cells.is_finite() || self.padding_cells < 0.0 {
            return Err(MinicuberError::Config(
                "padding_cells must be a non-negative number".to_string(),
            ));
        }

        if self.min_chunk_days < 1 {
            return Err(MinicuberError::Config(
                "min_chunk_days must be >= 1".to_string(),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(MinicuberError::Config(
                "retry max_attempts must be > 0".to_string(),
            ));
        }

        if self.retry.initial_delay > self.retry.max_delay {
            return Err(MinicuberError::Config(
                "retry initial_delay must not exceed max_delay".to_string(),
            ));
        }

        Ok(())
    }
}

/// Lossless compression codec for persisted variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compression {
    None,
    Zlib,
    Zstd,
}

impl Default for Compression {
    fn default() -> Self {
        Self::Zstd
    }
}

impl Compression {
    /// Parse from string (case-insensitive), defaulting to zstd.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "none" => Self::None,
            "zlib" | "deflate" => Self::Zlib,
            _ => Self::Zstd,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Zlib => "zlib",
            Self::Zstd => "zstd",
        }
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration for the encoding planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// Bit depth of quantized integers.
    pub bits: u8,

    pub compression: Compression,

    /// Compression level (1-9).
    pub compression_level: u8,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            bits: 16,
            compression: Compression::Zstd,
            compression_level: 9,
        }
    }
}

impl EncodingConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("MINICUBER_ENCODING_BITS") {
            if let Ok(bits) = val.parse() {
                config.bits = bits;
            }
        }

        if let Ok(val) = std::env::var("MINICUBER_COMPRESSION") {
            config.compression = Compression::from_str(&val);
        }

        if let Ok(val) = std::env::var("MINICUBER_COMPRESSION_LEVEL") {
            if let Ok(level) = val.parse() {
                config.compression_level = level;
            }
        }

        config
    }

    pub fn validate(&self) -> Result<()> {
        if !(2..=32).contains(&self.bits) {
            return Err(MinicuberError::Config(
                "encoding bits must be 2-32".to_string(),
            ));
        }

        if self.compression_level == 0 || self.compression_level > 9 {
            return Err(MinicuberError::Config(
                "compression_level must be 1-9".to_string(),
            ));
        }

        Ok(())
    }
}
