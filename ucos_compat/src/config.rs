//! # Configuration
//!
//! Build-time configuration of the guest kernel (priority range, minimum
//! stack, default round-robin quantum) expressed as a runtime value, so one
//! binary can be tested under several configurations.

use crate::types::{CpuStkSize, OsPrio, OsTick};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Fewer than two priority levels leaves nothing besides the idle task
    #[error("prio_max must be at least 2, got {0}")]
    PrioMax(OsPrio),

    /// Minimum stack of zero words
    #[error("stk_size_min must be non-zero")]
    StackMin,

    /// Malformed JSON
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Guest kernel configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OsConfig {
    /// Number of guest priorities; the lowest one is reserved for idle
    pub prio_max: OsPrio,

    /// Smallest task stack accepted, in words
    pub stk_size_min: CpuStkSize,

    /// Time quantum for tasks created with quanta 0 (0: tick rate / 10)
    pub default_time_quanta: OsTick,

    /// Allow semaphore, flag and queue posts from interrupt context
    pub post_from_isr: bool,
}

impl OsConfig {
    /// Deserializes from JSON string; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: OsConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Checks internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prio_max < 2 {
            return Err(ConfigError::PrioMax(self.prio_max));
        }
        if self.stk_size_min == 0 {
            return Err(ConfigError::StackMin);
        }
        Ok(())
    }

    /// Sets `post_from_isr`
    pub fn with_post_from_isr(mut self, allow: bool) -> Self {
        self.post_from_isr = allow;
        self
    }

    /// Sets the default time quantum
    pub fn with_default_time_quanta(mut self, quanta: OsTick) -> Self {
        self.default_time_quanta = quanta;
        self
    }
}

impl Default for OsConfig {
    fn default() -> Self {
        Self {
            prio_max: 32,
            stk_size_min: 64,
            default_time_quanta: 0,
            post_from_isr: false,
        }
    }
}
