//! Runtime configuration for the speech service.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (MYNAH_*)
//! 2. Built-in defaults
//!
//! The admission ceilings default to the service's documented per-tier
//! request quotas: 80/s for the standard engine, 8/s for neural.

use std::num::NonZeroU32;

use anyhow::{Context, Result};

use crate::domain::EngineTier;

const DEFAULT_STANDARD_RPS: u32 = 80;
const DEFAULT_NEURAL_RPS: u32 = 8;

/// Resolved service settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// Admission ceiling for the standard tier (calls per second)
    pub standard_rps: NonZeroU32,

    /// Admission ceiling for the neural tier (calls per second)
    pub neural_rps: NonZeroU32,

    /// Explicit endpoint, overriding the regional default
    pub endpoint: Option<String>,

    /// Bearer token for the speech endpoint
    pub api_key: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            standard_rps: nonzero(DEFAULT_STANDARD_RPS),
            neural_rps: nonzero(DEFAULT_NEURAL_RPS),
            endpoint: None,
            api_key: None,
        }
    }
}

impl Settings {
    /// Resolve settings from the environment
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            standard_rps: rate_from_env("MYNAH_STANDARD_RPS", DEFAULT_STANDARD_RPS)?,
            neural_rps: rate_from_env("MYNAH_NEURAL_RPS", DEFAULT_NEURAL_RPS)?,
            endpoint: std::env::var("MYNAH_SPEECH_ENDPOINT").ok(),
            api_key: std::env::var("MYNAH_SPEECH_API_KEY").ok(),
        })
    }

    /// Admission ceiling for an engine tier
    pub fn ceiling(&self, tier: EngineTier) -> NonZeroU32 {
        match tier {
            EngineTier::Standard => self.standard_rps,
            EngineTier::Neural => self.neural_rps,
        }
    }
}

fn nonzero(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).unwrap_or(NonZeroU32::MIN)
}

fn rate_from_env(var: &str, default: u32) -> Result<NonZeroU32> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<NonZeroU32>()
            .with_context(|| format!("invalid value for {}: {:?}", var, raw)),
        Err(_) => Ok(nonzero(default)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tier_quotas() {
        let settings = Settings::default();
        assert_eq!(settings.ceiling(EngineTier::Standard).get(), 80);
        assert_eq!(settings.ceiling(EngineTier::Neural).get(), 8);
        assert!(settings.endpoint.is_none());
        assert!(settings.api_key.is_none());
    }
}
