//! Numeric bounds the registry enforces.

use crate::cash::Cash;
use crate::error::{PmoError, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix for policy overrides, e.g. `FARM_POLICY_MAX_STUDENTS=20`.
pub const ENV_PREFIX: &str = "FARM_POLICY";

/// Configured limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// How many students one mentor may invite (§1).
    pub max_students: usize,
    /// Lowest hourly rate a person may set (§16).
    pub min_rate: Cash,
    /// Highest hourly rate a person may set (§16).
    pub max_rate: Cash,
    /// Reputation above which a person counts as high-reputation.
    pub high_reputation: u64,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            max_students: 16,
            min_rate: Cash::ZERO,
            max_rate: Cash::dollars(256),
            high_reputation: 256,
        }
    }
}

impl Policy {
    /// Loads the policy from an optional file, then applies `FARM_POLICY_*`
    /// environment overrides. Missing keys keep their defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let policy: Policy = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;
        policy.validate()?;
        tracing::debug!(?policy, "Policy loaded");
        Ok(policy)
    }

    /// Parses a policy from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let policy: Policy = Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        policy.validate()?;
        Ok(policy)
    }

    fn validate(&self) -> Result<()> {
        if self.min_rate.is_negative() {
            return Err(PmoError::InvalidPolicy(format!(
                "min_rate {} is below zero",
                self.min_rate
            )));
        }
        if self.min_rate > self.max_rate {
            return Err(PmoError::InvalidPolicy(format!(
                "min_rate {} is above max_rate {}",
                self.min_rate, self.max_rate
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    // Environment variables are process-wide; tests that call `load` take turns.
    static ENV: Mutex<()> = parking_lot::const_mutex(());

    #[test]
    fn test_defaults() {
        let policy = Policy::default();
        assert_eq!(policy.max_students, 16);
        assert_eq!(policy.max_rate, Cash::dollars(256));
        assert_eq!(policy.min_rate, Cash::ZERO);
        assert_eq!(policy.high_reputation, 256);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let policy = Policy::from_toml("max_students = 3\nmax_rate = \"$100\"").unwrap();
        assert_eq!(policy.max_students, 3);
        assert_eq!(policy.max_rate, Cash::dollars(100));
        assert_eq!(policy.high_reputation, 256);
    }

    #[test]
    fn test_inverted_bounds_are_rejected() {
        let err = Policy::from_toml("min_rate = \"$50\"\nmax_rate = \"$10\"").unwrap_err();
        assert!(matches!(err, PmoError::InvalidPolicy(_)));
    }

    #[test]
    fn test_load_from_file() {
        let _env = ENV.lock();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.toml");
        std::fs::write(&path, "high_reputation = 1024\n").unwrap();
        let policy = Policy::load(Some(path.as_path())).unwrap();
        assert_eq!(policy.high_reputation, 1024);
    }

    #[test]
    fn test_missing_required_file_fails() {
        let _env = ENV.lock();
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(Policy::load(Some(missing.as_path())).is_err());
    }

    #[test]
    fn test_environment_overrides_defaults_and_file() {
        let _env = ENV.lock();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.toml");
        std::fs::write(&path, "max_students = 3\nhigh_reputation = 512\n").unwrap();
        std::env::set_var("FARM_POLICY_MAX_STUDENTS", "20");
        std::env::set_var("FARM_POLICY_MAX_RATE", "100");

        let bare = Policy::load(None);
        let layered = Policy::load(Some(path.as_path()));
        std::env::remove_var("FARM_POLICY_MAX_STUDENTS");
        std::env::remove_var("FARM_POLICY_MAX_RATE");

        let bare = bare.unwrap();
        assert_eq!(bare.max_students, 20);
        assert_eq!(bare.max_rate, Cash::dollars(100));
        assert_eq!(bare.high_reputation, 256);
        let layered = layered.unwrap();
        assert_eq!(layered.max_students, 20);
        assert_eq!(layered.max_rate, Cash::dollars(100));
        assert_eq!(layered.high_reputation, 512);
        assert_eq!(Policy::load(None).unwrap(), Policy::default());
    }
}
