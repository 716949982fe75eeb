//! Pipeline configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::analysis::{ReadingProfile, StrengthTable};
use crate::error::{Error, Result};
use crate::render::OutputFormat;

/// How decided strengths are scaled before splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStrategy {
    /// ×0.7
    Conservative,
    /// ×1
    #[default]
    Balanced,
    /// ×1.3, capped at 1
    Aggressive,
    /// × role confidence
    Adaptive,
}

impl ProcessingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStrategy::Conservative => "conservative",
            ProcessingStrategy::Balanced => "balanced",
            ProcessingStrategy::Aggressive => "aggressive",
            ProcessingStrategy::Adaptive => "adaptive",
        }
    }

    /// Scale a strength; the result is clamped to `[0, 1]`.
    pub fn apply(&self, strength: f32, confidence: f32) -> f32 {
        let scaled = match self {
            ProcessingStrategy::Conservative => strength * 0.7,
            ProcessingStrategy::Balanced => strength,
            ProcessingStrategy::Aggressive => strength * 1.3,
            ProcessingStrategy::Adaptive => strength * confidence,
        };
        scaled.clamp(0.0, 1.0)
    }
}

impl fmt::Display for ProcessingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessingStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "conservative" => Ok(ProcessingStrategy::Conservative),
            "balanced" => Ok(ProcessingStrategy::Balanced),
            "aggressive" => Ok(ProcessingStrategy::Aggressive),
            "adaptive" => Ok(ProcessingStrategy::Adaptive),
            _ => Err(Error::Config(format!("unknown processing strategy: {}", s))),
        }
    }
}

/// Options for the processing pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingConfig {
    /// Reading profile selecting the strength table
    pub profile: ReadingProfile,

    /// Replaces the table strength for emphasized roles
    pub intensity_override: Option<f32>,

    /// Output format
    pub format: OutputFormat,

    /// Strength scaling strategy
    pub strategy: ProcessingStrategy,

    /// Run the fallback chain on low-quality or failed output
    pub enable_fallbacks: bool,

    /// Fan document units out to the worker pool
    pub parallel: bool,

    /// Worker threads for parallel processing
    pub max_workers: usize,

    /// Deadline for a whole batch or document
    pub timeout: Duration,

    /// Minimum quality score accepted without fallback
    pub quality_threshold: f32,

    /// Strength table used by the custom profile
    pub custom_table: StrengthTable,

    /// Longest unit accepted for analysis, in characters
    pub max_unit_chars: usize,
}

impl ProcessingConfig {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reading profile.
    pub fn with_profile(mut self, profile: ReadingProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Force a strength for emphasized roles.
    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity_override = Some(intensity);
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the strategy.
    pub fn with_strategy(mut self, strategy: ProcessingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Enable or disable fallbacks.
    pub fn with_fallbacks(mut self, enable: bool) -> Self {
        self.enable_fallbacks = enable;
        self
    }

    /// Enable parallel processing with the given worker count.
    pub fn with_parallel(mut self, workers: usize) -> Self {
        self.parallel = true;
        self.max_workers = workers;
        self
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the quality threshold.
    pub fn with_quality_threshold(mut self, threshold: f32) -> Self {
        self.quality_threshold = threshold;
        self
    }

    /// Set the custom strength table and select the custom profile.
    pub fn with_custom_table(mut self, table: StrengthTable) -> Self {
        self.custom_table = table;
        self.profile = ReadingProfile::Custom;
        self
    }

    /// Set the maximum unit length.
    pub fn with_max_unit_chars(mut self, max: usize) -> Self {
        self.max_unit_chars = max;
        self
    }

    /// Check every value is in range.
    pub fn validate(&self) -> Result<()> {
        if let Some(intensity) = self.intensity_override {
            if !(0.0..=1.0).contains(&intensity) {
                return Err(Error::Config(format!(
                    "intensity must be within [0, 1], got {}",
                    intensity
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.quality_threshold) {
            return Err(Error::Config(format!(
                "quality threshold must be within [0, 1], got {}",
                self.quality_threshold
            )));
        }
        if self.max_workers == 0 {
            return Err(Error::Config("max_workers must be at least 1".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(Error::Config("timeout must be positive".to_string()));
        }
        if self.max_unit_chars == 0 {
            return Err(Error::Config("max_unit_chars must be positive".to_string()));
        }
        Ok(())
    }

    /// Defaults overridden by `BIONIFY_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by values from `lookup`.
    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("BIONIFY_PROFILE") {
            config.profile = value.parse()?;
        }
        if let Some(value) = lookup("BIONIFY_INTENSITY") {
            let intensity = value
                .trim()
                .parse::<f32>()
                .map_err(|e| Error::Config(format!("BIONIFY_INTENSITY: {}", e)))?;
            config.intensity_override = Some(intensity);
        }
        if let Some(value) = lookup("BIONIFY_FORMAT") {
            config.format = value.parse()?;
        }
        if let Some(value) = lookup("BIONIFY_STRATEGY") {
            config.strategy = value.parse()?;
        }
        if let Some(value) = lookup("BIONIFY_TIMEOUT_SECS") {
            let secs = value
                .trim()
                .parse::<u64>()
                .map_err(|e| Error::Config(format!("BIONIFY_TIMEOUT_SECS: {}", e)))?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(value) = lookup("BIONIFY_MAX_WORKERS") {
            config.max_workers = value
                .trim()
                .parse::<usize>()
                .map_err(|e| Error::Config(format!("BIONIFY_MAX_WORKERS: {}", e)))?;
            config.parallel = true;
        }

        config.validate()?;
        Ok(config)
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            profile: ReadingProfile::Accessibility,
            intensity_override: None,
            format: OutputFormat::PlainText,
            strategy: ProcessingStrategy::Balanced,
            enable_fallbacks: true,
            parallel: false,
            max_workers: 4,
            timeout: Duration::from_secs(30),
            quality_threshold: 0.7,
            custom_table: StrengthTable::default(),
            max_unit_chars: 100_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = ProcessingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.profile, ReadingProfile::Accessibility);
        assert_eq!(config.quality_threshold, 0.7);
        assert!(!config.parallel);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(ProcessingConfig::new().with_intensity(1.5).validate().is_err());
        assert!(ProcessingConfig::new().with_quality_threshold(-0.1).validate().is_err());
        assert!(ProcessingConfig::new().with_parallel(0).validate().is_err());
        assert!(ProcessingConfig::new()
            .with_timeout(Duration::ZERO)
            .validate()
            .is_err());
    }

    #[test]
    fn test_strategy_multipliers() {
        assert!((ProcessingStrategy::Conservative.apply(0.5, 0.9) - 0.35).abs() < 1e-6);
        assert_eq!(ProcessingStrategy::Balanced.apply(0.5, 0.9), 0.5);
        assert_eq!(ProcessingStrategy::Aggressive.apply(0.9, 0.9), 1.0);
        assert!((ProcessingStrategy::Adaptive.apply(0.5, 0.8) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("BIONIFY_PROFILE", "technical"),
            ("BIONIFY_INTENSITY", "0.35"),
            ("BIONIFY_FORMAT", "html"),
            ("BIONIFY_STRATEGY", "adaptive"),
            ("BIONIFY_TIMEOUT_SECS", "5"),
            ("BIONIFY_MAX_WORKERS", "2"),
        ]
        .into_iter()
        .collect();
        let config =
            ProcessingConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();

        assert_eq!(config.profile, ReadingProfile::Technical);
        assert_eq!(config.intensity_override, Some(0.35));
        assert_eq!(config.format, OutputFormat::Html);
        assert_eq!(config.strategy, ProcessingStrategy::Adaptive);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_workers, 2);
        assert!(config.parallel);
    }

    #[test]
    fn test_from_lookup_rejects_bad_values() {
        assert!(ProcessingConfig::from_lookup(|key| {
            (key == "BIONIFY_INTENSITY").then(|| "lots".to_string())
        })
        .is_err());
        assert!(ProcessingConfig::from_lookup(|key| {
            (key == "BIONIFY_INTENSITY").then(|| "2.0".to_string())
        })
        .is_err());
    }
}
