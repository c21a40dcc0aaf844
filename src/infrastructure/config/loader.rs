use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::PipelineConfig;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid min_accuracy: {0}. Must be within [0, 1]")]
    InvalidMinAccuracy(f64),

    #[error("Invalid min_output_entropy: {0}. Must be non-negative")]
    InvalidMinOutputEntropy(f64),

    #[error("Invalid top_k: {0}. Must be at least 1")]
    InvalidTopK(usize),

    #[error("Invalid diversity_weight: {0}. Must be within [0, 1]")]
    InvalidDiversityWeight(f64),

    #[error("Invalid per_task_quota: {0}. Must be at least 1")]
    InvalidPerTaskQuota(usize),

    #[error("Invalid min_votes: {0}. Must be at least 1")]
    InvalidMinVotes(usize),

    #[error("Invalid max_iterations: {0}. Must be at least 1")]
    InvalidMaxIterations(u32),

    #[error("Invalid satisfaction_threshold: {0}. Must be within [0, 1]")]
    InvalidSatisfactionThreshold(f64),

    #[error("Invalid min_improvement_threshold: {0}. Must be non-negative")]
    InvalidMinImprovementThreshold(f64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .soar/config.yaml (project config)
    /// 3. .soar/local.yaml (project local overrides, optional)
    /// 4. Environment variables (SOAR_* prefix, highest priority)
    ///
    /// Configuration is always project-local (pwd/.soar/) so multiple
    /// pipelines on one machine can carry different settings.
    pub fn load() -> Result<PipelineConfig> {
        let config: PipelineConfig = Figment::new()
            .merge(Serialized::defaults(PipelineConfig::default()))
            .merge(Yaml::file(".soar/config.yaml"))
            .merge(Yaml::file(".soar/local.yaml"))
            .merge(Env::prefixed("SOAR_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<PipelineConfig> {
        let config: PipelineConfig = Figment::new()
            .merge(Serialized::defaults(PipelineConfig::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &PipelineConfig) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&config.relabel.min_accuracy) {
            return Err(ConfigError::InvalidMinAccuracy(config.relabel.min_accuracy));
        }

        if config.validation.min_output_entropy < 0.0 {
            return Err(ConfigError::InvalidMinOutputEntropy(
                config.validation.min_output_entropy,
            ));
        }

        if config.selection.top_k == 0 {
            return Err(ConfigError::InvalidTopK(config.selection.top_k));
        }

        if !(0.0..=1.0).contains(&config.selection.diversity_weight) {
            return Err(ConfigError::InvalidDiversityWeight(
                config.selection.diversity_weight,
            ));
        }

        if config.selection.per_task_quota == 0 {
            return Err(ConfigError::InvalidPerTaskQuota(
                config.selection.per_task_quota,
            ));
        }

        if config.voting.min_votes == 0 {
            return Err(ConfigError::InvalidMinVotes(config.voting.min_votes));
        }

        if config.ttt.max_iterations == 0 {
            return Err(ConfigError::InvalidMaxIterations(config.ttt.max_iterations));
        }

        if !(0.0..=1.0).contains(&config.ttt.satisfaction_threshold) {
            return Err(ConfigError::InvalidSatisfactionThreshold(
                config.ttt.satisfaction_threshold,
            ));
        }

        if config.ttt.min_improvement_threshold < 0.0 {
            return Err(ConfigError::InvalidMinImprovementThreshold(
                config.ttt.min_improvement_threshold,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert_eq!(config.selection.top_k, 5);
        assert_eq!(config.ttt.max_iterations, 5);
        assert_eq!(config.logging.level, "info");
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_validate_min_accuracy_out_of_range() {
        let mut config = PipelineConfig::default();
        config.relabel.min_accuracy = 1.5;

        let result = ConfigLoader::validate(&config);
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InvalidMinAccuracy(_)
        ));
    }

    #[test]
    fn test_validate_zero_top_k() {
        let mut config = PipelineConfig::default();
        config.selection.top_k = 0;

        let result = ConfigLoader::validate(&config);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::InvalidTopK(0)));
    }

    #[test]
    fn test_validate_diversity_weight_out_of_range() {
        let mut config = PipelineConfig::default();
        config.selection.diversity_weight = -0.1;

        let result = ConfigLoader::validate(&config);
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InvalidDiversityWeight(_)
        ));
    }

    #[test]
    fn test_validate_zero_min_votes() {
        let mut config = PipelineConfig::default();
        config.voting.min_votes = 0;

        let result = ConfigLoader::validate(&config);
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InvalidMinVotes(0)
        ));
    }

    #[test]
    fn test_validate_zero_max_iterations() {
        let mut config = PipelineConfig::default();
        config.ttt.max_iterations = 0;

        let result = ConfigLoader::validate(&config);
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InvalidMaxIterations(0)
        ));
    }

    #[test]
    fn test_validate_satisfaction_threshold_out_of_range() {
        let mut config = PipelineConfig::default();
        config.ttt.satisfaction_threshold = 1.01;

        let result = ConfigLoader::validate(&config);
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InvalidSatisfactionThreshold(_)
        ));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = PipelineConfig::default();
        config.logging.level = "verbose".to_string();

        let result = ConfigLoader::validate(&config);
        assert!(result.is_err());
        match result.unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "verbose"),
            other => panic!("Expected InvalidLogLevel, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = PipelineConfig::default();
        config.logging.format = "xml".to_string();

        let result = ConfigLoader::validate(&config);
        assert!(result.is_err());
        match result.unwrap_err() {
            ConfigError::InvalidLogFormat(format) => assert_eq!(format, "xml"),
            other => panic!("Expected InvalidLogFormat, got {other:?}"),
        }
    }

    #[test]
    fn test_env_override() {
        env::set_var("SOAR_VOTING__MIN_VOTES", "3");
        env::set_var("SOAR_TTT__MAX_ITERATIONS", "8");

        assert_eq!(env::var("SOAR_VOTING__MIN_VOTES").unwrap(), "3");
        assert_eq!(env::var("SOAR_TTT__MAX_ITERATIONS").unwrap(), "8");

        env::remove_var("SOAR_VOTING__MIN_VOTES");
        env::remove_var("SOAR_TTT__MAX_ITERATIONS");
    }

    #[test]
    fn test_hierarchical_merging() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut base_file = NamedTempFile::new().unwrap();
        writeln!(
            base_file,
            "selection:\n  top_k: 3\nlogging:\n  level: info\n  format: json"
        )
        .unwrap();
        base_file.flush().unwrap();

        let mut override_file = NamedTempFile::new().unwrap();
        writeln!(override_file, "selection:\n  top_k: 7\nlogging:\n  level: debug").unwrap();
        override_file.flush().unwrap();

        let config: PipelineConfig = Figment::new()
            .merge(Serialized::defaults(PipelineConfig::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .unwrap();

        assert_eq!(config.selection.top_k, 7, "Override should win");
        assert_eq!(
            config.logging.level, "debug",
            "Override should win for nested fields"
        );
        assert_eq!(
            config.logging.format, "json",
            "Base value should persist when not overridden"
        );
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "relabel:\n  min_accuracy: 0.05\nvoting:\n  min_votes: 2\n  tie_breaker: first_seen"
        )
        .unwrap();
        file.flush().unwrap();

        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert!((config.relabel.min_accuracy - 0.05).abs() < f64::EPSILON);
        assert_eq!(config.voting.min_votes, 2);
        // Untouched sections keep their defaults
        assert_eq!(config.ttt.max_iterations, 5);
    }
}
