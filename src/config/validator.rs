use crate::config::Config;
use crate::error::{Result, ValidationError, ZeroError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration, collecting every violation
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_storage(config, &mut errors);
        Self::validate_trackers(config, &mut errors);
        Self::validate_filter(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ZeroError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != "1.0.0" {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_storage(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.storage.db_path.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "storage.db_path",
                "Database path cannot be empty",
            ));
        }

        if config.storage.pool_size == 0 {
            errors.push(ValidationError::new(
                "storage.pool_size",
                "Pool size must be greater than 0",
            ));
        }

        if config.storage.busy_timeout_ms == 0 {
            errors.push(ValidationError::new(
                "storage.busy_timeout_ms",
                "Busy timeout must be greater than 0",
            ));
        }
    }

    fn validate_trackers(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.trackers.blacklist_file.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "trackers.blacklist_file",
                "Blacklist path cannot be empty",
            ));
        }
    }

    fn validate_filter(config: &Config, errors: &mut Vec<ValidationError>) {
        let filter = &config.filter;

        if !filter.tracker_weight.is_finite() || filter.tracker_weight < 0.0 {
            errors.push(ValidationError::new(
                "filter.tracker_weight",
                format!("Weight must be a non-negative number, got {}", filter.tracker_weight),
            ));
        }

        for (path, value) in [
            ("filter.tracker_penalty", filter.tracker_penalty),
            ("filter.content_penalty", filter.content_penalty),
        ] {
            if !value.is_finite() || value <= 0.0 {
                errors.push(ValidationError::new(
                    path,
                    format!("Penalty must be a positive number, got {}", value),
                ));
            }
        }

        if !(filter.thin_content_ratio > 0.0 && filter.thin_content_ratio <= 1.0) {
            errors.push(ValidationError::new(
                "filter.thin_content_ratio",
                format!(
                    "Ratio must be in (0.0, 1.0], got {}",
                    filter.thin_content_ratio
                ),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_all_errors() {
        let mut config = Config::default();
        config.meta.schema_version = "2.0.0".to_string();
        config.storage.pool_size = 0;
        config.filter.tracker_penalty = f64::NAN;
        config.filter.thin_content_ratio = 1.5;

        match ConfigValidator::validate(&config) {
            Err(ZeroError::ConfigValidation { errors }) => {
                let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
                assert_eq!(
                    paths,
                    vec![
                        "_meta.schema_version",
                        "storage.pool_size",
                        "filter.tracker_penalty",
                        "filter.thin_content_ratio",
                    ]
                );
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_weight_is_allowed() {
        let mut config = Config::default();
        config.filter.tracker_weight = 0.0;
        assert!(ConfigValidator::validate(&config).is_ok());
    }
}
