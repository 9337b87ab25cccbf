//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, connection limits > 0)
//! - Check addresses and the backend URL are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::AppConfig;

/// One semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: '{value}' is not a usable backend URL ({reason})")]
    InvalidUrl {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("observability.log_level: unknown level '{0}'")]
    UnknownLogLevel(String),
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Check a parsed configuration, collecting every problem.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "backend.bind_address", &config.backend.bind_address);
    check_address(&mut errors, "facade.bind_address", &config.facade.bind_address);
    check_backend_url(&mut errors, &config.facade.backend_url);

    let positive = [
        ("backend.max_connections", config.backend.max_connections as u64),
        ("facade.max_connections", config.facade.max_connections as u64),
        ("timeouts.read_secs", config.timeouts.read_secs),
        ("timeouts.upstream_secs", config.timeouts.upstream_secs),
        ("limits.max_header_bytes", config.limits.max_header_bytes as u64),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_backend_url(errors: &mut Vec<ValidationError>, value: &str) {
    let field = "facade.backend_url";
    let reason = match Url::parse(value) {
        Err(e) => Some(e.to_string()),
        Ok(url) if url.scheme() != "http" => Some("scheme must be http".to_string()),
        Ok(url) if url.host_str().is_none() => Some("missing host".to_string()),
        Ok(_) => None,
    };
    if let Some(reason) = reason {
        errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
            reason,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(validate_config(&AppConfig::default()), Ok(()));
    }

    #[test]
    fn collects_every_error() {
        let mut config = AppConfig::default();
        config.backend.bind_address = "localhost".to_string();
        config.facade.backend_url = "https://backend:45000".to_string();
        config.facade.max_connections = 0;
        config.timeouts.upstream_secs = 0;
        config.observability.log_level = "loud".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5, "{errors:?}");
        assert!(errors.contains(&ValidationError::Zero {
            field: "facade.max_connections"
        }));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidUrl { reason, .. } if reason == "scheme must be http")));
        assert!(errors.contains(&ValidationError::UnknownLogLevel("loud".to_string())));
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = AppConfig::default();
        config.observability.log_level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
