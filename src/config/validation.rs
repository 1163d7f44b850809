//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;

/// Smallest send queue that holds a new connection's welcome burst.
pub const MIN_SEND_QUEUE: usize = 8;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("moderation.warning_threshold must be at least 1")]
    ZeroWarningThreshold,
    #[error("listen.max_line_length must be at least 1")]
    ZeroLineLength,
    #[error("names.min_length ({min}) exceeds names.max_length ({max})")]
    NameBounds { min: usize, max: usize },
    #[error("listen.send_queue ({0}) must be at least {MIN_SEND_QUEUE}")]
    SendQueueTooSmall(usize),
    #[error("listen.host is required")]
    MissingHost,
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listen.host.trim().is_empty() {
        errors.push(ValidationError::MissingHost);
    }
    if config.listen.max_line_length == 0 {
        errors.push(ValidationError::ZeroLineLength);
    }
    if config.listen.send_queue < MIN_SEND_QUEUE {
        errors.push(ValidationError::SendQueueTooSmall(config.listen.send_queue));
    }
    if config.moderation.warning_threshold == 0 {
        errors.push(ValidationError::ZeroWarningThreshold);
    }
    if config.names.min_length > config.names.max_length {
        errors.push(ValidationError::NameBounds {
            min: config.names.min_length,
            max: config.names.max_length,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Join validation errors into one display string.
pub(super) fn describe(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
