//! Configuration validation

use crate::schema::RawConfig;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("timer.{field} must be at least 1, got {value}")]
    NonPositiveValue { field: &'static str, value: u32 },

    #[error("ambient.volume must be between 0.0 and 1.0, got {0}")]
    VolumeOutOfRange(f32),

    #[error("service.inhibit_command cannot be empty")]
    EmptyInhibitCommand,
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let timer = &config.timer;
    let positive_fields = [
        ("focus_seconds", timer.focus_seconds),
        ("short_break_seconds", timer.short_break_seconds),
        ("long_break_seconds", timer.long_break_seconds),
        ("long_break_every", timer.long_break_every),
    ];
    for (field, value) in positive_fields {
        if let Some(value) = value
            && value == 0
        {
            errors.push(ValidationError::NonPositiveValue { field, value });
        }
    }

    if let Some(volume) = config.ambient.volume
        && !(0.0..=1.0).contains(&volume)
    {
        // NaN fails the range check as well
        errors.push(ValidationError::VolumeOutOfRange(volume));
    }

    if let Some(command) = &config.service.inhibit_command
        && command.first().is_none_or(|program| program.is_empty())
    {
        errors.push(ValidationError::EmptyInhibitCommand);
    }

    errors
}
