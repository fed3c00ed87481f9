//! Error handling for the SILK encoder core
//!
//! This module defines the error types that can surface across the core
//! boundary. Degenerate-signal conditions (unstable filters, failed root
//! searches) are repaired in-stage and never reach this type; what remains
//! is caller-visible input validation and rate budget reporting.

#![allow(missing_docs)]

use thiserror::Error;

/// Result type alias for encoder operations
pub type Result<T> = std::result::Result<T, SilkError>;

/// Error type for SILK core operations
#[derive(Error, Debug)]
pub enum SilkError {
    /// Invalid encoder configuration
    #[error("Invalid encoder configuration: {details}")]
    InvalidConfig { details: String },

    /// Frame length does not match the configured sample rate and duration
    #[error("Invalid frame size: expected {expected} samples, got {actual}")]
    InvalidFrameSize { expected: usize, actual: usize },

    /// Sample rate not one of the SILK-internal rates
    #[error("Invalid sample rate: {rate}Hz (supported: {supported:?})")]
    InvalidSampleRate { rate: u32, supported: Vec<u32> },

    /// Bitrate outside the usable range for the configured bandwidth
    #[error("Invalid bitrate: {bitrate}bps (range: {min}-{max})")]
    InvalidBitrate { bitrate: u32, min: u32, max: u32 },

    /// Complexity outside 0..=10
    #[error("Invalid complexity: {complexity} (range: 0-10)")]
    InvalidComplexity { complexity: i32 },

    /// Input samples outside [-1.0, 1.0] beyond the allowed headroom
    #[error("Invalid input: {details}")]
    InvalidInput { details: String },

    /// The range coder reported more bits than the target budget
    #[error("Rate budget exceeded: used {used_bits} bits of {budget_bits}")]
    RateBudgetExceeded { used_bits: u32, budget_bits: u32 },

    /// Internal error (should not occur in normal operation)
    #[error("Internal error: {message} (this is a bug, please report it)")]
    InternalError { message: String },
}

impl SilkError {
    /// Create a new invalid configuration error
    pub fn invalid_config(details: impl Into<String>) -> Self {
        Self::InvalidConfig {
            details: details.into(),
        }
    }

    /// Create a new invalid input error
    pub fn invalid_input(details: impl Into<String>) -> Self {
        Self::InvalidInput {
            details: details.into(),
        }
    }

    /// Create a new internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable by retrying with the same encoder
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Configuration errors require caller intervention
            Self::InvalidConfig { .. }
            | Self::InvalidSampleRate { .. }
            | Self::InvalidBitrate { .. }
            | Self::InvalidComplexity { .. }
            | Self::InternalError { .. } => false,

            // Per-frame errors leave the encoder state untouched
            Self::InvalidFrameSize { .. }
            | Self::InvalidInput { .. }
            | Self::RateBudgetExceeded { .. } => true,
        }
    }

    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidConfig { .. }
            | Self::InvalidSampleRate { .. }
            | Self::InvalidBitrate { .. }
            | Self::InvalidComplexity { .. } => ErrorCategory::Configuration,

            Self::InvalidFrameSize { .. } | Self::InvalidInput { .. } => ErrorCategory::Input,

            Self::RateBudgetExceeded { .. } => ErrorCategory::RateControl,

            Self::InternalError { .. } => ErrorCategory::Internal,
        }
    }
}

/// Error category for grouping related errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Configuration and parameter errors
    Configuration,
    /// Per-frame input errors
    Input,
    /// Rate budget feedback
    RateControl,
    /// Internal library errors
    Internal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = SilkError::invalid_config("test message");
        assert!(matches!(err, SilkError::InvalidConfig { .. }));
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_error_recoverability() {
        let recoverable = SilkError::InvalidFrameSize {
            expected: 320,
            actual: 160,
        };
        assert!(recoverable.is_recoverable());

        let non_recoverable = SilkError::InvalidConfig {
            details: "test".to_string(),
        };
        assert!(!non_recoverable.is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let err = SilkError::InvalidFrameSize {
            expected: 320,
            actual: 160,
        };
        let display = format!("{}", err);
        assert!(display.contains("expected 320"));
        assert!(display.contains("got 160"));
    }

    #[test]
    fn test_rate_budget_category() {
        let err = SilkError::RateBudgetExceeded {
            used_bits: 600,
            budget_bits: 500,
        };
        assert_eq!(err.category(), ErrorCategory::RateControl);
        assert!(err.is_recoverable());
    }
}
