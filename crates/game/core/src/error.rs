//! Common error infrastructure for rpg-core.
//!
//! Gate failures (cooldown, conditions, range, dodge) are not errors: skills
//! report them through a boolean result and their last recorded state. The
//! types here cover the remaining cases: unresolvable attributes, invalid
//! progression data and failing hook handlers.

use crate::attributes::AttributeError;

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ErrorSeverity {
    /// May succeed later or with other input (a missing attribute on one target).
    Recoverable,

    /// Invalid input that should be rejected without retry.
    Validation,

    /// Unexpected state inconsistency; indicates a bug.
    Internal,

    /// Unrecoverable.
    Fatal,
}

impl ErrorSeverity {
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all rpg-core errors.
pub trait GameError: std::error::Error {
    fn severity(&self) -> ErrorSeverity;

    /// Static identifier of the variant, for metrics and tests.
    fn error_code(&self) -> &'static str;
}

/// Errors raised while building or moving along a progression track.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum LevelError {
    #[error("level key {0} is not an integer")]
    InvalidKey(f64),

    #[error("level {key} requires negative experience {experience}")]
    NegativeExperience { key: i32, experience: f64 },

    #[error("progression track `{0}` has no levels")]
    EmptySet(String),

    #[error("level {0} does not exist")]
    UnknownLevel(i32),

    #[error(transparent)]
    Attribute(#[from] AttributeError),
}

/// Failure reported by an event handler.
///
/// Handler failures are logged and isolated by the bus; they never abort the
/// transition that published the event.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("hook handler failed: {message}")]
pub struct HookError {
    pub message: String,
}

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl GameError for AttributeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::PathNotFound(_) => ErrorSeverity::Recoverable,
            Self::NotANumber(_) | Self::EmptyPath => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::PathNotFound(_) => "ATTRIBUTE_PATH_NOT_FOUND",
            Self::NotANumber(_) => "ATTRIBUTE_NOT_A_NUMBER",
            Self::EmptyPath => "ATTRIBUTE_EMPTY_PATH",
        }
    }
}

impl GameError for LevelError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidKey(_) | Self::NegativeExperience { .. } | Self::EmptySet(_) => {
                ErrorSeverity::Validation
            }
            Self::UnknownLevel(_) => ErrorSeverity::Validation,
            Self::Attribute(error) => error.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidKey(_) => "LEVEL_INVALID_KEY",
            Self::NegativeExperience { .. } => "LEVEL_NEGATIVE_EXPERIENCE",
            Self::EmptySet(_) => "LEVEL_EMPTY_SET",
            Self::UnknownLevel(_) => "LEVEL_UNKNOWN",
            Self::Attribute(error) => error.error_code(),
        }
    }
}

impl GameError for HookError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        "HOOK_FAILED"
    }
}
