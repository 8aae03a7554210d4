//! Error types for gradebook.
//!
//! This module defines all error types used throughout the gradebook crate,
//! providing detailed context for debugging and operator-facing messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for gradebook operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Record Errors ===
    /// A record with the same roll number already exists.
    #[error("a student with roll number {roll} already exists")]
    DuplicateRoll {
        /// The conflicting roll number.
        roll: String,
    },

    /// No record matches the given roll number.
    #[error("student with roll number {roll} not found")]
    NotFound {
        /// The roll number that was looked up.
        roll: String,
    },

    /// A mark was not an integer within the allowed range.
    #[error("invalid mark '{input}' for {subject}: expected an integer between 0 and {max}")]
    InvalidMark {
        /// Subject the mark was entered for.
        subject: String,
        /// The rejected input, as typed.
        input: String,
        /// Maximum marks per subject.
        max: u32,
    },

    /// The number of marks does not match the configured subjects.
    #[error("expected {expected} marks (one per subject), got {actual}")]
    MarkCount {
        /// Number of configured subjects.
        expected: usize,
        /// Number of marks supplied.
        actual: usize,
    },

    /// A mark was given for a subject that is not configured.
    #[error("unknown subject '{subject}'")]
    UnknownSubject {
        /// The subject name as given.
        subject: String,
    },

    // === Input Errors ===
    /// A required text field was empty.
    #[error("{field} cannot be empty")]
    EmptyField {
        /// Name of the field.
        field: &'static str,
    },

    /// A text field contained characters the data file cannot hold.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// Name of the field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Console input reached end of stream.
    #[error("input stream closed")]
    InputClosed,

    // === Persistence Errors ===
    /// Reading or writing the data file failed.
    #[error("failed to {operation} data file {path}: {source}")]
    Persistence {
        /// What was being attempted (`read`, `write`).
        operation: &'static str,
        /// Path to the data file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A stored line could not be parsed.
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number in the data file.
        line: usize,
        /// Description of what was wrong.
        message: String,
    },

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// Console I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for gradebook operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a not-found error for a roll number.
    #[must_use]
    pub fn not_found(roll: impl Into<String>) -> Self {
        Self::NotFound { roll: roll.into() }
    }

    /// Create a duplicate roll error.
    #[must_use]
    pub fn duplicate_roll(roll: impl Into<String>) -> Self {
        Self::DuplicateRoll { roll: roll.into() }
    }

    /// Create an invalid mark error.
    #[must_use]
    pub fn invalid_mark(subject: impl Into<String>, input: impl Into<String>, max: u32) -> Self {
        Self::InvalidMark {
            subject: subject.into(),
            input: input.into(),
            max,
        }
    }

    /// Create an invalid field error.
    #[must_use]
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Check if this error came from reading or writing the data file.
    #[must_use]
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            Self::Persistence { .. } | Self::DirectoryCreate { .. }
        )
    }
}
