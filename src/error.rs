//! Unified error handling for the gitnoob library.
//!
//! This module provides the error hierarchy using `thiserror`, so callers can
//! match on the failure class instead of parsing messages.
//!
//! ## Error Categories
//!
//! - [`GitError`]: Errors from spawning or running the external git program
//! - [`ApiError`]: Errors from the repository-hosting REST API
//! - [`ConfigError`]: Errors from configuration loading and validation
//!
//! ## Example
//!
//! ```rust,no_run
//! use gitnoob::error::{GitnoobError, ApiError};
//!
//! fn example() -> Result<(), GitnoobError> {
//!     // Errors are automatically converted via From trait
//!     Err(ApiError::MissingCredential {
//!         field: "token".to_string(),
//!         hint: "set GITNOOB_GITHUB_TOKEN".to_string(),
//!     })?;
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the gitnoob library.
#[derive(Error, Debug)]
pub enum GitnoobError {
    /// An error occurred while driving the git program.
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    /// An error occurred while talking to the hosting platform.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// An error occurred while loading or validating configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A generic error for cases not covered by specific error types.
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Errors that can occur while running git subcommands.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GitError {
    /// The program could not be started at all (not installed, not executable).
    #[error("Failed to run `{command}`: {message}")]
    Spawn {
        /// The command line that could not be spawned.
        command: String,
        /// The operating system error message.
        message: String,
    },

    /// The program ran but exited with a non-zero status.
    #[error("`{command}` exited with {}: {}", describe_exit(.exit_code), .output.trim())]
    Execution {
        /// The command line that failed.
        command: String,
        /// Exit code, `None` when the process was killed by a signal.
        exit_code: Option<i32>,
        /// Combined stdout and stderr text.
        output: String,
    },

    /// A rebase or merge stopped on conflicting changes.
    #[error("Integrating '{branch}' stopped on conflicts")]
    Conflict {
        /// The branch being rebased or merged.
        branch: String,
        /// Combined output of the failed merge.
        output: String,
    },

    /// HEAD is not on a branch, so there is nothing to push or pull against.
    #[error("HEAD is detached; check out a branch or pass --branch")]
    DetachedHead,

    /// A branch name contains characters git refuses or we do not generate.
    #[error("Invalid branch name '{name}': {reason}")]
    InvalidBranchName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

impl GitError {
    /// Returns true when this failure is a classified conflict.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Captured output of the failed command, if any.
    #[must_use]
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::Execution { output, .. } | Self::Conflict { output, .. } => Some(output),
            Self::Spawn { .. } | Self::DetachedHead | Self::InvalidBranchName { .. } => None,
        }
    }
}

/// Errors that can occur when interacting with the hosting platform API.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Username or token is missing or empty. Raised before any request is sent.
    #[error("Missing credential '{field}': {hint}")]
    MissingCredential {
        /// Name of the missing credential.
        field: String,
        /// How to provide it.
        hint: String,
    },

    /// Transport-level failure (DNS, TLS, timeout, connection reset).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a status other than the one the operation expects.
    #[error("{operation} failed with status {status}: {message}")]
    UnexpectedStatus {
        /// Operation that was attempted.
        operation: String,
        /// HTTP status code.
        status: u16,
        /// Body or reason returned by the server.
        message: String,
    },

    /// Failed to parse the API response.
    #[error("Failed to parse API response: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
    },
}

/// Errors that can occur during configuration loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required configuration field is missing.
    #[error("{field} is required (use --{field}, {env_var} env var, or config file)")]
    MissingRequired {
        /// Name of the missing field.
        field: String,
        /// Environment variable name for this field.
        env_var: String,
    },

    /// Failed to read the configuration file.
    #[error("Failed to read config file at {path}: {message}")]
    FileReadError {
        /// Path to the config file.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Failed to parse the configuration file.
    #[error("Failed to parse config file at {path}: {message}")]
    ParseError {
        /// Path to the config file.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// An invalid value was provided for a configuration field.
    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        /// Name of the field with invalid value.
        field: String,
        /// Description of why the value is invalid.
        message: String,
    },

    /// Failed to create config directory or file.
    #[error("Failed to create config at {path}: {message}")]
    DirectoryCreationError {
        /// Path where creation failed.
        path: PathBuf,
        /// Error message.
        message: String,
    },
}

/// Type alias for Results using GitnoobError.
///
/// Not re-exported from the crate root to avoid shadowing `anyhow::Result`.
pub type GitnoobResult<T> = std::result::Result<T, GitnoobError>;
