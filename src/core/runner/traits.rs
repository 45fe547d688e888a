//! Common types for command runners.

use std::path::PathBuf;

use crate::core::ExitCode;
use crate::error::{ApiError, GitError, GitnoobError};
use crate::models::OutputFormat;

/// Settings shared by every runner.
#[derive(Debug, Clone)]
pub struct RunnerSettings {
    /// Repository working directory.
    pub repo_path: PathBuf,
    /// Remote used for pull and push.
    pub remote: String,
    /// Output format (text, json, ndjson).
    pub output_format: OutputFormat,
    /// Whether to suppress progress output.
    pub quiet: bool,
}

impl RunnerSettings {
    pub fn new(repo_path: impl Into<PathBuf>, remote: impl Into<String>) -> Self {
        Self {
            repo_path: repo_path.into(),
            remote: remote.into(),
            output_format: OutputFormat::Text,
            quiet: false,
        }
    }

    pub fn with_output(mut self, format: OutputFormat, quiet: bool) -> Self {
        self.output_format = format;
        self.quiet = quiet;
        self
    }
}

/// Result of a command.
#[derive(Debug)]
pub struct RunResult {
    /// Exit code for the process.
    pub exit_code: ExitCode,
    /// Optional message to display.
    pub message: Option<String>,
}

impl RunResult {
    pub fn success() -> Self {
        Self {
            exit_code: ExitCode::Success,
            message: None,
        }
    }

    pub fn success_with_message(message: impl Into<String>) -> Self {
        Self {
            exit_code: ExitCode::Success,
            message: Some(message.into()),
        }
    }

    pub fn error(code: ExitCode, message: impl Into<String>) -> Self {
        Self {
            exit_code: code,
            message: Some(message.into()),
        }
    }

    pub fn partial_success(message: impl Into<String>) -> Self {
        Self {
            exit_code: ExitCode::PartialSuccess,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.exit_code, ExitCode::Success)
    }
}

/// Exit code for a git failure: conflicts need manual work, the rest is general.
pub fn exit_code_for_git(error: &GitError) -> ExitCode {
    if error.is_conflict() {
        ExitCode::Conflict
    } else {
        ExitCode::GeneralError
    }
}

pub fn exit_code_for_api(error: &ApiError) -> ExitCode {
    match error {
        ApiError::MissingCredential { .. } => ExitCode::MissingCredentials,
        _ => ExitCode::GeneralError,
    }
}

pub fn exit_code_for(error: &GitnoobError) -> ExitCode {
    match error {
        GitnoobError::Git(e) => exit_code_for_git(e),
        GitnoobError::Api(e) => exit_code_for_api(e),
        GitnoobError::Config(_) | GitnoobError::Other(_) => ExitCode::GeneralError,
    }
}
