//! Core of gitnoob.
//!
//! Everything below the CLI lives here:
//!
//! - Command execution and the typed branch name
//! - Commit/push, merge sweep and scaffold operations
//! - Output formatting for the text, JSON and NDJSON modes
//! - Runners that tie the operations to exit codes

pub mod branch_name;
pub mod command;
pub mod operations;
pub mod output;
pub mod runner;

/// Process exit codes.
///
/// Scripts can rely on these values; they do not change between releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// All operations completed successfully.
    Success = 0,

    /// General error (configuration, network, git, etc.).
    GeneralError = 1,

    /// A conflict must be resolved by hand.
    Conflict = 2,

    /// Some branches merged, others conflicted or failed.
    PartialSuccess = 3,

    /// Hosting credentials are missing.
    MissingCredentials = 4,
}

impl ExitCode {
    /// Returns the numeric exit code value.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Returns a human-readable description of the exit code.
    pub fn description(self) -> &'static str {
        match self {
            ExitCode::Success => "All operations completed successfully",
            ExitCode::GeneralError => "General error occurred",
            ExitCode::Conflict => "Conflict detected - resolve it manually",
            ExitCode::PartialSuccess => "Some branches merged, others need attention",
            ExitCode::MissingCredentials => "Hosting credentials are not configured",
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.code())
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}
