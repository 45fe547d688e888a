//! # gitnoob
//!
//! Automation for everyday git chores. The library drives an external `git`
//! executable and provides:
//!
//! - Timestamped branch names derived from commit messages
//! - Stage, commit and push with one rebase-and-retry on rejection
//! - A merge sweep of every local branch into an integration branch, with
//!   per-branch conflict isolation
//! - Repository scaffolding and a small GitHub-compatible hosting client
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gitnoob::core::command::ProcessRunner;
//! use gitnoob::core::operations::MergeAllOperation;
//! use gitnoob::git::Git;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let git = Git::new(ProcessRunner, "/path/to/repo");
//! let report = MergeAllOperation::new(&git).merge_all("main", |_event| {})?;
//!
//! for outcome in &report.outcomes {
//!     println!("{}: {:?}", outcome.branch, outcome.classification);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod core;
pub mod error;
pub mod git;
pub mod logging;
pub mod models;
pub mod parsed_property;

// Re-export commonly used types for convenience
pub use api::{GitHubClient, HostingCredential, HostingOperations};
pub use config::Config;
pub use error::{ApiError, ConfigError, GitError, GitnoobError};
pub use git::Git;
pub use models::{Args, Commands};

/// Core result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
