//! Runners for gitnoob commands.
//!
//! A runner drives one operation, renders its progress events through an
//! [`OutputWriter`](crate::core::output::OutputWriter) and turns the outcome
//! into a [`RunResult`] carrying the process exit code.
//!
//! # Architecture
//!
//! - `traits.rs` - Shared settings, `RunResult` and the error-to-exit-code mapping
//! - `workflow.rs` - Commit/push and merge sweep against a local repository
//! - `repo.rs` - Repository create, delete and list against the hosting API

pub mod repo;
pub mod traits;
pub mod workflow;

pub use repo::RepoRunner;
pub use traits::{RunResult, RunnerSettings, exit_code_for, exit_code_for_api, exit_code_for_git};
pub use workflow::WorkflowRunner;

// Re-export OutputFormat from models for convenience
pub use crate::models::OutputFormat;
