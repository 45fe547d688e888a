//! Core git workflows.
//!
//! These operations drive git through a [`CommandRunner`](crate::core::command::CommandRunner)
//! and report progress through a `ProgressEvent` callback. They never print.
//!
//! # Modules
//!
//! - [`commit_push`] - Stage, commit and push with one rebase-and-retry cycle
//! - [`merge_all`] - Merge every local branch into an integration branch
//! - [`scaffold`] - Create a new local repository and publish it

pub mod commit_push;
pub mod merge_all;
pub mod scaffold;

pub use commit_push::{
    CommitPushConfig, CommitPushOperation, WorkflowResult, WorkflowState, default_commit_message,
};
pub use merge_all::{
    MergeAllOperation, MergeClassification, MergeOutcome, MergeReport, merge_commit_message,
};
pub use scaffold::{ScaffoldConfig, default_remote_url, publish, scaffold_local};
