//! Progress events emitted by gitnoob workflows.
//!
//! Core operations never print. They report what happened through these
//! events, which the output layer renders as text, JSON or NDJSON.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::git::StageMode;

/// Progress events emitted during a workflow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Commit/push workflow is starting.
    WorkflowStart {
        /// Repository working directory.
        repo_path: PathBuf,
        /// Remote that will receive the push.
        remote: String,
    },

    /// The working tree had nothing to commit.
    NothingToCommit,

    /// A new branch was created and checked out.
    BranchCreated {
        /// Name of the new branch.
        branch: String,
    },

    /// Remote changes were pulled before staging.
    Pulled {
        /// Remote pulled from.
        remote: String,
        /// Branch pulled.
        branch: String,
    },

    /// Changes were staged.
    Staged {
        /// Which files were picked up.
        mode: StageMode,
    },

    /// A commit was created.
    Committed {
        /// Commit message used.
        message: String,
        /// Hash of the new commit, when it could be read.
        #[serde(skip_serializing_if = "Option::is_none")]
        commit_hash: Option<String>,
    },

    /// The remote refused the push.
    PushRejected {
        /// Remote that rejected.
        remote: String,
        /// Branch being pushed.
        branch: String,
        /// Output of the failed push.
        output: String,
    },

    /// Rebasing onto the remote branch after a rejected push.
    RebaseStart {
        /// Remote rebased onto.
        remote: String,
        /// Branch rebased onto.
        branch: String,
    },

    /// Push finished successfully.
    Pushed {
        /// Remote pushed to.
        remote: String,
        /// Branch pushed.
        branch: String,
        /// Whether the rebase-and-retry cycle was needed.
        retry_used: bool,
    },

    /// Merge sweep is starting.
    MergeSweepStart {
        /// Branch everything is merged into.
        integration_branch: String,
        /// Number of branches that will be merged.
        total: usize,
    },

    /// Starting to merge one branch.
    MergeStart {
        /// Branch being merged.
        branch: String,
        /// Current index (0-based).
        index: usize,
        /// Total number of branches to merge.
        total: usize,
    },

    /// Branch merged cleanly.
    MergeSuccess {
        /// Branch that was merged.
        branch: String,
    },

    /// Branch conflicted and the merge was rolled back.
    MergeConflict {
        /// Branch with conflicts.
        branch: String,
        /// Whether `merge --abort` succeeded.
        aborted: bool,
    },

    /// Branch failed to merge for a reason other than conflicts.
    MergeFailed {
        /// Branch that failed.
        branch: String,
        /// Error message.
        error: String,
    },

    /// Merge sweep completed.
    Complete {
        /// Branches merged.
        merged: usize,
        /// Branches skipped because of conflicts.
        conflicts: usize,
        /// Branches that failed otherwise.
        failed: usize,
    },

    /// Local repository scaffolded.
    RepoInitialized {
        /// Directory of the new repository.
        path: PathBuf,
    },

    /// Hosting repository created.
    RepoCreated {
        /// Repository name.
        name: String,
        /// Web URL, when the API returned one.
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },

    /// Hosting repository deleted.
    RepoDeleted {
        /// Repository name.
        name: String,
    },

    /// One repository from a listing.
    RepoListed {
        /// Repository name.
        name: String,
        /// Whether it is private.
        private: bool,
    },

    /// Error event for general errors.
    Error {
        /// Error message.
        message: String,
        /// Optional error code.
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<String>,
    },
}

/// Overall result of a command.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SummaryResult {
    /// Everything completed.
    Success,
    /// Nothing needed doing (clean tree, no branches).
    NothingToDo,
    /// Some branches merged, others did not.
    PartialSuccess,
    /// The command failed.
    Failed,
}

impl std::fmt::Display for SummaryResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummaryResult::Success => write!(f, "success"),
            SummaryResult::NothingToDo => write!(f, "nothing_to_do"),
            SummaryResult::PartialSuccess => write!(f, "partial_success"),
            SummaryResult::Failed => write!(f, "failed"),
        }
    }
}

/// Per-branch counts of a merge sweep.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryCounts {
    /// Total number of branches visited.
    pub total: usize,
    /// Merged cleanly.
    pub merged: usize,
    /// Rolled back on conflicts.
    pub conflicts: usize,
    /// Failed for other reasons.
    pub failed: usize,
}

impl SummaryCounts {
    /// Creates counts from component values.
    pub fn new(merged: usize, conflicts: usize, failed: usize) -> Self {
        Self {
            total: merged + conflicts + failed,
            merged,
            conflicts,
            failed,
        }
    }
}

/// Status of one branch in a sweep.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Merged cleanly.
    Merged,
    /// Conflicted, merge aborted.
    Conflict,
    /// Failed for another reason.
    Failed,
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemStatus::Merged => write!(f, "merged"),
            ItemStatus::Conflict => write!(f, "conflict"),
            ItemStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One branch in the final summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryItem {
    /// Branch name.
    pub branch: String,
    /// What happened to it.
    pub status: ItemStatus,
    /// Raw git output for conflicts and failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Commit/push details for the final summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowSummary {
    /// A commit was created.
    pub committed: bool,
    /// The commit reached the remote.
    pub pushed: bool,
    /// The rebase-and-retry cycle ran.
    pub retry_used: bool,
    /// Branch created by the workflow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Hash of the new commit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_hash: Option<String>,
}

/// Summary information for final output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryInfo {
    /// Command that produced the summary (e.g. "push", "merge-all").
    pub operation: String,
    /// Overall result status.
    pub result: SummaryResult,
    /// Commit/push details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow: Option<WorkflowSummary>,
    /// Integration branch of a merge sweep.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integration_branch: Option<String>,
    /// Counts of a merge sweep.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<SummaryCounts>,
    /// Per-branch results of a merge sweep.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<SummaryItem>>,
    /// Error or informational message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SummaryInfo {
    /// Creates a summary with only an operation and a result.
    pub fn new(operation: impl Into<String>, result: SummaryResult) -> Self {
        Self {
            operation: operation.into(),
            result,
            workflow: None,
            integration_branch: None,
            counts: None,
            items: None,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// # Progress Event Serialization
    ///
    /// Verifies that progress events serialize with a snake_case tag.
    ///
    /// ## Test Scenario
    /// - Serializes commit, push and merge events
    ///
    /// ## Expected Outcome
    /// - Event tag and fields appear in the JSON
    /// - Optional fields are omitted when empty
    #[test]
    fn test_progress_event_serialization() {
        let committed = ProgressEvent::Committed {
            message: "wip".to_string(),
            commit_hash: None,
        };
        let json = serde_json::to_string(&committed).unwrap();
        assert!(json.contains("\"event\":\"committed\""));
        assert!(!json.contains("commit_hash"));

        let pushed = ProgressEvent::Pushed {
            remote: "origin".to_string(),
            branch: "main".to_string(),
            retry_used: true,
        };
        let json = serde_json::to_string(&pushed).unwrap();
        assert!(json.contains("\"event\":\"pushed\""));
        assert!(json.contains("\"retry_used\":true"));

        let conflict = ProgressEvent::MergeConflict {
            branch: "b".to_string(),
            aborted: true,
        };
        let json = serde_json::to_string(&conflict).unwrap();
        assert!(json.contains("\"event\":\"merge_conflict\""));

        let staged = ProgressEvent::Staged {
            mode: StageMode::TrackedOnly,
        };
        let json = serde_json::to_string(&staged).unwrap();
        assert!(json.contains("\"mode\":\"tracked_only\""));
    }

    /// # Unit Event Serialization
    ///
    /// Verifies the field-less event.
    ///
    /// ## Test Scenario
    /// - Serializes and parses NothingToCommit
    ///
    /// ## Expected Outcome
    /// - Only the tag is emitted and it parses back
    #[test]
    fn test_unit_event_serialization() {
        let json = serde_json::to_string(&ProgressEvent::NothingToCommit).unwrap();
        assert_eq!(json, "{\"event\":\"nothing_to_commit\"}");
        let parsed: ProgressEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ProgressEvent::NothingToCommit);
    }

    /// # Summary Counts
    ///
    /// Verifies total calculation.
    ///
    /// ## Test Scenario
    /// - Creates counts from components
    ///
    /// ## Expected Outcome
    /// - Total is the sum
    #[test]
    fn test_summary_counts() {
        let counts = SummaryCounts::new(2, 1, 1);
        assert_eq!(counts.total, 4);
        assert_eq!(counts.merged, 2);
    }

    /// # Summary Serialization
    ///
    /// Verifies empty optional sections are omitted.
    ///
    /// ## Test Scenario
    /// - Serializes a bare summary with a message
    ///
    /// ## Expected Outcome
    /// - Only operation, result and message keys appear
    #[test]
    fn test_summary_serialization() {
        let summary = SummaryInfo::new("push", SummaryResult::NothingToDo)
            .with_message("working tree clean");
        let value = serde_json::to_value(&summary).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert_eq!(obj["result"], "nothing_to_do");
        assert_eq!(obj["message"], "working tree clean");
    }

    /// # Status Display
    ///
    /// Verifies Display for status enums.
    ///
    /// ## Test Scenario
    /// - Formats each ItemStatus and SummaryResult
    ///
    /// ## Expected Outcome
    /// - Matches the serde names
    #[test]
    fn test_status_display() {
        assert_eq!(ItemStatus::Merged.to_string(), "merged");
        assert_eq!(ItemStatus::Conflict.to_string(), "conflict");
        assert_eq!(ItemStatus::Failed.to_string(), "failed");
        assert_eq!(SummaryResult::PartialSuccess.to_string(), "partial_success");
        assert_eq!(SummaryResult::NothingToDo.to_string(), "nothing_to_do");
    }
}
