//! Merge every local branch into an integration branch.
//!
//! The sweep checks out the integration branch, then merges each other branch
//! with `--no-ff`. A conflicting merge is aborted and recorded, and the sweep
//! moves on. Only the initial listing and checkout are fatal.

use tracing::{info, warn};

use crate::core::command::{CommandRunner, looks_like_conflict};
use crate::core::output::{ItemStatus, ProgressEvent, SummaryCounts, SummaryItem};
use crate::error::GitError;
use crate::git::Git;

/// How a single branch merge ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeClassification {
    Merged,
    Conflict,
    OtherFailure,
}

impl From<MergeClassification> for ItemStatus {
    fn from(classification: MergeClassification) -> Self {
        match classification {
            MergeClassification::Merged => ItemStatus::Merged,
            MergeClassification::Conflict => ItemStatus::Conflict,
            MergeClassification::OtherFailure => ItemStatus::Failed,
        }
    }
}

/// Result of merging one source branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub branch: String,
    pub classification: MergeClassification,
    /// Git output of the merge (and of a failed abort, if any).
    pub message: String,
}

/// Ordered outcomes of one sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pub integration_branch: String,
    pub outcomes: Vec<MergeOutcome>,
}

impl MergeReport {
    fn count(&self, classification: MergeClassification) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.classification == classification)
            .count()
    }

    pub fn merged_count(&self) -> usize {
        self.count(MergeClassification::Merged)
    }

    pub fn conflict_count(&self) -> usize {
        self.count(MergeClassification::Conflict)
    }

    pub fn failed_count(&self) -> usize {
        self.count(MergeClassification::OtherFailure)
    }

    /// True when every branch merged (vacuously true for an empty sweep).
    pub fn all_merged(&self) -> bool {
        self.merged_count() == self.outcomes.len()
    }

    pub fn counts(&self) -> SummaryCounts {
        SummaryCounts::new(
            self.merged_count(),
            self.conflict_count(),
            self.failed_count(),
        )
    }

    pub fn items(&self) -> Vec<SummaryItem> {
        self.outcomes
            .iter()
            .map(|o| SummaryItem {
                branch: o.branch.clone(),
                status: o.classification.into(),
                message: (o.classification != MergeClassification::Merged)
                    .then(|| o.message.clone()),
            })
            .collect()
    }
}

/// Message git records on each merge commit.
pub fn merge_commit_message(branch: &str, integration_branch: &str) -> String {
    format!("Merging branch {branch} into {integration_branch}")
}

/// Merges all local branches into one integration branch.
pub struct MergeAllOperation<'a, R> {
    git: &'a Git<R>,
}

impl<'a, R: CommandRunner> MergeAllOperation<'a, R> {
    pub fn new(git: &'a Git<R>) -> Self {
        Self { git }
    }

    /// Runs the sweep.
    ///
    /// Errors only when the branch listing or the integration checkout fails;
    /// per-branch problems are recorded in the report.
    pub fn merge_all<F: FnMut(ProgressEvent)>(
        &self,
        integration_branch: &str,
        mut on_event: F,
    ) -> Result<MergeReport, GitError> {
        let branches: Vec<String> = self
            .git
            .list_branches()?
            .into_iter()
            .filter(|b| b != integration_branch)
            .collect();

        self.git.checkout(integration_branch)?;
        info!(
            integration_branch,
            branches = branches.len(),
            "starting merge sweep"
        );

        let total = branches.len();
        on_event(ProgressEvent::MergeSweepStart {
            integration_branch: integration_branch.to_string(),
            total,
        });

        let mut outcomes = Vec::with_capacity(total);
        for (index, branch) in branches.into_iter().enumerate() {
            on_event(ProgressEvent::MergeStart {
                branch: branch.clone(),
                index,
                total,
            });
            let outcome = self.merge_one(&branch, integration_branch, &mut on_event);
            outcomes.push(outcome);
        }

        let report = MergeReport {
            integration_branch: integration_branch.to_string(),
            outcomes,
        };
        on_event(ProgressEvent::Complete {
            merged: report.merged_count(),
            conflicts: report.conflict_count(),
            failed: report.failed_count(),
        });
        Ok(report)
    }

    fn merge_one<F: FnMut(ProgressEvent)>(
        &self,
        branch: &str,
        integration_branch: &str,
        on_event: &mut F,
    ) -> MergeOutcome {
        let message = merge_commit_message(branch, integration_branch);
        let outcome = match self.git.merge_no_ff(branch, &message) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(branch, error = %e, "merge could not be started");
                on_event(ProgressEvent::MergeFailed {
                    branch: branch.to_string(),
                    error: e.to_string(),
                });
                return MergeOutcome {
                    branch: branch.to_string(),
                    classification: MergeClassification::OtherFailure,
                    message: e.to_string(),
                };
            }
        };

        if outcome.success() {
            info!(branch, "merged");
            on_event(ProgressEvent::MergeSuccess {
                branch: branch.to_string(),
            });
            return MergeOutcome {
                branch: branch.to_string(),
                classification: MergeClassification::Merged,
                message: outcome.output,
            };
        }

        if looks_like_conflict(&outcome) {
            let mut message = outcome.output;
            let aborted = match self.git.merge_abort() {
                Ok(()) => true,
                Err(e) => {
                    warn!(branch, error = %e, "merge --abort failed after conflict");
                    message.push_str(&format!("\nmerge --abort failed: {e}"));
                    false
                }
            };
            info!(branch, aborted, "conflict, skipped");
            on_event(ProgressEvent::MergeConflict {
                branch: branch.to_string(),
                aborted,
            });
            return MergeOutcome {
                branch: branch.to_string(),
                classification: MergeClassification::Conflict,
                message,
            };
        }

        warn!(branch, exit_code = ?outcome.exit_code, "merge failed");
        on_event(ProgressEvent::MergeFailed {
            branch: branch.to_string(),
            error: outcome.output.clone(),
        });
        MergeOutcome {
            branch: branch.to_string(),
            classification: MergeClassification::OtherFailure,
            message: outcome.output,
        }
    }
}
