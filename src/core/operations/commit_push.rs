//! Stage, commit and push with one rebase-and-retry on rejection.
//!
//! [`CommitPushOperation`] walks a small state machine:
//!
//! ```text
//! Clean ──(changes)──> Dirty ──commit──> Committed ──push──> Pushed
//!                        │                   │  └─rejected─> pull --rebase ─> push ─> Pushed
//!                        └─────── any failure ┴──────────────────────────────────────> Failed
//! ```
//!
//! A clean tree is a successful no-op. Commit failures are never retried. A
//! rejected push gets exactly one `pull --rebase` followed by one more push.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::core::branch_name::BranchName;
use crate::core::command::{CommandRunner, contains_conflict_marker};
use crate::core::output::{ProgressEvent, WorkflowSummary};
use crate::error::GitError;
use crate::git::{Git, StageMode};

/// Builds the message used when none is given: `Auto commit on <RFC 1123 date>`.
pub fn default_commit_message(now: DateTime<Utc>) -> String {
    format!("Auto commit on {}", now.format("%a, %d %b %Y %H:%M:%S GMT"))
}

/// Where the workflow ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    /// Nothing to commit.
    Clean,
    /// Changes found, not yet committed.
    Dirty,
    /// Commit created, not pushed.
    Committed,
    /// Commit is on the remote.
    Pushed,
    /// Stopped on an error.
    Failed,
}

/// Knobs for one commit/push run.
#[derive(Debug, Clone)]
pub struct CommitPushConfig {
    /// Commit message; the timestamped default is used when `None`.
    pub message: Option<String>,
    pub stage: StageMode,
    /// Branch to create and check out before committing.
    pub new_branch: Option<BranchName>,
    pub push: bool,
    /// Pull (merge mode) from the remote branch before staging.
    pub pull_first: bool,
    pub remote: String,
    /// Branch to push; the current branch when `None`.
    pub branch: Option<String>,
    /// Pass `-u` to push.
    pub set_upstream: bool,
}

impl Default for CommitPushConfig {
    fn default() -> Self {
        Self {
            message: None,
            stage: StageMode::All,
            new_branch: None,
            push: true,
            pull_first: false,
            remote: "origin".to_string(),
            branch: None,
            set_upstream: false,
        }
    }
}

impl CommitPushConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_stage(mut self, stage: StageMode) -> Self {
        self.stage = stage;
        self
    }

    pub fn with_new_branch(mut self, branch: BranchName) -> Self {
        self.new_branch = Some(branch);
        self
    }

    pub fn with_push(mut self, push: bool) -> Self {
        self.push = push;
        self
    }

    pub fn with_pull_first(mut self, pull_first: bool) -> Self {
        self.pull_first = pull_first;
        self
    }

    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_set_upstream(mut self, set_upstream: bool) -> Self {
        self.set_upstream = set_upstream;
        self
    }
}

/// Outcome of one commit/push run.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResult {
    pub state: WorkflowState,
    pub committed: bool,
    pub pushed: bool,
    pub retry_used: bool,
    /// Branch created by the run.
    pub branch_created: Option<String>,
    /// Hash of the new commit.
    pub commit_hash: Option<String>,
    pub error: Option<GitError>,
}

impl WorkflowResult {
    fn new() -> Self {
        Self {
            state: WorkflowState::Clean,
            committed: false,
            pushed: false,
            retry_used: false,
            branch_created: None,
            commit_hash: None,
            error: None,
        }
    }

    fn fail(mut self, error: GitError) -> Self {
        warn!(state = ?self.state, %error, "commit/push workflow failed");
        self.state = WorkflowState::Failed;
        self.error = Some(error);
        self
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn summary(&self) -> WorkflowSummary {
        WorkflowSummary {
            committed: self.committed,
            pushed: self.pushed,
            retry_used: self.retry_used,
            branch: self.branch_created.clone(),
            commit_hash: self.commit_hash.clone(),
        }
    }
}

/// Runs the stage/commit/push sequence against one repository.
pub struct CommitPushOperation<'a, R> {
    git: &'a Git<R>,
    config: CommitPushConfig,
}

impl<'a, R: CommandRunner> CommitPushOperation<'a, R> {
    pub fn new(git: &'a Git<R>, config: CommitPushConfig) -> Self {
        Self { git, config }
    }

    pub fn config(&self) -> &CommitPushConfig {
        &self.config
    }

    /// Runs the workflow, reporting each step through `on_event`.
    ///
    /// Never returns early with an error; failures end in
    /// [`WorkflowState::Failed`] with the error recorded in the result.
    pub fn run<F: FnMut(ProgressEvent)>(&self, mut on_event: F) -> WorkflowResult {
        let mut result = WorkflowResult::new();

        on_event(ProgressEvent::WorkflowStart {
            repo_path: self.git.workdir().to_path_buf(),
            remote: self.config.remote.clone(),
        });

        match self.git.has_changes() {
            Ok(true) => result.state = WorkflowState::Dirty,
            Ok(false) => {
                info!("working tree clean, nothing to commit");
                on_event(ProgressEvent::NothingToCommit);
                return result;
            }
            Err(e) => return result.fail(e),
        }

        if let Some(branch) = &self.config.new_branch {
            if let Err(e) = self.git.create_branch(branch.as_str()) {
                return result.fail(e);
            }
            info!(branch = %branch, "created branch");
            result.branch_created = Some(branch.to_string());
            on_event(ProgressEvent::BranchCreated {
                branch: branch.to_string(),
            });
        }

        // Resolved lazily: only pull and push need it.
        let mut target_branch: Option<String> = None;

        if self.config.pull_first {
            let branch = match self.resolve_branch(&mut target_branch) {
                Ok(b) => b,
                Err(e) => return result.fail(e),
            };
            if let Err(e) = self.git.pull(&self.config.remote, &branch) {
                return result.fail(e);
            }
            on_event(ProgressEvent::Pulled {
                remote: self.config.remote.clone(),
                branch,
            });
        }

        if let Err(e) = self.git.stage(self.config.stage) {
            return result.fail(e);
        }
        on_event(ProgressEvent::Staged {
            mode: self.config.stage,
        });

        let message = self
            .config
            .message
            .clone()
            .unwrap_or_else(|| default_commit_message(Utc::now()));
        if let Err(e) = self.git.commit(&message) {
            return result.fail(e);
        }
        result.state = WorkflowState::Committed;
        result.committed = true;

        match self.git.last_commit_hash() {
            Ok(hash) => result.commit_hash = Some(hash),
            Err(e) => warn!(error = %e, "could not read the new commit hash"),
        }
        info!(hash = ?result.commit_hash, "committed");
        on_event(ProgressEvent::Committed {
            message,
            commit_hash: result.commit_hash.clone(),
        });

        if !self.config.push {
            return result;
        }

        let branch = match self.resolve_branch(&mut target_branch) {
            Ok(b) => b,
            Err(e) => return result.fail(e),
        };
        self.push_with_retry(&branch, result, &mut on_event)
    }

    fn push_with_retry<F: FnMut(ProgressEvent)>(
        &self,
        branch: &str,
        mut result: WorkflowResult,
        on_event: &mut F,
    ) -> WorkflowResult {
        let remote = self.config.remote.as_str();

        let first = match self
            .git
            .push(Some(remote), Some(branch), self.config.set_upstream)
        {
            Ok(outcome) => outcome,
            Err(e) => return result.fail(e),
        };

        if !first.success() {
            warn!(remote, branch, "push rejected, rebasing and retrying once");
            on_event(ProgressEvent::PushRejected {
                remote: remote.to_string(),
                branch: branch.to_string(),
                output: first.output,
            });
            result.retry_used = true;

            on_event(ProgressEvent::RebaseStart {
                remote: remote.to_string(),
                branch: branch.to_string(),
            });
            if let Err(e) = self.git.pull_rebase(remote, branch) {
                return result.fail(classify_rebase_failure(branch, e));
            }

            if let Err(e) = self
                .git
                .push_checked(Some(remote), Some(branch), self.config.set_upstream)
            {
                return result.fail(e);
            }
        }

        result.state = WorkflowState::Pushed;
        result.pushed = true;
        info!(remote, branch, retry_used = result.retry_used, "pushed");
        on_event(ProgressEvent::Pushed {
            remote: remote.to_string(),
            branch: branch.to_string(),
            retry_used: result.retry_used,
        });
        result
    }

    fn resolve_branch(&self, cache: &mut Option<String>) -> Result<String, GitError> {
        if let Some(branch) = cache {
            return Ok(branch.clone());
        }
        let branch = match (&self.config.branch, &self.config.new_branch) {
            (Some(branch), _) => branch.clone(),
            (None, Some(created)) => created.to_string(),
            (None, None) => {
                let current = self.git.current_branch()?;
                if current.is_empty() {
                    return Err(GitError::DetachedHead);
                }
                current
            }
        };
        *cache = Some(branch.clone());
        Ok(branch)
    }
}

/// A rebase that stopped on conflicting changes becomes [`GitError::Conflict`].
fn classify_rebase_failure(branch: &str, error: GitError) -> GitError {
    match error {
        GitError::Execution { output, .. } if contains_conflict_marker(&output) => {
            GitError::Conflict {
                branch: branch.to_string(),
                output,
            }
        }
        other => other,
    }
}
