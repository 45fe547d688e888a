//! Typed wrapper over the git subcommands gitnoob uses.
//!
//! [`Git`] owns a [`CommandRunner`] and a working directory and exposes one
//! method per subcommand, so no caller assembles raw argument lists. Methods
//! that treat a non-zero exit as failure return [`GitError::Execution`];
//! [`Git::merge_no_ff`] hands back the raw outcome so the caller can classify it.

use std::path::{Path, PathBuf};

use crate::core::command::{CommandInvocation, CommandOutcome, CommandRunner};
use crate::error::GitError;

/// What `git add` should pick up before a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageMode {
    /// `git add -A`: new, modified and deleted files.
    #[default]
    All,
    /// `git add -u`: only files git already tracks.
    TrackedOnly,
}

/// Git commands bound to one working directory.
#[derive(Debug, Clone)]
pub struct Git<R> {
    runner: R,
    workdir: PathBuf,
    program: String,
}

impl<R: CommandRunner> Git<R> {
    pub fn new(runner: R, workdir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            workdir: workdir.into(),
            program: "git".to_string(),
        }
    }

    /// Uses a different git executable (e.g. an absolute path).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn invocation<I, S>(&self, args: I) -> CommandInvocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandInvocation::new(self.program.clone(), self.workdir.clone()).args(args)
    }

    fn checked<I, S>(&self, args: I) -> Result<CommandOutcome, GitError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.runner.run_checked(&self.invocation(args))
    }

    /// `git status --porcelain`; returns the raw listing.
    pub fn status_porcelain(&self) -> Result<String, GitError> {
        Ok(self.checked(["status", "--porcelain"])?.output)
    }

    /// True when the working tree or index has anything to commit.
    pub fn has_changes(&self) -> Result<bool, GitError> {
        Ok(!self.status_porcelain()?.trim().is_empty())
    }

    pub fn stage(&self, mode: StageMode) -> Result<(), GitError> {
        let flag = match mode {
            StageMode::All => "-A",
            StageMode::TrackedOnly => "-u",
        };
        self.checked(["add", flag])?;
        Ok(())
    }

    /// `git add <paths>`.
    pub fn add_paths(&self, paths: &[&str]) -> Result<(), GitError> {
        self.checked(std::iter::once("add").chain(paths.iter().copied()))?;
        Ok(())
    }

    pub fn commit(&self, message: &str) -> Result<(), GitError> {
        self.checked(["commit", "-m", message])?;
        Ok(())
    }

    /// `git push [-u] [remote [branch]]`.
    ///
    /// Returns the raw outcome so a rejection can be retried by the caller.
    pub fn push(
        &self,
        remote: Option<&str>,
        branch: Option<&str>,
        set_upstream: bool,
    ) -> Result<CommandOutcome, GitError> {
        self.runner
            .run(&self.push_invocation(remote, branch, set_upstream))
    }

    /// Same arguments as [`Git::push`], but a rejection is an error naming
    /// the exact command line.
    pub fn push_checked(
        &self,
        remote: Option<&str>,
        branch: Option<&str>,
        set_upstream: bool,
    ) -> Result<(), GitError> {
        self.runner
            .run_checked(&self.push_invocation(remote, branch, set_upstream))?;
        Ok(())
    }

    fn push_invocation(
        &self,
        remote: Option<&str>,
        branch: Option<&str>,
        set_upstream: bool,
    ) -> CommandInvocation {
        let mut args = vec!["push"];
        if set_upstream {
            args.push("-u");
        }
        if let Some(remote) = remote {
            args.push(remote);
            if let Some(branch) = branch {
                args.push(branch);
            }
        }
        self.invocation(args)
    }

    /// `git push -u <remote> <branch>`, failing on rejection.
    pub fn push_upstream(&self, remote: &str, branch: &str) -> Result<(), GitError> {
        self.checked(["push", "-u", remote, branch])?;
        Ok(())
    }

    /// `git pull --rebase <remote> <branch>`.
    pub fn pull_rebase(&self, remote: &str, branch: &str) -> Result<(), GitError> {
        self.checked(["pull", "--rebase", remote, branch])?;
        Ok(())
    }

    /// `git pull --no-rebase <remote> <branch>`.
    pub fn pull(&self, remote: &str, branch: &str) -> Result<(), GitError> {
        self.checked(["pull", "--no-rebase", remote, branch])?;
        Ok(())
    }

    /// `git merge --no-ff -m <message> <branch>`, unchecked.
    pub fn merge_no_ff(&self, branch: &str, message: &str) -> Result<CommandOutcome, GitError> {
        self.runner
            .run(&self.invocation(["merge", "--no-ff", "-m", message, branch]))
    }

    pub fn merge_abort(&self) -> Result<(), GitError> {
        self.checked(["merge", "--abort"])?;
        Ok(())
    }

    /// Local branch names in refname order.
    ///
    /// Reads `refs/heads/` directly, so neither the current-branch marker nor
    /// pseudo-entries like `(HEAD detached at ...)` show up.
    pub fn list_branches(&self) -> Result<Vec<String>, GitError> {
        let outcome = self.checked(["for-each-ref", "--format=%(refname:short)", "refs/heads/"])?;
        Ok(outcome
            .output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    pub fn current_branch(&self) -> Result<String, GitError> {
        Ok(self
            .checked(["branch", "--show-current"])?
            .output
            .trim()
            .to_string())
    }

    /// Full hash of `HEAD`.
    pub fn last_commit_hash(&self) -> Result<String, GitError> {
        Ok(self.checked(["rev-parse", "HEAD"])?.output.trim().to_string())
    }

    pub fn checkout(&self, branch: &str) -> Result<(), GitError> {
        self.checked(["checkout", branch])?;
        Ok(())
    }

    /// `git checkout -b <branch>`.
    pub fn create_branch(&self, branch: &str) -> Result<(), GitError> {
        self.checked(["checkout", "-b", branch])?;
        Ok(())
    }

    /// `git init -b <initial_branch>` in the working directory.
    pub fn init(&self, initial_branch: &str) -> Result<(), GitError> {
        self.checked(["init", "-b", initial_branch])?;
        Ok(())
    }

    pub fn remote_add(&self, name: &str, url: &str) -> Result<(), GitError> {
        self.checked(["remote", "add", name, url])?;
        Ok(())
    }

    /// Reads a key from the global git configuration.
    ///
    /// Returns `None` when the key is unset (git exits with status 1) or empty.
    pub fn config_global_get(&self, key: &str) -> Result<Option<String>, GitError> {
        let invocation = self.invocation(["config", "--global", "--get", key]);
        let outcome = self.runner.run(&invocation)?;
        match outcome.exit_code {
            Some(0) => {
                let value = outcome.output.trim();
                Ok((!value.is_empty()).then(|| value.to_string()))
            }
            Some(1) => Ok(None),
            _ => outcome.into_checked(&invocation).map(|_| None),
        }
    }
}
