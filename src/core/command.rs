//! External command execution.
//!
//! Every git call in the crate goes through a [`CommandRunner`]. The runner
//! spawns the program, waits for it, and hands back the combined output. It
//! does not interpret the output; callers decide what a failure means.
//! The one shared classification is [`looks_like_conflict`].

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::GitError;

/// Marker git prints when a merge stops on conflicting hunks.
pub const CONFLICT_MARKER: &str = "CONFLICT";

/// A single program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    program: String,
    args: Vec<String>,
    working_dir: PathBuf,
}

impl CommandInvocation {
    pub fn new(program: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: working_dir.into(),
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments in order.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// The command line as a user would type it, for messages and logs.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// What a finished process left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Exit code, `None` when terminated by a signal.
    pub exit_code: Option<i32>,
    /// Stdout followed by stderr.
    pub output: String,
    pub elapsed: Duration,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Converts a failed outcome into an [`GitError::Execution`] for `invocation`.
    pub fn into_checked(self, invocation: &CommandInvocation) -> Result<Self, GitError> {
        if self.success() {
            Ok(self)
        } else {
            Err(GitError::Execution {
                command: invocation.display(),
                exit_code: self.exit_code,
                output: self.output,
            })
        }
    }
}

/// Runs external programs.
///
/// Implemented by [`ProcessRunner`] for real use and by scripted doubles in
/// tests. Implementations must not swallow failures.
pub trait CommandRunner {
    /// Runs the invocation to completion. Only a failure to start the program
    /// is an error; a non-zero exit is reported through the outcome.
    fn run(&self, invocation: &CommandInvocation) -> Result<CommandOutcome, GitError>;

    /// Like [`run`](Self::run) but a non-zero exit becomes [`GitError::Execution`].
    fn run_checked(&self, invocation: &CommandInvocation) -> Result<CommandOutcome, GitError> {
        self.run(invocation)?.into_checked(invocation)
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, invocation: &CommandInvocation) -> Result<CommandOutcome, GitError> {
        (**self).run(invocation)
    }
}

/// Runs invocations as child processes with `std::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, invocation: &CommandInvocation) -> Result<CommandOutcome, GitError> {
        let started = Instant::now();
        let output = Command::new(invocation.program())
            .args(invocation.arguments())
            .current_dir(invocation.working_dir())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| GitError::Spawn {
                command: invocation.display(),
                message: e.to_string(),
            })?;
        let elapsed = started.elapsed();

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        let outcome = CommandOutcome {
            exit_code: output.status.code(),
            output: combined,
            elapsed,
        };

        debug!(
            command = %invocation.display(),
            cwd = %invocation.working_dir().display(),
            exit_code = ?outcome.exit_code,
            elapsed_ms = elapsed.as_millis() as u64,
            "command finished"
        );

        Ok(outcome)
    }
}

/// Reports whether the captured output carries git's conflict marker.
///
/// This is a plain case-sensitive substring check on the text; git's
/// porcelain for merge failures is not a stable format.
pub fn looks_like_conflict(outcome: &CommandOutcome) -> bool {
    contains_conflict_marker(&outcome.output)
}

pub(crate) fn contains_conflict_marker(text: &str) -> bool {
    text.contains(CONFLICT_MARKER)
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// # Conflict Marker Detection
    ///
    /// Verifies the conflict heuristic on typical git output.
    ///
    /// ## Test Scenario
    /// - Checks merge output with and without the uppercase marker
    /// - Checks a lowercase mention
    ///
    /// ## Expected Outcome
    /// - Only the exact uppercase token counts as a conflict
    #[test]
    fn test_looks_like_conflict() {
        let conflict = testing::fail(
            "Auto-merging a.txt\nCONFLICT (content): Merge conflict in a.txt\n\
             Automatic merge failed; fix conflicts and then commit the result.\n",
        );
        assert!(looks_like_conflict(&conflict));

        let lowercase = testing::fail("error: could not apply; resolve conflict manually\n");
        assert!(!looks_like_conflict(&lowercase));

        let other = testing::fail("merge: nope - not something we can merge\n");
        assert!(!looks_like_conflict(&other));
    }

    /// # Invocation Display
    ///
    /// Verifies the command line rendering used in messages.
    ///
    /// ## Test Scenario
    /// - Builds an invocation with arg() and args()
    ///
    /// ## Expected Outcome
    /// - Program and arguments are joined with spaces in order
    #[test]
    fn test_invocation_display() {
        let inv = CommandInvocation::new("git", "/tmp")
            .arg("merge")
            .args(["--no-ff", "-m", "msg"]);
        assert_eq!(inv.display(), "git merge --no-ff -m msg");
        assert_eq!(inv.arguments().len(), 4);
        assert_eq!(inv.working_dir(), Path::new("/tmp"));
    }

    /// # Process Runner Captures Output
    ///
    /// Runs git itself to check output capture and exit codes.
    ///
    /// ## Test Scenario
    /// - Runs `git --version` (success)
    /// - Verifies a missing ref inside a fresh repository (failure)
    ///
    /// ## Expected Outcome
    /// - Success carries stdout; failure is returned as an outcome by run()
    ///   and as an Execution error by run_checked()
    #[test]
    fn test_process_runner_exit_status() {
        let dir = TempDir::new().unwrap();
        let runner = ProcessRunner;

        let version = CommandInvocation::new("git", dir.path()).arg("--version");
        let outcome = runner.run(&version).unwrap();
        assert!(outcome.success());
        assert!(outcome.output.contains("git version"));

        let init = CommandInvocation::new("git", dir.path()).args(["init", "-q"]);
        runner.run_checked(&init).unwrap();

        let missing = CommandInvocation::new("git", dir.path())
            .args(["rev-parse", "--verify", "refs/heads/no-such-branch"]);
        let outcome = runner.run(&missing).unwrap();
        assert!(!outcome.success());
        assert!(!outcome.output.is_empty());

        let err = runner.run_checked(&missing).unwrap_err();
        assert!(matches!(err, GitError::Execution { .. }));
        assert!(err.to_string().contains("rev-parse"));
    }

    /// # Spawn Failure
    ///
    /// Verifies that a missing program is reported as a spawn error.
    ///
    /// ## Test Scenario
    /// - Runs a program name that does not exist
    ///
    /// ## Expected Outcome
    /// - run() returns GitError::Spawn naming the command
    #[test]
    fn test_process_runner_spawn_error() {
        let dir = TempDir::new().unwrap();
        let inv = CommandInvocation::new("gitnoob-definitely-not-a-binary", dir.path()).arg("x");
        let err = ProcessRunner.run(&inv).unwrap_err();
        match err {
            GitError::Spawn { command, .. } => {
                assert_eq!(command, "gitnoob-definitely-not-a-binary x")
            }
            other => panic!("expected spawn error, got {other:?}"),
        }
    }

    /// # Scripted Runner Queues
    ///
    /// Verifies the scripted double used by orchestrator tests.
    ///
    /// ## Test Scenario
    /// - Scripts two responses for push, none for status
    ///
    /// ## Expected Outcome
    /// - Queue pops in order and the last response repeats
    /// - Unscripted calls succeed and every call is recorded
    #[test]
    fn test_scripted_runner() {
        let runner = testing::ScriptedRunner::new()
            .on(&["push"], vec![testing::fail("rejected"), testing::ok("")]);
        let push = CommandInvocation::new("git", "/r").arg("push");
        let status = CommandInvocation::new("git", "/r").arg("status");

        assert!(!runner.run(&push).unwrap().success());
        assert!(runner.run(&push).unwrap().success());
        assert!(runner.run(&push).unwrap().success());
        assert!(runner.run(&status).unwrap().success());
        assert_eq!(runner.count("push"), 3);
        assert_eq!(runner.calls().len(), 4);
    }
}
