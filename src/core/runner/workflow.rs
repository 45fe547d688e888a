//! Runner for the local git workflows: commit/push and the merge sweep.
//!
//! Ties an operation to an [`OutputWriter`] and maps the outcome to an exit
//! code and a final summary.

use std::io::{self, Write};

use crate::core::ExitCode;
use crate::core::command::CommandRunner;
use crate::core::operations::{
    CommitPushConfig, CommitPushOperation, MergeAllOperation, WorkflowState,
};
use crate::core::output::{OutputFormatter, OutputWriter, ProgressEvent, SummaryInfo, SummaryResult};
use crate::error::GitnoobError;
use crate::git::Git;

use super::traits::{RunResult, RunnerSettings, exit_code_for, exit_code_for_git};

/// Runs git workflows against one repository.
pub struct WorkflowRunner<R, W: Write = io::Stdout> {
    git: Git<R>,
    output: OutputWriter<W>,
}

impl<R: CommandRunner> WorkflowRunner<R, io::Stdout> {
    /// Creates a runner writing to stdout.
    pub fn new(git: Git<R>, settings: &RunnerSettings) -> Self {
        Self::with_writer(git, settings, io::stdout())
    }
}

impl<R: CommandRunner, W: Write> WorkflowRunner<R, W> {
    /// Creates a runner with a custom writer.
    pub fn with_writer(git: Git<R>, settings: &RunnerSettings, writer: W) -> Self {
        let output = OutputWriter::new(writer, settings.output_format, settings.quiet);
        Self { git, output }
    }

    pub fn git(&self) -> &Git<R> {
        &self.git
    }

    /// Runs the commit/push workflow under the given operation name.
    pub fn commit_push(&mut self, operation: &str, config: CommitPushConfig) -> RunResult {
        let git = &self.git;
        let output = &mut self.output;
        let result = CommitPushOperation::new(git, config).run(|event| emit(output, event));

        let mut summary = SummaryInfo::new(operation, SummaryResult::Success);
        summary.workflow = Some(result.summary());

        let run_result = match (&result.state, &result.error) {
            (WorkflowState::Clean, _) => {
                summary.result = SummaryResult::NothingToDo;
                RunResult::success_with_message("Nothing to commit")
            }
            (_, Some(error)) => {
                summary.result = SummaryResult::Failed;
                emit_error(&mut self.output, &error.to_string());
                let code = exit_code_for_git(error);
                let hint = if code == ExitCode::Conflict {
                    "; resolve the conflict and push manually"
                } else {
                    ""
                };
                RunResult::error(code, format!("{error}{hint}"))
            }
            (WorkflowState::Pushed, None) => {
                let retry = if result.retry_used { " after rebase" } else { "" };
                RunResult::success_with_message(format!("Committed and pushed{retry}"))
            }
            _ => RunResult::success_with_message("Committed"),
        };

        if let Some(message) = &run_result.message {
            summary.message = Some(message.clone());
        }
        write_summary(&mut self.output, &summary);
        run_result
    }

    /// Merges every local branch into `integration_branch`.
    pub fn merge_all(&mut self, integration_branch: &str) -> RunResult {
        let git = &self.git;
        let output = &mut self.output;
        let report = match MergeAllOperation::new(git).merge_all(integration_branch, |event| {
            emit(output, event)
        }) {
            Ok(report) => report,
            Err(e) => return self.fail("merge-all", &GitnoobError::from(e)),
        };

        let (result, run_result) = if report.outcomes.is_empty() {
            (
                SummaryResult::NothingToDo,
                RunResult::success_with_message(format!(
                    "No branches to merge into {integration_branch}"
                )),
            )
        } else if report.all_merged() {
            (
                SummaryResult::Success,
                RunResult::success_with_message(format!(
                    "Merged {} branches into {integration_branch}",
                    report.merged_count()
                )),
            )
        } else {
            (
                SummaryResult::PartialSuccess,
                RunResult::partial_success(format!(
                    "{} merged, {} conflicts, {} failed",
                    report.merged_count(),
                    report.conflict_count(),
                    report.failed_count()
                )),
            )
        };

        let mut summary = SummaryInfo::new("merge-all", result);
        summary.integration_branch = Some(report.integration_branch.clone());
        summary.counts = Some(report.counts());
        summary.items = Some(report.items());
        summary.message = run_result.message.clone();
        write_summary(&mut self.output, &summary);
        run_result
    }

    /// Reports an error raised before an operation could start.
    pub fn fail(&mut self, operation: &str, error: &GitnoobError) -> RunResult {
        report_failure(&mut self.output, operation, error, None)
    }
}

pub(crate) fn emit<W: Write>(output: &mut OutputWriter<W>, event: ProgressEvent) {
    if let Err(e) = output.write_event(&event) {
        eprintln!("Warning: Failed to write event: {}", e);
    }
}

pub(crate) fn emit_error<W: Write>(output: &mut OutputWriter<W>, message: &str) {
    let event = ProgressEvent::Error {
        message: message.to_string(),
        code: None,
    };
    if let Err(e) = output.write_event(&event) {
        eprintln!("Warning: Failed to write error: {}", e);
    }
}

/// Emits an error event and a failed summary, returning the mapped result.
pub(crate) fn report_failure<W: Write>(
    output: &mut OutputWriter<W>,
    operation: &str,
    error: &GitnoobError,
    hint: Option<String>,
) -> RunResult {
    emit_error(output, &error.to_string());
    let message = match hint {
        Some(hint) => format!("{error} ({hint})"),
        None => error.to_string(),
    };
    let summary = SummaryInfo::new(operation, SummaryResult::Failed).with_message(&message);
    write_summary(output, &summary);
    RunResult::error(exit_code_for(error), message)
}

pub(crate) fn write_summary<W: Write>(output: &mut OutputWriter<W>, summary: &SummaryInfo) {
    if let Err(e) = output.write_summary(summary).and_then(|_| output.flush()) {
        eprintln!("Warning: Failed to write summary: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::command::testing::{ScriptedRunner, fail, ok};
    use crate::git::StageMode;
    use crate::models::OutputFormat;

    fn settings(format: OutputFormat) -> RunnerSettings {
        RunnerSettings::new("/repo", "origin").with_output(format, false)
    }

    fn dirty(runner: ScriptedRunner) -> ScriptedRunner {
        runner
            .on(&["status"], vec![ok(" M a.txt\n")])
            .on(&["branch", "--show-current"], vec![ok("main\n")])
            .on(&["rev-parse"], vec![ok("0123456789abcdef\n")])
    }

    /// # Clean Tree
    ///
    /// Verifies a clean tree exits successfully with nothing to do.
    ///
    /// ## Test Scenario
    /// - status reports nothing
    ///
    /// ## Expected Outcome
    /// - Exit 0, text output mentions nothing to commit
    #[test]
    fn test_commit_push_clean_tree() {
        let runner = ScriptedRunner::new().on(&["status"], vec![ok("")]);
        let mut buffer = Vec::new();
        let result = WorkflowRunner::with_writer(
            Git::new(&runner, "/repo"),
            &settings(OutputFormat::Text),
            &mut buffer,
        )
        .commit_push("push", CommitPushConfig::new());

        assert!(result.is_success());
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("Nothing to commit"));
    }

    /// # Push With Retry, JSON
    ///
    /// Verifies the JSON document after a retried push.
    ///
    /// ## Test Scenario
    /// - First push rejected, rebase and second push succeed
    ///
    /// ## Expected Outcome
    /// - Exit 0; summary.workflow.retry_used is true; events include push_rejected
    #[test]
    fn test_commit_push_retry_json() {
        let runner = dirty(ScriptedRunner::new())
            .on(&["push"], vec![fail("! [rejected] (fetch first)"), ok("")]);
        let mut buffer = Vec::new();
        let result = WorkflowRunner::with_writer(
            Git::new(&runner, "/repo"),
            &settings(OutputFormat::Json),
            &mut buffer,
        )
        .commit_push("push", CommitPushConfig::new().with_message("sync"));

        assert!(result.is_success());
        let json: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(json["summary"]["result"], "success");
        assert_eq!(json["summary"]["workflow"]["retry_used"], true);
        let events = json["events"].as_array().unwrap();
        assert!(events.iter().any(|e| e["event"] == "push_rejected"));
    }

    /// # Rebase Conflict Exit Code
    ///
    /// Verifies a conflicting rebase maps to the conflict exit code.
    ///
    /// ## Test Scenario
    /// - Push rejected, pull --rebase reports CONFLICT
    ///
    /// ## Expected Outcome
    /// - Exit code 2 with a hint to finish by hand
    #[test]
    fn test_commit_push_rebase_conflict() {
        let runner = dirty(ScriptedRunner::new())
            .on(&["push"], vec![fail("rejected")])
            .on(
                &["pull", "--rebase"],
                vec![fail("CONFLICT (content): Merge conflict in a.txt")],
            );
        let mut buffer = Vec::new();
        let result = WorkflowRunner::with_writer(
            Git::new(&runner, "/repo"),
            &settings(OutputFormat::Text),
            &mut buffer,
        )
        .commit_push("push", CommitPushConfig::new());

        assert_eq!(result.exit_code, ExitCode::Conflict);
        let message = result.message.unwrap();
        assert!(message.contains("'main' stopped on conflicts"));
        assert!(message.ends_with("resolve the conflict and push manually"));
    }

    /// # Commit Only
    ///
    /// Verifies the tracked-only commit without push.
    ///
    /// ## Test Scenario
    /// - Commit with push disabled, NDJSON output
    ///
    /// ## Expected Outcome
    /// - Exit 0; last NDJSON line is the summary with pushed false
    #[test]
    fn test_commit_only_ndjson() {
        let runner = dirty(ScriptedRunner::new());
        let mut buffer = Vec::new();
        let result = WorkflowRunner::with_writer(
            Git::new(&runner, "/repo"),
            &settings(OutputFormat::Ndjson),
            &mut buffer,
        )
        .commit_push(
            "commit",
            CommitPushConfig::new()
                .with_stage(StageMode::TrackedOnly)
                .with_push(false),
        );

        assert!(result.is_success());
        assert_eq!(runner.count("push"), 0);
        let text = String::from_utf8(buffer).unwrap();
        let last: serde_json::Value =
            serde_json::from_str(text.lines().last().unwrap()).unwrap();
        assert_eq!(last["operation"], "commit");
        assert_eq!(last["workflow"]["pushed"], false);
    }

    /// # Merge Sweep Partial Success
    ///
    /// Verifies a sweep with a conflict exits with the partial-success code.
    ///
    /// ## Test Scenario
    /// - Two branches, second conflicts
    ///
    /// ## Expected Outcome
    /// - Exit 3; text banner lists the conflicting branch
    #[test]
    fn test_merge_all_partial_success() {
        let runner = ScriptedRunner::new()
            .on(&["for-each-ref"], vec![ok("a\nb\nmain\n")])
            .on(&["merge", "--abort"], vec![ok("")])
            .on(
                &["merge", "--no-ff"],
                vec![ok(""), fail("CONFLICT (content): Merge conflict in f")],
            );
        let mut buffer = Vec::new();
        let result = WorkflowRunner::with_writer(
            Git::new(&runner, "/repo"),
            &settings(OutputFormat::Text),
            &mut buffer,
        )
        .merge_all("main");

        assert_eq!(result.exit_code, ExitCode::PartialSuccess);
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("PARTIAL SUCCESS"));
        assert!(text.contains("Needs attention"));
    }

    /// # Merge Sweep Fatal Checkout
    ///
    /// Verifies a missing integration branch is a general error.
    ///
    /// ## Test Scenario
    /// - checkout fails
    ///
    /// ## Expected Outcome
    /// - Exit 1 with the git message
    #[test]
    fn test_merge_all_checkout_failure() {
        let runner = ScriptedRunner::new()
            .on(&["for-each-ref"], vec![ok("a\n")])
            .on(&["checkout"], vec![fail("pathspec 'trunk' did not match")]);
        let mut buffer = Vec::new();
        let result = WorkflowRunner::with_writer(
            Git::new(&runner, "/repo"),
            &settings(OutputFormat::Text),
            &mut buffer,
        )
        .merge_all("trunk");

        assert_eq!(result.exit_code, ExitCode::GeneralError);
        assert!(result.message.unwrap().contains("did not match"));
    }

    /// # Merge Sweep Nothing To Do
    ///
    /// Verifies a repository with only the integration branch.
    ///
    /// ## Test Scenario
    /// - Listing has only main
    ///
    /// ## Expected Outcome
    /// - Exit 0 with a no-branches message
    #[test]
    fn test_merge_all_nothing_to_do() {
        let runner = ScriptedRunner::new().on(&["for-each-ref"], vec![ok("main\n")]);
        let mut buffer = Vec::new();
        let result = WorkflowRunner::with_writer(
            Git::new(&runner, "/repo"),
            &settings(OutputFormat::Text),
            &mut buffer,
        )
        .merge_all("main");

        assert!(result.is_success());
        assert!(result.message.unwrap().contains("No branches"));
    }
}
