//! Runner for the repository commands: create, delete and list.

use std::io::{self, Write};

use tracing::{info, warn};

use crate::api::HostingOperations;
use crate::core::command::CommandRunner;
use crate::core::operations::{ScaffoldConfig, default_remote_url, publish, scaffold_local};
use crate::core::output::{OutputWriter, ProgressEvent, SummaryInfo, SummaryResult};
use crate::error::GitnoobError;

use super::traits::{RunResult, RunnerSettings};
use super::workflow::{emit, report_failure, write_summary};

/// Runs repository commands against the hosting API and the local disk.
pub struct RepoRunner<W: Write = io::Stdout> {
    output: OutputWriter<W>,
    remote: String,
}

impl RepoRunner<io::Stdout> {
    /// Creates a runner writing to stdout.
    pub fn new(settings: &RunnerSettings) -> Self {
        Self::with_writer(settings, io::stdout())
    }
}

impl<W: Write> RepoRunner<W> {
    /// Creates a runner with a custom writer.
    pub fn with_writer(settings: &RunnerSettings, writer: W) -> Self {
        Self {
            output: OutputWriter::new(writer, settings.output_format, settings.quiet),
            remote: settings.remote.clone(),
        }
    }

    /// Scaffolds a local repository and, with a hosting client, creates the
    /// remote repository and pushes the initial commit to it.
    pub async fn create<R, H>(
        &mut self,
        runner: R,
        hosting: Option<&H>,
        config: ScaffoldConfig,
        private: bool,
    ) -> RunResult
    where
        R: CommandRunner,
        H: HostingOperations + ?Sized,
    {
        let output = &mut self.output;
        let git = match scaffold_local(runner, &config, |event| emit(output, event)) {
            Ok(git) => git,
            Err(e) => return self.fail("repo-create", &e, None),
        };
        let path = config.repo_path();

        let Some(hosting) = hosting else {
            return self.finish(
                "repo-create",
                RunResult::success_with_message(format!(
                    "Created local repository at {}",
                    path.display()
                )),
            );
        };

        let created = match hosting.create_repository(&config.name, private).await {
            Ok(repo) => repo,
            Err(e) => {
                let hint = format!("local repository kept at {}", path.display());
                return self.fail("repo-create", &GitnoobError::from(e), Some(hint));
            }
        };
        info!(name = %created.name, "hosting repository created");
        emit(
            &mut self.output,
            ProgressEvent::RepoCreated {
                name: created.name.clone(),
                url: created.html_url.clone(),
            },
        );

        let url = created
            .clone_url
            .clone()
            .unwrap_or_else(|| default_remote_url(hosting.username(), &config.name));
        if let Err(e) = publish(&git, &self.remote, &url, &config.initial_branch) {
            warn!(error = %e, "initial push failed");
            let hint = format!("{} exists on the host but the initial push failed", config.name);
            return self.fail("repo-create", &GitnoobError::from(e), Some(hint));
        }

        self.finish(
            "repo-create",
            RunResult::success_with_message(format!(
                "Created {} and pushed {} to {}",
                config.name, config.initial_branch, url
            )),
        )
    }

    /// Deletes the named repository of the authenticated user.
    pub async fn delete<H>(&mut self, hosting: &H, name: &str) -> RunResult
    where
        H: HostingOperations + ?Sized,
    {
        if let Err(e) = hosting.delete_repository(name).await {
            return self.fail("repo-delete", &GitnoobError::from(e), None);
        }
        info!(name, "hosting repository deleted");
        emit(
            &mut self.output,
            ProgressEvent::RepoDeleted {
                name: name.to_string(),
            },
        );
        self.finish(
            "repo-delete",
            RunResult::success_with_message(format!(
                "Deleted {}/{}",
                hosting.username(),
                name
            )),
        )
    }

    /// Lists repositories of the authenticated user.
    pub async fn list<H>(&mut self, hosting: &H) -> RunResult
    where
        H: HostingOperations + ?Sized,
    {
        let repos = match hosting.list_repositories().await {
            Ok(repos) => repos,
            Err(e) => return self.fail("repo-list", &GitnoobError::from(e), None),
        };
        for repo in &repos {
            emit(
                &mut self.output,
                ProgressEvent::RepoListed {
                    name: repo.name.clone(),
                    private: repo.private,
                },
            );
        }
        let result = if repos.is_empty() {
            RunResult::success_with_message(format!("{} has no repositories", hosting.username()))
        } else {
            RunResult::success_with_message(format!("{} repositories", repos.len()))
        };
        self.finish("repo-list", result)
    }

    fn finish(&mut self, operation: &str, result: RunResult) -> RunResult {
        let mut summary = SummaryInfo::new(operation, SummaryResult::Success);
        summary.message = result.message.clone();
        write_summary(&mut self.output, &summary);
        result
    }

    /// Emits an error event and a failed summary for `operation`.
    pub fn fail(
        &mut self,
        operation: &str,
        error: &GitnoobError,
        hint: Option<String>,
    ) -> RunResult {
        report_failure(&mut self.output, operation, error, hint)
    }
}
