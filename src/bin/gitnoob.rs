use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::{CommandFactory, Parser};
use dialoguer::{Confirm, Input};
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

use gitnoob::{
    Args, Commands, Config, GitHubClient, HostingCredential, HostingOperations,
    core::{
        ExitCode,
        branch_name::{self, BranchName},
        command::ProcessRunner,
        operations::{CommitPushConfig, ScaffoldConfig, default_commit_message},
        runner::{RepoRunner, RunResult, RunnerSettings, WorkflowRunner},
    },
    error::{ApiError, GitnoobError},
    git::{Git, StageMode},
    logging,
    models::{BranchArgs, CommitArgs, PushArgs, RepoCommand, RepoCreateArgs, RepoDeleteArgs},
    parsed_property::ParsedProperty,
};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let argv: Vec<String> = std::env::args().collect();
    let _log_guard = logging::init_logging(logging::parse_early_log_config(&argv));

    let args = Args::parse();

    match run(args).await {
        Ok(result) => {
            debug!(exit_code = result.exit_code.code(), message = ?result.message, "finished");
            result.exit_code.into()
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::GeneralError.into()
        }
    }
}

async fn run(args: Args) -> Result<RunResult> {
    // Handle --create-config flag
    if args.create_config {
        let (path, created) = Config::create_sample_config()?;
        if created {
            println!("Created sample config at {}", path.display());
        } else {
            println!("Config already exists at {}, left unchanged", path.display());
        }
        return Ok(RunResult::success());
    }

    let Some(command) = args.command.map(Commands::normalize) else {
        Args::command().print_help()?;
        return Ok(RunResult::success());
    };

    // Resolve configuration: defaults < config file < environment < CLI
    let mut config = Config::defaults()
        .merge(Config::load_from_file()?)
        .merge(Config::load_from_env())
        .merge(Config::from_shared_args(&args.shared));
    if let Commands::MergeAll(merge) = &command {
        config = config.with_integration_branch(merge.into.as_deref(), "--into");
    }
    config.validate()?;
    debug!(?config, command = command.operation_name(), "resolved configuration");

    let repo_path = match &args.shared.repo {
        Some(path) => path.clone(),
        None => std::env::current_dir().context("cannot determine the current directory")?,
    };
    let settings = RunnerSettings::new(&repo_path, config.remote())
        .with_output(args.shared.output, args.shared.quiet);
    let git = Git::new(ProcessRunner, &repo_path).with_program(config.git_program());

    let result = match command {
        Commands::Branch(branch) => run_workflow(
            WorkflowRunner::new(git, &settings),
            "branch",
            branch.interactive,
            || branch_config(&branch, &config),
        ),
        Commands::Commit(commit) => run_workflow(
            WorkflowRunner::new(git, &settings),
            "commit",
            commit.interactive,
            || commit_config(&commit, &config),
        ),
        Commands::Push(push) => run_workflow(
            WorkflowRunner::new(git, &settings),
            "push",
            push.interactive,
            || push_config(&push, &config),
        ),
        Commands::MergeAll(_) => {
            WorkflowRunner::new(git, &settings).merge_all(config.integration_branch())
        }
        Commands::Repo(repo) => run_repo(repo, config, git, &settings, repo_path).await?,
        legacy => anyhow::bail!("{} was not normalized", legacy.operation_name()),
    };
    Ok(result)
}

async fn run_repo(
    command: RepoCommand,
    config: Config,
    git: Git<ProcessRunner>,
    settings: &RunnerSettings,
    parent: PathBuf,
) -> Result<RunResult> {
    let mut runner = RepoRunner::new(settings);

    match command {
        RepoCommand::Create(create) => {
            let name = repo_name(&create)?;
            let scaffold = ScaffoldConfig::new(name, parent).with_git_program(config.git_program());
            if create.local_only {
                return Ok(runner
                    .create(ProcessRunner, None::<&GitHubClient>, scaffold, false)
                    .await);
            }
            // Credentials are checked before anything is written to disk.
            let client = match hosting_client(config, &git) {
                Ok(client) => client,
                Err(e) => return Ok(runner.fail("repo-create", &GitnoobError::from(e), None)),
            };
            Ok(runner
                .create(ProcessRunner, Some(&client), scaffold, create.private)
                .await)
        }
        RepoCommand::Delete(delete) => {
            let client = match hosting_client(config, &git) {
                Ok(client) => client,
                Err(e) => return Ok(runner.fail("repo-delete", &GitnoobError::from(e), None)),
            };
            let name = delete_target(&delete)?;
            if !delete.yes && !confirm_delete(client.username(), &name)? {
                eprintln!("Deletion cancelled");
                return Ok(RunResult::success_with_message("Deletion cancelled"));
            }
            Ok(runner.delete(&client, &name).await)
        }
        RepoCommand::List => match hosting_client(config, &git) {
            Ok(client) => Ok(runner.list(&client).await),
            Err(e) => Ok(runner.fail("repo-list", &GitnoobError::from(e), None)),
        },
    }
}

/// Builds the hosting client, filling missing credentials from global git config.
fn hosting_client(config: Config, git: &Git<ProcessRunner>) -> Result<GitHubClient, ApiError> {
    let config = config.with_git_credentials(git);
    let api_url = config.api_url().to_string();
    let credential = HostingCredential::from_parts(
        config.github_user.map(ParsedProperty::into_value),
        config.github_token.map(ParsedProperty::into_value),
    )?;
    GitHubClient::new(api_url, credential)
}

/// Runs a commit/push command, building its configuration only when needed.
fn run_workflow<W: Write>(
    mut runner: WorkflowRunner<ProcessRunner, W>,
    operation: &str,
    interactive: bool,
    build: impl FnOnce() -> Result<CommitPushConfig, GitnoobError>,
) -> RunResult {
    // A clean tree ends the workflow before any prompt is shown.
    if interactive && matches!(runner.git().has_changes(), Ok(false)) {
        return runner.commit_push(operation, CommitPushConfig::new());
    }
    match build() {
        Ok(workflow) => runner.commit_push(operation, workflow),
        Err(e) => runner.fail(operation, &e),
    }
}

fn branch_config(args: &BranchArgs, config: &Config) -> Result<CommitPushConfig, GitnoobError> {
    let message = commit_message(args.message.as_deref(), args.interactive)?;
    let branch = match (&args.name, args.interactive) {
        (Some(name), _) => BranchName::parse(name)?,
        (None, true) => prompt_branch_name(&message)?,
        (None, false) => branch_name::generate(&message, Local::now().naive_local()),
    };
    let push = args.push || (args.interactive && confirm("Push the new branch?")?);

    Ok(CommitPushConfig::new()
        .with_message(message)
        .with_new_branch(branch)
        .with_stage(StageMode::TrackedOnly)
        .with_push(push)
        .with_set_upstream(true)
        .with_remote(config.remote()))
}

fn commit_config(args: &CommitArgs, config: &Config) -> Result<CommitPushConfig, GitnoobError> {
    let message = commit_message(args.message.as_deref(), args.interactive)?;
    let push = args.push || (args.interactive && confirm("Push after committing?")?);
    Ok(CommitPushConfig::new()
        .with_message(message)
        .with_stage(StageMode::TrackedOnly)
        .with_push(push)
        .with_remote(config.remote()))
}

fn push_config(args: &PushArgs, config: &Config) -> Result<CommitPushConfig, GitnoobError> {
    let message = commit_message(args.message.as_deref(), args.interactive)?;
    Ok(CommitPushConfig::new()
        .with_message(message)
        .with_stage(StageMode::All)
        .with_pull_first(args.pull)
        .with_remote(config.remote()))
}

/// The given message, a prompted one, or the timestamped default.
fn commit_message(given: Option<&str>, interactive: bool) -> anyhow::Result<String> {
    let fallback = given
        .map(str::to_string)
        .unwrap_or_else(|| default_commit_message(Utc::now()));
    if !interactive {
        return Ok(fallback);
    }
    Input::<String>::new()
        .with_prompt("Commit message")
        .default(fallback)
        .interact_text()
        .context("failed to read the commit message")
}

fn prompt_branch_name(message: &str) -> anyhow::Result<BranchName> {
    let suggested = branch_name::generate(message, Local::now().naive_local());
    let name = Input::<String>::new()
        .with_prompt("Branch name")
        .default(suggested.into_string())
        .validate_with(|input: &String| -> Result<(), String> {
            BranchName::parse(input).map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()
        .context("failed to read the branch name")?;
    Ok(BranchName::parse(&name)?)
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .context("failed to read confirmation")
}

fn repo_name(args: &RepoCreateArgs) -> anyhow::Result<String> {
    match &args.name {
        Some(name) => Ok(name.clone()),
        None => Input::<String>::new()
            .with_prompt("Repository name")
            .interact_text()
            .context("failed to read the repository name"),
    }
}

fn delete_target(args: &RepoDeleteArgs) -> anyhow::Result<String> {
    match &args.name {
        Some(name) => Ok(name.clone()),
        None => Input::<String>::new()
            .with_prompt("Repository to delete")
            .interact_text()
            .context("failed to read the repository name"),
    }
}

fn confirm_delete(user: &str, name: &str) -> anyhow::Result<bool> {
    Confirm::new()
        .with_prompt(format!("Delete {user}/{name}? This cannot be undone"))
        .default(false)
        .interact()
        .context("failed to read confirmation")
}
