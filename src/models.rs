//! Command-line surface of the `gitnoob` binary.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

/// Options accepted by every subcommand.
#[derive(ClapArgs, Clone, Default, Debug)]
pub struct SharedArgs {
    /// Repository to operate on (defaults to the current directory)
    #[arg(short = 'C', long = "repo", global = true, value_name = "PATH", help_heading = "Repository")]
    pub repo: Option<PathBuf>,

    /// Remote used for pull and push
    #[arg(long, global = true, help_heading = "Repository")]
    pub remote: Option<String>,

    /// Git executable to run
    #[arg(long = "git", global = true, value_name = "PROGRAM", help_heading = "Repository")]
    pub git_program: Option<String>,

    /// Hosting API base URL
    #[arg(long, global = true, value_name = "URL", help_heading = "Hosting")]
    pub api_url: Option<String>,

    /// Hosting account name
    #[arg(long, global = true, value_name = "USER", help_heading = "Hosting")]
    pub github_user: Option<String>,

    /// Show debug diagnostics (same as --log-level debug)
    #[arg(short, long, global = true, help_heading = "Output Options")]
    pub verbose: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true, help_heading = "Output Options")]
    pub output: OutputFormat,

    /// Only print problems
    #[arg(short, long, global = true, help_heading = "Output Options")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, value_name = "LEVEL", help_heading = "Logging")]
    pub log_level: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH", help_heading = "Logging")]
    pub log_file: Option<PathBuf>,

    /// Log format (text, json)
    #[arg(long, global = true, value_name = "FORMAT", help_heading = "Logging")]
    pub log_format: Option<String>,
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON summary at the end.
    Json,
    /// Newline-delimited JSON (one event per line).
    Ndjson,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Ndjson => write!(f, "ndjson"),
        }
    }
}

/// Arguments for `branch`.
#[derive(ClapArgs, Clone, Debug, Default)]
pub struct BranchArgs {
    /// Commit message; also the source of the branch name
    #[arg(short, long)]
    pub message: Option<String>,

    /// Branch name to use instead of a generated one
    #[arg(long)]
    pub name: Option<String>,

    /// Push the new branch and set its upstream
    #[arg(short, long)]
    pub push: bool,

    /// Prompt for the message, branch name and push confirmation
    #[arg(short, long)]
    pub interactive: bool,
}

/// Arguments for `commit`.
#[derive(ClapArgs, Clone, Debug, Default)]
pub struct CommitArgs {
    /// Commit message (defaults to a timestamped message)
    #[arg(short, long)]
    pub message: Option<String>,

    /// Push after committing
    #[arg(short, long)]
    pub push: bool,

    /// Prompt for the message and push confirmation
    #[arg(short, long)]
    pub interactive: bool,
}

/// Arguments for `push`.
#[derive(ClapArgs, Clone, Debug, Default)]
pub struct PushArgs {
    /// Commit message (defaults to a timestamped message)
    #[arg(short, long)]
    pub message: Option<String>,

    /// Pull the current branch before staging
    #[arg(long)]
    pub pull: bool,

    /// Prompt for the commit message
    #[arg(short, long)]
    pub interactive: bool,
}

/// Arguments for `merge-all`.
#[derive(ClapArgs, Clone, Debug, Default)]
pub struct MergeAllArgs {
    /// Branch every other local branch is merged into
    #[arg(long, value_name = "BRANCH")]
    pub into: Option<String>,
}

/// Arguments for `repo create`.
#[derive(ClapArgs, Clone, Debug, Default)]
pub struct RepoCreateArgs {
    /// Repository name (prompted for when omitted)
    pub name: Option<String>,

    /// Create the hosted repository as private
    #[arg(long)]
    pub private: bool,

    /// Only scaffold locally; skip the hosting API and push
    #[arg(long)]
    pub local_only: bool,
}

/// Arguments for `repo delete`.
#[derive(ClapArgs, Clone, Debug, Default)]
pub struct RepoDeleteArgs {
    /// Repository name (prompted for when omitted)
    pub name: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Hosted repository management.
#[derive(Subcommand, Clone, Debug)]
pub enum RepoCommand {
    /// Scaffold a local repository and publish it
    #[command(visible_alias = "new")]
    Create(RepoCreateArgs),

    /// Delete a hosted repository
    #[command(visible_alias = "rm")]
    Delete(RepoDeleteArgs),

    /// List repositories of the configured account
    #[command(visible_alias = "ls")]
    List,
}

/// Available commands
#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Commit on a new timestamped branch
    #[command(
        visible_alias = "autobranch",
        long_about = "Create a branch named after the commit message, commit tracked changes on it,\n\
            and optionally push it with an upstream.\n\n\
            The branch name is the message lower-cased, with every character outside\n\
            [a-z0-9] replaced by '-', trimmed, cut to 50 characters, and suffixed with\n\
            -YYYYMMDD-HHMMSS.",
        after_help = "EXAMPLES:\n    \
            # Branch fix-login-bug-20240309-140507 with one commit\n    \
            gitnoob branch -m \"Fix login bug\"\n\n    \
            # Same, then push with upstream\n    \
            gitnoob autobranch -m \"Fix login bug\" -p"
    )]
    Branch(BranchArgs),

    /// Commit tracked changes, optionally push
    #[command(
        visible_alias = "autocommit",
        after_help = "EXAMPLES:\n    \
            gitnoob commit -m \"wip\"\n    \
            gitnoob autocommit -p"
    )]
    Commit(CommitArgs),

    /// Stage everything, commit and push, rebasing once if rejected
    #[command(
        visible_alias = "lazypush",
        long_about = "Stage all changes, commit, and push the current branch.\n\n\
            If the push is rejected, gitnoob runs `git pull --rebase` once and pushes\n\
            again. A second rejection is reported and left for manual resolution.",
        after_help = "EXAMPLES:\n    \
            gitnoob push\n    \
            gitnoob lazypush --pull -m \"sync notes\""
    )]
    Push(PushArgs),

    /// Merge every local branch into an integration branch
    #[command(
        visible_alias = "automerge",
        long_about = "Check out the integration branch and merge each other local branch into it\n\
            with --no-ff. Conflicting merges are aborted and reported; the sweep continues.\n\n\
            Exit code 3 means some branches conflicted or failed.",
        after_help = "EXAMPLES:\n    \
            gitnoob merge-all\n    \
            gitnoob automerge --into develop --output json"
    )]
    MergeAll(MergeAllArgs),

    /// Create, delete or list hosted repositories
    #[command(subcommand)]
    Repo(RepoCommand),

    /// Scaffold and publish a new repository (same as `repo create`)
    #[command(name = "newrepo", hide = true)]
    NewRepo(RepoCreateArgs),

    /// Delete a hosted repository (same as `repo delete`)
    #[command(name = "deleterepo", hide = true)]
    DeleteRepo(RepoDeleteArgs),

    /// List hosted repositories (same as `repo list`)
    #[command(name = "lazyrepo", hide = true)]
    LazyRepo,
}

impl Commands {
    /// Folds the legacy repository commands into `repo`.
    pub fn normalize(self) -> Self {
        match self {
            Commands::NewRepo(args) => Commands::Repo(RepoCommand::Create(args)),
            Commands::DeleteRepo(args) => Commands::Repo(RepoCommand::Delete(args)),
            Commands::LazyRepo => Commands::Repo(RepoCommand::List),
            other => other,
        }
    }

    /// Name used in summaries and JSON output.
    pub fn operation_name(&self) -> &'static str {
        match self {
            Commands::Branch(_) => "branch",
            Commands::Commit(_) => "commit",
            Commands::Push(_) => "push",
            Commands::MergeAll(_) => "merge-all",
            Commands::Repo(RepoCommand::Create(_)) | Commands::NewRepo(_) => "repo-create",
            Commands::Repo(RepoCommand::Delete(_)) | Commands::DeleteRepo(_) => "repo-delete",
            Commands::Repo(RepoCommand::List) | Commands::LazyRepo => "repo-list",
        }
    }
}

#[derive(Parser, Clone, Debug)]
#[command(
    name = "gitnoob",
    author,
    version,
    about = "Automation for everyday git chores",
    long_about = "Automation for everyday git chores.\n\n\
        gitnoob helps you:\n  \
        • Commit on a branch named after the commit message\n  \
        • Commit and push, recovering once from a rejected push\n  \
        • Merge every local branch into an integration branch\n  \
        • Create, delete and list hosted repositories\n\n\
        Configuration can be provided via CLI arguments, environment variables (GITNOOB_*),\n\
        config file (~/.config/gitnoob/config.toml), or global git config (github.user, github.token).",
    after_help = "EXAMPLES:\n    \
        gitnoob push -m \"update docs\"\n    \
        gitnoob merge-all --into main\n    \
        gitnoob repo create my-project\n    \
        gitnoob --create-config"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub shared: SharedArgs,

    /// Create a sample configuration file at ~/.config/gitnoob/config.toml
    #[arg(long)]
    pub create_config: bool,
}
