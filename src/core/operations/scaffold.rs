//! Local repository scaffolding.
//!
//! Creates the directory, initializes git, writes a README and `.gitignore`,
//! and records an initial commit. Publishing to a remote is a separate step
//! so the hosting call can sit between the two.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::core::command::CommandRunner;
use crate::core::output::ProgressEvent;
use crate::error::{GitError, GitnoobError};
use crate::git::Git;

/// Branch a new repository starts on.
pub const DEFAULT_INITIAL_BRANCH: &str = "main";

const GITIGNORE: &str = "node_modules/\n.DS_Store\ntarget/\n";

fn readme_contents(name: &str) -> String {
    format!("# {name}\n\nThis is the README file for the {name} repository.\n")
}

/// Commit message of the first commit.
pub fn initial_commit_message(name: &str) -> String {
    format!("Initial commit for {name}")
}

/// Clone URL used when the hosting API did not return one.
pub fn default_remote_url(user: &str, name: &str) -> String {
    format!("https://github.com/{user}/{name}.git")
}

/// Inputs for [`scaffold_local`].
#[derive(Debug, Clone)]
pub struct ScaffoldConfig {
    /// Repository name; also the directory name.
    pub name: String,
    /// Directory the repository is created in.
    pub parent: PathBuf,
    pub initial_branch: String,
    pub git_program: String,
}

impl ScaffoldConfig {
    pub fn new(name: impl Into<String>, parent: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            parent: parent.into(),
            initial_branch: DEFAULT_INITIAL_BRANCH.to_string(),
            git_program: "git".to_string(),
        }
    }

    pub fn with_git_program(mut self, program: impl Into<String>) -> Self {
        self.git_program = program.into();
        self
    }

    pub fn repo_path(&self) -> PathBuf {
        self.parent.join(&self.name)
    }
}

fn validate_repo_name(name: &str) -> Result<(), GitnoobError> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "invalid repository name '{name}': use letters, digits, '-', '_' or '.'"
        )
        .into())
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), GitnoobError> {
    fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))?;
    Ok(())
}

/// Creates and commits a new local repository, returning its git handle.
///
/// Fails if the target directory already exists.
pub fn scaffold_local<R, F>(
    runner: R,
    config: &ScaffoldConfig,
    mut on_event: F,
) -> Result<Git<R>, GitnoobError>
where
    R: CommandRunner,
    F: FnMut(ProgressEvent),
{
    validate_repo_name(&config.name)?;
    let path = config.repo_path();
    if path.exists() {
        return Err(anyhow::anyhow!("{} already exists", path.display()).into());
    }
    fs::create_dir_all(&path)
        .map_err(|e| anyhow::anyhow!("failed to create {}: {e}", path.display()))?;

    let git = Git::new(runner, &path).with_program(config.git_program.clone());
    git.init(&config.initial_branch)?;
    write_file(&path.join("README.md"), &readme_contents(&config.name))?;
    write_file(&path.join(".gitignore"), GITIGNORE)?;
    git.add_paths(&["README.md", ".gitignore"])?;
    git.commit(&initial_commit_message(&config.name))?;

    info!(path = %path.display(), "repository initialized");
    on_event(ProgressEvent::RepoInitialized { path });
    Ok(git)
}

/// Adds `remote` pointing at `url` and pushes the initial branch with upstream.
pub fn publish<R: CommandRunner>(
    git: &Git<R>,
    remote: &str,
    url: &str,
    branch: &str,
) -> Result<(), GitError> {
    git.remote_add(remote, url)?;
    git.push_upstream(remote, branch)?;
    info!(remote, branch, "initial push complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::command::testing::{ScriptedRunner, fail};
    use tempfile::TempDir;

    /// # Existing Directory
    ///
    /// Verifies scaffolding refuses to reuse a directory.
    ///
    /// ## Test Scenario
    /// - Target directory already exists
    ///
    /// ## Expected Outcome
    /// - Error, no git command run
    #[test]
    fn test_scaffold_existing_directory() {
        let parent = TempDir::new().unwrap();
        fs::create_dir(parent.path().join("taken")).unwrap();
        let runner = ScriptedRunner::new();

        let result = scaffold_local(&runner, &ScaffoldConfig::new("taken", parent.path()), |_| {});

        assert!(result.is_err());
        assert!(runner.calls().is_empty());
    }

    /// # Repository Name Validation
    ///
    /// Verifies names that would escape the parent directory are rejected.
    ///
    /// ## Test Scenario
    /// - Tries empty, "..", and a path with a slash
    ///
    /// ## Expected Outcome
    /// - All rejected; a plain name is accepted
    #[test]
    fn test_validate_repo_name() {
        assert!(validate_repo_name("").is_err());
        assert!(validate_repo_name("..").is_err());
        assert!(validate_repo_name("a/b").is_err());
        assert!(validate_repo_name("my-repo_1.rs").is_ok());
    }

    /// # Scripted Scaffold Order
    ///
    /// Verifies the git command sequence.
    ///
    /// ## Test Scenario
    /// - Scaffolds with a scripted runner
    ///
    /// ## Expected Outcome
    /// - init, add, commit in that order with the initial commit message
    #[test]
    fn test_scaffold_command_order() {
        let parent = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();

        scaffold_local(&runner, &ScaffoldConfig::new("demo", parent.path()), |_| {}).unwrap();

        let calls = runner.calls();
        assert_eq!(calls[0], vec!["init", "-b", "main"]);
        assert_eq!(calls[1], vec!["add", "README.md", ".gitignore"]);
        assert_eq!(calls[2], vec!["commit", "-m", "Initial commit for demo"]);
    }

    /// # Publish
    ///
    /// Verifies remote setup and push, and push failure propagation.
    ///
    /// ## Test Scenario
    /// - Publishes with a succeeding and then a failing push
    ///
    /// ## Expected Outcome
    /// - remote add precedes push -u; a rejected push is an Execution error
    #[test]
    fn test_publish() {
        let runner = ScriptedRunner::new();
        let git = Git::new(&runner, "/repo");
        publish(&git, "origin", "https://example.test/u/demo.git", "main").unwrap();
        let calls = runner.calls();
        assert_eq!(
            calls[0],
            vec!["remote", "add", "origin", "https://example.test/u/demo.git"]
        );
        assert_eq!(calls[1], vec!["push", "-u", "origin", "main"]);

        let runner = ScriptedRunner::new().on(&["push"], vec![fail("rejected")]);
        let git = Git::new(&runner, "/repo");
        let err = publish(&git, "origin", "u", "main").unwrap_err();
        assert!(matches!(err, GitError::Execution { .. }));
    }

    /// # URL And Message Helpers
    ///
    /// Verifies the fallback remote URL and commit message.
    ///
    /// ## Test Scenario
    /// - Formats both for a sample user and name
    ///
    /// ## Expected Outcome
    /// - GitHub HTTPS clone URL and "Initial commit for" message
    #[test]
    fn test_helpers() {
        assert_eq!(
            default_remote_url("octo", "demo"),
            "https://github.com/octo/demo.git"
        );
        assert_eq!(initial_commit_message("demo"), "Initial commit for demo");
    }
}
