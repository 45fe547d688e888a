//! Configuration management for gitnoob.
//!
//! Values are layered, lowest precedence first:
//! - Built-in defaults
//! - TOML configuration file following the XDG Base Directory layout
//! - Environment variables (`GITNOOB_*`)
//! - Command-line arguments
//!
//! Hosting credentials missing from every layer are looked up in the global
//! git configuration (`github.user` or `user.name`, and `github.token`).
//!
//! ## Example
//!
//! ```rust,no_run
//! use gitnoob::Config;
//!
//! let config = Config::defaults()
//!     .merge(Config::load_from_file().unwrap())
//!     .merge(Config::load_from_env());
//! println!("Pushing to {}", config.remote());
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::DEFAULT_API_URL;
use crate::core::command::CommandRunner;
use crate::error::ConfigError;
use crate::git::Git;
use crate::models::SharedArgs;
use crate::parsed_property::ParsedProperty;

pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_INTEGRATION_BRANCH: &str = "main";
pub const DEFAULT_GIT_PROGRAM: &str = "git";

const ENV_REMOTE: &str = "GITNOOB_REMOTE";
const ENV_INTEGRATION_BRANCH: &str = "GITNOOB_INTEGRATION_BRANCH";
const ENV_GIT_PROGRAM: &str = "GITNOOB_GIT_PROGRAM";
const ENV_API_URL: &str = "GITNOOB_API_URL";
const ENV_GITHUB_USER: &str = "GITNOOB_GITHUB_USER";
const ENV_GITHUB_TOKEN: &str = "GITNOOB_GITHUB_TOKEN";
const ENV_GITHUB_TOKEN_FALLBACK: &str = "GITHUB_TOKEN";

/// On-disk layout of `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    pub remote: Option<String>,
    pub integration_branch: Option<String>,
    pub git_program: Option<String>,
    pub api_url: Option<String>,
    pub github_user: Option<String>,
    pub github_token: Option<String>,
}

/// Application configuration assembled from CLI arguments, environment
/// variables, config file, global git config and defaults.
#[derive(Clone, Default, PartialEq)]
pub struct Config {
    /// Remote used for pull and push.
    pub remote: Option<ParsedProperty<String>>,
    /// Branch the merge sweep merges into.
    pub integration_branch: Option<ParsedProperty<String>>,
    /// Git executable.
    pub git_program: Option<ParsedProperty<String>>,
    /// Hosting API base URL.
    pub api_url: Option<ParsedProperty<String>>,
    /// Hosting account name.
    pub github_user: Option<ParsedProperty<String>>,
    /// Hosting personal access token.
    pub github_token: Option<ParsedProperty<String>>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("remote", &self.remote)
            .field("integration_branch", &self.integration_branch)
            .field("git_program", &self.git_program)
            .field("api_url", &self.api_url)
            .field("github_user", &self.github_user)
            .field(
                "github_token",
                &self.github_token.as_ref().map(|t| t.source_name()),
            )
            .finish()
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn env_value(var: &str) -> Option<ParsedProperty<String>> {
    std::env::var(var)
        .ok()
        .and_then(non_empty)
        .map(|v| ParsedProperty::Env(v, var.to_string()))
}

impl Config {
    /// Built-in defaults. Credentials have none.
    pub fn defaults() -> Self {
        Self {
            remote: Some(ParsedProperty::Default(DEFAULT_REMOTE.to_string())),
            integration_branch: Some(ParsedProperty::Default(
                DEFAULT_INTEGRATION_BRANCH.to_string(),
            )),
            git_program: Some(ParsedProperty::Default(DEFAULT_GIT_PROGRAM.to_string())),
            api_url: Some(ParsedProperty::Default(DEFAULT_API_URL.to_string())),
            github_user: None,
            github_token: None,
        }
    }

    /// Load configuration from the XDG config directory.
    ///
    /// A missing file yields an empty layer.
    #[must_use = "this returns the loaded configuration which should be used"]
    pub fn load_from_file() -> Result<Self, ConfigError> {
        Self::load_from_path(&Self::get_config_path()?)
    }

    /// Load configuration from a specific TOML file.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::FileReadError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let file: ConfigFile = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), "loaded config file");

        let from_file = |value: Option<String>, key: &str| {
            value
                .and_then(non_empty)
                .map(|v| ParsedProperty::File(v, path.to_path_buf(), key.to_string()))
        };
        Ok(Self {
            remote: from_file(file.remote, "remote"),
            integration_branch: from_file(file.integration_branch, "integration_branch"),
            git_program: from_file(file.git_program, "git_program"),
            api_url: from_file(file.api_url, "api_url"),
            github_user: from_file(file.github_user, "github_user"),
            github_token: from_file(file.github_token, "github_token"),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// `GITHUB_TOKEN` is accepted when `GITNOOB_GITHUB_TOKEN` is unset.
    pub fn load_from_env() -> Self {
        Self {
            remote: env_value(ENV_REMOTE),
            integration_branch: env_value(ENV_INTEGRATION_BRANCH),
            git_program: env_value(ENV_GIT_PROGRAM),
            api_url: env_value(ENV_API_URL),
            github_user: env_value(ENV_GITHUB_USER),
            github_token: env_value(ENV_GITHUB_TOKEN)
                .or_else(|| env_value(ENV_GITHUB_TOKEN_FALLBACK)),
        }
    }

    /// Build a Config from shared CLI arguments.
    ///
    /// The token has no flag; it would leak into shell history.
    pub fn from_shared_args(shared: &SharedArgs) -> Self {
        let cli = |value: &Option<String>, flag: &str| {
            value
                .clone()
                .and_then(non_empty)
                .map(|v| ParsedProperty::Cli(v, flag.to_string()))
        };
        Self {
            remote: cli(&shared.remote, "--remote"),
            integration_branch: None,
            git_program: cli(&shared.git_program, "--git"),
            api_url: cli(&shared.api_url, "--api-url"),
            github_user: cli(&shared.github_user, "--github-user"),
            github_token: None,
        }
    }

    /// Reads credentials from the global git configuration.
    ///
    /// The user comes from `github.user`, falling back to `user.name`.
    /// Lookup failures are treated as absent values.
    pub fn detect_from_git_global<R: CommandRunner>(git: &Git<R>) -> Self {
        let lookup = |key: &str| match git.config_global_get(key) {
            Ok(value) => value.map(|v| ParsedProperty::Git(v, key.to_string())),
            Err(e) => {
                debug!(key, error = %e, "global git config lookup failed");
                None
            }
        };
        Self {
            github_user: lookup("github.user").or_else(|| lookup("user.name")),
            github_token: lookup("github.token"),
            ..Self::default()
        }
    }

    /// True when the username or the token is still unset.
    pub fn missing_credentials(&self) -> bool {
        self.github_user.is_none() || self.github_token.is_none()
    }

    /// Fills unset credentials from the global git configuration.
    pub fn with_git_credentials<R: CommandRunner>(self, git: &Git<R>) -> Self {
        if !self.missing_credentials() {
            return self;
        }
        Self::detect_from_git_global(git).merge(self)
    }

    /// Merge this config with another, preferring values from other when they exist
    pub fn merge(self, other: Self) -> Self {
        Self {
            remote: other.remote.or(self.remote),
            integration_branch: other.integration_branch.or(self.integration_branch),
            git_program: other.git_program.or(self.git_program),
            api_url: other.api_url.or(self.api_url),
            github_user: other.github_user.or(self.github_user),
            github_token: other.github_token.or(self.github_token),
        }
    }

    /// Sets the integration branch from a command flag.
    pub fn with_integration_branch(mut self, branch: Option<&str>, flag: &str) -> Self {
        if let Some(branch) = branch.map(str::to_string).and_then(non_empty) {
            self.integration_branch = Some(ParsedProperty::Cli(branch, flag.to_string()));
        }
        self
    }

    /// Checks values that would otherwise fail late with a confusing error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.api_url {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(ConfigError::InvalidValue {
                    field: "api_url".to_string(),
                    message: format!(
                        "'{}' from {} is not an http(s) URL",
                        url,
                        url.describe_source()
                    ),
                });
            }
        }
        if let Some(branch) = &self.integration_branch {
            if branch.starts_with('-') {
                return Err(ConfigError::InvalidValue {
                    field: "integration_branch".to_string(),
                    message: format!("'{}' looks like a flag", branch.value()),
                });
            }
        }
        Ok(())
    }

    pub fn remote(&self) -> &str {
        self.remote.as_deref().map_or(DEFAULT_REMOTE, String::as_str)
    }

    pub fn integration_branch(&self) -> &str {
        self.integration_branch
            .as_deref()
            .map_or(DEFAULT_INTEGRATION_BRANCH, String::as_str)
    }

    pub fn git_program(&self) -> &str {
        self.git_program
            .as_deref()
            .map_or(DEFAULT_GIT_PROGRAM, String::as_str)
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().map_or(DEFAULT_API_URL, String::as_str)
    }

    /// Get the XDG config file path for gitnoob.
    pub fn get_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .ok_or_else(|| ConfigError::MissingRequired {
                field: "home directory".to_string(),
                env_var: "XDG_CONFIG_HOME".to_string(),
            })?;

        Ok(config_dir.join("gitnoob").join("config.toml"))
    }

    /// Create a sample config file for user reference.
    ///
    /// Returns the path and whether a file was written; an existing file is
    /// never overwritten.
    #[must_use = "this operation can fail and the result should be checked"]
    pub fn create_sample_config() -> Result<(PathBuf, bool), ConfigError> {
        let path = Self::get_config_path()?;
        let written = Self::create_sample_config_at(&path)?;
        Ok((path, written))
    }

    pub fn create_sample_config_at(path: &Path) -> Result<bool, ConfigError> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| ConfigError::DirectoryCreationError {
                path: dir.to_path_buf(),
                message: e.to_string(),
            })?;
        }
        fs::write(path, SAMPLE_CONFIG).map_err(|e| ConfigError::DirectoryCreationError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(true)
    }
}

const SAMPLE_CONFIG: &str = r#"# gitnoob configuration file
# Location: $XDG_CONFIG_HOME/gitnoob/config.toml (usually ~/.config/gitnoob/config.toml)
# Every value can be overridden by a GITNOOB_* environment variable or a CLI flag.

# Remote used for pull and push (GITNOOB_REMOTE)
remote = "origin"

# Branch `merge-all` merges into (GITNOOB_INTEGRATION_BRANCH)
integration_branch = "main"

# Git executable (GITNOOB_GIT_PROGRAM)
git_program = "git"

# Hosting API base URL (GITNOOB_API_URL)
api_url = "https://api.github.com"

# Hosting account (GITNOOB_GITHUB_USER). Falls back to `git config --global github.user`,
# then `user.name`.
# github_user = "your-name"

# Personal access token (GITNOOB_GITHUB_TOKEN or GITHUB_TOKEN). Prefer the environment
# or `git config --global github.token <token>` over storing it here.
# github_token = "ghp_..."
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::command::testing::{ScriptedRunner, fail, ok};
    use serial_test::file_serial;
    use std::env;
    use tempfile::TempDir;

    const ALL_ENV: [&str; 7] = [
        ENV_REMOTE,
        ENV_INTEGRATION_BRANCH,
        ENV_GIT_PROGRAM,
        ENV_API_URL,
        ENV_GITHUB_USER,
        ENV_GITHUB_TOKEN,
        ENV_GITHUB_TOKEN_FALLBACK,
    ];

    fn clear_env() {
        for var in ALL_ENV {
            unsafe { env::remove_var(var) };
        }
    }

    /// # Config Defaults
    ///
    /// Verifies the built-in defaults and accessor fallbacks.
    ///
    /// ## Test Scenario
    /// - Builds defaults and an empty config
    ///
    /// ## Expected Outcome
    /// - Defaults carry the Default source; accessors fall back on empty config
    #[test]
    fn test_config_defaults() {
        let config = Config::defaults();
        assert_eq!(config.remote(), "origin");
        assert_eq!(config.integration_branch(), "main");
        assert_eq!(config.api_url(), "https://api.github.com");
        assert_eq!(config.remote.as_ref().unwrap().source_name(), "default");
        assert!(config.missing_credentials());

        let empty = Config::default();
        assert_eq!(empty.git_program(), "git");
    }

    /// # Load From Environment
    ///
    /// Verifies every GITNOOB_* variable is read and tagged.
    ///
    /// ## Test Scenario
    /// - Sets all variables
    ///
    /// ## Expected Outcome
    /// - Values and Env sources match
    #[test]
    #[file_serial(env_tests)]
    fn test_load_from_env_all_variables() {
        clear_env();
        unsafe {
            env::set_var(ENV_REMOTE, "upstream");
            env::set_var(ENV_INTEGRATION_BRANCH, "develop");
            env::set_var(ENV_GIT_PROGRAM, "/usr/bin/git");
            env::set_var(ENV_API_URL, "https://ghe.example.test/api/v3");
            env::set_var(ENV_GITHUB_USER, "octo");
            env::set_var(ENV_GITHUB_TOKEN, "env-token");
        }

        let config = Config::load_from_env();
        clear_env();

        assert_eq!(config.remote(), "upstream");
        assert_eq!(config.integration_branch(), "develop");
        assert_eq!(config.git_program(), "/usr/bin/git");
        assert_eq!(config.api_url(), "https://ghe.example.test/api/v3");
        assert_eq!(
            config.github_user,
            Some(ParsedProperty::Env("octo".to_string(), ENV_GITHUB_USER.to_string()))
        );
        assert_eq!(config.github_token.as_deref().map(String::as_str), Some("env-token"));
    }

    /// # GITHUB_TOKEN Fallback
    ///
    /// Verifies the generic token variable is used only as a fallback.
    ///
    /// ## Test Scenario
    /// - GITHUB_TOKEN alone, then both variables
    ///
    /// ## Expected Outcome
    /// - Fallback used alone; GITNOOB_GITHUB_TOKEN wins when both are set
    #[test]
    #[file_serial(env_tests)]
    fn test_github_token_fallback() {
        clear_env();
        unsafe { env::set_var(ENV_GITHUB_TOKEN_FALLBACK, "generic") };
        let config = Config::load_from_env();
        assert_eq!(
            config.github_token.as_ref().map(|t| t.describe_source()),
            Some("env GITHUB_TOKEN".to_string())
        );

        unsafe { env::set_var(ENV_GITHUB_TOKEN, "specific") };
        let config = Config::load_from_env();
        clear_env();
        assert_eq!(config.github_token.as_deref().map(String::as_str), Some("specific"));
    }

    /// # Empty Environment
    ///
    /// Verifies unset and blank variables produce no values.
    ///
    /// ## Test Scenario
    /// - Clears everything, sets one variable to whitespace
    ///
    /// ## Expected Outcome
    /// - Every field is None
    #[test]
    #[file_serial(env_tests)]
    fn test_load_from_env_no_variables() {
        clear_env();
        unsafe { env::set_var(ENV_REMOTE, "   ") };
        let config = Config::load_from_env();
        clear_env();
        assert_eq!(config, Config::default());
    }

    /// # Load From File
    ///
    /// Verifies TOML parsing and source tracking.
    ///
    /// ## Test Scenario
    /// - Writes a config file with several keys
    ///
    /// ## Expected Outcome
    /// - Values loaded with File sources naming the key
    #[test]
    fn test_load_from_path_valid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "remote = \"fork\"\nintegration_branch = \"trunk\"\ngithub_user = \"octo\"\n",
        )
        .unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.remote(), "fork");
        assert_eq!(config.integration_branch(), "trunk");
        assert!(config.api_url.is_none());
        assert_eq!(
            config.github_user.unwrap().describe_source(),
            format!("{} (github_user)", path.display())
        );
    }

    /// # Invalid File
    ///
    /// Verifies parse errors and unknown keys are reported.
    ///
    /// ## Test Scenario
    /// - Broken TOML, then an unknown key
    ///
    /// ## Expected Outcome
    /// - ConfigError::ParseError both times; missing file is an empty layer
    #[test]
    fn test_load_from_path_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        fs::write(&path, "remote = ").unwrap();
        assert!(matches!(
            Config::load_from_path(&path),
            Err(ConfigError::ParseError { .. })
        ));

        fs::write(&path, "organization = \"x\"\n").unwrap();
        assert!(matches!(
            Config::load_from_path(&path),
            Err(ConfigError::ParseError { .. })
        ));

        let missing = Config::load_from_path(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(missing, Config::default());
    }

    /// # Layer Precedence
    ///
    /// Verifies defaults < file < env < CLI.
    ///
    /// ## Test Scenario
    /// - Each layer sets remote; some layers set other fields
    ///
    /// ## Expected Outcome
    /// - Highest layer wins per field; lower layers fill gaps
    #[test]
    fn test_config_merge_precedence() {
        let file = Config {
            remote: Some(ParsedProperty::File("file".into(), PathBuf::from("/c"), "remote".into())),
            integration_branch: Some(ParsedProperty::File(
                "trunk".into(),
                PathBuf::from("/c"),
                "integration_branch".into(),
            )),
            ..Config::default()
        };
        let env = Config {
            remote: Some(ParsedProperty::Env("env".into(), ENV_REMOTE.into())),
            ..Config::default()
        };
        let shared = SharedArgs {
            remote: Some("cli".to_string()),
            ..SharedArgs::default()
        };

        let config = Config::defaults()
            .merge(file)
            .merge(env)
            .merge(Config::from_shared_args(&shared));

        assert_eq!(config.remote(), "cli");
        assert_eq!(config.remote.as_ref().unwrap().source_name(), "cli");
        assert_eq!(config.integration_branch(), "trunk");
        assert_eq!(config.git_program(), "git");
    }

    /// # Git Global Credentials
    ///
    /// Verifies the credential fallback order.
    ///
    /// ## Test Scenario
    /// - github.user unset, user.name and github.token set
    ///
    /// ## Expected Outcome
    /// - User from user.name, token from github.token, Git sources
    #[test]
    fn test_detect_from_git_global() {
        let runner = ScriptedRunner::new()
            .on(&["config", "--global", "--get", "github.user"], vec![fail("")])
            .on(&["config", "--global", "--get", "user.name"], vec![ok("Octo Cat\n")])
            .on(&["config", "--global", "--get", "github.token"], vec![ok("ghp_x\n")]);
        let git = Git::new(&runner, "/repo");

        let config = Config::detect_from_git_global(&git);
        assert_eq!(
            config.github_user,
            Some(ParsedProperty::Git("Octo Cat".to_string(), "user.name".to_string()))
        );
        assert_eq!(config.github_token.as_deref().map(String::as_str), Some("ghp_x"));
    }

    /// # Credentials Already Present
    ///
    /// Verifies git is not consulted when both credentials are set.
    ///
    /// ## Test Scenario
    /// - Config with user and token, then with_git_credentials
    ///
    /// ## Expected Outcome
    /// - No git invocation, values unchanged
    #[test]
    fn test_with_git_credentials_skips_lookup() {
        let runner = ScriptedRunner::new();
        let git = Git::new(&runner, "/repo");
        let config = Config {
            github_user: Some(ParsedProperty::Env("a".into(), ENV_GITHUB_USER.into())),
            github_token: Some(ParsedProperty::Env("b".into(), ENV_GITHUB_TOKEN.into())),
            ..Config::default()
        };

        let resolved = config.clone().with_git_credentials(&git);
        assert_eq!(resolved, config);
        assert!(runner.calls().is_empty());
    }

    /// # Validation
    ///
    /// Verifies API URL and branch checks.
    ///
    /// ## Test Scenario
    /// - ftp:// URL, branch starting with '-', defaults
    ///
    /// ## Expected Outcome
    /// - InvalidValue for the first two, defaults pass
    #[test]
    fn test_validate() {
        let bad_url = Config {
            api_url: Some(ParsedProperty::Env("ftp://x".into(), ENV_API_URL.into())),
            ..Config::defaults()
        };
        assert!(matches!(bad_url.validate(), Err(ConfigError::InvalidValue { .. })));

        let bad_branch = Config::defaults().with_integration_branch(Some("--force"), "--into");
        assert!(matches!(bad_branch.validate(), Err(ConfigError::InvalidValue { .. })));

        assert!(Config::defaults().validate().is_ok());
    }

    /// # Sample Config
    ///
    /// Verifies the sample is written once and parses.
    ///
    /// ## Test Scenario
    /// - Writes the sample into a nested temp path twice
    ///
    /// ## Expected Outcome
    /// - First call writes, second leaves it; content loads cleanly
    #[test]
    fn test_create_sample_config_at() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gitnoob").join("config.toml");

        assert!(Config::create_sample_config_at(&path).unwrap());
        assert!(!Config::create_sample_config_at(&path).unwrap());

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.remote(), "origin");
        assert!(config.github_token.is_none());
    }

    /// # Config Path
    ///
    /// Verifies XDG_CONFIG_HOME is honored.
    ///
    /// ## Test Scenario
    /// - Sets XDG_CONFIG_HOME to a temp directory
    ///
    /// ## Expected Outcome
    /// - Path is <xdg>/gitnoob/config.toml
    #[test]
    #[file_serial(env_tests)]
    fn test_get_config_path_xdg() {
        let dir = TempDir::new().unwrap();
        let original = env::var("XDG_CONFIG_HOME").ok();
        unsafe { env::set_var("XDG_CONFIG_HOME", dir.path()) };

        let path = Config::get_config_path().unwrap();

        unsafe {
            match original {
                Some(v) => env::set_var("XDG_CONFIG_HOME", v),
                None => env::remove_var("XDG_CONFIG_HOME"),
            }
        }
        assert_eq!(path, dir.path().join("gitnoob").join("config.toml"));
    }

    /// # Debug Redaction
    ///
    /// Verifies the token value never appears in Debug output.
    ///
    /// ## Test Scenario
    /// - Formats a config holding a token
    ///
    /// ## Expected Outcome
    /// - Only the token's source is printed
    #[test]
    fn test_debug_redacts_token() {
        let config = Config {
            github_token: Some(ParsedProperty::Env("ghp_secret".into(), ENV_GITHUB_TOKEN.into())),
            ..Config::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("ghp_secret"));
        assert!(debug.contains("env"));
    }
}
