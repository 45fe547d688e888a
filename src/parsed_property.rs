use std::{fmt::Display, ops::Deref, path::PathBuf};

/// A configuration value that remembers where it came from.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ParsedProperty<T> {
    /// Command line flag (value, flag as typed)
    Cli(T, String),
    /// Environment variable (value, variable name)
    Env(T, String),
    /// Global git configuration (value, config key such as `github.token`)
    Git(T, String),
    /// Configuration file (value, file path, toml key)
    File(T, PathBuf, String),
    /// Built-in default
    Default(T),
}

impl<T> ParsedProperty<T> {
    pub fn value(&self) -> &T {
        match self {
            ParsedProperty::Cli(value, _)
            | ParsedProperty::Env(value, _)
            | ParsedProperty::Git(value, _)
            | ParsedProperty::File(value, _, _)
            | ParsedProperty::Default(value) => value,
        }
    }

    /// Consume the property and return the bare value.
    pub fn into_value(self) -> T {
        match self {
            ParsedProperty::Cli(value, _)
            | ParsedProperty::Env(value, _)
            | ParsedProperty::Git(value, _)
            | ParsedProperty::File(value, _, _)
            | ParsedProperty::Default(value) => value,
        }
    }

    pub fn source_name(&self) -> &'static str {
        match self {
            ParsedProperty::Cli(_, _) => "cli",
            ParsedProperty::Env(_, _) => "env",
            ParsedProperty::Git(_, _) => "git",
            ParsedProperty::File(_, _, _) => "file",
            ParsedProperty::Default(_) => "default",
        }
    }

    /// Human-readable origin, e.g. `env GITNOOB_REMOTE` or `git config github.user`.
    pub fn describe_source(&self) -> String {
        match self {
            ParsedProperty::Cli(_, flag) => format!("cli {flag}"),
            ParsedProperty::Env(_, var) => format!("env {var}"),
            ParsedProperty::Git(_, key) => format!("git config {key}"),
            ParsedProperty::File(_, path, key) => format!("{} ({key})", path.display()),
            ParsedProperty::Default(_) => "default".to_string(),
        }
    }
}

impl<T> Deref for ParsedProperty<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.value()
    }
}

impl<T: Display> Display for ParsedProperty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.value().fmt(f)
    }
}

impl<T: AsRef<str>> AsRef<str> for ParsedProperty<T> {
    fn as_ref(&self) -> &str {
        self.value().as_ref()
    }
}

impl<T> From<T> for ParsedProperty<T> {
    fn from(value: T) -> Self {
        ParsedProperty::Default(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// # ParsedProperty Value Access
    ///
    /// Tests accessing the value from every source variant.
    ///
    /// ## Test Scenario
    /// - Creates one property per source
    /// - Reads it through value(), Deref and into_value()
    ///
    /// ## Expected Outcome
    /// - All access paths return the same value
    #[test]
    fn test_parsed_property_value_access() {
        let props = vec![
            ParsedProperty::Cli("origin".to_string(), "--remote".to_string()),
            ParsedProperty::Env("origin".to_string(), "GITNOOB_REMOTE".to_string()),
            ParsedProperty::Git("origin".to_string(), "gitnoob.remote".to_string()),
            ParsedProperty::File(
                "origin".to_string(),
                PathBuf::from("/home/u/.config/gitnoob/config.toml"),
                "remote".to_string(),
            ),
            ParsedProperty::Default("origin".to_string()),
        ];

        for prop in props {
            assert_eq!(prop.value(), "origin");
            assert_eq!(&*prop, "origin");
            assert_eq!(prop.as_ref(), "origin");
            assert_eq!(prop.to_string(), "origin");
            assert_eq!(prop.into_value(), "origin");
        }
    }

    /// # ParsedProperty Source Description
    ///
    /// Tests source names and the human-readable origin.
    ///
    /// ## Test Scenario
    /// - Describes env, git and file sourced properties
    ///
    /// ## Expected Outcome
    /// - Each description names the variable, key or path
    #[test]
    fn test_parsed_property_source_description() {
        let env = ParsedProperty::Env(1, "GITNOOB_X".to_string());
        assert_eq!(env.source_name(), "env");
        assert_eq!(env.describe_source(), "env GITNOOB_X");

        let git = ParsedProperty::Git(1, "github.user".to_string());
        assert_eq!(git.source_name(), "git");
        assert_eq!(git.describe_source(), "git config github.user");

        let file = ParsedProperty::File(1, PathBuf::from("/tmp/c.toml"), "remote".to_string());
        assert_eq!(file.describe_source(), "/tmp/c.toml (remote)");

        let default: ParsedProperty<i32> = 1.into();
        assert_eq!(default.source_name(), "default");
        assert_eq!(default.describe_source(), "default");
    }
}
