//! Branch names derived from commit messages.
//!
//! A message is slugged to lowercase ASCII letters, digits and hyphens, cut to
//! [`MAX_SLUG_LEN`] characters and suffixed with a second-resolution timestamp:
//!
//! ```rust
//! use chrono::NaiveDate;
//! use gitnoob::core::branch_name::generate;
//!
//! let now = NaiveDate::from_ymd_opt(2024, 3, 9)
//!     .unwrap()
//!     .and_hms_opt(14, 5, 7)
//!     .unwrap();
//! assert_eq!(generate("Fix: login bug!", now).as_str(), "fix--login-bug-20240309-140507");
//! ```

use std::fmt;

use chrono::NaiveDateTime;

use crate::error::GitError;

/// Longest slug kept before the timestamp suffix is appended.
pub const MAX_SLUG_LEN: usize = 50;

/// `strftime` pattern of the suffix.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// A branch name that is safe to hand to `git checkout -b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BranchName(String);

impl BranchName {
    /// Validates a user-supplied name.
    ///
    /// Accepts ASCII letters, digits, `-`, `_`, `.` and `/`. Rejects empty
    /// names, a leading `-` or `/`, a trailing `/` or `.`, and `..`.
    pub fn parse(name: &str) -> Result<Self, GitError> {
        let reject = |reason: &str| GitError::InvalidBranchName {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        if name.is_empty() {
            return Err(reject("name is empty"));
        }
        if let Some(bad) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/')))
        {
            return Err(reject(&format!("character {bad:?} is not allowed")));
        }
        if name.starts_with('-') || name.starts_with('/') {
            return Err(reject("must not start with '-' or '/'"));
        }
        if name.ends_with('/') || name.ends_with('.') {
            return Err(reject("must not end with '/' or '.'"));
        }
        if name.contains("..") {
            return Err(reject("must not contain '..'"));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Lowercases the message and replaces everything outside `[a-z0-9-]` with `-`,
/// trims hyphens at both ends, then keeps at most [`MAX_SLUG_LEN`] characters.
///
/// Truncation happens after trimming, so a cut slug may end in `-`.
pub fn slugify(message: &str) -> String {
    let mapped: String = message
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();

    mapped
        .trim_matches('-')
        .chars()
        .take(MAX_SLUG_LEN)
        .collect()
}

/// Builds `<slug>-<YYYYMMDD-HHMMSS>`, or just the timestamp when the slug is empty.
pub fn generate(message: &str, now: NaiveDateTime) -> BranchName {
    let stamp = now.format(TIMESTAMP_FORMAT).to_string();
    let slug = slugify(message);
    if slug.is_empty() {
        BranchName(stamp)
    } else {
        BranchName(format!("{slug}-{stamp}"))
    }
}
