//! Repository-hosting API.
//!
//! Creates, deletes and lists repositories on a GitHub-compatible REST API.
//!
//! ## Example
//!
//! ```rust,no_run
//! use gitnoob::api::{GitHubClient, HostingCredential, HostingOperations, DEFAULT_API_URL};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let credential = HostingCredential::from_parts(
//!     Some("octo".to_string()),
//!     Some("ghp_example".to_string()),
//! )?;
//! let client = GitHubClient::new(DEFAULT_API_URL, credential)?;
//!
//! for repo in client.list_repositories().await? {
//!     println!("{}", repo.name);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod credential;
mod traits;

use serde::{Deserialize, Serialize};

pub use client::{DEFAULT_API_URL, GitHubClient};
pub use credential::HostingCredential;
pub use traits::HostingOperations;

/// A repository as returned by the hosting API. Only `name` is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub clone_url: Option<String>,
    #[serde(default)]
    pub private: bool,
}
