//! Trait for repository-hosting operations.
//!
//! The CLI runners depend on this trait rather than on the HTTP client so they
//! can be exercised against an in-memory double.

use async_trait::async_trait;

use super::Repository;
use crate::error::ApiError;

/// Create, delete and list repositories of the authenticated user.
#[async_trait]
pub trait HostingOperations: Send + Sync {
    /// Creates a repository. Succeeds only on `201 Created`.
    async fn create_repository(&self, name: &str, private: bool) -> Result<Repository, ApiError>;

    /// Deletes `<owner>/<name>`. Succeeds only on `204 No Content`.
    async fn delete_repository(&self, name: &str) -> Result<(), ApiError>;

    /// Lists repositories of the authenticated user.
    async fn list_repositories(&self) -> Result<Vec<Repository>, ApiError>;

    /// Account the operations run as.
    fn username(&self) -> &str;
}
