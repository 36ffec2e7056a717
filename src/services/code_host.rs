use async_trait::async_trait;

use crate::domain::pull_request::PullRequestRef;
use crate::error::AppResult;

#[async_trait]
pub trait CodeHostService: Send + Sync {
    /// Adds labels to a pull request. Re-adding an existing label is a
    /// remote no-op.
    async fn add_labels(&self, pr: &PullRequestRef, labels: &[String]) -> AppResult<()>;

    /// Fetches the current description. Never cached; another automation
    /// step may have edited it since the triggering event was emitted.
    async fn latest_description(&self, pr: &PullRequestRef) -> AppResult<String>;

    async fn update_description(&self, pr: &PullRequestRef, body: &str) -> AppResult<()>;
}
