use async_trait::async_trait;

use crate::domain::key::IssueKey;
use crate::domain::ticket::TicketDetails;
use crate::error::AppResult;

#[async_trait]
pub trait IssueTrackerService: Send + Sync {
    async fn fetch_ticket(&self, key: &IssueKey) -> AppResult<TicketDetails>;
}
