use crate::domain::key::IssueKey;

/// What the issue tracker knows about a ticket.
#[derive(Debug, Clone)]
pub struct TicketDetails {
    pub key: IssueKey,
    pub summary: String,
    pub url: Option<String>,
    pub status: Option<String>,
    pub labels: Vec<String>,
}
