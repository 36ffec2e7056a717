use std::fmt;

/// Coordinates of the pull request being synchronized.
#[derive(Debug, Clone)]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// The free-form texts an issue key may be extracted from.
#[derive(Debug, Clone)]
pub struct PullRequestSources {
    pub title: String,
    pub branch: String,
}
