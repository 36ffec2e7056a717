use crate::context::AppContext;
use crate::domain::pull_request::{PullRequestRef, PullRequestSources};
use crate::error::AppResult;
use crate::workflow::sync::{SyncOutcome, sync_pull_request};

#[derive(Debug, Clone)]
pub struct SyncCommandArgs {
    pub pr: PullRequestRef,
    pub sources: PullRequestSources,
}

pub async fn run(ctx: &AppContext, args: SyncCommandArgs) -> AppResult<Option<SyncOutcome>> {
    sync_pull_request(ctx, &args.pr, &args.sources).await
}
