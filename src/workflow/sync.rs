use crate::config::SourceSelector;
use crate::context::AppContext;
use crate::domain::key::{IssueKey, KeyMatcher};
use crate::domain::pull_request::{PullRequestRef, PullRequestSources};
use crate::domain::ticket::TicketDetails;
use crate::error::{AppError, AppResult};

#[derive(Debug)]
pub struct SyncOutcome {
    pub key: IssueKey,
    pub labels_applied: Vec<String>,
    pub description_updated: bool,
}

/// Searches the configured sources in order and returns the first key found.
/// Under `Both` the title is tried before the branch name: titles are more
/// likely to be deliberately authored with the ticket reference, but branch
/// conventions are tolerated too.
pub fn resolve_issue_key(
    matcher: &KeyMatcher,
    sources: &PullRequestSources,
    selector: SourceSelector,
) -> AppResult<IssueKey> {
    let (found, attempted) = match selector {
        SourceSelector::Title => (matcher.find(&sources.title), vec!["title"]),
        SourceSelector::Branch => (matcher.find(&sources.branch), vec!["branch name"]),
        SourceSelector::Both => (
            matcher
                .find(&sources.title)
                .or_else(|| matcher.find(&sources.branch)),
            vec!["title", "branch name"],
        ),
    };
    found.ok_or(AppError::KeyNotFound { sources: attempted })
}

/// Runs the full synchronization: resolve the key, fetch the ticket, apply
/// mapped labels, and stamp the ticket reference into the description.
/// Returns `None` when the run ends early without doing anything (skip
/// filter hit, or ticket lookup tolerated as missing).
pub async fn sync_pull_request(
    ctx: &AppContext,
    pr: &PullRequestRef,
    sources: &PullRequestSources,
) -> AppResult<Option<SyncOutcome>> {
    if let Some(skip) = &ctx.config.skip_branches {
        if skip.is_match(&sources.branch) {
            println!(
                "Branch '{}' matches the skip filter, nothing to do",
                sources.branch
            );
            return Ok(None);
        }
    }

    let matcher = KeyMatcher::compile(&ctx.config.match_strategy)?;
    let key = resolve_issue_key(&matcher, sources, ctx.config.source_selector)?;
    println!("Issue key found -> {key}");

    let details = match ctx.issue_tracker.fetch_ticket(&key).await {
        Ok(details) => details,
        Err(err @ AppError::Configuration(_)) => return Err(err),
        Err(err) if ctx.config.fail_on_missing_ticket => return Err(err),
        Err(err) => {
            eprintln!("Warning: skipping {pr}, ticket {key} could not be fetched: {err}");
            return Ok(None);
        }
    };

    let labels = ctx.config.label_map.translate_all(&details.labels);
    let labels_applied = if labels.is_empty() {
        println!("No labels to add");
        Vec::new()
    } else {
        println!("Adding labels to {pr}: {}", labels.join(", "));
        ctx.code_host.add_labels(pr, &labels).await?;
        labels
    };

    // Re-fetched rather than taken from the triggering event: another
    // automation step may have edited the description in the meantime.
    let marker = reference_marker(&key);
    let body = ctx.code_host.latest_description(pr).await?;
    let description_updated = if body.contains(&marker) {
        println!("Description already references {key}");
        false
    } else {
        let block = ticket_reference_block(&details);
        let new_body = if body.trim().is_empty() {
            block
        } else {
            format!("{block}\n{body}")
        };
        ctx.code_host.update_description(pr, &new_body).await?;
        true
    };

    Ok(Some(SyncOutcome {
        key,
        labels_applied,
        description_updated,
    }))
}

fn reference_marker(key: &IssueKey) -> String {
    format!("<!-- prjira:{key} -->")
}

fn ticket_reference_block(details: &TicketDetails) -> String {
    let mut block = reference_marker(&details.key);
    block.push('\n');
    match &details.url {
        Some(url) => block.push_str(&format!("**[{}]({url})**", details.key)),
        None => block.push_str(&format!("**{}**", details.key)),
    }
    block.push_str(&format!(" {}", details.summary));
    if let Some(status) = &details.status {
        block.push_str(&format!(" _({status})_"));
    }
    block.push('\n');
    block
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use regex::Regex;

    use super::*;
    use crate::config::AppConfig;
    use crate::services::{CodeHostService, IssueTrackerService};

    fn sources(title: &str, branch: &str) -> PullRequestSources {
        PullRequestSources {
            title: title.to_string(),
            branch: branch.to_string(),
        }
    }

    fn default_matcher() -> KeyMatcher {
        KeyMatcher::compile(&crate::domain::key::MatchStrategy::Default).unwrap()
    }

    #[test]
    fn both_falls_back_to_branch() {
        let key = resolve_issue_key(
            &default_matcher(),
            &sources("Fix bug", "feature/ENG-7-fix"),
            SourceSelector::Both,
        )
        .unwrap();
        assert_eq!(key.as_str(), "ENG-7");
    }

    #[test]
    fn both_prefers_title_over_branch() {
        let key = resolve_issue_key(
            &default_matcher(),
            &sources("ENG-1: fix", "ENG-2-branch"),
            SourceSelector::Both,
        )
        .unwrap();
        assert_eq!(key.as_str(), "ENG-1");
    }

    #[test]
    fn both_fails_when_no_source_matches() {
        let err = resolve_issue_key(
            &default_matcher(),
            &sources("no ticket here", "also-none"),
            SourceSelector::Both,
        )
        .unwrap_err();
        match err {
            AppError::KeyNotFound { sources } => {
                assert_eq!(sources, vec!["title", "branch name"]);
            }
            other => panic!("expected KeyNotFound, got {other:?}"),
        }
    }

    #[test]
    fn title_only_ignores_branch() {
        let err = resolve_issue_key(
            &default_matcher(),
            &sources("no key", "ENG-9-branch"),
            SourceSelector::Title,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::KeyNotFound { .. }));
    }

    #[test]
    fn branch_only_ignores_title() {
        let key = resolve_issue_key(
            &default_matcher(),
            &sources("ENG-1: fix", "OPS-3-branch"),
            SourceSelector::Branch,
        )
        .unwrap();
        assert_eq!(key.as_str(), "OPS-3");
    }

    #[derive(Default)]
    struct FakeCodeHost {
        description: Mutex<String>,
        added_labels: Mutex<Vec<Vec<String>>>,
        updates: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CodeHostService for FakeCodeHost {
        async fn add_labels(&self, _pr: &PullRequestRef, labels: &[String]) -> AppResult<()> {
            self.added_labels.lock().unwrap().push(labels.to_vec());
            Ok(())
        }

        async fn latest_description(&self, _pr: &PullRequestRef) -> AppResult<String> {
            Ok(self.description.lock().unwrap().clone())
        }

        async fn update_description(&self, _pr: &PullRequestRef, body: &str) -> AppResult<()> {
            self.updates.lock().unwrap().push(body.to_string());
            Ok(())
        }
    }

    struct FakeIssueTracker {
        details: Option<TicketDetails>,
    }

    #[async_trait]
    impl IssueTrackerService for FakeIssueTracker {
        async fn fetch_ticket(&self, key: &IssueKey) -> AppResult<TicketDetails> {
            self.details
                .clone()
                .ok_or_else(|| AppError::IssueTracker(format!("ticket {key} not found")))
        }
    }

    fn ticket(summary: &str, labels: &[&str]) -> TicketDetails {
        TicketDetails {
            key: crate::domain::key::extract_by_default_pattern("ENG-7").unwrap(),
            summary: summary.to_string(),
            url: Some("https://jira.example.com/browse/ENG-7".to_string()),
            status: Some("In Progress".to_string()),
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    fn test_config(vars: &[(&str, &str)]) -> AppConfig {
        let map: std::collections::HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned()).unwrap()
    }

    fn context(
        config: AppConfig,
        code_host: Arc<FakeCodeHost>,
        tracker: FakeIssueTracker,
    ) -> AppContext {
        AppContext::new(config, code_host, Arc::new(tracker))
    }

    fn pr() -> PullRequestRef {
        PullRequestRef {
            owner: "acme".to_string(),
            repo: "widgets".to_string(),
            number: 12,
        }
    }

    #[tokio::test]
    async fn applies_mapped_labels_and_stamps_description() {
        let host = Arc::new(FakeCodeHost::default());
        *host.description.lock().unwrap() = "Original body".to_string();
        let ctx = context(
            test_config(&[("LABELS", r#"{"bugfix": "bug"}"#)]),
            host.clone(),
            FakeIssueTracker {
                details: Some(ticket("Fix the widget", &["bugfix", "unmapped"])),
            },
        );

        let outcome = sync_pull_request(&ctx, &pr(), &sources("Fix bug", "feature/ENG-7-fix"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(outcome.key.as_str(), "ENG-7");
        assert_eq!(outcome.labels_applied, vec!["bug"]);
        assert!(outcome.description_updated);
        assert_eq!(
            *host.added_labels.lock().unwrap(),
            vec![vec!["bug".to_string()]]
        );
        let updates = host.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        assert!(updates[0].contains("<!-- prjira:ENG-7 -->"));
        assert!(updates[0].contains("Fix the widget"));
        assert!(updates[0].ends_with("Original body"));
    }

    #[tokio::test]
    async fn skips_label_call_when_nothing_maps() {
        let host = Arc::new(FakeCodeHost::default());
        let ctx = context(
            test_config(&[]),
            host.clone(),
            FakeIssueTracker {
                details: Some(ticket("Fix the widget", &["bugfix"])),
            },
        );

        let outcome = sync_pull_request(&ctx, &pr(), &sources("ENG-7: fix", ""))
            .await
            .unwrap()
            .unwrap();

        assert!(outcome.labels_applied.is_empty());
        assert!(host.added_labels.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn leaves_description_alone_when_already_referenced() {
        let host = Arc::new(FakeCodeHost::default());
        *host.description.lock().unwrap() = "<!-- prjira:ENG-7 -->\nalready here".to_string();
        let ctx = context(
            test_config(&[]),
            host.clone(),
            FakeIssueTracker {
                details: Some(ticket("Fix the widget", &[])),
            },
        );

        let outcome = sync_pull_request(&ctx, &pr(), &sources("ENG-7: fix", ""))
            .await
            .unwrap()
            .unwrap();

        assert!(!outcome.description_updated);
        assert!(host.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn skip_filter_short_circuits() {
        let host = Arc::new(FakeCodeHost::default());
        let mut config = test_config(&[]);
        config.skip_branches = Some(Regex::new(r"^release/").unwrap());
        let ctx = context(config, host.clone(), FakeIssueTracker { details: None });

        let outcome = sync_pull_request(&ctx, &pr(), &sources("ENG-7: fix", "release/2024-06"))
            .await
            .unwrap();

        assert!(outcome.is_none());
        assert!(host.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_ticket_is_fatal_by_default() {
        let host = Arc::new(FakeCodeHost::default());
        let ctx = context(
            test_config(&[]),
            host.clone(),
            FakeIssueTracker { details: None },
        );

        let err = sync_pull_request(&ctx, &pr(), &sources("ENG-7: fix", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::IssueTracker(_)));
    }

    #[tokio::test]
    async fn missing_ticket_tolerated_when_configured() {
        let host = Arc::new(FakeCodeHost::default());
        let ctx = context(
            test_config(&[("FAIL_ON_MISSING_TICKET", "false")]),
            host.clone(),
            FakeIssueTracker { details: None },
        );

        let outcome = sync_pull_request(&ctx, &pr(), &sources("ENG-7: fix", ""))
            .await
            .unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn key_not_found_is_fatal() {
        let host = Arc::new(FakeCodeHost::default());
        let ctx = context(
            test_config(&[]),
            host.clone(),
            FakeIssueTracker { details: None },
        );

        let err = sync_pull_request(&ctx, &pr(), &sources("no ticket here", "also-none"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::KeyNotFound { .. }));
    }
}
