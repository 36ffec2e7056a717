use std::env;

use regex::Regex;

use crate::domain::key::MatchStrategy;
use crate::domain::labels::LabelMap;
use crate::error::{AppError, AppResult};

const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Which pull-request texts to search for an issue key. Under `Both` the
/// title is searched before the branch name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceSelector {
    Branch,
    Title,
    Both,
}

impl SourceSelector {
    pub fn parse(value: &str) -> AppResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "branch" => Ok(SourceSelector::Branch),
            "title" | "pr-title" => Ok(SourceSelector::Title),
            "both" => Ok(SourceSelector::Both),
            other => Err(AppError::Configuration(format!(
                "WHAT_TO_USE must be one of branch, title, both (got '{other}')"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub github_token: Option<String>,
    pub github_api_url: String,
    pub jira_base_url: Option<String>,
    pub jira_email: Option<String>,
    pub jira_token: Option<String>,
    pub source_selector: SourceSelector,
    pub match_strategy: MatchStrategy,
    pub label_map: LabelMap,
    pub skip_branches: Option<Regex>,
    pub fail_on_missing_ticket: bool,
}

impl AppConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from a variable lookup. `load` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let github_token = non_empty(lookup("GITHUB_TOKEN"));
        let github_api_url = non_empty(lookup("GITHUB_API_URL"))
            .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string());
        let jira_base_url = non_empty(lookup("JIRA_BASE_URL"));
        let jira_email = non_empty(lookup("JIRA_EMAIL"));
        let jira_token = non_empty(lookup("JIRA_TOKEN"));

        let source_selector = match non_empty(lookup("WHAT_TO_USE")) {
            Some(raw) => SourceSelector::parse(&raw)?,
            None => SourceSelector::Both,
        };

        let match_strategy = match non_empty(lookup("CUSTOM_KEY_PATTERN")) {
            Some(template) => {
                let project_key = non_empty(lookup("JIRA_PROJECT_KEY")).ok_or_else(|| {
                    AppError::Configuration(
                        "CUSTOM_KEY_PATTERN requires JIRA_PROJECT_KEY to be set".to_string(),
                    )
                })?;
                MatchStrategy::Custom {
                    template,
                    project_key,
                }
            }
            None => MatchStrategy::Default,
        };

        let label_map = match non_empty(lookup("LABELS")) {
            Some(raw) => LabelMap::from_json(&raw)?,
            None => LabelMap::empty(),
        };

        let skip_branches = match non_empty(lookup("SKIP_BRANCHES")) {
            Some(raw) => Some(Regex::new(&raw).map_err(|err| {
                AppError::Configuration(format!("SKIP_BRANCHES '{raw}' does not compile: {err}"))
            })?),
            None => None,
        };

        let fail_on_missing_ticket = match non_empty(lookup("FAIL_ON_MISSING_TICKET")) {
            None => true,
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                AppError::Configuration(format!(
                    "FAIL_ON_MISSING_TICKET must be true or false (got '{raw}')"
                ))
            })?,
        };

        Ok(Self {
            github_token,
            github_api_url,
            jira_base_url,
            jira_email,
            jira_token,
            source_selector,
            match_strategy,
            label_map,
            skip_branches,
            fail_on_missing_ticket,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> AppResult<AppConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_to_both_sources_and_default_strategy() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.source_selector, SourceSelector::Both);
        assert!(matches!(cfg.match_strategy, MatchStrategy::Default));
        assert!(cfg.fail_on_missing_ticket);
        assert_eq!(cfg.github_api_url, DEFAULT_GITHUB_API_URL);
    }

    #[test]
    fn parses_source_selector() {
        let cfg = load(&[("WHAT_TO_USE", "branch")]).unwrap();
        assert_eq!(cfg.source_selector, SourceSelector::Branch);
        let cfg = load(&[("WHAT_TO_USE", "pr-title")]).unwrap();
        assert_eq!(cfg.source_selector, SourceSelector::Title);
        assert!(load(&[("WHAT_TO_USE", "commits")]).is_err());
    }

    #[test]
    fn custom_pattern_requires_project_key() {
        let err = load(&[("CUSTOM_KEY_PATTERN", r"{PROJECT}-\d+")]).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));

        let cfg = load(&[
            ("CUSTOM_KEY_PATTERN", r"{PROJECT}-\d+"),
            ("JIRA_PROJECT_KEY", "ENG"),
        ])
        .unwrap();
        assert!(matches!(cfg.match_strategy, MatchStrategy::Custom { .. }));
    }

    #[test]
    fn blank_project_key_is_rejected() {
        let err = load(&[
            ("CUSTOM_KEY_PATTERN", r"{PROJECT}-\d+"),
            ("JIRA_PROJECT_KEY", "   "),
        ])
        .unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn parses_label_map_json() {
        let cfg = load(&[("LABELS", r#"{"bugfix": "bug"}"#)]).unwrap();
        assert_eq!(cfg.label_map.translate("bugfix"), Some("bug"));
        assert!(load(&[("LABELS", "nope")]).is_err());
    }

    #[test]
    fn compiles_skip_branches() {
        let cfg = load(&[("SKIP_BRANCHES", r"^release/")]).unwrap();
        assert!(cfg.skip_branches.unwrap().is_match("release/2024-06"));
        assert!(load(&[("SKIP_BRANCHES", "[")]).is_err());
    }

    #[test]
    fn parses_fail_on_missing_ticket() {
        let cfg = load(&[("FAIL_ON_MISSING_TICKET", "false")]).unwrap();
        assert!(!cfg.fail_on_missing_ticket);
        assert!(load(&[("FAIL_ON_MISSING_TICKET", "maybe")]).is_err());
    }
}
