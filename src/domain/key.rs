use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AppError, AppResult};

/// Placeholder token callers put in a custom pattern template where the
/// project key should be substituted.
pub const PROJECT_PLACEHOLDER: &str = "{PROJECT}";

static DEFAULT_KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z][A-Z0-9]*-[0-9]+").unwrap());

/// An issue-tracker key of the shape `PROJECT-NUMBER`, preserved exactly as
/// it appeared in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueKey(String);

impl IssueKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How keys are located in text. Resolved once from configuration and held
/// for the lifetime of the run; exactly one variant is active per run.
#[derive(Debug, Clone)]
pub enum MatchStrategy {
    Default,
    Custom {
        template: String,
        project_key: String,
    },
}

/// A [`MatchStrategy`] compiled into a ready matcher. Compilation fails fast
/// on a malformed custom template or an empty project key; searching never
/// fails.
pub struct KeyMatcher {
    pattern: Regex,
}

impl KeyMatcher {
    pub fn compile(strategy: &MatchStrategy) -> AppResult<Self> {
        let pattern = match strategy {
            MatchStrategy::Default => DEFAULT_KEY_PATTERN.clone(),
            MatchStrategy::Custom {
                template,
                project_key,
            } => {
                let key = project_key.trim();
                if key.is_empty() {
                    return Err(AppError::Configuration(
                        "custom key pattern requires a non-empty project key".to_string(),
                    ));
                }
                let expanded = template.replace(PROJECT_PLACEHOLDER, key);
                Regex::new(&expanded).map_err(|err| {
                    AppError::Configuration(format!(
                        "custom key pattern '{expanded}' does not compile: {err}"
                    ))
                })?
            }
        };
        Ok(Self { pattern })
    }

    /// Returns the leftmost key in `text`, or `None`.
    pub fn find(&self, text: &str) -> Option<IssueKey> {
        self.pattern
            .find(text)
            .map(|m| IssueKey(m.as_str().to_string()))
    }
}

/// Finds the leftmost substring shaped `UPPERCASE-DIGITS`. Lowercase and
/// mixed-case tokens, bare numbers, and bare project tokens never match.
pub fn extract_by_default_pattern(text: &str) -> Option<IssueKey> {
    DEFAULT_KEY_PATTERN
        .find(text)
        .map(|m| IssueKey(m.as_str().to_string()))
}

/// Substitutes `project_key` into the `{PROJECT}` placeholder of `template`
/// and searches `text` with the result. A template that does not compile
/// after substitution is a configuration error, never a silent fallback to
/// the default pattern.
pub fn extract_by_custom_pattern(
    text: &str,
    template: &str,
    project_key: &str,
) -> AppResult<Option<IssueKey>> {
    let matcher = KeyMatcher::compile(&MatchStrategy::Custom {
        template: template.to_string(),
        project_key: project_key.to_string(),
    })?;
    Ok(matcher.find(text))
}
