use std::collections::HashMap;

use crate::error::{AppError, AppResult};

/// Ticket-label to code-host-label translation table. A label with no entry
/// has no counterpart and is dropped.
#[derive(Debug, Clone, Default)]
pub struct LabelMap {
    entries: HashMap<String, String>,
}

impl LabelMap {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses the mapping from its JSON object form, e.g.
    /// `{"bugfix": "bug", "feature": "enhancement"}`.
    pub fn from_json(raw: &str) -> AppResult<Self> {
        let entries: HashMap<String, String> = serde_json::from_str(raw)
            .map_err(|err| AppError::Configuration(format!("invalid label mapping: {err}")))?;
        Ok(Self { entries })
    }

    pub fn translate(&self, ticket_label: &str) -> Option<&str> {
        self.entries.get(ticket_label).map(String::as_str)
    }

    /// Translates every label that has a mapping, preserving input order.
    pub fn translate_all(&self, ticket_labels: &[String]) -> Vec<String> {
        ticket_labels
            .iter()
            .filter_map(|label| self.translate(label))
            .map(str::to_string)
            .collect()
    }
}
