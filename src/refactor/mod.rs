//! Static source-pattern advisor.
//!
//! [`RefactorEngine`] scans a block of JavaScript-family source text line by
//! line and emits [`Suggestion`]s. It is stateless and never fails: text that
//! matches no rule simply yields an empty list.
//!
//! Rule sets run in a fixed order regardless of how they are listed in
//! [`RefactorConfig::rules`]: performance, then idiom, then async.

mod asynchronous;
mod idiom;
mod performance;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{RefactorConfig, RuleSet};

/// What a suggestion improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Performance,
    Idiom,
    Optimization,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A single refactor recommendation tied to one source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub description: String,
    /// The offending line, trimmed.
    pub original_code: String,
    pub suggested_code: String,
    /// 1-based line number.
    pub line: usize,
    pub severity: Severity,
}

impl Suggestion {
    pub(crate) fn new(
        kind: SuggestionKind,
        severity: Severity,
        description: &str,
        index: usize,
        line: &str,
        suggested_code: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            description: description.to_string(),
            original_code: line.trim().to_string(),
            suggested_code: suggested_code.into(),
            line: index + 1,
            severity,
        }
    }
}

/// Rule-based refactor advisor.
#[derive(Debug, Clone, Default)]
pub struct RefactorEngine {
    config: RefactorConfig,
}

impl RefactorEngine {
    pub fn new(config: RefactorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RefactorConfig {
        &self.config
    }

    /// Scan `source` and return every suggestion from the enabled rule sets.
    pub fn suggestions_for(&self, source: &str) -> Vec<Suggestion> {
        let lines: Vec<&str> = source.split('\n').collect();
        let mut suggestions = Vec::new();

        if self.enabled(RuleSet::Performance) {
            suggestions.extend(performance::analyze(source, &lines));
        }
        if self.enabled(RuleSet::Idiom) {
            suggestions.extend(idiom::analyze(&lines));
        }
        if self.enabled(RuleSet::Async) {
            suggestions.extend(asynchronous::analyze(&lines));
        }

        debug!(
            lines = lines.len(),
            suggestions = suggestions.len(),
            "source scanned"
        );
        suggestions
    }

    fn enabled(&self, rule: RuleSet) -> bool {
        self.config.rules.contains(&rule)
    }
}

/// The line after `index`, if any.
pub(crate) fn next_line<'a>(lines: &[&'a str], index: usize) -> Option<&'a str> {
    lines.get(index + 1).copied()
}
