//! Async rules: promise chains and sequential `Promise.resolve` calls.

use super::{next_line, Severity, Suggestion, SuggestionKind};

pub(super) fn analyze(lines: &[&str]) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        let next = next_line(lines, index).unwrap_or_default();

        if line.contains(".then(") && next.contains(".then(") {
            suggestions.push(Suggestion::new(
                SuggestionKind::Optimization,
                Severity::High,
                "Consider using async/await for cleaner asynchronous code",
                index,
                line,
                "Use async/await instead of promise chains",
            ));
        }

        if line.contains("Promise.resolve") && next.contains("Promise.resolve") {
            suggestions.push(Suggestion::new(
                SuggestionKind::Optimization,
                Severity::Medium,
                "Use Promise.all for parallel promise execution",
                index,
                line,
                "Promise.all([promise1, promise2])",
            ));
        }
    }

    suggestions
}
