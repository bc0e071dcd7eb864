//! Idiom rules: index loops, string concatenation, `var` declarations.

use std::sync::LazyLock;

use regex::Regex;

use super::{next_line, Severity, Suggestion, SuggestionKind};

/// A quoted string, concatenated with something, concatenated with another
/// quoted string.
static CONCATENATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:".*?"|'.*?')\s*\+\s*.*?\s*\+\s*["'].*?["']"#)
        .expect("concatenation pattern is valid")
});

const TEMPLATE_LITERAL: &str = "`template literal`";

pub(super) fn analyze(lines: &[&str]) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        let indexes_next_line = next_line(lines, index).is_some_and(|l| l.contains("[i]"));
        if line.contains("for (let i = 0") && indexes_next_line {
            suggestions.push(Suggestion::new(
                SuggestionKind::Idiom,
                Severity::Medium,
                "Use array methods like map(), filter(), or forEach() for better readability",
                index,
                line,
                "// Consider: arr.forEach(item => { ... });",
            ));
        }

        if line.contains("' + '") {
            suggestions.push(Suggestion::new(
                SuggestionKind::Idiom,
                Severity::Medium,
                "Use template literals for string interpolation",
                index,
                line,
                CONCATENATION.replace_all(line, TEMPLATE_LITERAL),
            ));
        }

        if line.contains("var ") {
            suggestions.push(Suggestion::new(
                SuggestionKind::Idiom,
                Severity::Medium,
                "Use const/let instead of var for block scoping",
                index,
                line,
                line.replacen("var ", "let ", 1),
            ));
        }
    }

    suggestions
}
