//! Performance rules: DOM queries inside loops, repeated zero-argument calls.

use std::sync::LazyLock;

use regex::Regex;

use super::{Severity, Suggestion, SuggestionKind};

static LOOP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"for\s*\(|\.foreach\(|while\s*\(").expect("loop pattern is valid")
});

static DOM_QUERY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"document\.getelementbyid|document\.queryselector")
        .expect("dom query pattern is valid")
});

static ZERO_ARG_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)\(\)").expect("call pattern is valid"));

const DOM_QUERY_CALLS: &[&str] = &[
    "document.getElementById",
    "document.querySelector",
    "document.querySelectorAll",
];

const CACHE_DOM: &str = "Cache DOM queries outside loops for better performance";
const CACHE_DOM_HINT: &str = "// Cache DOM query: const element = document.getElementById(...);";
const CACHE_CALL: &str = "Cache function results to avoid repeated calls";

pub(super) fn analyze(source: &str, lines: &[&str]) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    // Loop and DOM detection look at the whole source, case-insensitively.
    let lowered = source.to_lowercase();
    if LOOP.is_match(&lowered) && DOM_QUERY.is_match(&lowered) {
        for (index, line) in lines.iter().enumerate() {
            if DOM_QUERY_CALLS.iter().any(|call| line.contains(call)) {
                suggestions.push(cache_dom(index, line));
            }
        }
    }

    for (index, line) in lines.iter().enumerate() {
        if line.contains("innerHTML +=")
            && (line.contains("document.getElementById") || line.contains("document.querySelector"))
        {
            suggestions.push(cache_dom(index, line));
        }

        for caps in ZERO_ARG_CALL.captures_iter(line) {
            let name = &caps[1];
            if line.matches(&format!("{name}()")).count() > 2 {
                suggestions.push(Suggestion::new(
                    SuggestionKind::Performance,
                    Severity::Medium,
                    CACHE_CALL,
                    index,
                    line,
                    format!("const cachedResult = {name}(); // Cache result"),
                ));
            }
        }
    }

    suggestions
}

fn cache_dom(index: usize, line: &str) -> Suggestion {
    Suggestion::new(
        SuggestionKind::Performance,
        Severity::High,
        CACHE_DOM,
        index,
        line,
        CACHE_DOM_HINT,
    )
}
