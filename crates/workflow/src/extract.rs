//! Structured extraction from free-text completions.
//!
//! Routing, query extraction, and reranking all coerce unstructured model
//! output into control decisions. Each extraction here is a pure function
//! with a deterministic fallback, so malformed model output degrades the run
//! instead of aborting it, and the parsing is testable without the service.

use crate::state::Route;

/// Line prefix for the extracted search query.
pub const QUERY_PREFIX: &str = "search query:";

/// Line prefix for the extracted year filter.
pub const YEAR_PREFIX: &str = "year filter:";

/// Sentinel the extraction prompt uses for "no year mentioned".
const NO_YEAR_SENTINEL: &str = "none";

/// Classify a routing response.
///
/// Lenient by design: the decision is `Retrieve` if the token appears
/// anywhere in the (lowercased) response, tolerating verbose model output.
/// Anything else, including empty or unparseable text, falls back to `Chat`.
pub fn route_from_response(response: &str) -> Route {
    if response.trim().to_lowercase().contains("retrieve") {
        Route::Retrieve
    } else {
        Route::Chat
    }
}

/// Result of parsing a query-extraction response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryExtraction {
    /// Search query for the vector index
    pub query: String,

    /// Extracted year, present only when all-digit
    pub year: Option<String>,
}

/// Parse the two labeled lines of a query-extraction response.
///
/// Lines matching neither prefix are ignored. If no query line is present,
/// the raw question is used verbatim. A year is accepted only when it is not
/// the `none` sentinel and consists solely of ASCII digits.
pub fn parse_query_extraction(response: &str, question: &str) -> QueryExtraction {
    let mut query = None;
    let mut year = None;

    for line in response.lines() {
        let line = line.trim();

        if let Some(value) = strip_prefix_ci(line, QUERY_PREFIX) {
            if !value.is_empty() {
                query = Some(value.to_string());
            }
        } else if let Some(value) = strip_prefix_ci(line, YEAR_PREFIX) {
            if !value.eq_ignore_ascii_case(NO_YEAR_SENTINEL)
                && !value.is_empty()
                && value.chars().all(|c| c.is_ascii_digit())
            {
                year = Some(value.to_string());
            }
        }
    }

    QueryExtraction {
        query: query.unwrap_or_else(|| question.to_string()),
        year,
    }
}

/// Collect ranked document indices from a reranking response.
///
/// Scans line by line, taking the first bracket-delimited integer per line.
/// Lines without one, out-of-range indices, and repeated indices are skipped
/// without aborting the scan. Returns the surviving indices in the order
/// encountered; empty when nothing parsed (the caller falls back to original
/// distance order).
pub fn bracket_indices(response: &str, len: usize) -> Vec<usize> {
    let mut picks = Vec::new();

    for line in response.lines() {
        let Some(open) = line.find('[') else {
            continue;
        };
        let Some(close) = line[open + 1..].find(']') else {
            continue;
        };

        let token = line[open + 1..open + 1 + close].trim();
        let Ok(index) = token.parse::<usize>() else {
            continue;
        };

        if index < len && !picks.contains(&index) {
            picks.push(index);
        }
    }

    picks
}

/// Case-insensitive prefix strip, returning the trimmed remainder.
fn strip_prefix_ci<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(line[prefix.len()..].trim())
    } else {
        None
    }
}
