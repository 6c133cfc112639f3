//! Splits the agent's free text into an answer and its cited URLs

use crate::models::AnalysisResult;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SOURCES_MARKER: Regex =
        Regex::new(r"(?i)\s*sources:\s*").expect("sources marker pattern is valid");
    static ref URL_PATTERN: Regex = Regex::new(r"https?://\S+").expect("url pattern is valid");
}

/// Split on the first case-insensitive `sources:` marker. The second element
/// is `None` when the marker is absent.
pub fn split_on_sources_marker(text: &str) -> (&str, Option<&str>) {
    let mut parts = SOURCES_MARKER.splitn(text, 2);
    let head = parts.next().unwrap_or_default();
    (head, parts.next())
}

/// Every `http(s)://` run up to the next whitespace, in order of appearance
pub fn find_urls(text: &str) -> Vec<String> {
    URL_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

pub fn parse_response(text: &str) -> AnalysisResult {
    let (head, tail) = split_on_sources_marker(text);
    let mut answer = head.trim().to_string();

    let sources = match tail {
        Some(section) => find_urls(section),
        None => {
            // Model ignored the "Sources:" heading; pull bare links out of the body.
            let found = find_urls(&answer);
            if !found.is_empty() {
                for url in &found {
                    answer = answer.replace(url.as_str(), "");
                }
                answer = answer.trim().to_string();
            }
            found
        }
    };

    AnalysisResult { answer, sources }
}
