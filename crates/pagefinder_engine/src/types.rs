use std::fmt;

use url::Url;

use crate::EngineError;

/// Text shown in an untouched search box; never a valid term.
pub const TERM_PLACEHOLDER: &str = "Enter your search term...";

/// Title reported for pages without a usable `<title>`.
pub const NO_TITLE: &str = "No Title";

/// A trimmed, non-empty search term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchTerm(String);

impl SearchTerm {
    pub fn parse(raw: &str) -> Result<Self, EngineError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidInput(
                "Please enter a search term".to_string(),
            ));
        }
        if trimmed == TERM_PLACEHOLDER {
            return Err(EngineError::InvalidInput(
                "Please replace the placeholder with a search term".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a URL handed to the fetcher came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Search,
    CategoryTable,
    DefaultSet,
    Seed,
    CrawlLink,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTask {
    pub url: String,
    pub provenance: Provenance,
}

impl PageTask {
    pub fn new(url: impl Into<String>, provenance: Provenance) -> Self {
        Self {
            url: url.into(),
            provenance,
        }
    }
}

/// Canonical identity of a URL for dedupe: parsed, fragment removed.
pub fn normalize_url(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.into()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchIndicator {
    Relevance {
        relevant: bool,
        description: Option<String>,
    },
    Count(usize),
}

impl MatchIndicator {
    pub fn is_match(&self) -> bool {
        match self {
            MatchIndicator::Relevance { relevant, .. } => *relevant,
            MatchIndicator::Count(count) => *count > 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub url: String,
    pub title: String,
    pub indicator: MatchIndicator,
}

/// Counters and results owned by a single run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunState {
    pub pages_processed: usize,
    pub total_matches: usize,
    pub results: Vec<PageResult>,
}

impl RunState {
    pub fn summary(&self, cancelled: bool) -> RunSummary {
        RunSummary {
            pages_processed: self.pages_processed,
            pages_matched: self
                .results
                .iter()
                .filter(|result| result.indicator.is_match())
                .count(),
            total_matches: self.total_matches,
            cancelled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub pages_processed: usize,
    pub pages_matched: usize,
    pub total_matches: usize,
    pub cancelled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Human-readable activity line.
    Log(String),
    /// Single-line status replacing the previous one.
    Status(String),
    PageResult(PageResult),
    Completed(RunSummary),
    Failed { message: String },
}

impl EngineEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, EngineEvent::Completed(_) | EngineEvent::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub status: u16,
    pub redirect_count: usize,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// First `max_chars` characters of `text`, with `...` appended when cut.
pub fn ellipsize(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_and_blank_terms_are_rejected() {
        assert!(SearchTerm::parse("   ").is_err());
        assert!(SearchTerm::parse(TERM_PLACEHOLDER).is_err());
        assert_eq!(SearchTerm::parse("  rust  ").unwrap().as_str(), "rust");
    }

    #[test]
    fn ellipsize_is_char_safe() {
        assert_eq!(ellipsize("héllo wörld", 5), "héllo...");
        assert_eq!(ellipsize("short", 5), "short");
    }

    #[test]
    fn normalization_drops_fragment() {
        let url = Url::parse("https://example.com/a#top").unwrap();
        assert_eq!(normalize_url(&url), "https://example.com/a");
    }
}
