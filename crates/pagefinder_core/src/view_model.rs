use pagefinder_engine::{ellipsize, MatchIndicator, PageResult, RunSummary};

use crate::{SearchMode, SessionState};

/// Result rows show at most this many URL characters before `...`.
pub const URL_DISPLAY_LIMIT: usize = 50;
pub const TITLE_DISPLAY_LIMIT: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub session: SessionState,
    pub mode: SearchMode,
    pub term: String,
    /// The term box is empty and should show the placeholder hint.
    pub show_term_placeholder: bool,
    pub seed: String,
    pub seed_enabled: bool,
    pub status: String,
    pub log: Vec<String>,
    pub rows: Vec<ResultRowView>,
    pub start_enabled: bool,
    pub stop_enabled: bool,
    pub progress_active: bool,
    pub last_summary: Option<RunSummary>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRowView {
    pub url: String,
    pub title: String,
    /// Occurrence count, or `Yes`/`No` for relevance checks.
    pub matches: String,
    pub description: Option<String>,
}

impl ResultRowView {
    pub(crate) fn from_result(result: &PageResult) -> Self {
        let (matches, description) = match &result.indicator {
            MatchIndicator::Count(count) => (count.to_string(), None),
            MatchIndicator::Relevance {
                relevant,
                description,
            } => {
                let label = if *relevant { "Yes" } else { "No" };
                (label.to_string(), description.clone())
            }
        };
        Self {
            url: ellipsize(&result.url, URL_DISPLAY_LIMIT),
            title: ellipsize(&result.title, TITLE_DISPLAY_LIMIT),
            matches,
            description,
        }
    }
}
