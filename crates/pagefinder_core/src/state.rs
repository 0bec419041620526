use pagefinder_engine::{CrawlConfig, DiscoveryConfig, PageResult, RunSummary};
use serde::{Deserialize, Serialize};

use crate::view_model::{AppViewModel, ResultRowView};

pub(crate) const READY_STATUS: &str = "Ready";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Find candidate sites for the term and check each for relevance.
    #[default]
    Discovery,
    /// Crawl outward from a starting URL counting term occurrences.
    Crawl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    /// Stop requested; waiting for the worker's terminal event.
    Stopping,
}

/// Inputs and settings a shell may persist between launches.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub term: String,
    pub seed: String,
    pub mode: SearchMode,
    pub crawl: CrawlConfig,
    pub discovery: DiscoveryConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    term: String,
    seed: String,
    mode: SearchMode,
    crawl: CrawlConfig,
    discovery: DiscoveryConfig,
    session: SessionState,
    status: String,
    log: Vec<String>,
    results: Vec<PageResult>,
    last_summary: Option<RunSummary>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            term: String::new(),
            seed: String::new(),
            mode: SearchMode::default(),
            crawl: CrawlConfig::default(),
            discovery: DiscoveryConfig::default(),
            session: SessionState::default(),
            status: READY_STATUS.to_string(),
            log: Vec::new(),
            results: Vec::new(),
            last_summary: None,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let running = self.session != SessionState::Idle;
        AppViewModel {
            session: self.session,
            mode: self.mode,
            term: self.term.clone(),
            show_term_placeholder: self.term.is_empty(),
            seed: self.seed.clone(),
            seed_enabled: self.mode == SearchMode::Crawl && !running,
            status: self.status.clone(),
            log: self.log.clone(),
            rows: self.results.iter().map(ResultRowView::from_result).collect(),
            start_enabled: !running,
            stop_enabled: self.session == SessionState::Running,
            progress_active: running,
            last_summary: self.last_summary,
            dirty: self.dirty,
        }
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn results(&self) -> &[PageResult] {
        &self.results
    }

    pub fn settings(&self) -> Settings {
        Settings {
            term: self.term.clone(),
            seed: self.seed.clone(),
            mode: self.mode,
            crawl: self.crawl.clone(),
            discovery: self.discovery.clone(),
        }
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn term(&self) -> &str {
        &self.term
    }

    pub(crate) fn seed(&self) -> &str {
        &self.seed
    }

    pub(crate) fn mode(&self) -> SearchMode {
        self.mode
    }

    pub(crate) fn crawl(&self) -> &CrawlConfig {
        &self.crawl
    }

    pub(crate) fn discovery(&self) -> &DiscoveryConfig {
        &self.discovery
    }

    pub(crate) fn set_term(&mut self, term: String) {
        if self.term != term {
            self.term = term;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_seed(&mut self, seed: String) {
        if self.seed != seed {
            self.seed = seed;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_mode(&mut self, mode: SearchMode) {
        if self.mode != mode {
            self.mode = mode;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_crawl(&mut self, config: CrawlConfig) {
        if self.crawl != config {
            self.crawl = config;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_discovery(&mut self, config: DiscoveryConfig) {
        if self.discovery != config {
            self.discovery = config;
            self.mark_dirty();
        }
    }

    pub(crate) fn restore(&mut self, settings: Settings) {
        self.term = settings.term;
        self.seed = settings.seed;
        self.mode = settings.mode;
        self.crawl = settings.crawl;
        self.discovery = settings.discovery;
        self.mark_dirty();
    }

    pub(crate) fn set_status(&mut self, status: impl Into<String>) {
        let status = status.into();
        if self.status != status {
            self.status = status;
            self.mark_dirty();
        }
    }

    pub(crate) fn push_log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
        self.mark_dirty();
    }

    pub(crate) fn push_result(&mut self, result: PageResult) {
        self.results.push(result);
        self.mark_dirty();
    }

    /// Begin a run: previous results, log and summary are dropped.
    pub(crate) fn begin_run(&mut self, status: impl Into<String>) {
        self.results.clear();
        self.log.clear();
        self.last_summary = None;
        self.session = SessionState::Running;
        self.status = status.into();
        self.mark_dirty();
    }

    pub(crate) fn begin_stop(&mut self) {
        self.session = SessionState::Stopping;
        self.mark_dirty();
    }

    pub(crate) fn finish_run(&mut self, summary: Option<RunSummary>) {
        self.session = SessionState::Idle;
        self.last_summary = summary;
        self.mark_dirty();
    }

    /// Returns `false` when there was nothing to clear.
    pub(crate) fn clear_results(&mut self) -> bool {
        let changed = !self.results.is_empty()
            || !self.log.is_empty()
            || self.last_summary.is_some();
        self.results.clear();
        self.log.clear();
        self.last_summary = None;
        if changed {
            self.mark_dirty();
        }
        changed
    }
}
