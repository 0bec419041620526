//! Breadth-first crawl restricted to the seed's host.

use engine_logging::{engine_debug, engine_warn};
use url::Url;

use crate::extract::Extractor;
use crate::fetch::{fetch_page, Fetcher};
use crate::frontier::Frontier;
use crate::links::same_domain_links;
use crate::progress::{pause, CancelFlag, EventSink};
use crate::relevance::count_occurrences;
use crate::{
    ellipsize, normalize_url, CrawlConfig, EngineError, MatchIndicator, PageResult, PageTask,
    Provenance, RunState, RunSummary, SearchTerm, NO_TITLE,
};

/// Prepend `https://` when no scheme is given, then parse.
pub fn normalize_seed(raw: &str) -> Result<Url, EngineError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(
            "Please enter a starting URL".to_string(),
        ));
    }
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    let url = Url::parse(&candidate)
        .map_err(|err| EngineError::InvalidInput(format!("invalid starting URL {raw}: {err}")))?;
    if url.host_str().is_none() {
        return Err(EngineError::InvalidInput(format!(
            "starting URL {raw} has no host"
        )));
    }
    Ok(url)
}

/// One crawl run. The frontier stays inspectable after [`CrawlEngine::run`].
pub struct CrawlEngine<'a> {
    fetcher: &'a dyn Fetcher,
    extractor: &'a dyn Extractor,
    sink: &'a dyn EventSink,
    cancel: &'a CancelFlag,
    term: SearchTerm,
    seed: Url,
    config: CrawlConfig,
    frontier: Frontier,
    state: RunState,
}

impl<'a> CrawlEngine<'a> {
    pub fn new(
        fetcher: &'a dyn Fetcher,
        extractor: &'a dyn Extractor,
        sink: &'a dyn EventSink,
        cancel: &'a CancelFlag,
        term: SearchTerm,
        seed: Url,
        config: CrawlConfig,
    ) -> Self {
        let mut frontier = Frontier::new();
        frontier.push(PageTask::new(normalize_url(&seed), Provenance::Seed));
        Self {
            fetcher,
            extractor,
            sink,
            cancel,
            term,
            seed,
            config,
            frontier,
            state: RunState::default(),
        }
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn into_state(self) -> RunState {
        self.state
    }

    fn has_more_work(&self) -> bool {
        !self.frontier.is_empty() && self.state.pages_processed < self.config.max_pages
    }

    pub async fn run(&mut self) -> RunSummary {
        let sink = self.sink;
        sink.log(&format!("Starting search for '{}' from {}", self.term, self.seed));
        sink.log(&format!(
            "Max pages: {}, Delay: {}s, Case sensitive: {}",
            self.config.max_pages, self.config.delay_seconds, self.config.case_sensitive
        ));

        while self.has_more_work() && !self.cancel.is_requested() {
            let Some(task) = self.frontier.pop_next() else {
                break;
            };
            self.state.pages_processed += 1;
            self.visit(&task).await;
            debug_assert!(self.frontier.is_disjoint());

            if self.has_more_work() {
                pause(self.config.delay(), self.cancel).await;
            }
        }

        let cancelled = self.cancel.is_requested();
        self.report(cancelled);
        self.state.summary(cancelled)
    }

    async fn visit(&mut self, task: &PageTask) {
        let sink = self.sink;
        let position = self.state.pages_processed;
        sink.status(&format!("Scraping: {}", ellipsize(&task.url, 60)));
        sink.log(&format!(
            "Scraping page {position}/{}: {}",
            self.config.max_pages, task.url
        ));

        let page = match fetch_page(self.fetcher, self.extractor, &task.url).await {
            Ok(page) => page,
            Err(err) => {
                engine_warn!("crawl fetch {} failed: {err}", task.url);
                sink.log(&format!("Error scraping {}: {err}", task.url));
                return;
            }
        };

        let matches = count_occurrences(
            &page.visible_text,
            self.term.as_str(),
            self.config.case_sensitive,
        );
        if matches > 0 {
            let result = PageResult {
                url: task.url.clone(),
                title: page.title.clone().unwrap_or_else(|| NO_TITLE.to_string()),
                indicator: MatchIndicator::Count(matches),
            };
            self.state.total_matches += matches;
            sink.result(&result);
            self.state.results.push(result);
            sink.log(&format!("Found {matches} matches on: {}", task.url));
        }

        let Ok(page_url) = Url::parse(&task.url) else {
            return;
        };
        let mut added = 0;
        for link in same_domain_links(&page.anchors, &page_url, &self.seed) {
            if added >= self.config.max_new_links_per_page {
                break;
            }
            if self
                .frontier
                .push(PageTask::new(normalize_url(&link), Provenance::CrawlLink))
            {
                added += 1;
            }
        }
        engine_debug!(
            "{} queued {added} links, frontier size {}",
            task.url,
            self.frontier.queued_len()
        );
        sink.log(&format!("Found {added} new links to explore"));
    }

    fn report(&self, cancelled: bool) {
        let sink = self.sink;
        let summary = self.state.summary(cancelled);
        if cancelled {
            sink.log("Search stopped by user");
            sink.status("Search stopped by user");
        } else {
            sink.log("Search completed!");
            sink.status(&format!(
                "Completed: {} pages scanned, {} pages with matches",
                summary.pages_processed, summary.pages_matched
            ));
        }
        sink.log(&format!("Pages scanned: {}", summary.pages_processed));
        sink.log(&format!("Pages with matches: {}", summary.pages_matched));
        sink.log(&format!("Total matches found: {}", summary.total_matches));
    }
}
