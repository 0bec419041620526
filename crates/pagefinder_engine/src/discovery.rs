//! Candidate discovery and relevance probing for a search term.
//!
//! Candidates come from a strict three-tier cascade: a live search-provider
//! query, then a keyword-matched category table, then a small default set.
//! A tier only runs when every tier before it produced nothing.

use std::collections::HashSet;

use engine_logging::engine_warn;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::extract::{decode_html, Extractor, ParsedPage};
use crate::fetch::{fetch_page, Fetcher};
use crate::frontier::VisitedSet;
use crate::links::is_http;
use crate::progress::{pause, CancelFlag, EventSink};
use crate::relevance::{is_relevant, VariantRule, DEFAULT_VARIANT_RULES};
use crate::{
    ellipsize, normalize_url, DiscoveryConfig, EngineError, MatchIndicator, PageResult, PageTask,
    Provenance, RunState, RunSummary, SearchTerm, NO_TITLE,
};

/// Meta descriptions are cut to this many characters before `...` is appended.
pub const DESCRIPTION_LIMIT: usize = 200;

/// HTML search endpoint queried for live candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchProvider {
    /// Endpoint URL with a `{query}` placeholder for the form-encoded term.
    pub endpoint: String,
    /// CSS selector matching result anchors.
    pub result_selector: String,
    /// Links to this domain or its subdomains point back at the provider.
    pub own_domain: String,
}

impl Default for SearchProvider {
    fn default() -> Self {
        Self {
            endpoint: "https://html.duckduckgo.com/html/?q={query}".to_string(),
            result_selector: "a.result__a".to_string(),
            own_domain: "duckduckgo.com".to_string(),
        }
    }
}

impl SearchProvider {
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.endpoint.contains("{query}") {
            return Err(EngineError::InvalidInput(format!(
                "search endpoint {} has no {{query}} placeholder",
                self.endpoint
            )));
        }
        Selector::parse(&self.result_selector).map_err(|err| {
            EngineError::InvalidInput(format!(
                "invalid result selector {}: {err}",
                self.result_selector
            ))
        })?;
        Ok(())
    }

    pub fn query_url(&self, term: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(term.as_bytes()).collect();
        self.endpoint.replace("{query}", &encoded)
    }

    /// Absolute http(s) result links not pointing back at the provider, at most `limit`.
    pub fn parse_results(&self, html: &str, limit: usize) -> Vec<String> {
        let Ok(selector) = Selector::parse(&self.result_selector) else {
            return Vec::new();
        };
        let doc = Html::parse_document(html);
        doc.select(&selector)
            .filter_map(|anchor| anchor.value().attr("href"))
            .filter_map(|href| Url::parse(href.trim()).ok())
            .filter(|url| is_http(url) && !self.is_own_link(url))
            .map(String::from)
            .take(limit)
            .collect()
    }

    fn is_own_link(&self, url: &Url) -> bool {
        let own = self.own_domain.to_ascii_lowercase();
        url.host_str()
            .map(|host| {
                let host = host.to_ascii_lowercase();
                host == own || host.ends_with(&format!(".{own}"))
            })
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Technology,
    Food,
    Health,
    General,
}

/// A URL built as `prefix` + term. Each word of the term is percent-encoded
/// and the words are joined with `space`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlTemplate {
    pub prefix: &'static str,
    pub space: &'static str,
}

const fn tpl(prefix: &'static str, space: &'static str) -> UrlTemplate {
    UrlTemplate { prefix, space }
}

impl UrlTemplate {
    pub fn render(&self, term: &str) -> String {
        let words: Vec<String> = term
            .split(' ')
            .map(|word| url::form_urlencoded::byte_serialize(word.as_bytes()).collect())
            .collect();
        format!("{}{}", self.prefix, words.join(self.space))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    pub category: Category,
    /// Matched as substrings of the lowercased term.
    pub keywords: &'static [&'static str],
    pub templates: &'static [UrlTemplate],
}

impl CategoryRule {
    pub fn matches(&self, term: &str) -> bool {
        let lower = term.to_lowercase();
        self.keywords.iter().any(|keyword| lower.contains(keyword))
    }

    pub fn urls(&self, term: &str) -> Vec<String> {
        self.templates.iter().map(|t| t.render(term)).collect()
    }
}

/// Ordered keyword rules, first match wins, with a mandatory catch-all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    rules: Vec<CategoryRule>,
    catch_all: CategoryRule,
}

impl CategoryTable {
    pub fn new(rules: Vec<CategoryRule>, catch_all: CategoryRule) -> Self {
        Self { rules, catch_all }
    }

    pub fn classify(&self, term: &str) -> &CategoryRule {
        self.rules
            .iter()
            .find(|rule| rule.matches(term))
            .unwrap_or(&self.catch_all)
    }

    pub fn urls_for(&self, term: &str) -> Vec<String> {
        self.classify(term).urls(term)
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::new(
            vec![
                CategoryRule {
                    category: Category::Technology,
                    keywords: TECHNOLOGY_KEYWORDS,
                    templates: TECHNOLOGY_URLS,
                },
                CategoryRule {
                    category: Category::Food,
                    keywords: FOOD_KEYWORDS,
                    templates: FOOD_URLS,
                },
                CategoryRule {
                    category: Category::Health,
                    keywords: HEALTH_KEYWORDS,
                    templates: HEALTH_URLS,
                },
            ],
            CategoryRule {
                category: Category::General,
                keywords: &[],
                templates: GENERAL_URLS,
            },
        )
    }
}

const TECHNOLOGY_KEYWORDS: &[&str] = &[
    "python",
    "javascript",
    "programming",
    "coding",
    "llm",
    "ai",
    "machine learning",
    "software",
];

const FOOD_KEYWORDS: &[&str] = &[
    "recipe", "cooking", "food", "apple", "apples", "cake", "chicken", "pasta",
];

const HEALTH_KEYWORDS: &[&str] = &["health", "medicine", "disease", "treatment", "symptoms"];

const WIKIPEDIA: UrlTemplate = tpl("https://en.wikipedia.org/wiki/", "_");

const TECHNOLOGY_URLS: &[UrlTemplate] = &[
    WIKIPEDIA,
    tpl("https://stackoverflow.com/search?q=", "+"),
    tpl("https://github.com/search?q=", "+"),
    tpl("https://docs.python.org/3/search.html?q=", "+"),
    tpl("https://developer.mozilla.org/en-US/search?q=", "+"),
    tpl("https://www.reddit.com/search/?q=", "+"),
    tpl("https://medium.com/search?q=", "+"),
    tpl("https://dev.to/search?q=", "+"),
    tpl("https://www.geeksforgeeks.org/", "-"),
    tpl("https://towardsdatascience.com/search?q=", "+"),
    tpl("https://www.kaggle.com/search?q=", "+"),
    tpl("https://arxiv.org/search/?query=", "+"),
    tpl("https://huggingface.co/search/full-text?q=", "+"),
    tpl("https://openai.com/search/?query=", "+"),
    tpl("https://www.tensorflow.org/s/results?q=", "+"),
];

const FOOD_URLS: &[UrlTemplate] = &[
    WIKIPEDIA,
    tpl("https://www.allrecipes.com/search/results/?search=", "+"),
    tpl("https://www.foodnetwork.com/search/", "-"),
    tpl("https://www.epicurious.com/search/", "%20"),
    tpl("https://www.bbcgoodfood.com/search/recipes?query=", "+"),
    tpl("https://www.delish.com/search/?q=", "+"),
    tpl("https://www.taste.com.au/search?q=", "+"),
    tpl("https://www.bonappetit.com/search?q=", "+"),
    tpl("https://www.foodandwine.com/search?q=", "+"),
    tpl("https://www.simplyrecipes.com/search?q=", "+"),
    tpl("https://www.kitchn.com/search?q=", "+"),
    tpl("https://www.seriouseats.com/search?q=", "+"),
    tpl("https://www.marthastewart.com/search?q=", "+"),
    tpl("https://www.recipetineats.com/?s=", "+"),
    tpl("https://www.tasteofhome.com/search/?q=", "+"),
];

const HEALTH_URLS: &[UrlTemplate] = &[
    WIKIPEDIA,
    tpl("https://www.mayoclinic.org/search/search-results?q=", "+"),
    tpl(
        "https://www.webmd.com/search/search_results/default.aspx?query=",
        "+",
    ),
    tpl("https://medlineplus.gov/search/?query=", "+"),
    tpl("https://www.healthline.com/search?q1=", "+"),
    tpl("https://www.medicalnewstoday.com/search?q=", "+"),
    tpl("https://www.health.com/search?q=", "+"),
    tpl("https://www.verywellhealth.com/search?q=", "+"),
    tpl("https://www.nhs.uk/search/?q=", "+"),
    tpl("https://www.drugs.com/search.php?searchterm=", "+"),
    tpl("https://www.everydayhealth.com/search/?q=", "+"),
    tpl("https://www.prevention.com/search/?q=", "+"),
    tpl("https://www.womenshealthmag.com/search/?q=", "+"),
    tpl("https://www.menshealth.com/search/?q=", "+"),
    tpl("https://www.healthcentral.com/search?q=", "+"),
];

const GENERAL_URLS: &[UrlTemplate] = &[
    WIKIPEDIA,
    tpl("https://www.britannica.com/search?query=", "+"),
    tpl("https://www.reddit.com/search/?q=", "+"),
    tpl("https://www.quora.com/search?q=", "+"),
    tpl("https://medium.com/search?q=", "+"),
    tpl("https://scholar.google.com/scholar?q=", "+"),
    tpl("https://www.youtube.com/results?search_query=", "+"),
    tpl("https://www.coursera.org/search?query=", "%20"),
    tpl("https://www.udemy.com/courses/search/?q=", "+"),
    tpl("https://www.khanacademy.org/search?page_search_query=", "+"),
    tpl("https://www.ted.com/search?q=", "+"),
    tpl("https://www.investopedia.com/search?q=", "+"),
    tpl("https://www.howstuffworks.com/search.php?terms=", "+"),
    tpl("https://www.nationalgeographic.com/search?q=", "+"),
    tpl("https://www.smithsonianmag.com/search/?q=", "+"),
];

const DEFAULT_SET: &[UrlTemplate] = &[
    WIKIPEDIA,
    tpl("https://www.reddit.com/search/?q=", "+"),
    tpl("https://medium.com/search?q=", "+"),
];

/// Last-resort reference URLs; never empty.
pub fn default_set_urls(term: &str) -> Vec<String> {
    DEFAULT_SET.iter().map(|t| t.render(term)).collect()
}

/// Pure part of candidate resolution: pick the first non-empty tier, dedupe
/// preserving order, truncate to `max`.
pub fn cascade(
    live: Vec<String>,
    term: &str,
    table: &CategoryTable,
    max: usize,
) -> Vec<PageTask> {
    let (urls, provenance) = if live.is_empty() {
        (table.urls_for(term), Provenance::CategoryTable)
    } else {
        (live, Provenance::Search)
    };

    let tasks = dedupe_truncate(urls, provenance, max);
    if !tasks.is_empty() {
        return tasks;
    }
    dedupe_truncate(default_set_urls(term), Provenance::DefaultSet, max)
}

/// Candidates are keyed on their normalized form; unparsable ones are dropped.
fn dedupe_truncate(urls: Vec<String>, provenance: Provenance, max: usize) -> Vec<PageTask> {
    let mut seen = HashSet::new();
    urls.iter()
        .filter_map(|raw| Url::parse(raw.trim()).ok())
        .map(|url| normalize_url(&url))
        .filter(|url| seen.insert(url.clone()))
        .take(max)
        .map(|url| PageTask::new(url, provenance))
        .collect()
}

/// Query the provider. Any failure is logged and yields no links.
pub async fn live_candidates(
    fetcher: &dyn Fetcher,
    provider: &SearchProvider,
    term: &SearchTerm,
    limit: usize,
    sink: &dyn EventSink,
) -> Vec<String> {
    let query_url = provider.query_url(term.as_str());
    let output = match fetcher.fetch(&query_url).await {
        Ok(output) => output,
        Err(err) => {
            engine_warn!("search provider query {query_url} failed: {err}");
            sink.log(&format!("Search provider query failed: {err}"));
            return Vec::new();
        }
    };
    match decode_html(&output.bytes, output.metadata.content_type.as_deref()) {
        Ok(html) => provider.parse_results(&html, limit),
        Err(err) => {
            sink.log(&format!("Search provider response unreadable: {err}"));
            Vec::new()
        }
    }
}

pub async fn resolve_candidates(
    fetcher: &dyn Fetcher,
    term: &SearchTerm,
    config: &DiscoveryConfig,
    table: &CategoryTable,
    sink: &dyn EventSink,
) -> Result<Vec<PageTask>, EngineError> {
    sink.log(&format!("Trying to fetch search results for '{term}'..."));
    let live = live_candidates(
        fetcher,
        &config.provider,
        term,
        config.max_candidates,
        sink,
    )
    .await;
    if live.is_empty() {
        sink.log("Using fallback URL strategy...");
    }

    let tasks = cascade(live, term.as_str(), table, config.max_candidates);
    match tasks.first().map(|task| task.provenance) {
        None => return Err(EngineError::NoCandidates),
        Some(Provenance::DefaultSet) => sink.log("No URLs found - using default websites"),
        Some(_) => {}
    }
    sink.log(&format!("Found {} URLs to check", tasks.len()));
    Ok(tasks)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Relevant {
        title: String,
        description: Option<String>,
    },
    Irrelevant {
        title: String,
    },
    Errored {
        reason: String,
    },
}

pub async fn classify(
    fetcher: &dyn Fetcher,
    extractor: &dyn Extractor,
    url: &str,
    term: &SearchTerm,
    rules: &[VariantRule],
) -> Classification {
    match fetch_page(fetcher, extractor, url).await {
        Ok(page) => classify_page(&page, term, rules),
        Err(err) => Classification::Errored {
            reason: err.to_string(),
        },
    }
}

pub fn classify_page(page: &ParsedPage, term: &SearchTerm, rules: &[VariantRule]) -> Classification {
    let title = page.title.clone().unwrap_or_else(|| NO_TITLE.to_string());
    if !is_relevant(&page.visible_text, term.as_str(), rules) {
        return Classification::Irrelevant { title };
    }
    Classification::Relevant {
        title,
        description: page.meta_description.as_deref().map(describe),
    }
}

fn describe(meta: &str) -> String {
    let cut: String = meta.chars().take(DESCRIPTION_LIMIT).collect();
    format!("{cut}...")
}

/// One discovery run: resolve candidates, then probe each in order.
pub struct DiscoveryEngine<'a> {
    fetcher: &'a dyn Fetcher,
    extractor: &'a dyn Extractor,
    sink: &'a dyn EventSink,
    cancel: &'a CancelFlag,
    term: SearchTerm,
    config: DiscoveryConfig,
    table: CategoryTable,
    rules: Vec<VariantRule>,
    visited: VisitedSet,
    state: RunState,
}

impl<'a> DiscoveryEngine<'a> {
    pub fn new(
        fetcher: &'a dyn Fetcher,
        extractor: &'a dyn Extractor,
        sink: &'a dyn EventSink,
        cancel: &'a CancelFlag,
        term: SearchTerm,
        config: DiscoveryConfig,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            sink,
            cancel,
            term,
            config,
            table: CategoryTable::default(),
            rules: DEFAULT_VARIANT_RULES.to_vec(),
            visited: VisitedSet::new(),
            state: RunState::default(),
        }
    }

    pub fn with_table(mut self, table: CategoryTable) -> Self {
        self.table = table;
        self
    }

    pub fn with_rules(mut self, rules: Vec<VariantRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn into_state(self) -> RunState {
        self.state
    }

    pub async fn run(&mut self) -> Result<RunSummary, EngineError> {
        let sink = self.sink;
        sink.log(&format!(
            "Starting website search for: '{}'",
            self.term.as_str().to_uppercase()
        ));
        sink.status("Finding relevant websites...");

        let candidates = match resolve_candidates(
            self.fetcher,
            &self.term,
            &self.config,
            &self.table,
            sink,
        )
        .await
        {
            Ok(candidates) => candidates,
            Err(err) => {
                sink.log("No URLs found to scrape");
                sink.status("No search results found");
                return Err(err);
            }
        };

        let total = candidates.len();
        sink.status(&format!("Found {total} URLs to check..."));
        sink.log(&format!("Checking websites for '{}' content...", self.term));

        for (index, task) in candidates.iter().enumerate() {
            if self.cancel.is_requested() {
                break;
            }
            if !self.visited.insert(&task.url) {
                continue;
            }
            self.check(index + 1, total, task).await;

            if index + 1 < total {
                pause(self.config.delay(), self.cancel).await;
            }
        }

        let cancelled = self.cancel.is_requested();
        self.report(total, cancelled);
        Ok(self.state.summary(cancelled))
    }

    async fn check(&mut self, position: usize, total: usize, task: &PageTask) {
        let sink = self.sink;
        sink.status(&format!(
            "Checking website {position}/{total}: {}",
            ellipsize(&task.url, 50)
        ));
        sink.log(&format!("[{position}/{total}] Checking: {}", task.url));

        let classification =
            classify(self.fetcher, self.extractor, &task.url, &self.term, &self.rules).await;
        self.state.pages_processed += 1;

        let result = match classification {
            Classification::Errored { reason } => {
                engine_warn!("discovery fetch {} failed: {reason}", task.url);
                sink.log(&format!("   Error: {reason}"));
                return;
            }
            Classification::Relevant { title, description } => {
                sink.log("   RELEVANT SITE FOUND!");
                sink.log(&format!("   Title: {title}"));
                if let Some(description) = &description {
                    sink.log(&format!("   Description: {description}"));
                }
                self.state.total_matches += 1;
                PageResult {
                    url: task.url.clone(),
                    title,
                    indicator: MatchIndicator::Relevance {
                        relevant: true,
                        description,
                    },
                }
            }
            Classification::Irrelevant { title } => {
                sink.log(&format!("   Not relevant to '{}'", self.term));
                PageResult {
                    url: task.url.clone(),
                    title,
                    indicator: MatchIndicator::Relevance {
                        relevant: false,
                        description: None,
                    },
                }
            }
        };
        sink.result(&result);
        self.state.results.push(result);
    }

    fn report(&self, total: usize, cancelled: bool) {
        let sink = self.sink;
        sink.log("SCRAPING COMPLETE - SUMMARY");
        sink.log(&format!("Search term: '{}'", self.term));
        sink.log(&format!("Total sites checked: {}", self.state.pages_processed));
        sink.log(&format!("Relevant sites found: {}", self.state.total_matches));

        let relevant: Vec<&PageResult> = self
            .state
            .results
            .iter()
            .filter(|result| result.indicator.is_match())
            .collect();
        if relevant.is_empty() {
            sink.log(
                "No relevant sites found. Try a different search term or check your internet connection.",
            );
        } else {
            sink.log(&format!(
                "SITES CONTAINING '{}':",
                self.term.as_str().to_uppercase()
            ));
            for (index, site) in relevant.iter().enumerate() {
                sink.log(&format!("{}. {}", index + 1, site.title));
                sink.log(&format!("   URL: {}", site.url));
                if let MatchIndicator::Relevance {
                    description: Some(description),
                    ..
                } = &site.indicator
                {
                    sink.log(&format!("   Description: {description}"));
                }
            }
        }

        if cancelled {
            sink.log(&format!(
                "Search stopped by user after {} of {total} sites.",
                self.state.pages_processed
            ));
            sink.status("Search stopped by user");
        } else {
            sink.status("Scraping completed successfully!");
        }
    }
}
