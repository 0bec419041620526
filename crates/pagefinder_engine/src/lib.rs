//! Pagefinder engine: candidate discovery, same-host crawling and the
//! background worker that drives them.
mod config;
pub mod crawl;
pub mod discovery;
mod error;
mod extract;
mod fetch;
mod frontier;
mod links;
mod progress;
pub mod relevance;
mod types;
mod worker;

pub use config::{CrawlConfig, DiscoveryConfig};
pub use crawl::{normalize_seed, CrawlEngine};
pub use discovery::{
    cascade, classify, classify_page, resolve_candidates, Category, CategoryRule, CategoryTable,
    Classification, DiscoveryEngine, SearchProvider, UrlTemplate,
};
pub use error::EngineError;
pub use extract::{decode_html, parse_html, Anchor, Extractor, ParseError, ParsedPage, VisibleTextExtractor};
pub use fetch::{fetch_page, FetchSettings, Fetcher, ReqwestFetcher, DEFAULT_USER_AGENT};
pub use frontier::{Frontier, VisitedSet};
pub use links::{resolve_url, same_domain_links, same_host};
pub use progress::{CancelFlag, ChannelSink, EventSink};
pub use relevance::{count_occurrences, is_relevant, VariantRule, DEFAULT_VARIANT_RULES};
pub use types::{
    ellipsize, normalize_url, EngineEvent, FailureKind, FetchError, FetchMetadata, FetchOutput,
    MatchIndicator, PageResult, PageTask, Provenance, RunState, RunSummary, SearchTerm, NO_TITLE,
    TERM_PLACEHOLDER,
};
pub use worker::{RunMode, RunRequest, StartOutcome, WorkerHandle};
