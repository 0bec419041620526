use pagefinder_engine::{CrawlConfig, DiscoveryConfig, EngineEvent};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited the search term box.
    TermChanged(String),
    /// User edited the starting URL box (crawl mode).
    SeedChanged(String),
    ModeSelected(crate::SearchMode),
    CrawlSettingsChanged(CrawlConfig),
    DiscoverySettingsChanged(DiscoveryConfig),
    /// Restore persisted inputs and settings.
    RestoreSettings(crate::Settings),
    /// User clicked Start.
    StartClicked,
    /// User pressed Enter in the search term box; same as Start.
    TermSubmitted,
    /// User clicked Stop.
    StopClicked,
    /// User clicked Clear Results.
    ClearClicked,
    /// Event drained from the worker channel.
    Engine(EngineEvent),
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
