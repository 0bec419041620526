use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::discovery::SearchProvider;
use crate::EngineError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub max_pages: usize,
    pub delay_seconds: f64,
    pub case_sensitive: bool,
    /// Cap on links newly queued from a single page.
    pub max_new_links_per_page: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: 10,
            delay_seconds: 1.0,
            case_sensitive: false,
            max_new_links_per_page: 10,
        }
    }
}

impl CrawlConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_pages == 0 {
            return Err(EngineError::InvalidInput(
                "max pages must be at least 1".to_string(),
            ));
        }
        delay_from_seconds(self.delay_seconds)?;
        Ok(())
    }

    pub fn delay(&self) -> Duration {
        delay_from_seconds(self.delay_seconds).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub max_candidates: usize,
    pub delay_seconds: f64,
    pub provider: SearchProvider,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_candidates: 15,
            delay_seconds: 2.0,
            provider: SearchProvider::default(),
        }
    }
}

impl DiscoveryConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_candidates == 0 {
            return Err(EngineError::InvalidInput(
                "max candidates must be at least 1".to_string(),
            ));
        }
        delay_from_seconds(self.delay_seconds)?;
        self.provider.validate()
    }

    pub fn delay(&self) -> Duration {
        delay_from_seconds(self.delay_seconds).unwrap_or_default()
    }
}

fn delay_from_seconds(seconds: f64) -> Result<Duration, EngineError> {
    Duration::try_from_secs_f64(seconds).map_err(|_| {
        EngineError::InvalidInput(format!(
            "delay must be a finite, non-negative number of seconds (got {seconds})"
        ))
    })
}
