#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};

use pagefinder_engine::{
    CancelFlag, EngineEvent, EventSink, FailureKind, FetchError, FetchMetadata, FetchOutput,
    Fetcher,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

#[derive(Default)]
pub struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }

    pub fn logs(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                EngineEvent::Log(line) => Some(line.clone()),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// In-memory fetcher: serves registered pages, 404s everything else.
#[derive(Default)]
pub struct StubFetcher {
    pages: HashMap<String, Result<String, FailureKind>>,
    fetched: Mutex<Vec<String>>,
    cancel_on_fetch: Option<(usize, CancelFlag)>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), Ok(html.to_string()));
        self
    }

    pub fn failing(mut self, url: &str, kind: FailureKind) -> Self {
        self.pages.insert(url.to_string(), Err(kind));
        self
    }

    /// Request cancellation while serving the `nth` fetch (1-based).
    pub fn cancel_on_fetch(mut self, nth: usize, flag: CancelFlag) -> Self {
        self.cancel_on_fetch = Some((nth, flag));
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        let count = {
            let mut fetched = self.fetched.lock().unwrap();
            fetched.push(url.to_string());
            fetched.len()
        };
        if let Some((nth, flag)) = &self.cancel_on_fetch {
            if count == *nth {
                flag.request();
            }
        }

        match self.pages.get(url) {
            Some(Ok(html)) => Ok(FetchOutput {
                bytes: html.as_bytes().to_vec(),
                metadata: FetchMetadata {
                    original_url: url.to_string(),
                    final_url: url.to_string(),
                    status: 200,
                    redirect_count: 0,
                    content_type: Some("text/html; charset=utf-8".to_string()),
                },
            }),
            Some(Err(kind)) => Err(FetchError::new(kind.clone(), "stubbed failure")),
            None => Err(FetchError::new(FailureKind::HttpStatus(404), "404 Not Found")),
        }
    }
}

pub fn html_page(title: &str, body: &str) -> String {
    format!("<html><head><title>{title}</title></head><body>{body}</body></html>")
}
