use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_error, engine_info};
use url::Url;

use crate::crawl::{normalize_seed, CrawlEngine};
use crate::discovery::DiscoveryEngine;
use crate::extract::{Extractor, VisibleTextExtractor};
use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::progress::{CancelFlag, ChannelSink, EventSink};
use crate::{CrawlConfig, DiscoveryConfig, EngineError, EngineEvent, RunSummary, SearchTerm};

#[derive(Debug, Clone, PartialEq)]
pub enum RunMode {
    Discovery(DiscoveryConfig),
    Crawl { seed: String, config: CrawlConfig },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub term: String,
    pub mode: RunMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// Another run is active; nothing was changed.
    AlreadyRunning,
}

/// Validated form of a [`RunRequest`].
enum RunPlan {
    Discovery {
        term: SearchTerm,
        config: DiscoveryConfig,
    },
    Crawl {
        term: SearchTerm,
        seed: Url,
        config: CrawlConfig,
    },
}

impl RunPlan {
    fn from_request(request: RunRequest) -> Result<Self, EngineError> {
        let term = SearchTerm::parse(&request.term)?;
        match request.mode {
            RunMode::Discovery(config) => {
                config.validate()?;
                Ok(RunPlan::Discovery { term, config })
            }
            RunMode::Crawl { seed, config } => {
                config.validate()?;
                let seed = normalize_seed(&seed)?;
                Ok(RunPlan::Crawl { term, seed, config })
            }
        }
    }
}

/// Owner of the background worker. At most one run is active at a time.
pub struct WorkerHandle {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    running: Arc<AtomicBool>,
    cancel: CancelFlag,
    event_tx: mpsc::Sender<EngineEvent>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl WorkerHandle {
    pub fn new(settings: FetchSettings) -> Self {
        Self::with_collaborators(
            Arc::new(ReqwestFetcher::new(settings)),
            Arc::new(VisibleTextExtractor),
        )
    }

    pub fn with_collaborators(fetcher: Arc<dyn Fetcher>, extractor: Arc<dyn Extractor>) -> Self {
        let (event_tx, event_rx) = mpsc::channel();
        Self {
            fetcher,
            extractor,
            running: Arc::new(AtomicBool::new(false)),
            cancel: CancelFlag::new(),
            event_tx,
            event_rx,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Validate `request` and spawn a run on a background thread.
    pub fn start(&self, request: RunRequest) -> Result<StartOutcome, EngineError> {
        let plan = RunPlan::from_request(request)?;

        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            engine_info!("start ignored: a run is already active");
            ChannelSink::new(self.event_tx.clone()).status("A search is already running");
            return Ok(StartOutcome::AlreadyRunning);
        }
        self.cancel.reset();

        let fetcher = self.fetcher.clone();
        let extractor = self.extractor.clone();
        let cancel = self.cancel.clone();
        let guard = RunningGuard(self.running.clone());
        let sink = ChannelSink::new(self.event_tx.clone());

        let spawned = thread::Builder::new()
            .name("pagefinder-worker".to_string())
            .spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    execute(plan, fetcher.as_ref(), extractor.as_ref(), &sink, &cancel)
                }));
                let terminal = match outcome {
                    Ok(Ok(summary)) => EngineEvent::Completed(summary),
                    Ok(Err(err)) => {
                        engine_error!("run failed: {err}");
                        EngineEvent::Failed {
                            message: err.to_string(),
                        }
                    }
                    Err(payload) => {
                        let message = panic_message(payload.as_ref());
                        engine_error!("run aborted: {message}");
                        sink.log(&format!("Error during scraping: {message}"));
                        sink.status("Error occurred during scraping");
                        EngineEvent::Failed { message }
                    }
                };
                // Release the run slot before announcing the end so a new
                // start issued on receipt of the terminal event is accepted.
                drop(guard);
                sink.emit(terminal);
            });

        match spawned {
            Ok(_) => Ok(StartOutcome::Started),
            // The closure (and the guard inside it) was dropped with the error.
            Err(err) => Err(self.reject_start(format!("failed to spawn worker thread: {err}"))),
        }
    }

    /// A start that claimed the run slot but never ran still ends with a
    /// terminal event, so listeners leave their running state.
    fn reject_start(&self, message: String) -> EngineError {
        engine_error!("{message}");
        let sink = ChannelSink::new(self.event_tx.clone());
        sink.status("Error occurred during scraping");
        sink.emit(EngineEvent::Failed {
            message: message.clone(),
        });
        EngineError::Runtime(message)
    }

    /// Ask the active run to stop at its next checkpoint. Never blocks.
    pub fn request_stop(&self) {
        if self.is_running() {
            engine_info!("stop requested");
        }
        self.cancel.request();
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

impl Default for WorkerHandle {
    fn default() -> Self {
        Self::new(FetchSettings::default())
    }
}

/// Clears the running flag on every exit path, unwinding included.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn execute(
    plan: RunPlan,
    fetcher: &dyn Fetcher,
    extractor: &dyn Extractor,
    sink: &dyn EventSink,
    cancel: &CancelFlag,
) -> Result<RunSummary, EngineError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| EngineError::Runtime(err.to_string()))?;

    runtime.block_on(async {
        match plan {
            RunPlan::Discovery { term, config } => {
                let mut engine =
                    DiscoveryEngine::new(fetcher, extractor, sink, cancel, term, config);
                engine.run().await
            }
            RunPlan::Crawl { term, seed, config } => {
                sink.status(&format!("Crawling from {seed}"));
                let mut engine =
                    CrawlEngine::new(fetcher, extractor, sink, cancel, term, seed, config);
                Ok(engine.run().await)
            }
        }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}
