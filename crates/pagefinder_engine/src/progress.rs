use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use engine_logging::engine_info;

use crate::{EngineEvent, PageResult};

/// Receives worker events. Implementations must be callable from the worker thread.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);

    fn log(&self, line: &str) {
        engine_info!("{line}");
        self.emit(EngineEvent::Log(line.to_string()));
    }

    fn status(&self, status: &str) {
        self.emit(EngineEvent::Status(status.to_string()));
    }

    fn result(&self, result: &PageResult) {
        self.emit(EngineEvent::PageResult(result.clone()));
    }
}

pub struct ChannelSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: EngineEvent) {
        // A dropped receiver means nobody is listening any more.
        let _ = self.tx.send(event);
    }
}

/// Cooperative stop request shared between a handle and its worker.
///
/// Relaxed ordering is enough: a late read only delays the stop by one step.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// Granularity at which a running pause notices a stop request.
const PAUSE_SLICE: Duration = Duration::from_millis(100);

/// Inter-request delay. Returns early once a stop is requested.
pub(crate) async fn pause(delay: Duration, cancel: &CancelFlag) {
    let mut remaining = delay;
    while !remaining.is_zero() && !cancel.is_requested() {
        let step = remaining.min(PAUSE_SLICE);
        tokio::time::sleep(step).await;
        remaining -= step;
    }
}
