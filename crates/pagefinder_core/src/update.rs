use engine_logging::{engine_debug, engine_info};
use pagefinder_engine::{normalize_seed, EngineEvent, RunMode, RunRequest, SearchTerm};

use crate::state::READY_STATUS;
use crate::{AppState, Effect, Msg, SearchMode, SessionState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::TermChanged(term) => {
            state.set_term(term);
            Vec::new()
        }
        Msg::SeedChanged(seed) => {
            state.set_seed(seed);
            Vec::new()
        }
        Msg::ModeSelected(mode) => {
            state.set_mode(mode);
            Vec::new()
        }
        Msg::CrawlSettingsChanged(config) => {
            state.set_crawl(config);
            Vec::new()
        }
        Msg::DiscoverySettingsChanged(config) => {
            state.set_discovery(config);
            Vec::new()
        }
        Msg::RestoreSettings(settings) => {
            state.restore(settings);
            Vec::new()
        }
        Msg::StartClicked | Msg::TermSubmitted => start(&mut state),
        Msg::StopClicked => {
            if state.session() == SessionState::Running {
                state.begin_stop();
                state.set_status("Stopping...");
                vec![Effect::RequestStop]
            } else {
                Vec::new()
            }
        }
        Msg::ClearClicked => {
            state.clear_results();
            if state.session() == SessionState::Idle {
                state.set_status(READY_STATUS);
            }
            Vec::new()
        }
        Msg::Engine(event) => {
            apply_event(&mut state, event);
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn start(state: &mut AppState) -> Vec<Effect> {
    if state.session() != SessionState::Idle {
        engine_debug!("start ignored in session {:?}", state.session());
        state.set_status("A search is already running");
        return Vec::new();
    }

    let term = match SearchTerm::parse(state.term()) {
        Ok(term) => term,
        Err(err) => {
            state.set_status(input_message(&err));
            return Vec::new();
        }
    };

    let (mode, status) = match state.mode() {
        SearchMode::Discovery => {
            let config = state.discovery().clone();
            if let Err(err) = config.validate() {
                state.set_status(input_message(&err));
                return Vec::new();
            }
            (RunMode::Discovery(config), "Searching for relevant websites...")
        }
        SearchMode::Crawl => {
            let config = state.crawl().clone();
            let seed = match normalize_seed(state.seed()).and_then(|seed| {
                config.validate()?;
                Ok(seed)
            }) {
                Ok(seed) => seed,
                Err(err) => {
                    state.set_status(input_message(&err));
                    return Vec::new();
                }
            };
            // Show the user the URL that will actually be crawled.
            state.set_seed(seed.to_string());
            (
                RunMode::Crawl {
                    seed: seed.to_string(),
                    config,
                },
                "Starting search...",
            )
        }
    };

    engine_info!("starting {:?} run for '{term}'", state.mode());
    state.begin_run(status);
    vec![Effect::StartRun(RunRequest {
        term: term.as_str().to_string(),
        mode,
    })]
}

fn apply_event(state: &mut AppState, event: EngineEvent) {
    match event {
        EngineEvent::Log(line) => state.push_log(line),
        EngineEvent::Status(status) => state.set_status(status),
        EngineEvent::PageResult(result) => state.push_result(result),
        EngineEvent::Completed(summary) => state.finish_run(Some(summary)),
        EngineEvent::Failed { message } => {
            state.push_log(format!("Error: {message}"));
            state.finish_run(None);
        }
    }
}

/// Invalid input messages without the error-kind prefix.
fn input_message(err: &pagefinder_engine::EngineError) -> String {
    match err {
        pagefinder_engine::EngineError::InvalidInput(message) => message.clone(),
        other => other.to_string(),
    }
}
