use pagefinder_core::{update, AppState, Msg, SessionState, TITLE_DISPLAY_LIMIT, URL_DISPLAY_LIMIT};
use pagefinder_engine::{EngineEvent, MatchIndicator, PageResult, RunSummary};
use pretty_assertions::assert_eq;

fn running() -> AppState {
    let (state, _) = update(AppState::new(), Msg::TermChanged("rust".to_string()));
    update(state, Msg::StartClicked).0
}

fn engine(state: AppState, event: EngineEvent) -> AppState {
    update(state, Msg::Engine(event)).0
}

fn count_result(url: &str, title: &str, count: usize) -> PageResult {
    PageResult {
        url: url.to_string(),
        title: title.to_string(),
        indicator: MatchIndicator::Count(count),
    }
}

const SUMMARY: RunSummary = RunSummary {
    pages_processed: 3,
    pages_matched: 1,
    total_matches: 4,
    cancelled: false,
};

#[test]
fn worker_events_fill_log_status_and_rows() {
    let state = running();
    let state = engine(state, EngineEvent::Log("Starting search".to_string()));
    let state = engine(state, EngineEvent::Status("Scraping: https://a.test/".to_string()));
    let state = engine(
        state,
        EngineEvent::PageResult(count_result("https://a.test/", "A page", 4)),
    );

    let view = state.view();
    assert_eq!(view.log, vec!["Starting search".to_string()]);
    assert_eq!(view.status, "Scraping: https://a.test/");
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].matches, "4");
    assert_eq!(view.session, SessionState::Running);
}

#[test]
fn completion_returns_to_idle_and_keeps_results() {
    let state = engine(
        running(),
        EngineEvent::PageResult(count_result("https://a.test/", "A", 1)),
    );
    let state = engine(state, EngineEvent::Completed(SUMMARY));

    let view = state.view();
    assert_eq!(view.session, SessionState::Idle);
    assert!(view.start_enabled);
    assert!(!view.stop_enabled);
    assert!(!view.progress_active);
    assert_eq!(view.last_summary, Some(SUMMARY));
    assert_eq!(view.rows.len(), 1);
}

#[test]
fn failure_is_logged_and_unlocks_start() {
    let state = engine(
        running(),
        EngineEvent::Failed {
            message: "no candidate URLs could be resolved".to_string(),
        },
    );

    let view = state.view();
    assert_eq!(view.session, SessionState::Idle);
    assert_eq!(
        view.log.last().map(String::as_str),
        Some("Error: no candidate URLs could be resolved")
    );
    assert_eq!(view.last_summary, None);
}

#[test]
fn stopping_ends_on_the_terminal_event() {
    let (state, _) = update(running(), Msg::StopClicked);
    let state = engine(
        state,
        EngineEvent::Completed(RunSummary {
            cancelled: true,
            ..SUMMARY
        }),
    );
    assert_eq!(state.session(), SessionState::Idle);
}

#[test]
fn run_that_never_started_still_unlocks_start() {
    // The only events a worker that failed to spawn sends.
    let (state, _) = update(running(), Msg::StopClicked);
    let state = engine(
        state,
        EngineEvent::Status("Error occurred during scraping".to_string()),
    );
    let state = engine(
        state,
        EngineEvent::Failed {
            message: "failed to spawn worker thread: out of resources".to_string(),
        },
    );

    let view = state.view();
    assert_eq!(view.session, SessionState::Idle);
    assert!(view.start_enabled);
    assert!(!view.stop_enabled);
}

#[test]
fn new_run_drops_previous_results() {
    let state = engine(
        running(),
        EngineEvent::PageResult(count_result("https://a.test/", "A", 1)),
    );
    let state = engine(state, EngineEvent::Completed(SUMMARY));
    let (state, _) = update(state, Msg::StartClicked);

    let view = state.view();
    assert!(view.rows.is_empty());
    assert!(view.log.is_empty());
    assert_eq!(view.last_summary, None);
}

#[test]
fn clearing_twice_is_a_noop_the_second_time() {
    let state = engine(
        running(),
        EngineEvent::PageResult(count_result("https://a.test/", "A", 1)),
    );
    let state = engine(state, EngineEvent::Log("line".to_string()));
    let mut state = engine(state, EngineEvent::Completed(SUMMARY));
    state.consume_dirty();

    let (mut cleared, effects) = update(state, Msg::ClearClicked);
    assert!(effects.is_empty());
    assert!(cleared.consume_dirty());
    let view = cleared.view();
    assert!(view.rows.is_empty());
    assert!(view.log.is_empty());
    assert_eq!(view.status, "Ready");

    let (mut again, effects) = update(cleared.clone(), Msg::ClearClicked);
    assert!(effects.is_empty());
    assert!(!again.consume_dirty());
    assert_eq!(again, cleared);
}

#[test]
fn rows_are_truncated_for_display() {
    let long_url = format!("https://example.com/{}", "a".repeat(80));
    let long_title = "T".repeat(45);
    let state = engine(
        running(),
        EngineEvent::PageResult(count_result(&long_url, &long_title, 2)),
    );
    let state = engine(
        state,
        EngineEvent::PageResult(PageResult {
            url: "https://short.test/".to_string(),
            title: "Short".to_string(),
            indicator: MatchIndicator::Relevance {
                relevant: true,
                description: Some("About things...".to_string()),
            },
        }),
    );

    let rows = state.view().rows;
    assert_eq!(rows[0].url.chars().count(), URL_DISPLAY_LIMIT + 3);
    assert!(rows[0].url.ends_with("..."));
    assert_eq!(rows[0].title, format!("{}...", "T".repeat(TITLE_DISPLAY_LIMIT)));
    assert_eq!(rows[1].url, "https://short.test/");
    assert_eq!(rows[1].title, "Short");
    assert_eq!(rows[1].matches, "Yes");
    assert_eq!(rows[1].description.as_deref(), Some("About things..."));
}
