//! Pagefinder core: pure state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use state::{AppState, SearchMode, SessionState, Settings};
pub use update::update;
pub use view_model::{AppViewModel, ResultRowView, TITLE_DISPLAY_LIMIT, URL_DISPLAY_LIMIT};
