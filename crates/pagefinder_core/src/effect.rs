use pagefinder_engine::RunRequest;

/// Work the shell performs on the worker handle after an update.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartRun(RunRequest),
    RequestStop,
}
