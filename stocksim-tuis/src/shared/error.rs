use std::fmt;

use thiserror::Error;

/// Control actions against the simulation API, named for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Start,
    Stop,
    Reset,
    FetchTraders,
}

impl ControlAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlAction::Start => "start",
            ControlAction::Stop => "stop",
            ControlAction::Reset => "reset",
            ControlAction::FetchTraders => "fetch traders",
        }
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// All errors produced by control actions in `stocksim-tuis`.
///
/// A failed action leaves every store untouched; callers log the error and
/// do not retry.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("failed to build control client: {0}")]
    Client(reqwest::Error),

    #[error("{action} request failed: {source}")]
    Http {
        action: ControlAction,
        #[source]
        source: reqwest::Error,
    },

    #[error("{action} rejected with status {status}")]
    Status {
        action: ControlAction,
        status: reqwest::StatusCode,
    },
}
