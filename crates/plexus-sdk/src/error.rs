use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for `plexus_sdk::run`, aggregating every stage's own
/// error type the same way `agtrace_runtime::Error` aggregates
/// `agtrace_index::Error`/`agtrace_providers::Error`.
#[derive(Debug)]
pub enum Error {
    Planner(plexus_planner::Error),
    Exec(plexus_exec::Error),
    Store(plexus_store::Error),
    Types(plexus_types::Error),
    /// A validator collaborator returned an error rather than a verdict.
    Validator(String),
    /// An answer-generator collaborator returned an error rather than text.
    AnswerGenerator(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Planner(e) => write!(f, "{}", e),
            Error::Exec(e) => write!(f, "{}", e),
            Error::Store(e) => write!(f, "{}", e),
            Error::Types(e) => write!(f, "{}", e),
            Error::Validator(msg) => write!(f, "validator failed: {}", msg),
            Error::AnswerGenerator(msg) => write!(f, "answer generator failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Planner(e) => Some(e),
            Error::Exec(e) => Some(e),
            Error::Store(e) => Some(e),
            Error::Types(e) => Some(e),
            Error::Validator(_) | Error::AnswerGenerator(_) => None,
        }
    }
}

impl From<plexus_planner::Error> for Error {
    fn from(e: plexus_planner::Error) -> Self {
        Error::Planner(e)
    }
}

impl From<plexus_exec::Error> for Error {
    fn from(e: plexus_exec::Error) -> Self {
        Error::Exec(e)
    }
}

impl From<plexus_store::Error> for Error {
    fn from(e: plexus_store::Error) -> Self {
        Error::Store(e)
    }
}

impl From<plexus_types::Error> for Error {
    fn from(e: plexus_types::Error) -> Self {
        Error::Types(e)
    }
}
