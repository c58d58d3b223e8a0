use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Sqlite(rusqlite::Error),
    Io(std::io::Error),
    Json(serde_json::Error),
    /// A worker tried to start a task that already has a non-terminal run
    /// recorded for the same `(run_id, task_id)`.
    AlreadyStarted { run_id: String, task_id: String },
    NotFound { run_id: String, task_id: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Sqlite(e) => write!(f, "sqlite error: {}", e),
            Error::Io(e) => write!(f, "io error: {}", e),
            Error::Json(e) => write!(f, "json error: {}", e),
            Error::AlreadyStarted { run_id, task_id } => write!(
                f,
                "task '{}' already started for run '{}'",
                task_id, run_id
            ),
            Error::NotFound { run_id, task_id } => {
                write!(f, "no record for task '{}' in run '{}'", task_id, run_id)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Sqlite(e) => Some(e),
            Error::Io(e) => Some(e),
            Error::Json(e) => Some(e),
            Error::AlreadyStarted { .. } | Error::NotFound { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Sqlite(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

impl From<Error> for plexus_types::Error {
    fn from(e: Error) -> Self {
        plexus_types::Error::TaskStoreError(e.to_string())
    }
}
