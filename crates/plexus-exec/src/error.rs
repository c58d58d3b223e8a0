use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Graph(plexus_graph::Error),
    Store(plexus_store::Error),
    Artifacts(plexus_artifacts::Error),
    Agents(plexus_agents::Error),
    Timeout(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Graph(e) => write!(f, "{}", e),
            Error::Store(e) => write!(f, "{}", e),
            Error::Artifacts(e) => write!(f, "{}", e),
            Error::Agents(e) => write!(f, "{}", e),
            Error::Timeout(what) => write!(f, "timeout: {}", what),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Graph(e) => Some(e),
            Error::Store(e) => Some(e),
            Error::Artifacts(e) => Some(e),
            Error::Agents(e) => Some(e),
            Error::Timeout(_) => None,
        }
    }
}

impl From<plexus_graph::Error> for Error {
    fn from(e: plexus_graph::Error) -> Self {
        Error::Graph(e)
    }
}

impl From<plexus_store::Error> for Error {
    fn from(e: plexus_store::Error) -> Self {
        Error::Store(e)
    }
}

impl From<plexus_artifacts::Error> for Error {
    fn from(e: plexus_artifacts::Error) -> Self {
        Error::Artifacts(e)
    }
}

impl From<plexus_agents::Error> for Error {
    fn from(e: plexus_agents::Error) -> Self {
        Error::Agents(e)
    }
}

impl From<Error> for plexus_types::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Timeout(what) => plexus_types::Error::Timeout(what),
            other => plexus_types::Error::ToolError {
                tool_id: "execution".to_string(),
                cause: other.to_string(),
            },
        }
    }
}
