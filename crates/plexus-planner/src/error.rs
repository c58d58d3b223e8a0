use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Graph(plexus_graph::Error),
    Agents(plexus_agents::Error),
    /// Stage 1 produced (or the planner collaborator returned) more
    /// subtasks than the configured cap allows.
    TooManySubtasks { max_subtasks: usize, found: usize },
    PlannerUnavailable(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Graph(e) => write!(f, "{}", e),
            Error::Agents(e) => write!(f, "{}", e),
            Error::TooManySubtasks { max_subtasks, found } => write!(
                f,
                "decomposition produced {} subtasks, exceeding configured max {}",
                found, max_subtasks
            ),
            Error::PlannerUnavailable(msg) => write!(f, "planner unavailable: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Graph(e) => Some(e),
            Error::Agents(e) => Some(e),
            Error::TooManySubtasks { .. } | Error::PlannerUnavailable(_) => None,
        }
    }
}

impl From<plexus_graph::Error> for Error {
    fn from(e: plexus_graph::Error) -> Self {
        Error::Graph(e)
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
            Error::PlannerUnavailable(msg) => plexus_types::Error::PlannerUnavailable(msg),
            other => plexus_types::Error::PlannerUnavailable(other.to_string()),
        }
    }
}
