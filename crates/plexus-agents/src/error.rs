use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone)]
pub enum Error {
    UnknownAgent(String),
    UnknownTool(String),
    UnauthorizedTool { tool_id: String, agent_id: String },
    ToolError { tool_id: String, cause: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownAgent(id) => write!(f, "unknown agent: {}", id),
            Error::UnknownTool(id) => write!(f, "unknown tool: {}", id),
            Error::UnauthorizedTool { tool_id, agent_id } => write!(
                f,
                "agent '{}' is not authorized to call tool '{}'",
                agent_id, tool_id
            ),
            Error::ToolError { tool_id, cause } => write!(f, "tool '{}' failed: {}", tool_id, cause),
        }
    }
}

impl std::error::Error for Error {}

impl From<Error> for plexus_types::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::UnknownAgent(id) => plexus_types::Error::UnknownTool(id),
            Error::UnknownTool(id) => plexus_types::Error::UnknownTool(id),
            Error::UnauthorizedTool { tool_id, agent_id } => {
                plexus_types::Error::UnauthorizedTool { tool_id, agent_id }
            }
            Error::ToolError { tool_id, cause } => plexus_types::Error::ToolError { tool_id, cause },
        }
    }
}
