use std::fmt;

/// Result type for plexus-types operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds shared by every stage of the engine.
///
/// Individual crates wrap this in their own `Error` enum (via `From`)
/// rather than re-deriving the same variants, mirroring how
/// `agtrace-runtime::Error` wraps `agtrace_index::Error`.
#[derive(Debug, Clone)]
pub enum Error {
    /// A plan failed structural validation before execution began.
    InvalidPlan(InvalidPlanReason),
    /// Stage 2 selected a tool the agent is not allowed to call.
    UnauthorizedTool { tool_id: String, agent_id: String },
    /// Stage 2 (or the tool loader) referenced a tool id that does not exist.
    UnknownTool(String),
    /// Extracted parameters did not conform to the tool's input schema.
    SchemaViolation { tool_id: String, field: String, reason: String },
    /// A tool/agent invocation failed.
    ToolError { tool_id: String, cause: String },
    /// Per-task wall clock or dependency-wait timeout was exceeded.
    Timeout(String),
    /// The Planner collaborator could not be reached or returned an error.
    PlannerUnavailable(String),
    /// Artifact Bus publish failed at the filesystem level.
    ArtifactPublishError(String),
    /// Task Store operation failed unexpectedly.
    TaskStoreError(String),
}

#[derive(Debug, Clone)]
pub enum InvalidPlanReason {
    Cycle(Vec<String>),
    DanglingDependency { task_id: String, missing_dep: String },
    Empty,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidPlan(reason) => write!(f, "invalid plan: {}", reason),
            Error::UnauthorizedTool { tool_id, agent_id } => write!(
                f,
                "agent '{}' is not authorized to call tool '{}'",
                agent_id, tool_id
            ),
            Error::UnknownTool(tool_id) => write!(f, "unknown tool: {}", tool_id),
            Error::SchemaViolation { tool_id, field, reason } => write!(
                f,
                "schema violation for tool '{}' field '{}': {}",
                tool_id, field, reason
            ),
            Error::ToolError { tool_id, cause } => {
                write!(f, "tool '{}' failed: {}", tool_id, cause)
            }
            Error::Timeout(what) => write!(f, "timeout: {}", what),
            Error::PlannerUnavailable(msg) => write!(f, "planner unavailable: {}", msg),
            Error::ArtifactPublishError(msg) => write!(f, "artifact publish failed: {}", msg),
            Error::TaskStoreError(msg) => write!(f, "task store error: {}", msg),
        }
    }
}

impl fmt::Display for InvalidPlanReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidPlanReason::Cycle(path) => write!(f, "cycle detected: {}", path.join(" -> ")),
            InvalidPlanReason::DanglingDependency { task_id, missing_dep } => write!(
                f,
                "task '{}' depends on unknown task '{}'",
                task_id, missing_dep
            ),
            InvalidPlanReason::Empty => write!(f, "plan has no subtasks"),
        }
    }
}

impl std::error::Error for Error {}
