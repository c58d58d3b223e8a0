//! Shared data model for the plexus query engine: the types every other
//! `plexus-*` crate passes across its boundary. No behavior lives here
//! beyond small constructors and invariant checks.

mod agent;
mod artifact;
mod error;
mod ids;
mod result;
mod store;
mod subtask;

pub use agent::{AgentDescriptor, AgentKind, FieldType, SchemaField, SideEffect, ToolDescriptor};
pub use artifact::{Artifact, ArtifactManifest, ArtifactPayload};
pub use error::{Error, InvalidPlanReason, Result};
pub use ids::{generate_run_id, generate_session_id, RunId, SessionContext, SessionId};
pub use result::{AgentSummary, ConsolidatedResult, RunMetadata, RunResult, ValidationResult};
pub use store::{RunSummary, TaskOutputRecord, TaskStatus, WorkerRunRecord};
pub use subtask::{Plan, PathPlan, Query, Subtask, ToolSelection};
