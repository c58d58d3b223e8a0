use std::collections::HashMap;

use plexus_types::ArtifactPayload;
use serde_json::Value;

use crate::error::Result;

/// Contract a worker agent implements to actually execute a tool call.
///
/// This crate only ships [`EchoInvoker`] as a reference implementation;
/// real invokers (hitting a market data warehouse, a web crawler, etc.)
/// live outside this engine and are wired in by the embedding
/// application.
pub trait AgentInvoker: Send + Sync {
    /// Invokes `tool_id` with `parameters`, returning a canonical
    /// artifact payload (`{data, metadata}`).
    fn invoke(&self, tool_id: &str, parameters: &HashMap<String, Value>) -> Result<ArtifactPayload>;
}

/// Reference invoker that echoes its parameters back as a single-row
/// artifact. Useful for exercising the planner and executor end to end
/// without a real data backend wired in.
pub struct EchoInvoker;

impl AgentInvoker for EchoInvoker {
    fn invoke(&self, tool_id: &str, parameters: &HashMap<String, Value>) -> Result<ArtifactPayload> {
        let row = serde_json::json!(parameters);
        Ok(ArtifactPayload::new(vec![row], tool_id.to_string()))
    }
}
