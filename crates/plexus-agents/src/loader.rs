use std::collections::HashMap;
use std::sync::Mutex;

use plexus_types::{AgentDescriptor, AgentKind, ToolDescriptor};

use crate::error::{Error, Result};
use crate::registry::{agent_descriptors, tool_descriptors};

/// On-demand, cached view over the static agent/tool registry.
///
/// Resolution is cheap (a linear scan over a handful of entries) but the
/// planner calls it per task per path, so results are memoized behind a
/// mutex rather than re-scanned every time.
pub struct ToolLoader {
    agents: Vec<AgentDescriptor>,
    tools: Vec<ToolDescriptor>,
    cache: Mutex<HashMap<String, ToolDescriptor>>,
}

impl ToolLoader {
    pub fn new() -> Self {
        Self {
            agents: agent_descriptors(),
            tools: tool_descriptors(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn agents(&self) -> &[AgentDescriptor] {
        &self.agents
    }

    pub fn agent(&self, kind: AgentKind) -> Option<&AgentDescriptor> {
        self.agents.iter().find(|a| a.kind == kind)
    }

    /// Resolves a tool by id, enforcing that `agent_id` is allowed to call
    /// it according to the owning agent's allow-list.
    pub fn resolve(&self, agent_kind: AgentKind, tool_id: &str) -> Result<ToolDescriptor> {
        if let Some(cached) = self.cache.lock().expect("tool loader cache poisoned").get(tool_id) {
            return self.check_authorized(agent_kind, cached);
        }

        let tool = self
            .tools
            .iter()
            .find(|t| t.tool_id == tool_id)
            .cloned()
            .ok_or_else(|| Error::UnknownTool(tool_id.to_string()))?;

        self.cache
            .lock()
            .expect("tool loader cache poisoned")
            .insert(tool_id.to_string(), tool.clone());

        self.check_authorized(agent_kind, &tool)
    }

    fn check_authorized(&self, agent_kind: AgentKind, tool: &ToolDescriptor) -> Result<ToolDescriptor> {
        let agent = self
            .agent(agent_kind)
            .ok_or_else(|| Error::UnknownAgent(agent_kind.id().to_string()))?;
        if !agent.allowed_tools.contains(&tool.tool_id) {
            return Err(Error::UnauthorizedTool {
                tool_id: tool.tool_id.clone(),
                agent_id: agent_kind.id().to_string(),
            });
        }
        Ok(tool.clone())
    }

    pub fn tools_for(&self, agent_kind: AgentKind) -> Vec<ToolDescriptor> {
        self.tools
            .iter()
            .filter(|t| t.owner_agent == agent_kind)
            .cloned()
            .collect()
    }
}

impl Default for ToolLoader {
    fn default() -> Self {
        Self::new()
    }
}
