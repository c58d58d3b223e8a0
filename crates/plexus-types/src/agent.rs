use serde::{Deserialize, Serialize};

/// One of the named worker-agent kinds the planner can route subtasks to.
/// Concrete invocation behavior lives in `plexus-agents`; this crate only
/// carries the shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    MarketDataSql,
    PredictionMarketSearch,
    WebPuller,
    EventPuller,
    MessagePuller,
    Analytics,
}

impl AgentKind {
    pub fn id(&self) -> &'static str {
        match self {
            AgentKind::MarketDataSql => "market_data_sql",
            AgentKind::PredictionMarketSearch => "prediction_market_search",
            AgentKind::WebPuller => "web_puller",
            AgentKind::EventPuller => "event_puller",
            AgentKind::MessagePuller => "message_puller",
            AgentKind::Analytics => "analytics",
        }
    }

    pub fn all() -> [AgentKind; 6] {
        [
            AgentKind::MarketDataSql,
            AgentKind::PredictionMarketSearch,
            AgentKind::WebPuller,
            AgentKind::EventPuller,
            AgentKind::MessagePuller,
            AgentKind::Analytics,
        ]
    }
}

/// Describes a worker agent available to the planner: what it's for, and
/// which tools it is allowed to call (the allow-list enforced by
/// `plexus-agents::ToolLoader`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDescriptor {
    pub kind: AgentKind,
    pub display_name: String,
    pub description: String,
    /// Keywords used by Stage 1's overlap-based agent mapping.
    pub keywords: Vec<String>,
    pub allowed_tools: Vec<String>,
}

/// Primitive field types a tool's input/output schema can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    DateTime,
    Array,
    Object,
}

/// Whether calling a tool can mutate external state. Stage 2 and the
/// worker executor treat `Mutating` tools more conservatively (no
/// speculative retries).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideEffect {
    ReadOnly,
    Mutating,
}

/// A single named field in a tool's parameter or output schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Describes one invocable tool: its parameter schema, output schema, and
/// side-effect classification. The Tool Loader resolves these on demand
/// and caches them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub tool_id: String,
    pub display_name: String,
    pub description: String,
    pub owner_agent: AgentKind,
    pub side_effect: SideEffect,
    pub parameters: Vec<SchemaField>,
    pub output_fields: Vec<SchemaField>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_kind_id_round_trips_through_all() {
        for kind in AgentKind::all() {
            assert!(!kind.id().is_empty());
        }
    }
}
