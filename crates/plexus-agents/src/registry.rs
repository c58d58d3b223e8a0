use plexus_types::{AgentDescriptor, AgentKind, FieldType, SchemaField, SideEffect, ToolDescriptor};

fn field(name: &str, field_type: FieldType, required: bool) -> SchemaField {
    SchemaField {
        name: name.to_string(),
        field_type,
        required,
        description: None,
    }
}

/// The statically known set of worker agents the planner can route
/// subtasks to. New agent kinds are added here and in
/// [`plexus_types::AgentKind`] together.
pub fn agent_descriptors() -> Vec<AgentDescriptor> {
    vec![
        AgentDescriptor {
            kind: AgentKind::MarketDataSql,
            display_name: "Market Data (SQL)".into(),
            description: "Queries historical and current market data (prices, OHLC bars, volumes) via SQL-style filters.".into(),
            keywords: vec!["price".into(), "closing".into(), "close".into(), "market".into(), "ohlc".into(), "volume".into(), "futures".into(), "option".into(), "options".into()],
            allowed_tools: vec!["market_data_sql.query".into()],
        },
        AgentDescriptor {
            kind: AgentKind::PredictionMarketSearch,
            display_name: "Prediction Market Search".into(),
            description: "Searches prediction markets (e.g. Polymarket, Kalshi) for contracts matching a topic.".into(),
            keywords: vec!["prediction".into(), "market".into(), "odds".into(), "probability".into(), "bitcoin".into(), "election".into()],
            allowed_tools: vec!["prediction_market_search.search".into()],
        },
        AgentDescriptor {
            kind: AgentKind::WebPuller,
            display_name: "Web Puller".into(),
            description: "Fetches and extracts content from web pages.".into(),
            keywords: vec!["website".into(), "article".into(), "page".into(), "url".into(), "web".into()],
            allowed_tools: vec!["web_puller.fetch".into()],
        },
        AgentDescriptor {
            kind: AgentKind::EventPuller,
            display_name: "Event Puller".into(),
            description: "Fetches structured event data (calendars, earnings dates, economic releases).".into(),
            keywords: vec!["event".into(), "earnings".into(), "calendar".into(), "release".into(), "schedule".into()],
            allowed_tools: vec!["event_puller.fetch".into()],
        },
        AgentDescriptor {
            kind: AgentKind::MessagePuller,
            display_name: "Message Puller".into(),
            description: "Fetches messages from chat/news feeds (Discord, Telegram, RSS) for a topic.".into(),
            keywords: vec!["message".into(), "chat".into(), "feed".into(), "news".into(), "discussion".into()],
            allowed_tools: vec!["message_puller.fetch".into()],
        },
        AgentDescriptor {
            kind: AgentKind::Analytics,
            display_name: "Analytics".into(),
            description: "Computes derived statistics (returns, correlations, aggregates) over upstream task outputs.".into(),
            keywords: vec!["correlation".into(), "average".into(), "trend".into(), "compare".into(), "analyze".into(), "analysis".into()],
            allowed_tools: vec!["analytics.compute".into()],
        },
    ]
}

/// The statically known set of invocable tools. Each tool's `owner_agent`
/// must be one the corresponding [`AgentDescriptor::allowed_tools`] lists.
pub fn tool_descriptors() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            tool_id: "market_data_sql.query".into(),
            display_name: "Market Data SQL Query".into(),
            description: "Runs a filtered query over historical market data.".into(),
            owner_agent: AgentKind::MarketDataSql,
            side_effect: SideEffect::ReadOnly,
            parameters: vec![
                field("symbol_pattern", FieldType::String, true),
                field("field", FieldType::String, true),
                field("conditions", FieldType::String, false),
                field("values", FieldType::Array, false),
                field("start_date", FieldType::DateTime, false),
                field("end_date", FieldType::DateTime, false),
                field("order_by_column", FieldType::String, false),
                field("order_by_direction", FieldType::String, false),
                field("limit", FieldType::Integer, false),
            ],
            output_fields: vec![
                field("symbol", FieldType::String, true),
                field("value", FieldType::Float, true),
                field("as_of", FieldType::DateTime, true),
            ],
        },
        ToolDescriptor {
            tool_id: "prediction_market_search.search".into(),
            display_name: "Prediction Market Search".into(),
            description: "Searches prediction markets for contracts matching a topic.".into(),
            owner_agent: AgentKind::PredictionMarketSearch,
            side_effect: SideEffect::ReadOnly,
            parameters: vec![
                field("topic", FieldType::String, true),
                field("limit", FieldType::Integer, false),
                field("session_id", FieldType::String, false),
            ],
            output_fields: vec![
                field("contract_name", FieldType::String, true),
                field("probability", FieldType::Float, true),
            ],
        },
        ToolDescriptor {
            tool_id: "web_puller.fetch".into(),
            display_name: "Web Fetch".into(),
            description: "Fetches and extracts text content from a web page.".into(),
            owner_agent: AgentKind::WebPuller,
            side_effect: SideEffect::ReadOnly,
            parameters: vec![field("url", FieldType::String, true)],
            output_fields: vec![field("text", FieldType::String, true)],
        },
        ToolDescriptor {
            tool_id: "event_puller.fetch".into(),
            display_name: "Event Fetch".into(),
            description: "Fetches structured events matching a topic and date range.".into(),
            owner_agent: AgentKind::EventPuller,
            side_effect: SideEffect::ReadOnly,
            parameters: vec![
                field("topic", FieldType::String, true),
                field("start_date", FieldType::DateTime, false),
                field("end_date", FieldType::DateTime, false),
            ],
            output_fields: vec![
                field("title", FieldType::String, true),
                field("occurs_at", FieldType::DateTime, true),
            ],
        },
        ToolDescriptor {
            tool_id: "message_puller.fetch".into(),
            display_name: "Message Fetch".into(),
            description: "Fetches recent messages matching a topic from a configured feed.".into(),
            owner_agent: AgentKind::MessagePuller,
            side_effect: SideEffect::ReadOnly,
            parameters: vec![
                field("topic", FieldType::String, true),
                field("limit", FieldType::Integer, false),
            ],
            output_fields: vec![
                field("author", FieldType::String, true),
                field("body", FieldType::String, true),
            ],
        },
        ToolDescriptor {
            tool_id: "analytics.compute".into(),
            display_name: "Analytics Compute".into(),
            description: "Computes a derived statistic over one or more upstream artifacts.".into(),
            owner_agent: AgentKind::Analytics,
            side_effect: SideEffect::ReadOnly,
            parameters: vec![
                field("operation", FieldType::String, true),
                field("inputs", FieldType::Array, true),
            ],
            output_fields: vec![field("result", FieldType::Float, true)],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tool_owner_allows_the_tool() {
        let agents = agent_descriptors();
        for tool in tool_descriptors() {
            let owner = agents.iter().find(|a| a.kind == tool.owner_agent).unwrap();
            assert!(
                owner.allowed_tools.contains(&tool.tool_id),
                "{} not in {}'s allow-list",
                tool.tool_id,
                owner.display_name
            );
        }
    }
}
