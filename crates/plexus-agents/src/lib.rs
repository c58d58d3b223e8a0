//! Static agent/tool registry and the on-demand, cached Tool Loader that
//! enforces per-agent allow-lists. Also defines the [`AgentInvoker`]
//! contract downstream executors dispatch tool calls through.

mod error;
mod invoker;
mod loader;
mod registry;

pub use error::{Error, Result};
pub use invoker::{AgentInvoker, EchoInvoker};
pub use loader::ToolLoader;
pub use registry::{agent_descriptors, tool_descriptors};
