//! The Coder assembles a plan's tool selections into a flat, dispatch
//! ready [`ExecutionPlan`]. The Worker Executor then runs that plan
//! against a shared task store and artifact bus, respecting dependency
//! order, a configurable parallelism cap, per-task timeouts, and
//! upstream-failure-skip semantics.

mod coder;
mod dispatcher;
mod error;

pub use coder::{build_execution_plan, ExecutionPlan, ExecutionTask};
pub use dispatcher::{ProgressEvent, WorkerExecutor};
pub use error::{Error, Result};
