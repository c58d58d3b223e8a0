//! Two-stage query planner. Stage 1 ([`decompose`]) turns a natural
//! language query into a validated subtask DAG mapped to worker agents.
//! Stage 2 ([`plan_stage2`]) selects a tool and extracts call parameters
//! for every task on every leaf-to-root dependency path.

mod decompose;
mod error;
mod extractors;
mod select;

pub use decompose::{decompose, DraftTask, Planner};
pub use error::{Error, Result};
pub use select::plan_stage2;
