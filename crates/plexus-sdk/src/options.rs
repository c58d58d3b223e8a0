use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use plexus_agents::{AgentInvoker, EchoInvoker};
use plexus_core::Config;
use plexus_exec::ProgressEvent;
use plexus_planner::Planner;
use plexus_types::SessionId;

use crate::runner::AnswerGenerator;
use crate::validator::Validator;

/// Per-run configuration for [`crate::run`].
///
/// Construct with [`RunOptions::new`] and override only the fields a
/// caller cares about: everything else falls back to [`Config::default`]
/// and the reference [`EchoInvoker`], the same "no LLM required to
/// exercise the pipeline" posture Stage 1 and the Runner fall back to on
/// their own.
pub struct RunOptions {
    pub config: Config,
    /// Upper bound on the number of subtasks Stage 1 may produce.
    pub max_subtasks: usize,
    pub skip_validation: bool,
    /// Session identifier stamped onto prediction-market tool calls.
    /// Generated if not supplied.
    pub session_id: Option<SessionId>,
    pub cancellation_token: Option<Arc<AtomicBool>>,
    pub invoker: Arc<dyn AgentInvoker>,
    pub planner: Option<Box<dyn Planner>>,
    pub answer_generator: Option<Box<dyn AnswerGenerator>>,
    pub validator: Option<Box<dyn Validator>>,
    pub progress: Option<Box<dyn FnMut(ProgressEvent) + Send>>,
}

impl RunOptions {
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        let config = Config {
            workspace_root: workspace_root.into(),
            ..Config::default()
        };
        Self {
            max_subtasks: config.max_decomposition_depth,
            config,
            skip_validation: false,
            session_id: None,
            cancellation_token: None,
            invoker: Arc::new(EchoInvoker),
            planner: None,
            answer_generator: None,
            validator: None,
            progress: None,
        }
    }
}
