//! Public SDK for running plexus queries end to end.
//!
//! This crate is the facade the CLI and any embedding application build
//! on: it wires the Dependency Analyzer, Task Store, Artifact Bus, Tool
//! Loader, two-stage planner, Coder, and Worker Executor together behind
//! a single [`run`] entry point, and owns the Runner's consolidation
//! step.
//!
//! ```no_run
//! use plexus_sdk::{run, RunOptions};
//! use plexus_types::Query;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = RunOptions::new("/tmp/plexus-workspace");
//! let result = run(Query::new("show all call options"), options).await?;
//! println!("{}", result.answer_text);
//! # Ok(())
//! # }
//! ```

mod error;
mod options;
mod run;
mod runner;
mod validator;

pub use error::{Error, Result};
pub use options::RunOptions;
pub use run::run;
pub use runner::{consolidate, AnswerGenerator};
pub use validator::Validator;
