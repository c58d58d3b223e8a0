use std::sync::{Arc, Mutex};

use anyhow::Result;
use plexus_core::Config;
use plexus_exec::ProgressEvent;
use plexus_sdk::RunOptions;
use plexus_types::Query;

use crate::args::OutputFormat;
use crate::output::Paint;

pub async fn handle(
    config: Config,
    query: String,
    max_subtasks: usize,
    skip_validation: bool,
    max_parallel: Option<usize>,
    format: OutputFormat,
    paint: Paint,
) -> Result<()> {
    let mut options = RunOptions::new(config.workspace_root.clone());
    options.config = config;
    options.max_subtasks = max_subtasks;
    options.skip_validation = skip_validation;
    if let Some(max_parallel) = max_parallel {
        options.config.max_parallel = max_parallel;
    }

    if format == OutputFormat::Plain {
        let paint = paint;
        let last_printed = Arc::new(Mutex::new(()));
        options.progress = Some(Box::new(move |event: ProgressEvent| {
            let _guard = last_printed.lock().expect("progress print lock poisoned");
            match event {
                ProgressEvent::TaskStarted(task_id) => {
                    println!("  {} {}", paint.dim("->"), task_id);
                }
                ProgressEvent::TaskCompleted(task_id) => {
                    println!("  {} {}", paint.success("ok "), task_id);
                }
                ProgressEvent::TaskFailed(task_id, cause) => {
                    println!("  {} {} ({})", paint.failure("fail"), task_id, cause);
                }
                ProgressEvent::TaskSkipped(task_id, cause) => {
                    println!("  {} {} ({})", paint.warn("skip"), task_id, cause);
                }
            }
        }));
    }

    let result = plexus_sdk::run(Query::new(query), options).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Plain => {
            println!();
            println!("{}", paint.heading("answer"));
            println!("{}", result.answer_text);
            println!();
            println!(
                "{} total={} success={} failed={} unmappable={} agents=[{}]",
                paint.dim("run"),
                result.metadata.total_tasks,
                result.metadata.successful_tasks,
                result.metadata.failed_tasks,
                result.metadata.unmappable_tasks,
                result.metadata.agents_used.join(", "),
            );
            if let Some(validation) = &result.validation {
                let verdict = if validation.valid {
                    paint.success("valid")
                } else {
                    paint.failure("invalid")
                };
                println!(
                    "{} {} completeness={:.2}",
                    paint.dim("validation"),
                    verdict,
                    validation.completeness_score,
                );
                for issue in &validation.issues {
                    println!("  {} {}", paint.warn("issue:"), issue);
                }
            }
        }
    }

    if result.metadata.failed_tasks > 0 {
        std::process::exit(1);
    }

    Ok(())
}
