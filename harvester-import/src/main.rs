//! Imports a feed-task configuration file and prints it as task records
//! ready for insertion into the task table.
//!
//! Validates the file (JSON syntax, schema, unique task ids) without writing
//! anywhere; the actual insert is left to whatever state adapter the
//! deployment uses, consistent with the adapters being external to this
//! workspace. Exit codes: `0` success, `1` validation failure, `2` I/O
//! failure.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use harvester_protocol::{validate_unique_task_ids, HarvesterTask, TaskRecord};
use serde::Deserialize;

/// Import a harvester feed-task configuration file
#[derive(Parser, Debug)]
#[command(name = "harvester-import")]
#[command(about = "Validate and format a feed-task configuration file", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the JSON configuration file
    json_file: PathBuf,

    /// Only emit the task with this id
    #[arg(long = "task-id")]
    task_id: Option<String>,

    /// Output shape
    #[arg(long, value_enum, default_value_t = OutputFormat::Single)]
    format: OutputFormat,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    /// A single task record
    Single,
    /// All matching records wrapped in a batch envelope
    Batch,
    /// All matching records as a JSON array
    All,
}

/// The on-disk shape of a configuration file: a version tag plus the list
/// of tasks, mirroring the importer's original input format.
#[derive(Debug, Deserialize)]
struct ImportConfig {
    version: u32,
    tasks: Vec<HarvesterTask>,
}

#[derive(Debug, thiserror::Error)]
enum ImportError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Validation(String),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::from(0)
        }
        Err(ImportError::Validation(reason)) => {
            eprintln!("Error: {reason}");
            ExitCode::from(1)
        }
        Err(err @ ImportError::Read { .. }) => {
            eprintln!("Error: {err}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<String, ImportError> {
    let content =
        std::fs::read_to_string(&cli.json_file).map_err(|source| ImportError::Read {
            path: cli.json_file.clone(),
            source,
        })?;

    let config: ImportConfig = serde_json::from_str(&content)
        .map_err(|e| ImportError::Validation(format!("failed to parse {}: {e}", cli.json_file.display())))?;

    validate_unique_task_ids(&config.tasks).map_err(ImportError::Validation)?;

    let now = chrono::Utc::now();
    let mut records: Vec<TaskRecord> = config
        .tasks
        .into_iter()
        .map(|task| TaskRecord::new(task, now))
        .collect();

    if let Some(task_id) = &cli.task_id {
        records.retain(|record| record.task.task_id().as_str() == task_id);
        if records.is_empty() {
            return Err(ImportError::Validation(format!(
                "task id '{task_id}' not found in configuration"
            )));
        }
    }

    format_output(&records, cli.format, cli.task_id.is_some())
}

fn format_output(
    records: &[TaskRecord],
    format: OutputFormat,
    filtered_by_task_id: bool,
) -> Result<String, ImportError> {
    match format {
        OutputFormat::Single => {
            if records.len() > 1 && !filtered_by_task_id {
                eprintln!(
                    "Warning: found {} tasks, only the first will be emitted",
                    records.len()
                );
            }
            serde_json::to_string(&records[0])
                .map_err(|e| ImportError::Validation(format!("failed to serialize task record: {e}")))
        }
        OutputFormat::Batch => serde_json::to_string(&serde_json::json!({ "tasks": records }))
            .map_err(|e| ImportError::Validation(format!("failed to serialize batch: {e}"))),
        OutputFormat::All => serde_json::to_string(records)
            .map_err(|e| ImportError::Validation(format!("failed to serialize tasks: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task(id: &str) -> HarvesterTask {
        HarvesterTask::CrawlRss {
            task_id: harvester_common::ids::TaskId::new(id).unwrap(),
            tags: vec!["news".into()],
            feed_url: "https://example.com/rss".into(),
            max_items: 20,
            save_pdf: true,
        }
    }

    #[test]
    fn single_format_emits_first_record() {
        let now = chrono::Utc::now();
        let records = vec![
            TaskRecord::new(sample_task("a"), now),
            TaskRecord::new(sample_task("b"), now),
        ];
        let output = format_output(&records, OutputFormat::Single, false).unwrap();
        assert!(output.contains("\"task_id\":\"a\""));
    }

    #[test]
    fn all_format_emits_every_record() {
        let now = chrono::Utc::now();
        let records = vec![
            TaskRecord::new(sample_task("a"), now),
            TaskRecord::new(sample_task("b"), now),
        ];
        let output = format_output(&records, OutputFormat::All, false).unwrap();
        assert!(output.contains("\"a\"") && output.contains("\"b\""));
    }

    #[test]
    fn missing_task_id_filter_is_a_validation_error() {
        let config = ImportConfig {
            version: 1,
            tasks: vec![sample_task("a")],
        };
        let now = chrono::Utc::now();
        let records: Vec<TaskRecord> = config
            .tasks
            .into_iter()
            .map(|task| TaskRecord::new(task, now))
            .filter(|record| record.task.task_id().as_str() == "missing")
            .collect();
        assert!(records.is_empty());
    }
}
