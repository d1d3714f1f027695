use std::path::PathBuf;

use clap::{value_parser, Args, Parser, Subcommand};

use crate::core::sort::SortRule;
use crate::model::{Priority, Status, TaskDraft};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "taskgrid",
    version,
    about = "A local task table with filters, multi-column sorting and custom fields.",
    after_help = "Examples:\n  taskgrid                 Launch the TUI (same as `taskgrid tui`)\n  taskgrid list --filter status=Completed --sort title:asc\n  taskgrid add Renew passport --priority urgent\n  taskgrid delete 1712345678901"
)]
pub struct Cli {
    /// Override the data directory (defaults to platform-specific app dir)
    #[arg(long, value_name = "PATH", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Tracing filter directive (e.g. "info", "taskgrid_core=debug")
    #[arg(long = "log", value_name = "DIRECTIVE", global = true)]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Launch the keyboard-first terminal UI (default command)
    Tui,
    /// Print one page of tasks after filtering and sorting
    List(ListArgs),
    /// Create a task
    Add(AddArgs),
    /// Delete one or more tasks by id
    Delete(DeleteArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Filter rule as COLUMN=VALUE (repeatable; all rules must match)
    #[arg(long = "filter", value_name = "COLUMN=VALUE", value_parser = parse_filter)]
    pub filters: Vec<(String, String)>,

    /// Sort rule as COLUMN[:asc|desc] (repeatable; earlier rules take precedence)
    #[arg(long = "sort", value_name = "COLUMN[:ORDER]")]
    pub sort: Vec<SortRule>,

    /// 1-based page number
    #[arg(long, default_value_t = 1, value_parser = value_parser!(u64).range(1..))]
    pub page: u64,

    /// Rows per page
    #[arg(long = "page-size", default_value_t = 10, value_parser = value_parser!(u64).range(1..))]
    pub page_size: u64,
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Task title
    #[arg(value_name = "TITLE", required = true)]
    pub title: Vec<String>,

    /// Priority (defaults to medium)
    #[arg(long, value_enum, default_value_t = Priority::Medium)]
    pub priority: Priority,

    /// Status (defaults to not-started)
    #[arg(long, value_enum, default_value_t = Status::NotStarted)]
    pub status: Status,
}

impl From<&AddArgs> for TaskDraft {
    fn from(args: &AddArgs) -> Self {
        TaskDraft::new(args.title.join(" "))
            .with_priority(args.priority)
            .with_status(args.status)
    }
}

#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    /// One or more task ids to delete
    #[arg(value_name = "ID", required = true)]
    pub ids: Vec<u64>,
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((column, value)) if !column.trim().is_empty() => {
            Ok((column.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected COLUMN=VALUE, got '{raw}'")),
    }
}
