use std::fmt;
use std::io::Write;

use anyhow::{anyhow, Result};
use tracing::info;

use crate::cli::{AddArgs, CliCommand, DeleteArgs, ListArgs};
use crate::config::AppConfig;
use crate::core::commands as core_commands;
use crate::core::{Board, TableSnapshot};
use crate::model::{DeleteResult, TaskDraft};

pub fn execute<W: Write>(config: &AppConfig, command: CliCommand, mut writer: W) -> Result<()> {
    match command {
        CliCommand::List(args) => handle_list(config, &args, &mut writer),
        CliCommand::Add(args) => handle_add(config, &args, &mut writer),
        CliCommand::Delete(args) => handle_delete(config, &args, &mut writer),
        CliCommand::Tui => Err(anyhow!("launch interactive surfaces directly")),
    }
}

fn handle_list<W: Write>(config: &AppConfig, args: &ListArgs, mut writer: W) -> Result<()> {
    let mut board = core_commands::open_board(config)?;
    let snapshot = list_page(&mut board, args);
    write_table(&board, &snapshot, &mut writer)
}

fn list_page(board: &mut Board, args: &ListArgs) -> TableSnapshot {
    for (column, value) in &args.filters {
        board.apply_filter(column, value);
    }
    board.set_sort_rules(args.sort.clone());
    board.set_page_size(args.page_size as usize);
    board.set_page(args.page as usize);
    board.snapshot()
}

fn write_table<W: Write>(board: &Board, snapshot: &TableSnapshot, mut writer: W) -> Result<()> {
    let fields = board.schema().fields();
    let mut header = format!("{:<15} {:<40} {:<8} {:<12}", "ID", "TITLE", "PRIORITY", "STATUS");
    for field in fields {
        header.push_str(&format!(" {:<12}", field.name));
    }
    writeln!(writer, "{}", header.trim_end())?;

    for task in &snapshot.rows {
        let mut line = format!(
            "{:<15} {:<40} {:<8} {:<12}",
            task.id,
            truncate(&task.title, 40),
            task.priority.as_str(),
            task.status.as_str()
        );
        for field in fields {
            let value = board
                .schema()
                .effective_value(task, &field.name)
                .map(ToString::to_string)
                .unwrap_or_else(|| String::from("N/A"));
            line.push_str(&format!(" {:<12}", value));
        }
        writeln!(writer, "{}", line.trim_end())?;
    }

    writeln!(
        writer,
        "Page {} of {} ({} matching, {} per page)",
        snapshot.page, snapshot.total_pages, snapshot.total_matches, snapshot.page_size
    )?;
    Ok(())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn handle_add<W: Write>(config: &AppConfig, args: &AddArgs, mut writer: W) -> Result<()> {
    let draft = TaskDraft::from(args);
    if draft.title.trim().is_empty() {
        return Err(anyhow!("task title cannot be empty"));
    }
    let mut board = core_commands::open_board(config)?;
    let task = board.add_task(draft);
    info!(id = task.id, "task added from the command line");
    writeln!(
        writer,
        "Added {} [{} / {}] {}",
        task.id, task.priority, task.status, task.title
    )?;
    Ok(())
}

fn handle_delete<W: Write>(config: &AppConfig, args: &DeleteArgs, mut writer: W) -> Result<()> {
    let results = core_commands::delete_tasks(config, &args.ids)?;
    let summary = DeleteSummary::from_results(&results);
    summary.write_to(&mut writer)?;
    Ok(())
}

struct DeleteSummary {
    deleted: usize,
    missing: Vec<u64>,
}

impl DeleteSummary {
    fn from_results(results: &[DeleteResult]) -> Self {
        let deleted = results.iter().filter(|result| result.deleted).count();
        let missing = results
            .iter()
            .filter(|result| !result.deleted)
            .map(|result| result.id)
            .collect();
        Self { deleted, missing }
    }

    fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "{}", SummaryLine::deleted(self.deleted))?;
        if !self.missing.is_empty() {
            let missing: Vec<String> = self.missing.iter().map(u64::to_string).collect();
            writeln!(writer, "Not found: {}", missing.join(", "))?;
        }
        Ok(())
    }
}

enum SummaryLine {
    Deleted(usize),
    NoneDeleted,
}

impl SummaryLine {
    fn deleted(count: usize) -> Self {
        if count > 0 {
            SummaryLine::Deleted(count)
        } else {
            SummaryLine::NoneDeleted
        }
    }
}

impl fmt::Display for SummaryLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryLine::Deleted(count) => {
                write!(
                    f,
                    "Deleted {} task{}",
                    count,
                    if *count == 1 { "" } else { "s" }
                )
            }
            SummaryLine::NoneDeleted => write!(f, "No tasks deleted"),
        }
    }
}
