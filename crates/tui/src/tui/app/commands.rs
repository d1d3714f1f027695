use anyhow::Result;

use crate::core::pagination::PAGE_SIZES;
use crate::tui::constants::COMMAND_HELP;

use super::{App, InputMode};

#[derive(Debug, Clone)]
pub(crate) struct Suggestion {
    pub(crate) fill: String,
    pub(crate) label: String,
}

impl Suggestion {
    fn new<F: Into<String>, L: Into<String>>(fill: F, label: L) -> Self {
        Self {
            fill: fill.into(),
            label: label.into(),
        }
    }
}

impl App {
    pub(crate) fn run_command(&mut self) -> Result<()> {
        let raw = self.input.as_str().trim().to_string();
        let Some(body) = raw.strip_prefix(':') else {
            self.set_status_error("Commands must start with ':'");
            self.finish_command();
            return Ok(());
        };
        let mut parts = body.split_whitespace();
        let Some(cmd) = parts.next().map(str::to_ascii_lowercase) else {
            self.set_status_error("Enter a command after ':'");
            self.finish_command();
            return Ok(());
        };
        let rest = parts.collect::<Vec<_>>().join(" ");

        self.finish_command();
        match cmd.as_str() {
            "help" | "h" => {
                self.set_status_info(COMMAND_HELP);
            }
            "add" => {
                if rest.is_empty() {
                    self.open_task_form();
                } else {
                    self.add_task_from_title(&rest);
                }
            }
            "search" => {
                self.apply_search(&rest);
            }
            "filter" => {
                if rest.eq_ignore_ascii_case("clear") || rest.eq_ignore_ascii_case("off") {
                    self.clear_filters();
                } else if rest.is_empty() {
                    self.open_filter_builder();
                } else {
                    self.set_status_error("Usage: :filter [clear]");
                }
            }
            "page" => match rest.parse::<usize>() {
                Ok(page) if page > 0 => {
                    self.board.set_page(page);
                    self.selected = 0;
                    self.refresh();
                    self.set_status_info(format!(
                        "Page {} of {}",
                        self.snapshot.page, self.snapshot.total_pages
                    ));
                }
                _ => self.set_status_error("Usage: :page <n>"),
            },
            "size" => match rest.parse::<usize>() {
                Ok(size) if PAGE_SIZES.contains(&size) => {
                    self.board.set_page_size(size);
                    self.refresh();
                    self.set_status_info(format!("Showing {size} rows per page"));
                }
                _ => self.set_status_error("Usage: :size <10|20|50>"),
            },
            "quit" | "q" | "exit" => {
                self.should_quit = true;
            }
            unknown => {
                self.set_status_error(format!("Unknown command: {unknown} (try :help)"));
            }
        }
        Ok(())
    }

    pub(crate) fn finish_command(&mut self) {
        self.input.clear();
        self.suggestions.clear();
        self.suggestion_index = 0;
        self.input_mode = InputMode::Normal;
    }

    pub(crate) fn update_command_suggestions(&mut self) {
        self.suggestions = build_command_suggestions(self);
        if self.suggestion_index >= self.suggestions.len() {
            self.suggestion_index = 0;
        }
    }

    pub(crate) fn accept_suggestion(&mut self) {
        if let Some(s) = self.suggestions.get(self.suggestion_index) {
            self.input.set(s.fill.clone());
            self.update_command_suggestions();
        }
    }
}

fn build_command_suggestions(app: &App) -> Vec<Suggestion> {
    let raw = app.input.as_str();
    let Some(without) = raw.strip_prefix(':') else {
        return Vec::new();
    };
    let without = without.trim_start();
    let mut tokens = without.split_whitespace();
    let first = tokens.next().unwrap_or("").to_ascii_lowercase();
    let rest = tokens.collect::<Vec<_>>().join(" ");
    let typed_space = without.ends_with(' ');

    let base = vec![
        Suggestion::new(":help", "❓ Show available commands"),
        Suggestion::new(":add ", "✚ Add a task with this title"),
        Suggestion::new(":search ", "🔍 Search task titles"),
        Suggestion::new(":filter clear", "🧹 Clear active filters"),
        Suggestion::new(":page ", "📄 Jump to a page"),
        Suggestion::new(":size ", "📏 Rows per page (10/20/50)"),
        Suggestion::new(":quit", "🚪 Quit the application"),
    ];

    if rest.is_empty() && !typed_space {
        return base
            .into_iter()
            .filter(|s| s.fill[1..].starts_with(&first))
            .collect();
    }

    match first.as_str() {
        "add" if !rest.is_empty() => vec![Suggestion::new(format!(":add {rest}"), "Add this task")],
        "search" if !rest.is_empty() => vec![Suggestion::new(
            format!(":search {rest}"),
            "Filter titles containing this text",
        )],
        "filter" => {
            if "clear".starts_with(&rest.to_ascii_lowercase()) {
                vec![Suggestion::new(":filter clear", "🧹 Clear active filters")]
            } else {
                Vec::new()
            }
        }
        "size" => PAGE_SIZES
            .iter()
            .map(|size| size.to_string())
            .filter(|size| size.starts_with(rest.as_str()))
            .map(|size| Suggestion::new(format!(":size {size}"), format!("{size} rows per page")))
            .collect(),
        "page" => {
            let total = app.snapshot.total_pages;
            (1..=total)
                .map(|page| page.to_string())
                .filter(|page| page.starts_with(rest.as_str()))
                .take(6)
                .map(|page| Suggestion::new(format!(":page {page}"), format!("Page {page} of {total}")))
                .collect()
        }
        _ => Vec::new(),
    }
}
