use std::time::Instant;

use ratatui::style::{Color, Style};
use ratatui::widgets::TableState;

use super::buffer::TextBuffer;
use super::constants::*;
use super::filters::{ChipList, FilterBuilder};
use super::forms::{FieldForm, TaskForm};
use crate::core::column::BuiltinColumn;
use crate::core::schema::{CustomFieldDefinition, CustomFieldType};
use crate::core::{Board, TableSnapshot};
use crate::model::{FieldValue, Task};

mod commands;
mod input;
mod render;
#[cfg(test)]
mod tests;

use commands::Suggestion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Normal,
    Search,
    Command,
    Filter,
    Chips,
    TaskForm,
    FieldEditor,
    SetValue,
    Help,
    ConfirmDelete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfirmChoice {
    Yes,
    No,
}

impl ConfirmChoice {
    fn toggle(self) -> Self {
        match self {
            ConfirmChoice::Yes => ConfirmChoice::No,
            ConfirmChoice::No => ConfirmChoice::Yes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DeleteTarget {
    Task { id: u64, title: String },
    Selected(usize),
}

#[derive(Debug, Clone)]
struct StatusMessage {
    text: String,
    kind: StatusKind,
    created_at: Instant,
}

impl StatusMessage {
    fn new<T: Into<String>>(text: T, kind: StatusKind) -> Self {
        Self {
            text: text.into(),
            kind,
            created_at: Instant::now(),
        }
    }

    fn style(&self) -> Style {
        match self.kind {
            StatusKind::Info => Style::default().fg(Color::Cyan),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum StatusKind {
    Info,
    Error,
}

pub(crate) struct App {
    board: Board,
    location: String,
    snapshot: TableSnapshot,
    selected: usize,
    table_state: TableState,
    header_cursor: usize,
    input_mode: InputMode,
    input: TextBuffer,
    suggestions: Vec<Suggestion>,
    suggestion_index: usize,
    status: Option<StatusMessage>,
    filter_builder: Option<FilterBuilder>,
    chips: ChipList,
    task_form: Option<TaskForm>,
    field_form: FieldForm,
    value_target: Option<(u64, CustomFieldDefinition)>,
    delete_target: Option<DeleteTarget>,
    confirm_choice: ConfirmChoice,
    should_quit: bool,
}

impl App {
    pub(crate) fn new(mut board: Board, location: String) -> Self {
        let snapshot = board.snapshot();
        let mut app = Self {
            board,
            location,
            snapshot,
            selected: 0,
            table_state: TableState::default(),
            header_cursor: 0,
            input_mode: InputMode::Normal,
            input: TextBuffer::new(),
            suggestions: Vec::new(),
            suggestion_index: 0,
            status: None,
            filter_builder: None,
            chips: ChipList::default(),
            task_form: None,
            field_form: FieldForm::default(),
            value_target: None,
            delete_target: None,
            confirm_choice: ConfirmChoice::No,
            should_quit: false,
        };
        app.refresh();
        app
    }

    /// Re-runs the pipeline and keeps the row and header cursors in range.
    pub(crate) fn refresh(&mut self) {
        self.snapshot = self.board.snapshot();
        let rows = self.snapshot.rows.len();
        if rows == 0 {
            self.selected = 0;
            self.table_state.select(None);
        } else {
            self.selected = self.selected.min(rows - 1);
            self.table_state.select(Some(self.selected));
        }
        let columns = self.sort_columns().len();
        self.header_cursor = self.header_cursor.min(columns.saturating_sub(1));
    }

    pub(crate) fn on_tick(&mut self) {
        if let Some(status) = &self.status {
            if status.created_at.elapsed() > STATUS_TTL {
                self.status = None;
            }
        }
    }

    pub(crate) fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Column keys in header order: built-ins, then one per custom field.
    fn sort_columns(&self) -> Vec<String> {
        BuiltinColumn::ALL
            .iter()
            .map(|column| column.as_str().to_string())
            .chain(
                self.board
                    .schema()
                    .fields()
                    .iter()
                    .map(|field| field.name.clone()),
            )
            .collect()
    }

    fn focused_column(&self) -> Option<String> {
        self.sort_columns().into_iter().nth(self.header_cursor)
    }

    fn selected_task(&self) -> Option<&Task> {
        self.snapshot.rows.get(self.selected)
    }

    fn select_next(&mut self) {
        if self.snapshot.rows.is_empty() {
            return;
        }
        self.selected = (self.selected + 1).min(self.snapshot.rows.len() - 1);
        self.table_state.select(Some(self.selected));
    }

    fn select_prev(&mut self) {
        if self.snapshot.rows.is_empty() {
            return;
        }
        self.selected = self.selected.saturating_sub(1);
        self.table_state.select(Some(self.selected));
    }

    fn select_first(&mut self) {
        if !self.snapshot.rows.is_empty() {
            self.selected = 0;
            self.table_state.select(Some(0));
        }
    }

    fn select_last(&mut self) {
        if !self.snapshot.rows.is_empty() {
            self.selected = self.snapshot.rows.len() - 1;
            self.table_state.select(Some(self.selected));
        }
    }

    fn select_task_by_id(&mut self, id: u64) {
        if let Some(idx) = self.snapshot.rows.iter().position(|task| task.id == id) {
            self.selected = idx;
            self.table_state.select(Some(idx));
        }
    }

    fn move_header(&mut self, forward: bool) {
        let len = self.sort_columns().len();
        if len == 0 {
            return;
        }
        self.header_cursor = if forward {
            (self.header_cursor + 1) % len
        } else {
            (self.header_cursor + len - 1) % len
        };
    }

    fn toggle_sort_focused(&mut self) {
        let Some(column) = self.focused_column() else {
            return;
        };
        self.board.toggle_sort(&column);
        self.refresh();
        self.set_status_info(format!("Sort: {}", self.board.sort_rules().summary()));
    }

    // Paging

    fn next_page(&mut self) {
        if self.board.next_page() {
            self.selected = 0;
            self.refresh();
        } else {
            self.set_status_info("Already on the last page");
        }
    }

    fn prev_page(&mut self) {
        if self.board.prev_page() {
            self.selected = 0;
            self.refresh();
        } else {
            self.set_status_info("Already on the first page");
        }
    }

    fn cycle_page_size(&mut self) {
        let size = self.board.cycle_page_size();
        self.refresh();
        self.set_status_info(format!("Showing {size} rows per page"));
    }

    // Tasks

    fn open_task_form(&mut self) {
        self.task_form = Some(TaskForm::create());
        self.input_mode = InputMode::TaskForm;
        self.set_status_info(STATUS_TASK_FORM);
    }

    fn open_edit_form(&mut self) {
        let Some(task) = self.selected_task() else {
            self.set_status_info("Nothing to edit");
            return;
        };
        self.task_form = Some(TaskForm::edit(task));
        self.input_mode = InputMode::TaskForm;
        self.set_status_info(STATUS_TASK_FORM);
    }

    /// Saves the open form. A blank title keeps the form open.
    fn submit_task_form(&mut self) {
        let Some(form) = self.task_form.as_ref() else {
            self.input_mode = InputMode::Normal;
            return;
        };
        let editing = form.editing;
        let Some(draft) = form.to_draft() else {
            return;
        };

        match editing {
            Some(id) => match self.board.update_task(id, draft) {
                Some(task) => {
                    self.refresh();
                    self.select_task_by_id(task.id);
                    self.set_status_info(format!("Updated task {}: {}", task.id, task.title));
                }
                None => self.set_status_error("Task not found"),
            },
            None => {
                let task = self.board.add_task(draft);
                self.refresh();
                self.select_task_by_id(task.id);
                self.set_status_info(format!("Created task {}: {}", task.id, task.title));
            }
        }
        self.task_form = None;
        self.input_mode = InputMode::Normal;
    }

    fn add_task_from_title(&mut self, title: &str) {
        self.task_form = Some(TaskForm::create());
        if let Some(form) = self.task_form.as_mut() {
            form.title.set(title);
        }
        self.submit_task_form();
    }

    fn toggle_selection(&mut self) {
        let Some(id) = self.selected_task().map(|task| task.id) else {
            return;
        };
        self.board.toggle_selection(id);
    }

    fn prompt_delete(&mut self) {
        let Some(task) = self.selected_task() else {
            self.set_status_info("Nothing to delete");
            return;
        };
        self.delete_target = Some(DeleteTarget::Task {
            id: task.id,
            title: task.title.clone(),
        });
        self.confirm_choice = ConfirmChoice::No;
        self.input_mode = InputMode::ConfirmDelete;
        self.set_status_info(STATUS_CONFIRM_DELETE);
    }

    fn prompt_delete_selected(&mut self) {
        let count = self.board.store().selection().len();
        if count == 0 {
            self.set_status_info("No tasks selected");
            return;
        }
        self.delete_target = Some(DeleteTarget::Selected(count));
        self.confirm_choice = ConfirmChoice::No;
        self.input_mode = InputMode::ConfirmDelete;
        self.set_status_info(STATUS_CONFIRM_DELETE);
    }

    fn perform_delete(&mut self) {
        match self.delete_target.take() {
            Some(DeleteTarget::Task { id, .. }) => {
                if self.board.delete_task(id) {
                    self.set_status_info(format!("Deleted task {id}"));
                } else {
                    self.set_status_error("Task not found");
                }
            }
            Some(DeleteTarget::Selected(_)) => {
                let removed = self.board.delete_selected();
                self.set_status_info(format!("Deleted {removed} selected task(s)"));
            }
            None => {}
        }
        self.refresh();
    }

    // Custom field values

    /// Acts on the focused custom column for the selected row: checkboxes
    /// flip in place, other types open a value prompt.
    fn edit_focused_value(&mut self) {
        let Some(id) = self.selected_task().map(|task| task.id) else {
            self.set_status_info("Nothing selected");
            return;
        };
        let field = self
            .focused_column()
            .and_then(|column| self.board.schema().field(&column).cloned());
        let Some(field) = field else {
            self.set_status_info("Move the header cursor to a custom field with [ and ]");
            return;
        };

        if field.field_type == CustomFieldType::Checkbox {
            if let Some(checked) = self.board.toggle_checkbox(id, &field.name) {
                self.refresh();
                self.set_status_info(format!(
                    "{} {}",
                    field.name,
                    if checked { "checked" } else { "unchecked" }
                ));
            }
            return;
        }

        let current = self
            .board
            .task(id)
            .and_then(|task| self.board.schema().effective_value(task, &field.name))
            .map(ToString::to_string)
            .unwrap_or_default();
        self.input.set(current);
        self.value_target = Some((id, field));
        self.input_mode = InputMode::SetValue;
        self.set_status_info(STATUS_SET_VALUE);
    }

    fn submit_value(&mut self) {
        let Some((id, field)) = self.value_target.take() else {
            self.input_mode = InputMode::Normal;
            return;
        };
        let raw = self.input.as_str().trim();
        let value = if raw.is_empty() {
            None
        } else {
            Some(match field.field_type {
                CustomFieldType::Number => raw
                    .parse::<f64>()
                    .map(FieldValue::Number)
                    .unwrap_or_else(|_| FieldValue::Text(raw.to_string())),
                CustomFieldType::Text | CustomFieldType::Checkbox => {
                    FieldValue::Text(raw.to_string())
                }
            })
        };
        self.board.set_custom_field(id, &field.name, value);
        self.input.clear();
        self.input_mode = InputMode::Normal;
        self.refresh();
        self.set_status_info(format!("Updated {} on task {id}", field.name));
    }

    // Filters

    fn start_search(&mut self) {
        let current = self
            .board
            .filters()
            .get(BuiltinColumn::Title.as_str())
            .map(|rule| rule.value.to_string())
            .unwrap_or_default();
        self.input.set(current);
        self.input_mode = InputMode::Search;
        self.set_status_info(STATUS_SEARCH);
    }

    /// Blank queries drop the title rule instead of adding one.
    fn apply_search(&mut self, query: &str) {
        if query.trim().is_empty() {
            self.board.remove_filter(BuiltinColumn::Title.as_str());
            self.set_status_info("Search cleared");
        } else {
            self.board.search_title(query);
            self.set_status_info(format!("Searching titles for '{}'", query.trim()));
        }
        self.refresh();
    }

    fn open_filter_builder(&mut self) {
        let columns = self.board.schema().filter_columns().to_vec();
        self.filter_builder = Some(FilterBuilder::new(columns));
        self.input_mode = InputMode::Filter;
        self.set_status_info(STATUS_FILTER_COLUMN);
    }

    fn apply_filter(&mut self, column: &str, raw: &str) {
        if self.board.apply_filter(column, raw) {
            self.refresh();
            self.set_status_info(format!("Filtering {column} = {}", raw.trim()));
        } else {
            self.set_status_info("Empty filter value ignored");
        }
    }

    fn open_chips(&mut self) {
        if self.board.filters().is_empty() {
            self.set_status_info("No active filters");
            return;
        }
        self.chips.clamp(self.board.filters().len());
        self.input_mode = InputMode::Chips;
        self.set_status_info(STATUS_CHIPS);
    }

    fn remove_current_chip(&mut self) {
        let column = self
            .board
            .filters()
            .rules()
            .get(self.chips.index)
            .map(|rule| rule.column.clone());
        if let Some(column) = column {
            self.board.remove_filter(&column);
            self.refresh();
            self.set_status_info(format!("Removed filter on {column}"));
        }
        self.chips.clamp(self.board.filters().len());
        if self.board.filters().is_empty() {
            self.input_mode = InputMode::Normal;
        }
    }

    fn clear_filters(&mut self) {
        self.board.clear_filters();
        self.chips = ChipList::default();
        self.refresh();
        self.set_status_info("Cleared filters");
    }

    // Field editor

    fn open_field_editor(&mut self) {
        self.field_form = FieldForm::default();
        self.input_mode = InputMode::FieldEditor;
        self.set_status_info(STATUS_FIELD_EDITOR);
    }

    /// Invalid input leaves the editor open without feedback.
    fn submit_new_field(&mut self) {
        match self.board.add_field(&self.field_form.to_draft()) {
            Ok(field) => {
                self.field_form.reset_add();
                self.input_mode = InputMode::Normal;
                self.refresh();
                self.set_status_info(format!("Added {} field '{}'", field.field_type, field.name));
            }
            Err(err) => {
                tracing::debug!(error = %err, "field input rejected");
            }
        }
    }

    fn toggle_field_for_removal(&mut self) {
        let id = self
            .board
            .schema()
            .fields()
            .get(self.field_form.remove_index)
            .map(|field| field.id.clone());
        if let Some(id) = id {
            self.board.toggle_field_selection(&id);
        }
    }

    fn remove_selected_fields(&mut self) {
        let removed = self.board.remove_selected_fields();
        if removed == 0 {
            return;
        }
        self.field_form = FieldForm::default();
        self.input_mode = InputMode::Normal;
        self.refresh();
        self.set_status_info(format!("Removed {removed} field(s)"));
    }

    fn show_help_overlay(&mut self) {
        self.input_mode = InputMode::Help;
        self.set_status_info(STATUS_HELP);
    }

    pub(crate) fn set_status_info<T: Into<String>>(&mut self, message: T) {
        let mut text = String::from("ℹ️  ");
        text.push_str(&message.into());
        self.status = Some(StatusMessage::new(text, StatusKind::Info));
    }

    pub(crate) fn set_status_error<T: Into<String>>(&mut self, message: T) {
        let mut text = String::from("⚠️  ");
        text.push_str(&message.into());
        self.status = Some(StatusMessage::new(text, StatusKind::Error));
    }
}
