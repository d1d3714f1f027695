use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::buffer::TextBuffer;
use crate::tui::constants::{STATUS_COMMAND_PALETTE, STATUS_FILTER_COLUMN, STATUS_FILTER_VALUE};
use crate::tui::filters::BuilderStage;
use crate::tui::forms::{FieldFocus, FieldTab, TaskFormFocus};

use super::{App, ConfirmChoice, InputMode};

#[derive(Debug, Clone, Copy)]
pub(crate) enum NormalAction {
    Quit,
    AddTask,
    EditTask,
    Delete,
    DeleteSelected,
    ToggleSelection,
    Search,
    OpenFilter,
    OpenChips,
    HeaderPrev,
    HeaderNext,
    ToggleSort,
    EditValue,
    NextPage,
    PrevPage,
    CyclePageSize,
    FieldEditor,
    ShowHelp,
    EnterCommand,
    SelectNext,
    SelectPrev,
    SelectFirst,
    SelectLast,
}

impl NormalAction {
    fn from_event(key: &KeyEvent) -> Option<Self> {
        if matches!(key.code, KeyCode::Char('c')) && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Self::Quit);
        }

        match key.code {
            KeyCode::Char('q') => Some(Self::Quit),
            KeyCode::Char('a') => Some(Self::AddTask),
            KeyCode::Char('e') | KeyCode::Enter => Some(Self::EditTask),
            KeyCode::Char('x') | KeyCode::Delete => Some(Self::Delete),
            KeyCode::Char('D') => Some(Self::DeleteSelected),
            KeyCode::Char(' ') => Some(Self::ToggleSelection),
            KeyCode::Char('/') => Some(Self::Search),
            KeyCode::Char('f') => Some(Self::OpenFilter),
            KeyCode::Char('c') => Some(Self::OpenChips),
            KeyCode::Char('[') | KeyCode::Left => Some(Self::HeaderPrev),
            KeyCode::Char(']') | KeyCode::Right => Some(Self::HeaderNext),
            KeyCode::Char('s') => Some(Self::ToggleSort),
            KeyCode::Char('t') => Some(Self::EditValue),
            KeyCode::Char('n') | KeyCode::PageDown => Some(Self::NextPage),
            KeyCode::Char('p') | KeyCode::PageUp => Some(Self::PrevPage),
            KeyCode::Char('z') => Some(Self::CyclePageSize),
            KeyCode::Char('m') => Some(Self::FieldEditor),
            KeyCode::Char('h') | KeyCode::Char('?') => Some(Self::ShowHelp),
            KeyCode::Char(':') => Some(Self::EnterCommand),
            KeyCode::Char('j') | KeyCode::Down => Some(Self::SelectNext),
            KeyCode::Char('k') | KeyCode::Up => Some(Self::SelectPrev),
            KeyCode::Home => Some(Self::SelectFirst),
            KeyCode::End => Some(Self::SelectLast),
            _ => None,
        }
    }
}

/// Shared single-line editing keys. Returns false when the key was not an
/// editing key.
fn edit_buffer(buffer: &mut TextBuffer, key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char(c) => buffer.insert_char(c),
        KeyCode::Backspace => buffer.backspace(),
        KeyCode::Delete => buffer.delete_char(),
        KeyCode::Left => buffer.move_left(),
        KeyCode::Right => buffer.move_right(),
        KeyCode::Home => buffer.move_home(),
        KeyCode::End => buffer.move_end(),
        _ => return false,
    }
    true
}

impl App {
    pub(crate) fn on_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.input_mode {
            InputMode::Normal => self.handle_normal_mode(key),
            InputMode::Search => self.handle_search_mode(key),
            InputMode::Command => self.handle_command_mode(key),
            InputMode::Filter => self.handle_filter_mode(key),
            InputMode::Chips => self.handle_chips_mode(key),
            InputMode::TaskForm => self.handle_task_form_mode(key),
            InputMode::FieldEditor => self.handle_field_editor_mode(key),
            InputMode::SetValue => self.handle_set_value_mode(key),
            InputMode::Help => self.handle_help_mode(key),
            InputMode::ConfirmDelete => self.handle_confirm_delete_mode(key),
        }
    }

    fn handle_normal_mode(&mut self, key: KeyEvent) -> Result<()> {
        if let Some(action) = NormalAction::from_event(&key) {
            self.execute_normal_action(action)?;
        }
        Ok(())
    }

    fn execute_normal_action(&mut self, action: NormalAction) -> Result<()> {
        match action {
            NormalAction::Quit => {
                self.should_quit = true;
            }
            NormalAction::AddTask => self.open_task_form(),
            NormalAction::EditTask => self.open_edit_form(),
            NormalAction::Delete => self.prompt_delete(),
            NormalAction::DeleteSelected => self.prompt_delete_selected(),
            NormalAction::ToggleSelection => self.toggle_selection(),
            NormalAction::Search => self.start_search(),
            NormalAction::OpenFilter => self.open_filter_builder(),
            NormalAction::OpenChips => self.open_chips(),
            NormalAction::HeaderPrev => self.move_header(false),
            NormalAction::HeaderNext => self.move_header(true),
            NormalAction::ToggleSort => self.toggle_sort_focused(),
            NormalAction::EditValue => self.edit_focused_value(),
            NormalAction::NextPage => self.next_page(),
            NormalAction::PrevPage => self.prev_page(),
            NormalAction::CyclePageSize => self.cycle_page_size(),
            NormalAction::FieldEditor => self.open_field_editor(),
            NormalAction::ShowHelp => self.show_help_overlay(),
            NormalAction::EnterCommand => {
                self.input_mode = InputMode::Command;
                self.input.set(":");
                self.update_command_suggestions();
                self.set_status_info(STATUS_COMMAND_PALETTE);
            }
            NormalAction::SelectNext => self.select_next(),
            NormalAction::SelectPrev => self.select_prev(),
            NormalAction::SelectFirst => self.select_first(),
            NormalAction::SelectLast => self.select_last(),
        }
        Ok(())
    }

    fn handle_search_mode(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Enter => {
                let query = self.input.as_str().to_string();
                self.input.clear();
                self.input_mode = InputMode::Normal;
                self.apply_search(&query);
            }
            KeyCode::Esc => {
                self.input.clear();
                self.input_mode = InputMode::Normal;
                self.status = None;
            }
            _ => {
                edit_buffer(&mut self.input, &key);
            }
        }
        Ok(())
    }

    fn handle_filter_mode(&mut self, key: KeyEvent) -> Result<()> {
        let Some(builder) = self.filter_builder.as_mut() else {
            self.input_mode = InputMode::Normal;
            return Ok(());
        };

        match key.code {
            KeyCode::Esc => {
                self.filter_builder = None;
                self.input_mode = InputMode::Normal;
                self.set_status_info("Filter cancelled");
            }
            KeyCode::Up => builder.prev_row(),
            KeyCode::Down => builder.next_row(),
            KeyCode::Enter => {
                let was_column = builder.stage == BuilderStage::Column;
                match builder.advance() {
                    Some((column, raw)) => {
                        self.filter_builder = None;
                        self.input_mode = InputMode::Normal;
                        self.apply_filter(&column, &raw);
                    }
                    None if was_column => self.set_status_info(STATUS_FILTER_VALUE),
                    None => {}
                }
            }
            KeyCode::Backspace if builder.wants_text() && !builder.value.as_str().is_empty() => {
                builder.value.backspace();
            }
            KeyCode::Backspace => {
                if builder.back() {
                    self.set_status_info(STATUS_FILTER_COLUMN);
                }
            }
            _ if builder.wants_text() => {
                edit_buffer(&mut builder.value, &key);
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_chips_mode(&mut self, key: KeyEvent) -> Result<()> {
        let len = self.board.filters().len();
        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                self.status = None;
            }
            KeyCode::Up | KeyCode::Char('k') | KeyCode::Left => self.chips.prev(len),
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Right => self.chips.next(len),
            KeyCode::Char('x') | KeyCode::Delete | KeyCode::Backspace => {
                self.remove_current_chip()
            }
            KeyCode::Char('C') => {
                self.clear_filters();
                self.input_mode = InputMode::Normal;
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_task_form_mode(&mut self, key: KeyEvent) -> Result<()> {
        let Some(form) = self.task_form.as_mut() else {
            self.input_mode = InputMode::Normal;
            return Ok(());
        };

        match key.code {
            KeyCode::Esc => {
                self.task_form = None;
                self.input_mode = InputMode::Normal;
                self.status = None;
            }
            KeyCode::Enter => self.submit_task_form(),
            KeyCode::Tab | KeyCode::Down => form.next_focus(),
            KeyCode::BackTab | KeyCode::Up => form.prev_focus(),
            KeyCode::Left if form.focus != TaskFormFocus::Title => form.cycle_choice(false),
            KeyCode::Right if form.focus != TaskFormFocus::Title => form.cycle_choice(true),
            _ if form.focus == TaskFormFocus::Title => {
                edit_buffer(&mut form.title, &key);
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_field_editor_mode(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.board.clear_field_selection();
                self.input_mode = InputMode::Normal;
                self.status = None;
                return Ok(());
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.field_form.switch_tab();
                return Ok(());
            }
            _ => {}
        }

        match self.field_form.tab {
            FieldTab::Add => self.handle_field_add_tab(key),
            FieldTab::Remove => self.handle_field_remove_tab(key),
        }
        Ok(())
    }

    fn handle_field_add_tab(&mut self, key: KeyEvent) {
        let form = &mut self.field_form;
        match key.code {
            KeyCode::Enter => self.submit_new_field(),
            KeyCode::Down => form.next_focus(),
            KeyCode::Up => form.prev_focus(),
            KeyCode::Left if form.focus == FieldFocus::Type => form.cycle_type(false),
            KeyCode::Right | KeyCode::Char(' ') if form.focus == FieldFocus::Type => {
                form.cycle_type(true)
            }
            KeyCode::Char(' ') if !form.accepts_text() => {
                form.default_checked = !form.default_checked;
            }
            _ => {
                if let Some(buffer) = form.focused_text() {
                    edit_buffer(buffer, &key);
                }
            }
        }
    }

    fn handle_field_remove_tab(&mut self, key: KeyEvent) {
        let len = self.board.schema().fields().len();
        let form = &mut self.field_form;
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                form.remove_index = form.remove_index.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if form.remove_index + 1 < len {
                    form.remove_index += 1;
                }
            }
            KeyCode::Char(' ') => self.toggle_field_for_removal(),
            KeyCode::Enter => self.remove_selected_fields(),
            _ => {}
        }
    }

    fn handle_set_value_mode(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Enter => self.submit_value(),
            KeyCode::Esc => {
                self.value_target = None;
                self.input.clear();
                self.input_mode = InputMode::Normal;
                self.status = None;
            }
            _ => {
                edit_buffer(&mut self.input, &key);
            }
        }
        Ok(())
    }

    fn handle_help_mode(&mut self, key: KeyEvent) -> Result<()> {
        if matches!(
            key.code,
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('h') | KeyCode::Char('?')
        ) {
            self.input_mode = InputMode::Normal;
            self.status = None;
        }
        Ok(())
    }

    fn handle_confirm_delete_mode(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.delete_target = None;
                self.input_mode = InputMode::Normal;
                self.set_status_info("Deletion cancelled");
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') | KeyCode::Tab => {
                self.confirm_choice = self.confirm_choice.toggle();
            }
            KeyCode::Char('y') => {
                self.perform_delete();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => {
                if self.confirm_choice == ConfirmChoice::Yes {
                    self.perform_delete();
                } else {
                    self.delete_target = None;
                    self.set_status_info("Deletion cancelled");
                }
                self.input_mode = InputMode::Normal;
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_command_mode(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Enter => {
                if let Some(s) = self.suggestions.get(self.suggestion_index) {
                    if s.fill.ends_with(' ') && self.input.as_str() != s.fill {
                        self.input.set(s.fill.clone());
                        self.update_command_suggestions();
                        return Ok(());
                    }
                    if s.fill.starts_with(self.input.as_str().trim_end()) {
                        self.input.set(s.fill.clone());
                    }
                }
                self.run_command()
            }
            KeyCode::Esc => {
                self.finish_command();
                self.status = None;
                Ok(())
            }
            KeyCode::Tab | KeyCode::Right => {
                self.accept_suggestion();
                Ok(())
            }
            KeyCode::Up => {
                if !self.suggestions.is_empty() {
                    if self.suggestion_index == 0 {
                        self.suggestion_index = self.suggestions.len() - 1;
                    } else {
                        self.suggestion_index -= 1;
                    }
                }
                Ok(())
            }
            KeyCode::Down => {
                if !self.suggestions.is_empty() {
                    self.suggestion_index = (self.suggestion_index + 1) % self.suggestions.len();
                }
                Ok(())
            }
            _ => {
                if edit_buffer(&mut self.input, &key) {
                    self.update_command_suggestions();
                }
                Ok(())
            }
        }
    }
}
