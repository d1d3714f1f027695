//! Modal forms for tasks and custom-field definitions.

use crate::core::schema::{CustomFieldType, FieldDraft};
use crate::model::{Priority, Status, Task, TaskDraft};

use super::buffer::TextBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TaskFormFocus {
    Title,
    Priority,
    Status,
}

impl TaskFormFocus {
    const ORDER: [TaskFormFocus; 3] = [
        TaskFormFocus::Title,
        TaskFormFocus::Priority,
        TaskFormFocus::Status,
    ];
}

/// Create/edit form. `editing` holds the id of the task being edited.
#[derive(Debug, Clone)]
pub(crate) struct TaskForm {
    pub(crate) editing: Option<u64>,
    pub(crate) title: TextBuffer,
    pub(crate) priority: Priority,
    pub(crate) status: Status,
    pub(crate) focus: TaskFormFocus,
}

impl TaskForm {
    pub(crate) fn create() -> Self {
        Self {
            editing: None,
            title: TextBuffer::new(),
            priority: Priority::default(),
            status: Status::default(),
            focus: TaskFormFocus::Title,
        }
    }

    pub(crate) fn edit(task: &Task) -> Self {
        let mut title = TextBuffer::new();
        title.set(task.title.clone());
        Self {
            editing: Some(task.id),
            title,
            priority: task.priority,
            status: task.status,
            focus: TaskFormFocus::Title,
        }
    }

    pub(crate) fn next_focus(&mut self) {
        self.focus = cycle(&TaskFormFocus::ORDER, self.focus, true);
    }

    pub(crate) fn prev_focus(&mut self) {
        self.focus = cycle(&TaskFormFocus::ORDER, self.focus, false);
    }

    pub(crate) fn cycle_choice(&mut self, forward: bool) {
        match self.focus {
            TaskFormFocus::Title => {}
            TaskFormFocus::Priority => self.priority = cycle(&Priority::ALL, self.priority, forward),
            TaskFormFocus::Status => self.status = cycle(&Status::ALL, self.status, forward),
        }
    }

    /// `None` while the title is blank.
    pub(crate) fn to_draft(&self) -> Option<TaskDraft> {
        let title = self.title.as_str().trim();
        if title.is_empty() {
            return None;
        }
        Some(
            TaskDraft::new(title)
                .with_priority(self.priority)
                .with_status(self.status),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldTab {
    Add,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldFocus {
    Name,
    Type,
    Description,
    Default,
}

impl FieldFocus {
    const ORDER: [FieldFocus; 4] = [
        FieldFocus::Name,
        FieldFocus::Type,
        FieldFocus::Description,
        FieldFocus::Default,
    ];
}

/// Field editor with an Add tab (one definition) and a Remove tab
/// (bulk removal by selection).
#[derive(Debug, Clone)]
pub(crate) struct FieldForm {
    pub(crate) tab: FieldTab,
    pub(crate) focus: FieldFocus,
    pub(crate) name: TextBuffer,
    pub(crate) field_type: CustomFieldType,
    pub(crate) description: TextBuffer,
    pub(crate) default_text: TextBuffer,
    pub(crate) default_checked: bool,
    pub(crate) remove_index: usize,
}

impl Default for FieldForm {
    fn default() -> Self {
        Self {
            tab: FieldTab::Add,
            focus: FieldFocus::Name,
            name: TextBuffer::new(),
            field_type: CustomFieldType::Text,
            description: TextBuffer::new(),
            default_text: TextBuffer::new(),
            default_checked: false,
            remove_index: 0,
        }
    }
}

impl FieldForm {
    pub(crate) fn switch_tab(&mut self) {
        self.tab = match self.tab {
            FieldTab::Add => FieldTab::Remove,
            FieldTab::Remove => FieldTab::Add,
        };
    }

    pub(crate) fn next_focus(&mut self) {
        self.focus = cycle(&FieldFocus::ORDER, self.focus, true);
    }

    pub(crate) fn prev_focus(&mut self) {
        self.focus = cycle(&FieldFocus::ORDER, self.focus, false);
    }

    pub(crate) fn cycle_type(&mut self, forward: bool) {
        self.field_type = cycle(&CustomFieldType::ALL, self.field_type, forward);
    }

    /// Checkbox defaults and the type selector take no typed text.
    pub(crate) fn accepts_text(&self) -> bool {
        match self.focus {
            FieldFocus::Name | FieldFocus::Description => true,
            FieldFocus::Default => self.field_type != CustomFieldType::Checkbox,
            FieldFocus::Type => false,
        }
    }

    pub(crate) fn focused_text(&mut self) -> Option<&mut TextBuffer> {
        if !self.accepts_text() {
            return None;
        }
        match self.focus {
            FieldFocus::Name => Some(&mut self.name),
            FieldFocus::Description => Some(&mut self.description),
            FieldFocus::Default => Some(&mut self.default_text),
            FieldFocus::Type => None,
        }
    }

    pub(crate) fn to_draft(&self) -> FieldDraft {
        FieldDraft {
            name: self.name.as_str().to_string(),
            field_type: Some(self.field_type),
            description: self.description.as_str().to_string(),
            default_text: self.default_text.as_str().to_string(),
            default_checked: self.default_checked,
        }
    }

    pub(crate) fn reset_add(&mut self) {
        *self = Self {
            tab: FieldTab::Add,
            ..Self::default()
        };
    }
}

fn cycle<T: Copy + PartialEq>(items: &[T], current: T, forward: bool) -> T {
    let len = items.len();
    let index = items.iter().position(|item| *item == current).unwrap_or(0);
    let next = if forward {
        (index + 1) % len
    } else {
        (index + len - 1) % len
    };
    items[next]
}
