use crate::core::column::{ColumnKind, FilterColumn};

use super::buffer::TextBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BuilderStage {
    Column,
    Value,
}

/// Two-step filter picker: choose a column, then a value suited to its kind.
#[derive(Debug, Clone)]
pub(crate) struct FilterBuilder {
    pub(crate) columns: Vec<FilterColumn>,
    pub(crate) column_index: usize,
    pub(crate) stage: BuilderStage,
    pub(crate) option_index: usize,
    pub(crate) value: TextBuffer,
}

impl FilterBuilder {
    pub(crate) fn new(columns: Vec<FilterColumn>) -> Self {
        Self {
            columns,
            column_index: 0,
            stage: BuilderStage::Column,
            option_index: 0,
            value: TextBuffer::new(),
        }
    }

    pub(crate) fn current_column(&self) -> Option<&FilterColumn> {
        self.columns.get(self.column_index)
    }

    /// Fixed choices for the current column; empty means free text.
    pub(crate) fn options(&self) -> Vec<String> {
        let Some(column) = self.current_column() else {
            return Vec::new();
        };
        match column.kind {
            ColumnKind::Enum => column.options().into_iter().map(String::from).collect(),
            ColumnKind::Boolean => vec![String::from("true"), String::from("false")],
            ColumnKind::String | ColumnKind::Number => Vec::new(),
        }
    }

    pub(crate) fn wants_text(&self) -> bool {
        self.stage == BuilderStage::Value && self.options().is_empty()
    }

    pub(crate) fn next_row(&mut self) {
        match self.stage {
            BuilderStage::Column => {
                if !self.columns.is_empty() {
                    self.column_index = (self.column_index + 1) % self.columns.len();
                }
            }
            BuilderStage::Value => {
                let len = self.options().len();
                if len > 0 {
                    self.option_index = (self.option_index + 1) % len;
                }
            }
        }
    }

    pub(crate) fn prev_row(&mut self) {
        match self.stage {
            BuilderStage::Column => {
                if !self.columns.is_empty() {
                    self.column_index =
                        (self.column_index + self.columns.len() - 1) % self.columns.len();
                }
            }
            BuilderStage::Value => {
                let len = self.options().len();
                if len > 0 {
                    self.option_index = (self.option_index + len - 1) % len;
                }
            }
        }
    }

    /// Enter: moves from the column step to the value step, or yields the
    /// chosen `(column, raw value)` pair from the value step.
    pub(crate) fn advance(&mut self) -> Option<(String, String)> {
        match self.stage {
            BuilderStage::Column => {
                if self.current_column().is_some() {
                    self.stage = BuilderStage::Value;
                    self.option_index = 0;
                    self.value.clear();
                }
                None
            }
            BuilderStage::Value => {
                let column = self.current_column()?.column.clone();
                let options = self.options();
                let raw = if options.is_empty() {
                    self.value.as_str().to_string()
                } else {
                    options.get(self.option_index)?.clone()
                };
                Some((column, raw))
            }
        }
    }

    pub(crate) fn back(&mut self) -> bool {
        if self.stage == BuilderStage::Value {
            self.stage = BuilderStage::Column;
            self.value.clear();
            true
        } else {
            false
        }
    }
}

/// Cursor over the active filter chips.
#[derive(Debug, Clone, Default)]
pub(crate) struct ChipList {
    pub(crate) index: usize,
}

impl ChipList {
    pub(crate) fn clamp(&mut self, len: usize) {
        self.index = self.index.min(len.saturating_sub(1));
    }

    pub(crate) fn next(&mut self, len: usize) {
        if len > 0 {
            self.index = (self.index + 1) % len;
        }
    }

    pub(crate) fn prev(&mut self, len: usize) {
        if len > 0 {
            self.index = (self.index + len - 1) % len;
        }
    }
}
