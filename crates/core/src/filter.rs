use std::fmt;

use crate::column::{BuiltinColumn, CellValue, ColumnKind};
use crate::model::{format_number, Task};
use crate::schema::SchemaRegistry;

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl FilterValue {
    /// Types raw input according to the column it targets. Input that does
    /// not parse for the column stays text.
    pub fn parse(kind: ColumnKind, raw: &str) -> Self {
        match kind {
            ColumnKind::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => FilterValue::Bool(true),
                "false" | "no" | "0" => FilterValue::Bool(false),
                _ => FilterValue::Text(raw.to_string()),
            },
            ColumnKind::Number => raw
                .trim()
                .parse::<f64>()
                .map(FilterValue::Number)
                .unwrap_or_else(|_| FilterValue::Text(raw.to_string())),
            ColumnKind::String | ColumnKind::Enum => FilterValue::Text(raw.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FilterValue::Text(text) if text.trim().is_empty())
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Text(text) => write!(f, "{text}"),
            FilterValue::Number(number) => write!(f, "{}", format_number(*number)),
            FilterValue::Bool(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterRule {
    pub column: String,
    pub value: FilterValue,
}

impl FilterRule {
    pub fn new<T: Into<String>>(column: T, value: FilterValue) -> Self {
        Self {
            column: column.into(),
            value,
        }
    }

    pub fn matches(&self, task: &Task, schema: &SchemaRegistry) -> bool {
        match (resolve_value(task, &self.column, schema), &self.value) {
            (CellValue::Text(haystack), FilterValue::Text(needle)) => haystack
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            (CellValue::Bool(actual), FilterValue::Bool(expected)) => actual == *expected,
            (CellValue::Number(actual), FilterValue::Number(expected)) => actual == *expected,
            // Values of different types are never strictly equal.
            _ => false,
        }
    }

    pub fn summary(&self) -> String {
        format!("{}: {}", self.column, self.value)
    }
}

/// Resolves a task's value for filtering: built-in attribute, then the
/// task's own custom entry, then the field default.
pub fn resolve_value(task: &Task, column: &str, schema: &SchemaRegistry) -> CellValue {
    if let Some(builtin) = BuiltinColumn::from_name(column) {
        return task.builtin_value(builtin);
    }
    schema
        .effective_value(task, column)
        .map(CellValue::from)
        .unwrap_or(CellValue::Null)
}

/// Active filter rules, at most one per column, in the order they were
/// first applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterRules {
    rules: Vec<FilterRule>,
}

impl FilterRules {
    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn get(&self, column: &str) -> Option<&FilterRule> {
        self.rules.iter().find(|rule| rule.column == column)
    }

    /// Adds or replaces the rule for `column`. Empty values are ignored and
    /// leave the rule list unchanged.
    pub fn apply<T: Into<String>>(&mut self, column: T, value: FilterValue) -> bool {
        if value.is_empty() {
            return false;
        }
        let column = column.into();
        match self.rules.iter_mut().find(|rule| rule.column == column) {
            Some(existing) => existing.value = value,
            None => self.rules.push(FilterRule::new(column, value)),
        }
        true
    }

    pub fn remove(&mut self, column: &str) -> bool {
        match self.rules.iter().position(|rule| rule.column == column) {
            Some(index) => {
                self.rules.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    pub fn summary(&self) -> Option<String> {
        if self.rules.is_empty() {
            return None;
        }
        Some(
            self.rules
                .iter()
                .map(FilterRule::summary)
                .collect::<Vec<_>>()
                .join(" | "),
        )
    }
}

/// Returns the tasks matching every rule, in input order.
pub fn filter_tasks<'a>(
    tasks: &'a [Task],
    rules: &[FilterRule],
    schema: &SchemaRegistry,
) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|task| rules.iter().all(|rule| rule.matches(task, schema)))
        .collect()
}
