//! Column metadata shared by the filter and sort engines.

use crate::model::{FieldValue, Priority, Status, Task};
use crate::schema::CustomFieldType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinColumn {
    Id,
    Title,
    Priority,
    Status,
    CreatedAt,
}

impl BuiltinColumn {
    pub const ALL: [BuiltinColumn; 5] = [
        BuiltinColumn::Id,
        BuiltinColumn::Title,
        BuiltinColumn::Priority,
        BuiltinColumn::Status,
        BuiltinColumn::CreatedAt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuiltinColumn::Id => "id",
            BuiltinColumn::Title => "title",
            BuiltinColumn::Priority => "priority",
            BuiltinColumn::Status => "status",
            BuiltinColumn::CreatedAt => "created_at",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|column| column.as_str() == name)
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            BuiltinColumn::Id => ColumnKind::Number,
            BuiltinColumn::Priority | BuiltinColumn::Status => ColumnKind::Enum,
            BuiltinColumn::Title | BuiltinColumn::CreatedAt => ColumnKind::String,
        }
    }
}

/// A value resolved out of a task for one column.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Null,
}

impl From<&FieldValue> for CellValue {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Checkbox(checked) => CellValue::Bool(*checked),
            FieldValue::Number(number) => CellValue::Number(*number),
            FieldValue::Text(text) => CellValue::Text(text.clone()),
        }
    }
}

impl Task {
    pub fn builtin_value(&self, column: BuiltinColumn) -> CellValue {
        match column {
            BuiltinColumn::Id => CellValue::Number(self.id as f64),
            BuiltinColumn::Title => CellValue::Text(self.title.clone()),
            BuiltinColumn::Priority => CellValue::Text(self.priority.as_str().to_string()),
            BuiltinColumn::Status => CellValue::Text(self.status.as_str().to_string()),
            BuiltinColumn::CreatedAt => CellValue::Text(self.created_at.to_rfc3339()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    String,
    Enum,
    Number,
    Boolean,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::String => "string",
            ColumnKind::Enum => "enum",
            ColumnKind::Number => "number",
            ColumnKind::Boolean => "boolean",
        }
    }
}

impl From<CustomFieldType> for ColumnKind {
    fn from(field_type: CustomFieldType) -> Self {
        match field_type {
            CustomFieldType::Text => ColumnKind::String,
            CustomFieldType::Number => ColumnKind::Number,
            CustomFieldType::Checkbox => ColumnKind::Boolean,
        }
    }
}

/// A column offered by the filter builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterColumn {
    pub column: String,
    pub kind: ColumnKind,
}

impl FilterColumn {
    pub fn new<T: Into<String>>(column: T, kind: ColumnKind) -> Self {
        Self {
            column: column.into(),
            kind,
        }
    }

    /// Choices for enum columns; empty for every other kind.
    pub fn options(&self) -> Vec<&'static str> {
        if self.kind != ColumnKind::Enum {
            return Vec::new();
        }
        match self.column.as_str() {
            "status" => Status::ALL.iter().map(|s| s.as_str()).collect(),
            "priority" => Priority::ALL.iter().map(|p| p.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

pub fn builtin_filter_columns() -> Vec<FilterColumn> {
    vec![
        FilterColumn::new("status", ColumnKind::Enum),
        FilterColumn::new("priority", ColumnKind::Enum),
    ]
}
