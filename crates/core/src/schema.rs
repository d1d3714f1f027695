//! Registry of user-defined custom fields.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use ulid::Ulid;

use crate::column::{builtin_filter_columns, BuiltinColumn, ColumnKind, FilterColumn};
use crate::model::{FieldValue, Task};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CustomFieldType {
    Text,
    Number,
    Checkbox,
}

impl CustomFieldType {
    pub const ALL: [CustomFieldType; 3] = [
        CustomFieldType::Text,
        CustomFieldType::Number,
        CustomFieldType::Checkbox,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CustomFieldType::Text => "text",
            CustomFieldType::Number => "number",
            CustomFieldType::Checkbox => "checkbox",
        }
    }
}

impl fmt::Display for CustomFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFieldDefinition {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub field_type: CustomFieldType,
    #[serde(
        rename = "defaultValue",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub default_value: Option<FieldValue>,
}

/// Raw input from the field editor. `default_text` is used for text and
/// number fields, `default_checked` for checkbox fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldDraft {
    pub name: String,
    pub field_type: Option<CustomFieldType>,
    pub description: String,
    pub default_text: String,
    pub default_checked: bool,
}

impl FieldDraft {
    pub fn new<T: Into<String>>(name: T, field_type: CustomFieldType) -> Self {
        Self {
            name: name.into(),
            field_type: Some(field_type),
            ..Self::default()
        }
    }

    pub fn with_default_text<T: Into<String>>(mut self, text: T) -> Self {
        self.default_text = text.into();
        self
    }

    pub fn with_default_checked(mut self, checked: bool) -> Self {
        self.default_checked = checked;
        self
    }

    pub fn with_description<T: Into<String>>(mut self, description: T) -> Self {
        self.description = description.into();
        self
    }

    fn default_value(&self, field_type: CustomFieldType) -> Option<FieldValue> {
        if field_type == CustomFieldType::Checkbox {
            return Some(FieldValue::Checkbox(self.default_checked));
        }
        let raw = self.default_text.trim();
        if raw.is_empty() {
            return None;
        }
        match field_type {
            // Number fields keep unparseable input as raw text.
            CustomFieldType::Number => Some(
                raw.parse::<f64>()
                    .map(FieldValue::Number)
                    .unwrap_or_else(|_| FieldValue::Text(raw.to_string())),
            ),
            _ => Some(FieldValue::Text(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("field name cannot be empty")]
    EmptyName,
    #[error("field type is required")]
    MissingType,
    #[error("a field named '{0}' already exists")]
    DuplicateName(String),
    #[error("'{0}' is a built-in column")]
    ReservedName(String),
}

#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    fields: Vec<CustomFieldDefinition>,
    selected: BTreeSet<String>,
    columns: Vec<FilterColumn>,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl SchemaRegistry {
    pub fn new(fields: Vec<CustomFieldDefinition>) -> Self {
        let mut registry = Self {
            fields,
            selected: BTreeSet::new(),
            columns: Vec::new(),
        };
        registry.rebuild_columns();
        registry
    }

    pub fn fields(&self) -> &[CustomFieldDefinition] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&CustomFieldDefinition> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn default_for(&self, name: &str) -> Option<&FieldValue> {
        self.field(name).and_then(|field| field.default_value.as_ref())
    }

    /// The value shown for a task: its own entry, else the field default.
    pub fn effective_value<'a>(&'a self, task: &'a Task, name: &str) -> Option<&'a FieldValue> {
        task.custom_value(name).or_else(|| self.default_for(name))
    }

    pub fn filter_columns(&self) -> &[FilterColumn] {
        &self.columns
    }

    pub fn column_kind(&self, column: &str) -> Option<ColumnKind> {
        self.columns
            .iter()
            .find(|candidate| candidate.column == column)
            .map(|candidate| candidate.kind)
    }

    pub fn add(&mut self, draft: &FieldDraft) -> Result<CustomFieldDefinition, SchemaError> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(SchemaError::EmptyName);
        }
        let field_type = draft.field_type.ok_or(SchemaError::MissingType)?;
        if BuiltinColumn::from_name(name).is_some() {
            return Err(SchemaError::ReservedName(name.to_string()));
        }
        if self.field(name).is_some() {
            return Err(SchemaError::DuplicateName(name.to_string()));
        }

        let description = draft.description.trim();
        let definition = CustomFieldDefinition {
            id: Ulid::new().to_string(),
            name: name.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            field_type,
            default_value: draft.default_value(field_type),
        };
        debug!(field = %definition.name, kind = %field_type, "custom field added");
        self.fields.push(definition.clone());
        self.rebuild_columns();
        Ok(definition)
    }

    pub fn toggle_selection(&mut self, id: &str) -> bool {
        if !self.fields.iter().any(|field| field.id == id) {
            return false;
        }
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.to_string());
            true
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn selection(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Removes every selected definition and clears the selection. Values
    /// already stored on tasks under the removed names are left in place.
    pub fn remove_selected(&mut self) -> usize {
        let before = self.fields.len();
        let selected = std::mem::take(&mut self.selected);
        self.fields.retain(|field| !selected.contains(&field.id));
        let removed = before - self.fields.len();
        if removed > 0 {
            debug!(removed, "custom fields removed");
            self.rebuild_columns();
        }
        removed
    }

    fn rebuild_columns(&mut self) {
        let mut columns = builtin_filter_columns();
        columns.extend(
            self.fields
                .iter()
                .map(|field| FilterColumn::new(field.name.clone(), field.field_type.into())),
        );
        self.columns = columns;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskDraft;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn new_registry_exposes_builtin_columns() {
        let registry = SchemaRegistry::default();
        let names: Vec<&str> = registry
            .filter_columns()
            .iter()
            .map(|c| c.column.as_str())
            .collect();
        assert_eq!(names, vec!["status", "priority"]);
    }

    #[test]
    fn adding_fields_regenerates_columns() {
        let mut registry = SchemaRegistry::default();
        registry
            .add(&FieldDraft::new("Notes", CustomFieldType::Text))
            .unwrap();
        registry
            .add(&FieldDraft::new("Estimate", CustomFieldType::Number))
            .unwrap();
        registry
            .add(&FieldDraft::new("Reviewed", CustomFieldType::Checkbox))
            .unwrap();

        let columns: Vec<(String, ColumnKind)> = registry
            .filter_columns()
            .iter()
            .map(|c| (c.column.clone(), c.kind))
            .collect();
        assert_eq!(
            columns,
            vec![
                ("status".to_string(), ColumnKind::Enum),
                ("priority".to_string(), ColumnKind::Enum),
                ("Notes".to_string(), ColumnKind::String),
                ("Estimate".to_string(), ColumnKind::Number),
                ("Reviewed".to_string(), ColumnKind::Boolean),
            ]
        );
    }

    #[rstest]
    #[case(FieldDraft::new("   ", CustomFieldType::Text), SchemaError::EmptyName)]
    #[case(
        FieldDraft { name: "Owner".into(), ..FieldDraft::default() },
        SchemaError::MissingType
    )]
    #[case(
        FieldDraft::new("title", CustomFieldType::Text),
        SchemaError::ReservedName("title".into())
    )]
    fn invalid_drafts_leave_registry_untouched(
        #[case] draft: FieldDraft,
        #[case] expected: SchemaError,
    ) {
        let mut registry = SchemaRegistry::default();
        assert_eq!(registry.add(&draft).unwrap_err(), expected);
        assert!(registry.fields().is_empty());
        assert_eq!(registry.filter_columns().len(), 2);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = SchemaRegistry::default();
        registry
            .add(&FieldDraft::new("Owner", CustomFieldType::Text))
            .unwrap();
        let err = registry
            .add(&FieldDraft::new(" Owner ", CustomFieldType::Number))
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateName("Owner".into()));
    }

    #[rstest]
    #[case(FieldDraft::new("A", CustomFieldType::Checkbox), Some(FieldValue::Checkbox(false)))]
    #[case(
        FieldDraft::new("B", CustomFieldType::Checkbox).with_default_checked(true),
        Some(FieldValue::Checkbox(true))
    )]
    #[case(FieldDraft::new("C", CustomFieldType::Text), None)]
    #[case(
        FieldDraft::new("D", CustomFieldType::Text).with_default_text("n/a"),
        Some(FieldValue::Text("n/a".into()))
    )]
    #[case(
        FieldDraft::new("E", CustomFieldType::Number).with_default_text("3"),
        Some(FieldValue::Number(3.0))
    )]
    #[case(
        FieldDraft::new("F", CustomFieldType::Number).with_default_text("soon"),
        Some(FieldValue::Text("soon".into()))
    )]
    fn defaults_follow_field_type(#[case] draft: FieldDraft, #[case] expected: Option<FieldValue>) {
        let mut registry = SchemaRegistry::default();
        let definition = registry.add(&draft).unwrap();
        assert_eq!(definition.default_value, expected);
    }

    #[test]
    fn remove_selected_is_bulk_and_clears_selection() {
        let mut registry = SchemaRegistry::default();
        let a = registry
            .add(&FieldDraft::new("A", CustomFieldType::Text))
            .unwrap();
        let b = registry
            .add(&FieldDraft::new("B", CustomFieldType::Number))
            .unwrap();
        registry
            .add(&FieldDraft::new("C", CustomFieldType::Checkbox))
            .unwrap();

        assert!(registry.toggle_selection(&a.id));
        assert!(registry.toggle_selection(&b.id));
        assert_eq!(registry.remove_selected(), 2);

        assert!(registry.selection().is_empty());
        let names: Vec<&str> = registry.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["C"]);
        assert_eq!(registry.filter_columns().len(), 3);
    }

    #[test]
    fn toggling_twice_deselects() {
        let mut registry = SchemaRegistry::default();
        let field = registry
            .add(&FieldDraft::new("A", CustomFieldType::Text))
            .unwrap();
        assert!(registry.toggle_selection(&field.id));
        assert!(!registry.toggle_selection(&field.id));
        assert!(!registry.is_selected(&field.id));
        assert!(!registry.toggle_selection("unknown"));
    }

    #[test]
    fn effective_value_prefers_task_entry() {
        let mut registry = SchemaRegistry::default();
        registry
            .add(&FieldDraft::new("Done", CustomFieldType::Checkbox))
            .unwrap();
        let mut task = TaskDraft::new("a").into_task(1, Utc::now());
        let sibling = TaskDraft::new("b").into_task(2, Utc::now());
        task.custom_fields
            .insert("Done".into(), FieldValue::Checkbox(true));

        assert_eq!(
            registry.effective_value(&task, "Done"),
            Some(&FieldValue::Checkbox(true))
        );
        assert_eq!(
            registry.effective_value(&sibling, "Done"),
            Some(&FieldValue::Checkbox(false))
        );
    }

    #[test]
    fn definitions_roundtrip_through_json() {
        let mut registry = SchemaRegistry::default();
        registry
            .add(
                &FieldDraft::new("Estimate", CustomFieldType::Number)
                    .with_default_text("2")
                    .with_description("hours"),
            )
            .unwrap();
        let json = serde_json::to_string(registry.fields()).unwrap();
        assert!(json.contains("\"type\":\"number\""));
        assert!(json.contains("\"defaultValue\":2.0"));
        let back: Vec<CustomFieldDefinition> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, registry.fields());
    }
}
