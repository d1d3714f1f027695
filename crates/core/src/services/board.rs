use anyhow::Result;
use tracing::debug;

use crate::column::{BuiltinColumn, ColumnKind};
use crate::config::AppConfig;
use crate::filter::{filter_tasks, FilterRules, FilterValue};
use crate::model::{FieldValue, Task, TaskDraft};
use crate::pagination::Pagination;
use crate::schema::{CustomFieldDefinition, FieldDraft, SchemaError, SchemaRegistry};
use crate::sort::{sort_tasks, SortRule, SortRules};
use crate::storage::{load_json, save_json, KeyValueStorage, SqliteStorage, CUSTOM_FIELDS_KEY};
use crate::store::TaskStore;

/// One rendered page of the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSnapshot {
    pub rows: Vec<Task>,
    pub total_matches: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

/// Application state: the task store, the field schema and the transient
/// filter, sort and paging state.
pub struct Board {
    store: TaskStore,
    schema: SchemaRegistry,
    filters: FilterRules,
    sort: SortRules,
    pagination: Pagination,
}

impl Board {
    pub fn open(storage: Box<dyn KeyValueStorage>) -> Self {
        let fields: Vec<CustomFieldDefinition> =
            load_json(storage.as_ref(), CUSTOM_FIELDS_KEY).unwrap_or_default();
        debug!(fields = fields.len(), "loaded custom field schema");
        Self {
            store: TaskStore::load(storage),
            schema: SchemaRegistry::new(fields),
            filters: FilterRules::default(),
            sort: SortRules::default(),
            pagination: Pagination::default(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let storage = SqliteStorage::initialize(config)?;
        Ok(Self::open(Box::new(storage)))
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    pub fn filters(&self) -> &FilterRules {
        &self.filters
    }

    pub fn sort_rules(&self) -> &SortRules {
        &self.sort
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn task(&self, id: u64) -> Option<&Task> {
        self.store.get(id)
    }

    // Tasks

    pub fn add_task(&mut self, draft: TaskDraft) -> Task {
        self.store.add(draft)
    }

    pub fn update_task(&mut self, id: u64, draft: TaskDraft) -> Option<Task> {
        self.store.update(id, draft)
    }

    pub fn delete_task(&mut self, id: u64) -> bool {
        self.store.delete(id)
    }

    pub fn delete_selected(&mut self) -> usize {
        self.store.delete_selected()
    }

    pub fn toggle_selection(&mut self, id: u64) -> bool {
        self.store.toggle_selection(id)
    }

    pub fn set_custom_field(&mut self, id: u64, name: &str, value: Option<FieldValue>) -> bool {
        self.store.set_custom_field(id, name, value)
    }

    /// Flips a checkbox field on one task, starting from its effective value.
    pub fn toggle_checkbox(&mut self, id: u64, name: &str) -> Option<bool> {
        let task = self.store.get(id)?;
        let current = self
            .schema
            .effective_value(task, name)
            .and_then(FieldValue::as_bool)
            .unwrap_or(false);
        let next = !current;
        self.store
            .set_custom_field(id, name, Some(FieldValue::Checkbox(next)))
            .then_some(next)
    }

    // Schema

    pub fn add_field(&mut self, draft: &FieldDraft) -> Result<CustomFieldDefinition, SchemaError> {
        let definition = self.schema.add(draft)?;
        self.persist_schema();
        Ok(definition)
    }

    pub fn toggle_field_selection(&mut self, id: &str) -> bool {
        self.schema.toggle_selection(id)
    }

    pub fn clear_field_selection(&mut self) {
        self.schema.clear_selection();
    }

    /// Removes the selected field definitions. Task values stored under the
    /// removed names are kept.
    pub fn remove_selected_fields(&mut self) -> usize {
        let removed = self.schema.remove_selected();
        if removed > 0 {
            for column in self.orphaned_filter_columns() {
                self.filters.remove(&column);
            }
            self.persist_schema();
        }
        removed
    }

    // Filter rules on columns that no longer exist would hide every task.
    fn orphaned_filter_columns(&self) -> Vec<String> {
        self.filters
            .rules()
            .iter()
            .filter(|rule| {
                BuiltinColumn::from_name(&rule.column).is_none()
                    && self.schema.field(&rule.column).is_none()
            })
            .map(|rule| rule.column.clone())
            .collect()
    }

    fn persist_schema(&self) {
        save_json(self.store.storage(), CUSTOM_FIELDS_KEY, self.schema.fields());
        debug!(fields = self.schema.fields().len(), "custom field schema persisted");
    }

    // Filters

    /// Applies a filter typed by the column's kind. Blank input is ignored.
    pub fn apply_filter(&mut self, column: &str, raw: &str) -> bool {
        let kind = self
            .schema
            .column_kind(column)
            .or_else(|| BuiltinColumn::from_name(column).map(|builtin| builtin.kind()))
            .unwrap_or(ColumnKind::String);
        let applied = self.filters.apply(column, FilterValue::parse(kind, raw));
        if applied {
            debug!(column, value = raw, "filter applied");
        }
        applied
    }

    pub fn search_title(&mut self, query: &str) -> bool {
        self.apply_filter(BuiltinColumn::Title.as_str(), query)
    }

    pub fn remove_filter(&mut self, column: &str) -> bool {
        self.filters.remove(column)
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    // Sorting

    pub fn toggle_sort(&mut self, column: &str) {
        self.sort.toggle(column);
        debug!(rules = %self.sort.summary(), "sort toggled");
    }

    pub fn set_sort_rules(&mut self, rules: Vec<SortRule>) {
        self.sort = SortRules::from_rules(rules);
    }

    // Paging

    pub fn next_page(&mut self) -> bool {
        let total = self.total_matches();
        self.pagination.next(total)
    }

    pub fn prev_page(&mut self) -> bool {
        self.pagination.prev()
    }

    pub fn set_page(&mut self, page: usize) {
        let total = self.total_matches();
        self.pagination.set_page(page, total);
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        let total = self.total_matches();
        self.pagination.set_page_size(page_size, total);
    }

    pub fn cycle_page_size(&mut self) -> usize {
        let total = self.total_matches();
        self.pagination.cycle_page_size(total)
    }

    // Pipeline

    /// Filtered and sorted tasks, before paging.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        let mut tasks = filter_tasks(self.store.tasks(), self.filters.rules(), &self.schema);
        sort_tasks(&mut tasks, self.sort.rules());
        tasks
    }

    pub fn total_matches(&self) -> usize {
        filter_tasks(self.store.tasks(), self.filters.rules(), &self.schema).len()
    }

    pub fn snapshot(&mut self) -> TableSnapshot {
        let visible = self.visible_tasks();
        let total_matches = visible.len();
        let mut pagination = self.pagination;
        pagination.clamp(total_matches);
        let rows = pagination
            .slice(&visible)
            .iter()
            .map(|task| (*task).clone())
            .collect();
        self.pagination = pagination;
        TableSnapshot {
            rows,
            total_matches,
            page: pagination.page(),
            page_size: pagination.page_size(),
            total_pages: pagination.total_pages(total_matches),
        }
    }
}
