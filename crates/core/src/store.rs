use std::collections::BTreeSet;

use chrono::Utc;
use tracing::debug;

use crate::model::{FieldValue, Task, TaskDraft};
use crate::seed::seed_tasks;
use crate::storage::{load_json, save_json, KeyValueStorage, TASKS_KEY};

/// The task collection plus the selection set, mirrored to the `tasks`
/// slot after every successful mutation.
pub struct TaskStore {
    storage: Box<dyn KeyValueStorage>,
    tasks: Vec<Task>,
    selected: BTreeSet<u64>,
    last_id: u64,
}

impl TaskStore {
    /// Loads the `tasks` slot, falling back to the seed data when the slot
    /// is missing or malformed.
    pub fn load(storage: Box<dyn KeyValueStorage>) -> Self {
        let tasks = match load_json::<Vec<Task>>(storage.as_ref(), TASKS_KEY) {
            Some(tasks) => {
                debug!(count = tasks.len(), "loaded tasks from storage");
                tasks
            }
            None => {
                debug!("no stored tasks; using seed data");
                seed_tasks(Utc::now())
            }
        };
        Self::with_tasks(storage, tasks)
    }

    pub fn with_tasks(storage: Box<dyn KeyValueStorage>, tasks: Vec<Task>) -> Self {
        let last_id = tasks.iter().map(|task| task.id).max().unwrap_or(0);
        Self {
            storage,
            tasks,
            selected: BTreeSet::new(),
            last_id,
        }
    }

    pub fn storage(&self) -> &dyn KeyValueStorage {
        self.storage.as_ref()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn add(&mut self, draft: TaskDraft) -> Task {
        let now = Utc::now();
        // Millisecond clock ids, bumped past the newest id on collisions.
        let id = (now.timestamp_millis().max(0) as u64).max(self.last_id + 1);
        self.last_id = id;
        let task = draft.into_task(id, now);
        self.tasks.push(task.clone());
        debug!(id, title = %task.title, "task added");
        self.persist();
        task
    }

    /// Replaces the editable fields of task `id`, keeping its id, creation
    /// time and custom-field values.
    pub fn update(&mut self, id: u64, draft: TaskDraft) -> Option<Task> {
        let task = self.tasks.iter_mut().find(|task| task.id == id)?;
        task.title = draft.title;
        task.priority = draft.priority;
        task.status = draft.status;
        let updated = task.clone();
        debug!(id, "task updated");
        self.persist();
        Some(updated)
    }

    pub fn delete(&mut self, id: u64) -> bool {
        let Some(index) = self.tasks.iter().position(|task| task.id == id) else {
            return false;
        };
        self.tasks.remove(index);
        self.selected.remove(&id);
        debug!(id, "task deleted");
        self.persist();
        true
    }

    /// Removes every selected task and clears the selection.
    pub fn delete_selected(&mut self) -> usize {
        if self.selected.is_empty() {
            return 0;
        }
        let selected = std::mem::take(&mut self.selected);
        let before = self.tasks.len();
        self.tasks.retain(|task| !selected.contains(&task.id));
        let removed = before - self.tasks.len();
        debug!(removed, "selected tasks deleted");
        if removed > 0 {
            self.persist();
        }
        removed
    }

    /// Flips selection for `id`; returns whether the task is now selected.
    /// Unknown ids are ignored.
    pub fn toggle_selection(&mut self, id: u64) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        if self.selected.remove(&id) {
            false
        } else {
            self.selected.insert(id);
            true
        }
    }

    pub fn is_selected(&self, id: u64) -> bool {
        self.selected.contains(&id)
    }

    pub fn selection(&self) -> &BTreeSet<u64> {
        &self.selected
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Sets or, with `None`, clears one custom-field entry on a task. Other
    /// entries are untouched.
    pub fn set_custom_field(&mut self, id: u64, name: &str, value: Option<FieldValue>) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return false;
        };
        match value {
            Some(value) => {
                task.custom_fields.insert(name.to_string(), value);
            }
            None => {
                task.custom_fields.remove(name);
            }
        }
        debug!(id, field = name, "custom field value set");
        self.persist();
        true
    }

    fn persist(&self) {
        save_json(self.storage.as_ref(), TASKS_KEY, &self.tasks);
        debug!(count = self.tasks.len(), "tasks persisted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Priority, Status};
    use crate::storage::MemoryStorage;
    use pretty_assertions::assert_eq;

    fn empty_store() -> TaskStore {
        TaskStore::load(Box::new(MemoryStorage::new().with_entry(TASKS_KEY, "[]")))
    }

    fn stored_tasks(store: &TaskStore) -> Vec<Task> {
        load_json(store.storage(), TASKS_KEY).expect("tasks slot")
    }

    #[test]
    fn missing_slot_falls_back_to_seed() {
        let store = TaskStore::load(Box::new(MemoryStorage::new()));
        assert!(!store.is_empty());
    }

    #[test]
    fn malformed_slot_falls_back_to_seed() {
        let store = TaskStore::load(Box::new(
            MemoryStorage::new().with_entry(TASKS_KEY, "definitely not json"),
        ));
        assert_eq!(store.len(), seed_tasks(Utc::now()).len());
    }

    #[test]
    fn add_assigns_unique_increasing_ids_and_persists() {
        let mut store = empty_store();
        let first = store.add(TaskDraft::new("one"));
        let second = store.add(TaskDraft::new("two"));
        let third = store.add(TaskDraft::new("three"));

        assert!(first.id < second.id && second.id < third.id);
        assert_eq!(stored_tasks(&store), store.tasks().to_vec());
    }

    #[test]
    fn add_never_reuses_loaded_ids() {
        let far_future = u64::MAX / 2;
        let seeded = vec![TaskDraft::new("future").into_task(far_future, Utc::now())];
        let mut store = TaskStore::with_tasks(Box::new(MemoryStorage::new()), seeded);
        let task = store.add(TaskDraft::new("next"));
        assert_eq!(task.id, far_future + 1);
    }

    #[test]
    fn update_preserves_identity_and_custom_fields() {
        let mut store = empty_store();
        let task = store.add(TaskDraft::new("Draft"));
        store.set_custom_field(task.id, "Estimate", Some(FieldValue::Number(2.0)));

        let updated = store
            .update(
                task.id,
                TaskDraft::new("Final")
                    .with_priority(Priority::Urgent)
                    .with_status(Status::Completed),
            )
            .expect("task exists");

        assert_eq!(updated.id, task.id);
        assert_eq!(updated.created_at, task.created_at);
        assert_eq!(updated.title, "Final");
        assert_eq!(
            updated.custom_value("Estimate"),
            Some(&FieldValue::Number(2.0))
        );
        assert_eq!(stored_tasks(&store)[0].title, "Final");
    }

    #[test]
    fn unknown_ids_report_not_found() {
        let mut store = empty_store();
        assert!(store.update(99, TaskDraft::new("x")).is_none());
        assert!(!store.delete(99));
        assert!(!store.toggle_selection(99));
        assert!(!store.set_custom_field(99, "Owner", None));
        assert!(store.selection().is_empty());
    }

    #[test]
    fn bulk_delete_removes_selected_and_clears_selection() {
        let mut store = empty_store();
        let ids: Vec<u64> = (0..5)
            .map(|n| store.add(TaskDraft::new(format!("task {n}"))).id)
            .collect();

        assert!(store.toggle_selection(ids[1]));
        assert!(store.toggle_selection(ids[3]));
        assert_eq!(store.delete_selected(), 2);

        assert_eq!(store.len(), 3);
        assert!(store.get(ids[1]).is_none());
        assert!(store.get(ids[3]).is_none());
        assert!(store.selection().is_empty());
        assert_eq!(stored_tasks(&store).len(), 3);
    }

    #[test]
    fn toggling_twice_deselects() {
        let mut store = empty_store();
        let task = store.add(TaskDraft::new("pick me"));
        assert!(store.toggle_selection(task.id));
        assert!(store.is_selected(task.id));
        assert!(!store.toggle_selection(task.id));
        assert!(!store.is_selected(task.id));
    }

    #[test]
    fn deleting_a_task_drops_it_from_selection() {
        let mut store = empty_store();
        let task = store.add(TaskDraft::new("gone"));
        store.toggle_selection(task.id);
        assert!(store.delete(task.id));
        assert!(store.selection().is_empty());
    }

    #[test]
    fn set_custom_field_leaves_other_entries() {
        let mut store = empty_store();
        let task = store.add(TaskDraft::new("fields"));
        store.set_custom_field(task.id, "Owner", Some(FieldValue::Text("kim".into())));
        store.set_custom_field(task.id, "Reviewed", Some(FieldValue::Checkbox(true)));
        store.set_custom_field(task.id, "Owner", None);

        let task = store.get(task.id).expect("task exists");
        assert_eq!(task.custom_value("Owner"), None);
        assert_eq!(
            task.custom_value("Reviewed"),
            Some(&FieldValue::Checkbox(true))
        );
    }
}
