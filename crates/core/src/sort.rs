use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail};

use crate::column::{BuiltinColumn, CellValue};
use crate::model::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortOrder::Asc => "▲",
            SortOrder::Desc => "▼",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortRule {
    pub column: String,
    pub order: SortOrder,
}

impl SortRule {
    pub fn new<T: Into<String>>(column: T, order: SortOrder) -> Self {
        Self {
            column: column.into(),
            order,
        }
    }

    fn is_default(&self) -> bool {
        self.is_id() && self.order == SortOrder::Desc
    }

    fn is_id(&self) -> bool {
        self.column == BuiltinColumn::Id.as_str()
    }
}

impl fmt::Display for SortRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.column, self.order.as_str())
    }
}

impl FromStr for SortRule {
    type Err = anyhow::Error;

    /// Parses `column` or `column:asc|desc`; a bare column sorts ascending.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, order) = match s.rsplit_once(':') {
            Some((column, order)) => (column, Some(order)),
            None => (s, None),
        };
        let column = column.trim();
        if column.is_empty() {
            bail!("Sort rule '{}' is missing a column", s);
        }
        let order = match order.map(|o| o.trim().to_ascii_lowercase()) {
            None => SortOrder::Asc,
            Some(o) if o == "asc" => SortOrder::Asc,
            Some(o) if o == "desc" => SortOrder::Desc,
            Some(other) => return Err(anyhow!("Unknown sort order '{}': expected asc|desc", other)),
        };
        Ok(SortRule::new(column, order))
    }
}

/// Ordered sort rules, highest precedence first. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortRules {
    rules: Vec<SortRule>,
}

impl Default for SortRules {
    fn default() -> Self {
        Self {
            rules: vec![SortRule::new(BuiltinColumn::Id.as_str(), SortOrder::Desc)],
        }
    }
}

impl SortRules {
    /// Builds a rule list, falling back to the default when `rules` is empty.
    pub fn from_rules(rules: Vec<SortRule>) -> Self {
        if rules.is_empty() {
            Self::default()
        } else {
            Self { rules }
        }
    }

    pub fn rules(&self) -> &[SortRule] {
        &self.rules
    }

    pub fn is_default(&self) -> bool {
        self.rules.len() == 1 && self.rules[0].is_default()
    }

    /// Position and direction of the rule for `column`, if any.
    pub fn order_for(&self, column: &str) -> Option<(usize, SortOrder)> {
        self.rules
            .iter()
            .position(|rule| rule.column == column)
            .map(|index| (index, self.rules[index].order))
    }

    /// Header-click cycle: none -> asc -> desc -> none. A new column replaces
    /// a lone `id` rule in either direction.
    pub fn toggle(&mut self, column: &str) {
        match self.rules.iter().position(|rule| rule.column == column) {
            None => {
                let rule = SortRule::new(column, SortOrder::Asc);
                if self.rules.len() == 1 && self.rules[0].is_id() {
                    self.rules = vec![rule];
                } else {
                    self.rules.push(rule);
                }
            }
            Some(index) if self.rules[index].order == SortOrder::Asc => {
                self.rules[index].order = SortOrder::Desc;
            }
            Some(index) => {
                self.rules.remove(index);
                if self.rules.is_empty() {
                    *self = Self::default();
                }
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn summary(&self) -> String {
        self.rules
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// Sorting never consults field defaults; a missing custom value sorts as "".
fn sort_key(task: &Task, column: &str) -> CellValue {
    if let Some(builtin) = BuiltinColumn::from_name(column) {
        return task.builtin_value(builtin);
    }
    task.custom_value(column)
        .map(CellValue::from)
        .unwrap_or_else(|| CellValue::Text(String::new()))
}

fn compare_cells(a: &CellValue, b: &CellValue) -> Ordering {
    match (a, b) {
        (CellValue::Text(a), CellValue::Text(b)) => compare_text(a, b),
        (CellValue::Number(a), CellValue::Number(b)) => {
            a.partial_cmp(b).unwrap_or(Ordering::Equal)
        }
        _ => Ordering::Equal,
    }
}

// Case-insensitive first; on a tie lowercase sorts ahead of uppercase.
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

pub fn compare_tasks(a: &Task, b: &Task, rules: &[SortRule]) -> Ordering {
    for rule in rules {
        let ordering = compare_cells(&sort_key(a, &rule.column), &sort_key(b, &rule.column));
        if ordering != Ordering::Equal {
            return match rule.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            };
        }
    }
    Ordering::Equal
}

/// Stable multi-key sort; full ties keep their input order.
pub fn sort_tasks(tasks: &mut [&Task], rules: &[SortRule]) {
    tasks.sort_by(|a, b| compare_tasks(a, b, rules));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldValue, Priority, TaskDraft};
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn task(id: u64, title: &str, priority: Priority) -> Task {
        TaskDraft::new(title)
            .with_priority(priority)
            .into_task(id, Utc::now())
    }

    fn sorted(tasks: &[Task], rules: &[SortRule]) -> Vec<u64> {
        let mut refs: Vec<&Task> = tasks.iter().collect();
        sort_tasks(&mut refs, rules);
        refs.iter().map(|t| t.id).collect()
    }

    #[test]
    fn default_rules_sort_newest_first() {
        let tasks = vec![
            task(1, "a", Priority::Low),
            task(3, "b", Priority::Low),
            task(2, "c", Priority::Low),
        ];
        assert_eq!(sorted(&tasks, SortRules::default().rules()), vec![3, 2, 1]);
    }

    #[test]
    fn text_sorts_case_insensitively() {
        let tasks = vec![
            task(1, "banana", Priority::Low),
            task(2, "Apple", Priority::Low),
            task(3, "cherry", Priority::Low),
        ];
        let rules = [SortRule::new("title", SortOrder::Asc)];
        assert_eq!(sorted(&tasks, &rules), vec![2, 1, 3]);
    }

    #[test]
    fn later_rules_break_ties() {
        let tasks = vec![
            task(1, "b", Priority::High),
            task(2, "a", Priority::Low),
            task(3, "a", Priority::High),
        ];
        let rules = [
            SortRule::new("priority", SortOrder::Asc),
            SortRule::new("title", SortOrder::Desc),
        ];
        assert_eq!(sorted(&tasks, &rules), vec![1, 3, 2]);
    }

    #[test]
    fn full_ties_keep_input_order() {
        let tasks = vec![
            task(5, "same", Priority::Low),
            task(9, "same", Priority::Low),
            task(2, "same", Priority::Low),
        ];
        let rules = [SortRule::new("title", SortOrder::Desc)];
        assert_eq!(sorted(&tasks, &rules), vec![5, 9, 2]);
    }

    #[test]
    fn custom_values_sort_without_defaults() {
        let mut tasks = vec![
            task(1, "a", Priority::Low),
            task(2, "b", Priority::Low),
            task(3, "c", Priority::Low),
        ];
        tasks[0]
            .custom_fields
            .insert("Owner".into(), FieldValue::Text("zoe".into()));
        tasks[2]
            .custom_fields
            .insert("Owner".into(), FieldValue::Text("amir".into()));

        let rules = [SortRule::new("Owner", SortOrder::Asc)];
        assert_eq!(sorted(&tasks, &rules), vec![2, 3, 1]);
    }

    #[test]
    fn mixed_types_compare_equal() {
        let mut tasks = vec![task(1, "a", Priority::Low), task(2, "b", Priority::Low)];
        tasks[0]
            .custom_fields
            .insert("Points".into(), FieldValue::Number(3.0));
        tasks[1]
            .custom_fields
            .insert("Points".into(), FieldValue::Checkbox(true));

        let rules = [SortRule::new("Points", SortOrder::Desc)];
        assert_eq!(sorted(&tasks, &rules), vec![1, 2]);
    }

    #[test]
    fn toggle_cycles_through_asc_desc_and_default() {
        let mut rules = SortRules::default();

        rules.toggle("title");
        assert_eq!(rules.rules(), &[SortRule::new("title", SortOrder::Asc)]);

        rules.toggle("title");
        assert_eq!(rules.rules(), &[SortRule::new("title", SortOrder::Desc)]);

        rules.toggle("title");
        assert_eq!(rules, SortRules::default());
    }

    #[test]
    fn toggle_appends_behind_existing_rules() {
        let mut rules = SortRules::default();
        rules.toggle("status");
        rules.toggle("title");

        assert_eq!(
            rules.rules(),
            &[
                SortRule::new("status", SortOrder::Asc),
                SortRule::new("title", SortOrder::Asc),
            ]
        );
        assert_eq!(rules.order_for("title"), Some((1, SortOrder::Asc)));
        assert_eq!(rules.order_for("id"), None);
    }

    #[test]
    fn toggling_id_from_default_removes_then_restores_it() {
        let mut rules = SortRules::default();
        rules.toggle("id");
        assert_eq!(rules, SortRules::default());
    }

    #[test]
    fn new_column_replaces_a_lone_ascending_id_rule() {
        let mut rules = SortRules::default();
        rules.toggle("title");
        rules.toggle("id");
        rules.toggle("title");
        rules.toggle("title");
        assert_eq!(rules.rules(), &[SortRule::new("id", SortOrder::Asc)]);

        rules.toggle("status");
        assert_eq!(rules.rules(), &[SortRule::new("status", SortOrder::Asc)]);
    }

    #[test]
    fn from_empty_rules_falls_back_to_default() {
        assert_eq!(SortRules::from_rules(Vec::new()), SortRules::default());
    }

    #[rstest]
    #[case("title", SortRule::new("title", SortOrder::Asc))]
    #[case("created_at:desc", SortRule::new("created_at", SortOrder::Desc))]
    #[case("Owner:ASC", SortRule::new("Owner", SortOrder::Asc))]
    fn sort_rules_parse(#[case] raw: &str, #[case] expected: SortRule) {
        assert_eq!(raw.parse::<SortRule>().unwrap(), expected);
    }

    #[rstest]
    #[case(":asc")]
    #[case("title:sideways")]
    fn malformed_sort_rules_are_rejected(#[case] raw: &str) {
        assert!(raw.parse::<SortRule>().is_err());
    }
}
