//! Demo tasks used when no usable task slot exists yet.

use chrono::{DateTime, Duration, Utc};

use crate::model::{Priority, Status, Task, TaskDraft};

const SAMPLE_SEEDS: &[(&str, Priority, Status)] = &[
    ("Draft onboarding checklist for new hires", Priority::High, Status::InProgress),
    ("Renew TLS certificates on staging", Priority::Urgent, Status::NotStarted),
    ("Review weekly metrics dashboard", Priority::Medium, Status::Completed),
    ("Follow up with Acme procurement", Priority::High, Status::NotStarted),
    ("Prep quarterly planning deck", Priority::Medium, Status::InProgress),
    ("Capture retro ideas for the team", Priority::Low, Status::NotStarted),
    ("Audit backlog for parser refactor", Priority::Medium, Status::NotStarted),
    ("Fix flaky login integration test", Priority::Urgent, Status::InProgress),
    ("Update API reference for v2 endpoints", Priority::Low, Status::Completed),
    ("Book venue for team offsite", Priority::None, Status::NotStarted),
    ("Migrate cron jobs to the scheduler", Priority::High, Status::NotStarted),
    ("Write postmortem for Tuesday outage", Priority::Urgent, Status::Completed),
    ("Clean up unused feature flags", Priority::Low, Status::InProgress),
    ("Benchmark search indexing throughput", Priority::Medium, Status::NotStarted),
    ("Collect feedback on billing redesign", Priority::High, Status::InProgress),
    ("Archive stale support tickets", Priority::None, Status::Completed),
    ("Rotate database credentials", Priority::Urgent, Status::NotStarted),
    ("Plan accessibility review", Priority::Medium, Status::NotStarted),
    ("Refresh screenshots in user guide", Priority::Low, Status::NotStarted),
    ("Pair with design on empty states", Priority::Medium, Status::Completed),
    ("Triage crash reports from mobile", Priority::High, Status::InProgress),
    ("Set up cost alerts for cloud account", Priority::Medium, Status::NotStarted),
    ("Interview candidates for SRE role", Priority::High, Status::Completed),
    ("Sketch roadmap for next quarter", Priority::None, Status::InProgress),
];

/// Builds the demo collection. Ids count up from 1 and creation times step
/// back an hour per task so the newest task carries the highest id.
pub fn seed_tasks(now: DateTime<Utc>) -> Vec<Task> {
    let count = SAMPLE_SEEDS.len() as i64;
    SAMPLE_SEEDS
        .iter()
        .enumerate()
        .map(|(index, (title, priority, status))| {
            let created_at = now - Duration::hours(count - index as i64);
            TaskDraft::new(*title)
                .with_priority(*priority)
                .with_status(*status)
                .into_task(index as u64 + 1, created_at)
        })
        .collect()
}
