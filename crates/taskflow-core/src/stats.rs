use crate::project::{Priority, Project, ProjectStatus};
use crate::task::{Task, TaskStatus};

/// Aggregates recomputed from the current collection snapshot on every use;
/// nothing here is cached between mutations.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectStats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub on_hold: usize,
    pub archived: usize,
    pub high_priority: usize,
    pub medium_priority: usize,
    pub low_priority: usize,
    pub average_progress: f64,
}

impl ProjectStats {
    pub fn compute(projects: &[Project]) -> Self {
        let count_status = |status: ProjectStatus| {
            projects.iter().filter(|p| p.status == status).count()
        };
        let count_priority =
            |priority: Priority| projects.iter().filter(|p| p.priority == priority).count();

        Self {
            total: projects.len(),
            active: count_status(ProjectStatus::Active),
            completed: count_status(ProjectStatus::Completed),
            on_hold: count_status(ProjectStatus::OnHold),
            archived: count_status(ProjectStatus::Archived),
            high_priority: count_priority(Priority::High),
            medium_priority: count_priority(Priority::Medium),
            low_priority: count_priority(Priority::Low),
            average_progress: average(projects.iter().map(|p| p.progress)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskStats {
    pub total: usize,
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
    pub high_priority: usize,
    pub medium_priority: usize,
    pub low_priority: usize,
    pub completion_rate: f64,
    pub average_progress: f64,
}

impl TaskStats {
    pub fn compute(tasks: &[Task]) -> Self {
        let count_status =
            |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count();
        let count_priority =
            |priority: Priority| tasks.iter().filter(|t| t.priority == priority).count();

        let done = count_status(TaskStatus::Done);
        let completion_rate = if tasks.is_empty() {
            0.0
        } else {
            done as f64 / tasks.len() as f64
        };

        Self {
            total: tasks.len(),
            todo: count_status(TaskStatus::Todo),
            in_progress: count_status(TaskStatus::InProgress),
            done,
            high_priority: count_priority(Priority::High),
            medium_priority: count_priority(Priority::Medium),
            low_priority: count_priority(Priority::Low),
            completion_rate,
            average_progress: average(tasks.iter().map(|t| t.progress)),
        }
    }
}

/// Arithmetic mean; 0.0 for an empty collection rather than a division
/// error.
fn average(values: impl Iterator<Item = u8>) -> f64 {
    let mut sum = 0u64;
    let mut count = 0u64;
    for value in values {
        sum += u64::from(value);
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{ProjectStats, TaskStats};
    use crate::project::{ProjectDraft, ProjectPatch, ProjectStatus};
    use crate::store::{ProjectStore, TaskStore};
    use crate::task::{TaskDraft, TaskStatus};

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn empty_collection_yields_zeroes_without_panicking() {
        let stats = ProjectStats::compute(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.average_progress, 0.0);

        let stats = TaskStats::compute(&[]);
        assert_eq!(stats.completion_rate, 0.0);
        assert_eq!(stats.average_progress, 0.0);
    }

    #[test]
    fn status_update_moves_per_status_counts() {
        let mut store = ProjectStore::default();
        let mut first = ProjectDraft::new("One", "first");
        first.progress = 50;
        let first = store.create(first, now()).expect("create");
        let mut second = ProjectDraft::new("Two", "second");
        second.status = ProjectStatus::OnHold;
        second.progress = 80;
        store.create(second, now()).expect("create");

        let before = ProjectStats::compute(store.projects());
        assert_eq!(before.active, 1);
        assert_eq!(before.on_hold, 1);
        assert_eq!(before.medium_priority, 2);
        assert_eq!(before.average_progress, 65.0);

        let patch = ProjectPatch {
            status: Some(ProjectStatus::Completed),
            ..ProjectPatch::default()
        };
        assert!(store.update(first.id, &patch, now()));

        let after = ProjectStats::compute(store.projects());
        assert_eq!(after.active, 0);
        assert_eq!(after.completed, 1);
        assert_eq!(after.total, 2);
        assert_eq!(
            store.get(first.id).expect("project").progress,
            50,
            "progress untouched"
        );
    }

    #[test]
    fn task_completion_rate() {
        let mut store = TaskStore::default();
        for (title, status) in [
            ("a", TaskStatus::Done),
            ("b", TaskStatus::Done),
            ("c", TaskStatus::InProgress),
            ("d", TaskStatus::Todo),
        ] {
            let mut draft = TaskDraft::new(title);
            draft.status = status;
            store.create(draft, now()).expect("create");
        }

        let stats = TaskStats::compute(store.tasks());
        assert_eq!(stats.total, 4);
        assert_eq!(stats.done, 2);
        assert_eq!(stats.in_progress, 1);
        assert_eq!(stats.completion_rate, 0.5);
    }
}
