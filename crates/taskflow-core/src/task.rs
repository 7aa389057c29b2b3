use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::project::Priority;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "todo" => Some(Self::Todo),
            "inprogress" | "in-progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "inprogress",
            Self::Done => "done",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub progress: u8,

    #[serde(default)]
    pub due: Option<NaiveDate>,

    /// Weak reference to the owning project; task counts per project are
    /// always derived from this, never cached on the project record.
    #[serde(default)]
    pub project: Option<Uuid>,

    /// Ordered weak references into the member directory.
    #[serde(default)]
    pub assignees: Vec<Uuid>,

    #[serde(default)]
    pub comments: u32,

    #[serde(default)]
    pub attachments: u32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub title: String,
    pub category: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub progress: u8,
    pub due: Option<NaiveDate>,
    pub project: Option<Uuid>,
    pub assignees: Vec<Uuid>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category: "general".to_string(),
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            progress: 0,
            due: None,
            project: None,
            assignees: vec![],
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.title.trim().is_empty() {
            return Err(anyhow!("task title is required"));
        }
        if self.category.trim().is_empty() {
            return Err(anyhow!("task category cannot be empty"));
        }
        Ok(())
    }
}

impl Task {
    pub(crate) fn from_draft(draft: TaskDraft, now: DateTime<Utc>) -> Self {
        let mut assignees: Vec<Uuid> = Vec::with_capacity(draft.assignees.len());
        for member in draft.assignees {
            if !assignees.contains(&member) {
                assignees.push(member);
            }
        }
        Self {
            id: Uuid::new_v4(),
            title: draft.title,
            category: draft.category,
            status: draft.status,
            priority: draft.priority,
            progress: draft.progress.min(100),
            due: draft.due,
            project: draft.project,
            assignees,
            comments: 0,
            attachments: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != TaskStatus::Done && self.due.map(|due| due < today).unwrap_or(false)
    }

    pub fn due_within(&self, today: NaiveDate, days: u64) -> bool {
        if self.status == TaskStatus::Done {
            return false;
        }
        self.due
            .map(|due| due >= today && (due - today).num_days() <= days as i64)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub category: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub progress: Option<u8>,
    pub due: Option<Option<NaiveDate>>,
    pub project: Option<Option<Uuid>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.category.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.progress.is_none()
            && self.due.is_none()
            && self.project.is_none()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(title) = &self.title
            && title.trim().is_empty()
        {
            return Err(anyhow!("task title cannot be empty"));
        }
        if let Some(category) = &self.category
            && category.trim().is_empty()
        {
            return Err(anyhow!("task category cannot be empty"));
        }
        Ok(())
    }

    pub(crate) fn apply(&self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(category) = &self.category {
            task.category = category.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(progress) = self.progress {
            task.progress = progress.min(100);
        }
        if let Some(due) = self.due {
            task.due = due;
        }
        if let Some(project) = self.project {
            task.project = project;
        }
        task.updated_at = now;
    }
}
