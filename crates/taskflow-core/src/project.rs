use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const COPY_SUFFIX: &str = " (Copy)";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    Active,
    Completed,
    OnHold,
    Archived,
}

impl ProjectStatus {
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "on-hold" | "onhold" => Some(Self::OnHold),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::OnHold => "on-hold",
            Self::Archived => "archived",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "med" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    pub allocated: f64,
    pub spent: f64,
    pub currency: String,
}

impl Budget {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.allocated < 0.0 {
            return Err(anyhow!("budget allocation cannot be negative"));
        }
        if self.spent < 0.0 {
            return Err(anyhow!("budget spend cannot be negative"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub progress: u8,

    /// Weak references into the member directory; removing a member
    /// elsewhere does not cascade here.
    #[serde(default)]
    pub team: Vec<Uuid>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub due: Option<NaiveDate>,

    #[serde(default)]
    pub budget: Option<Budget>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub progress: u8,
    pub team: Vec<Uuid>,
    pub tags: Vec<String>,
    pub due: Option<NaiveDate>,
    pub budget: Option<Budget>,
}

impl ProjectDraft {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            status: ProjectStatus::Active,
            priority: Priority::Medium,
            progress: 0,
            team: vec![],
            tags: vec![],
            due: None,
            budget: None,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.name.trim().is_empty() {
            return Err(anyhow!("project name is required"));
        }
        if self.description.trim().is_empty() {
            return Err(anyhow!("project description is required"));
        }
        if let Some(budget) = &self.budget {
            budget.validate()?;
        }
        Ok(())
    }
}

impl Project {
    pub(crate) fn from_draft(draft: ProjectDraft, now: DateTime<Utc>) -> Self {
        // first occurrence wins, same set semantics as add_tag/add_team_member
        let mut tags: Vec<String> = Vec::with_capacity(draft.tags.len());
        for tag in draft.tags {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        let mut team: Vec<Uuid> = Vec::with_capacity(draft.team.len());
        for member in draft.team {
            if !team.contains(&member) {
                team.push(member);
            }
        }
        Self {
            id: Uuid::new_v4(),
            name: draft.name,
            description: draft.description,
            status: draft.status,
            priority: draft.priority,
            progress: draft.progress.min(100),
            team,
            tags,
            due: draft.due,
            budget: draft.budget,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != ProjectStatus::Completed
            && self.status != ProjectStatus::Archived
            && self.due.map(|due| due < today).unwrap_or(false)
    }
}

/// Partial update; `None` leaves a field untouched. Optional fields use a
/// nested `Option` so a patch can also clear them.
#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub progress: Option<u8>,
    pub due: Option<Option<NaiveDate>>,
    pub budget: Option<Option<Budget>>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.progress.is_none()
            && self.due.is_none()
            && self.budget.is_none()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            return Err(anyhow!("project name cannot be empty"));
        }
        if let Some(description) = &self.description
            && description.trim().is_empty()
        {
            return Err(anyhow!("project description cannot be empty"));
        }
        if let Some(Some(budget)) = &self.budget {
            budget.validate()?;
        }
        Ok(())
    }

    pub(crate) fn apply(&self, project: &mut Project, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            project.name = name.clone();
        }
        if let Some(description) = &self.description {
            project.description = description.clone();
        }
        if let Some(status) = self.status {
            project.status = status;
        }
        if let Some(priority) = self.priority {
            project.priority = priority;
        }
        if let Some(progress) = self.progress {
            project.progress = progress.min(100);
        }
        if let Some(due) = self.due {
            project.due = due;
        }
        if let Some(budget) = &self.budget {
            project.budget = budget.clone();
        }
        project.updated_at = now;
    }
}
