use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use uuid::Uuid;

use crate::notification::Notification;
use crate::project::Project;
use crate::task::Task;
use crate::user::{Member, UserProfile};

/// Durable backing for the in-memory stores: one JSONL file per collection
/// plus single-document files for the profile and the selection pointers.
/// All writes go through a temp file and an atomic rename.
#[derive(Debug)]
pub struct Repository {
    pub data_dir: PathBuf,
    projects_path: PathBuf,
    tasks_path: PathBuf,
    members_path: PathBuf,
    notifications_path: PathBuf,
    profile_path: PathBuf,
    selection_path: PathBuf,
}

/// Active-selection pointers, persisted across invocations the way a UI
/// session would keep them in component state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Selection {
    pub project: Option<Uuid>,
    pub task: Option<Uuid>,
}

impl Repository {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let data_dir = data_dir.to_path_buf();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        let projects_path = data_dir.join("projects.data");
        let tasks_path = data_dir.join("tasks.data");
        let members_path = data_dir.join("members.data");
        let notifications_path = data_dir.join("notifications.data");
        let profile_path = data_dir.join("profile.data");
        let selection_path = data_dir.join("selection.data");

        for path in [
            &projects_path,
            &tasks_path,
            &members_path,
            &notifications_path,
            &profile_path,
            &selection_path,
        ] {
            if !path.exists() {
                fs::write(path, "")?;
            }
        }

        info!(data_dir = %data_dir.display(), "opened repository");

        Ok(Self {
            data_dir,
            projects_path,
            tasks_path,
            members_path,
            notifications_path,
            profile_path,
            selection_path,
        })
    }

    #[tracing::instrument(skip(self))]
    pub fn load_projects(&self) -> anyhow::Result<Vec<Project>> {
        load_jsonl(&self.projects_path).context("failed to load projects.data")
    }

    #[tracing::instrument(skip(self, projects))]
    pub fn save_projects(&self, projects: &[Project]) -> anyhow::Result<()> {
        save_jsonl_atomic(&self.projects_path, projects).context("failed to save projects.data")
    }

    #[tracing::instrument(skip(self))]
    pub fn load_tasks(&self) -> anyhow::Result<Vec<Task>> {
        load_jsonl(&self.tasks_path).context("failed to load tasks.data")
    }

    #[tracing::instrument(skip(self, tasks))]
    pub fn save_tasks(&self, tasks: &[Task]) -> anyhow::Result<()> {
        save_jsonl_atomic(&self.tasks_path, tasks).context("failed to save tasks.data")
    }

    #[tracing::instrument(skip(self))]
    pub fn load_members(&self) -> anyhow::Result<Vec<Member>> {
        load_jsonl(&self.members_path).context("failed to load members.data")
    }

    #[tracing::instrument(skip(self, members))]
    pub fn save_members(&self, members: &[Member]) -> anyhow::Result<()> {
        save_jsonl_atomic(&self.members_path, members).context("failed to save members.data")
    }

    #[tracing::instrument(skip(self))]
    pub fn load_notifications(&self) -> anyhow::Result<Vec<Notification>> {
        load_jsonl(&self.notifications_path).context("failed to load notifications.data")
    }

    #[tracing::instrument(skip(self, notifications))]
    pub fn save_notifications(&self, notifications: &[Notification]) -> anyhow::Result<()> {
        save_jsonl_atomic(&self.notifications_path, notifications)
            .context("failed to save notifications.data")
    }

    /// An empty file means a fresh profile.
    #[tracing::instrument(skip(self))]
    pub fn load_profile(&self) -> anyhow::Result<UserProfile> {
        load_doc(&self.profile_path)
            .context("failed to load profile.data")
            .map(|doc| doc.unwrap_or_default())
    }

    #[tracing::instrument(skip(self, profile))]
    pub fn save_profile(&self, profile: &UserProfile) -> anyhow::Result<()> {
        save_doc_atomic(&self.profile_path, profile).context("failed to save profile.data")
    }

    #[tracing::instrument(skip(self))]
    pub fn load_selection(&self) -> anyhow::Result<Selection> {
        load_doc(&self.selection_path)
            .context("failed to load selection.data")
            .map(|doc| doc.unwrap_or_default())
    }

    #[tracing::instrument(skip(self, selection))]
    pub fn save_selection(&self, selection: &Selection) -> anyhow::Result<()> {
        save_doc_atomic(&self.selection_path, selection).context("failed to save selection.data")
    }
}

#[tracing::instrument(skip(path))]
fn load_jsonl<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    debug!(file = %path.display(), "loading jsonl");
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let record: T = serde_json::from_str(trimmed)
            .with_context(|| format!("failed parsing {} line {}", path.display(), idx + 1))?;
        out.push(record);
    }

    debug!(count = out.len(), "loaded records from jsonl");
    Ok(out)
}

#[tracing::instrument(skip(path, records))]
fn save_jsonl_atomic<T: Serialize>(path: &Path, records: &[T]) -> anyhow::Result<()> {
    debug!(file = %path.display(), count = records.len(), "saving jsonl atomically");

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    for record in records {
        let serialized = serde_json::to_string(record)?;
        writeln!(temp, "{serialized}")?;
    }
    temp.flush()?;

    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

    Ok(())
}

fn load_doc<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Option<T>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading {}", path.display()))?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let doc: T = serde_json::from_str(trimmed)
        .with_context(|| format!("failed parsing {}", path.display()))?;
    Ok(Some(doc))
}

fn save_doc_atomic<T: Serialize>(path: &Path, doc: &T) -> anyhow::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    let serialized = serde_json::to_string(doc)?;
    writeln!(temp, "{serialized}")?;
    temp.flush()?;
    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;
    Ok(())
}
