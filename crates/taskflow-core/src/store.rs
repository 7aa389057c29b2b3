use chrono::{DateTime, Utc};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::project::{
    Budget, COPY_SUFFIX, Priority, Project, ProjectDraft, ProjectPatch, ProjectStatus,
};
use crate::task::{Task, TaskDraft, TaskPatch, TaskStatus};

/// In-memory project collection plus the active-selection pointer.
///
/// Ordering is newest first: `create` prepends. Mutations that reference a
/// missing id report it (`false` / `None` / a zero count) instead of
/// silently doing nothing, and every applied mutation refreshes the
/// record's `updated_at`.
#[derive(Debug, Default)]
pub struct ProjectStore {
    projects: Vec<Project>,
    selected: Option<Uuid>,
}

impl ProjectStore {
    pub fn new(projects: Vec<Project>, selected: Option<Uuid>) -> Self {
        Self { projects, selected }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn selected(&self) -> Option<Uuid> {
        self.selected
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Project> {
        self.projects.iter().find(|project| project.id == id)
    }

    #[instrument(skip(self, draft))]
    pub fn create(&mut self, draft: ProjectDraft, now: DateTime<Utc>) -> anyhow::Result<Project> {
        draft.validate()?;
        let project = Project::from_draft(draft, now);
        debug!(id = %project.id, name = %project.name, "created project");
        self.projects.insert(0, project.clone());
        Ok(project)
    }

    #[instrument(skip(self, patch))]
    pub fn update(&mut self, id: Uuid, patch: &ProjectPatch, now: DateTime<Utc>) -> bool {
        match self.projects.iter_mut().find(|project| project.id == id) {
            Some(project) => {
                patch.apply(project, now);
                true
            }
            None => {
                debug!(%id, "update target not found");
                false
            }
        }
    }

    #[instrument(skip(self))]
    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.projects.len();
        self.projects.retain(|project| project.id != id);
        let removed = self.projects.len() < before;
        if removed && self.selected == Some(id) {
            self.selected = None;
        }
        removed
    }

    #[instrument(skip(self))]
    pub fn duplicate(&mut self, id: Uuid, now: DateTime<Utc>) -> Option<Project> {
        let source = self.get(id)?;
        let mut copy = source.clone();
        copy.id = Uuid::new_v4();
        copy.name = format!("{}{}", source.name, COPY_SUFFIX);
        copy.progress = 0;
        copy.status = ProjectStatus::Active;
        copy.created_at = now;
        copy.updated_at = now;
        debug!(source = %id, copy = %copy.id, "duplicated project");
        self.projects.insert(0, copy.clone());
        Some(copy)
    }

    /// Ids with no matching record are ignored; the count of records
    /// actually touched is returned.
    #[instrument(skip(self, ids))]
    pub fn bulk_update_status(
        &mut self,
        ids: &[Uuid],
        status: ProjectStatus,
        now: DateTime<Utc>,
    ) -> usize {
        let mut touched = 0;
        for project in &mut self.projects {
            if ids.contains(&project.id) {
                project.status = status;
                project.updated_at = now;
                touched += 1;
            }
        }
        touched
    }

    #[instrument(skip(self, ids))]
    pub fn bulk_delete(&mut self, ids: &[Uuid]) -> usize {
        let before = self.projects.len();
        self.projects.retain(|project| !ids.contains(&project.id));
        let removed = before - self.projects.len();
        if let Some(selected) = self.selected
            && ids.contains(&selected)
        {
            self.selected = None;
        }
        removed
    }

    /// No validation that the id exists; a stale selection is tolerated.
    pub fn select(&mut self, id: Option<Uuid>) {
        self.selected = id;
    }

    pub fn archive(&mut self, id: Uuid, now: DateTime<Utc>) -> bool {
        self.update(
            id,
            &ProjectPatch {
                status: Some(ProjectStatus::Archived),
                ..ProjectPatch::default()
            },
            now,
        )
    }

    pub fn restore(&mut self, id: Uuid, now: DateTime<Utc>) -> bool {
        self.update(
            id,
            &ProjectPatch {
                status: Some(ProjectStatus::Active),
                ..ProjectPatch::default()
            },
            now,
        )
    }

    /// Set semantics: adding an already-present member reports false.
    pub fn add_team_member(&mut self, id: Uuid, member: Uuid, now: DateTime<Utc>) -> bool {
        match self.projects.iter_mut().find(|project| project.id == id) {
            Some(project) if !project.team.contains(&member) => {
                project.team.push(member);
                project.updated_at = now;
                true
            }
            _ => false,
        }
    }

    pub fn remove_team_member(&mut self, id: Uuid, member: Uuid, now: DateTime<Utc>) -> bool {
        match self.projects.iter_mut().find(|project| project.id == id) {
            Some(project) => {
                let before = project.team.len();
                project.team.retain(|existing| *existing != member);
                let removed = project.team.len() < before;
                if removed {
                    project.updated_at = now;
                }
                removed
            }
            None => false,
        }
    }

    pub fn add_tag(&mut self, id: Uuid, tag: &str, now: DateTime<Utc>) -> bool {
        let tag = tag.trim();
        if tag.is_empty() {
            return false;
        }
        match self.projects.iter_mut().find(|project| project.id == id) {
            Some(project) if !project.tags.iter().any(|t| t == tag) => {
                project.tags.push(tag.to_string());
                project.updated_at = now;
                true
            }
            _ => false,
        }
    }

    pub fn remove_tag(&mut self, id: Uuid, tag: &str, now: DateTime<Utc>) -> bool {
        match self.projects.iter_mut().find(|project| project.id == id) {
            Some(project) => {
                let before = project.tags.len();
                project.tags.retain(|existing| existing != tag);
                let removed = project.tags.len() < before;
                if removed {
                    project.updated_at = now;
                }
                removed
            }
            None => false,
        }
    }

    pub fn set_budget(
        &mut self,
        id: Uuid,
        budget: Option<Budget>,
        now: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        if let Some(budget) = &budget {
            budget.validate()?;
        }
        Ok(self.update(
            id,
            &ProjectPatch {
                budget: Some(budget),
                ..ProjectPatch::default()
            },
            now,
        ))
    }
}

/// Task counterpart of [`ProjectStore`]; the entity-manager pattern is
/// deliberately implemented twice with the same shape.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    selected: Option<Uuid>,
}

impl TaskStore {
    pub fn new(tasks: Vec<Task>, selected: Option<Uuid>) -> Self {
        Self { tasks, selected }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn selected(&self) -> Option<Uuid> {
        self.selected
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    #[instrument(skip(self, draft))]
    pub fn create(&mut self, draft: TaskDraft, now: DateTime<Utc>) -> anyhow::Result<Task> {
        draft.validate()?;
        let task = Task::from_draft(draft, now);
        debug!(id = %task.id, title = %task.title, "created task");
        self.tasks.insert(0, task.clone());
        Ok(task)
    }

    #[instrument(skip(self, patch))]
    pub fn update(&mut self, id: Uuid, patch: &TaskPatch, now: DateTime<Utc>) -> bool {
        match self.tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => {
                patch.apply(task, now);
                true
            }
            None => {
                debug!(%id, "update target not found");
                false
            }
        }
    }

    #[instrument(skip(self))]
    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        let removed = self.tasks.len() < before;
        if removed && self.selected == Some(id) {
            self.selected = None;
        }
        removed
    }

    #[instrument(skip(self))]
    pub fn duplicate(&mut self, id: Uuid, now: DateTime<Utc>) -> Option<Task> {
        let source = self.get(id)?;
        let mut copy = source.clone();
        copy.id = Uuid::new_v4();
        copy.title = format!("{}{}", source.title, COPY_SUFFIX);
        copy.progress = 0;
        copy.status = TaskStatus::Todo;
        copy.created_at = now;
        copy.updated_at = now;
        debug!(source = %id, copy = %copy.id, "duplicated task");
        self.tasks.insert(0, copy.clone());
        Some(copy)
    }

    #[instrument(skip(self, ids))]
    pub fn bulk_update_status(
        &mut self,
        ids: &[Uuid],
        status: TaskStatus,
        now: DateTime<Utc>,
    ) -> usize {
        let mut touched = 0;
        for task in &mut self.tasks {
            if ids.contains(&task.id) {
                task.status = status;
                task.updated_at = now;
                touched += 1;
            }
        }
        touched
    }

    #[instrument(skip(self, ids))]
    pub fn bulk_delete(&mut self, ids: &[Uuid]) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| !ids.contains(&task.id));
        let removed = before - self.tasks.len();
        if let Some(selected) = self.selected
            && ids.contains(&selected)
        {
            self.selected = None;
        }
        removed
    }

    pub fn select(&mut self, id: Option<Uuid>) {
        self.selected = id;
    }

    /// Transitions are unconstrained: any status may move to any other.
    pub fn set_status(&mut self, id: Uuid, status: TaskStatus, now: DateTime<Utc>) -> bool {
        self.update(
            id,
            &TaskPatch {
                status: Some(status),
                ..TaskPatch::default()
            },
            now,
        )
    }

    pub fn assign(&mut self, id: Uuid, member: Uuid, now: DateTime<Utc>) -> bool {
        match self.tasks.iter_mut().find(|task| task.id == id) {
            Some(task) if !task.assignees.contains(&member) => {
                task.assignees.push(member);
                task.updated_at = now;
                true
            }
            _ => false,
        }
    }

    pub fn unassign(&mut self, id: Uuid, member: Uuid, now: DateTime<Utc>) -> bool {
        match self.tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => {
                let before = task.assignees.len();
                task.assignees.retain(|existing| *existing != member);
                let removed = task.assignees.len() < before;
                if removed {
                    task.updated_at = now;
                }
                removed
            }
            None => false,
        }
    }

    /// Derived on demand; there is no cached per-project counter to drift.
    pub fn count_for_project(&self, project: Uuid) -> usize {
        self.tasks
            .iter()
            .filter(|task| task.project == Some(project))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    use super::{ProjectStore, TaskStore};
    use crate::project::{
        Budget, Priority, ProjectDraft, ProjectPatch, ProjectStatus,
    };
    use crate::task::{TaskDraft, TaskPatch, TaskStatus};

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn store_with(names: &[&str]) -> ProjectStore {
        let mut store = ProjectStore::default();
        for name in names {
            store
                .create(ProjectDraft::new(*name, format!("About {name}")), now())
                .expect("create project");
        }
        store
    }

    #[test]
    fn create_grows_by_one_with_fresh_id() {
        let mut store = store_with(&["Website Redesign"]);
        let existing: Vec<Uuid> = store.projects().iter().map(|p| p.id).collect();

        let created = store
            .create(ProjectDraft::new("Mobile App", "Ship the app"), now())
            .expect("create");

        assert_eq!(store.len(), 2);
        assert!(!existing.contains(&created.id));
        // newest first
        assert_eq!(store.projects()[0].id, created.id);
    }

    #[test]
    fn create_rejects_blank_name_and_negative_budget() {
        let mut store = ProjectStore::default();
        assert!(store.create(ProjectDraft::new("  ", "desc"), now()).is_err());

        let mut draft = ProjectDraft::new("Budgeted", "desc");
        draft.budget = Some(Budget {
            allocated: -1.0,
            spent: 0.0,
            currency: "USD".to_string(),
        });
        assert!(store.create(draft, now()).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn update_missing_id_leaves_collection_unchanged() {
        let mut store = store_with(&["Alpha"]);
        let snapshot: Vec<String> = store.projects().iter().map(|p| p.name.clone()).collect();

        let patch = ProjectPatch {
            name: Some("Beta".to_string()),
            ..ProjectPatch::default()
        };
        assert!(!store.update(Uuid::new_v4(), &patch, now()));

        let after: Vec<String> = store.projects().iter().map(|p| p.name.clone()).collect();
        assert_eq!(snapshot, after);
    }

    #[test]
    fn update_merges_partial_fields_and_refreshes_updated_at() {
        let mut store = store_with(&["Alpha"]);
        let id = store.projects()[0].id;
        let later = now() + Duration::hours(1);

        let patch = ProjectPatch {
            status: Some(ProjectStatus::Completed),
            ..ProjectPatch::default()
        };
        assert!(store.update(id, &patch, later));

        let project = store.get(id).expect("project");
        assert_eq!(project.status, ProjectStatus::Completed);
        assert_eq!(project.progress, 0, "untouched field preserved");
        assert_eq!(project.updated_at, later);
    }

    #[test]
    fn progress_is_clamped_on_update() {
        let mut store = store_with(&["Alpha"]);
        let id = store.projects()[0].id;
        let patch = ProjectPatch {
            progress: Some(250),
            ..ProjectPatch::default()
        };
        assert!(store.update(id, &patch, now()));
        assert_eq!(store.get(id).expect("project").progress, 100);
    }

    #[test]
    fn delete_clears_matching_selection() {
        let mut store = store_with(&["Alpha", "Beta"]);
        let id = store.projects()[0].id;
        store.select(Some(id));

        assert!(store.delete(id));
        assert_eq!(store.len(), 1);
        assert!(store.get(id).is_none());
        assert_eq!(store.selected(), None);

        // deleting an absent id is reported and changes nothing
        assert!(!store.delete(id));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delete_keeps_unrelated_selection() {
        let mut store = store_with(&["Alpha", "Beta"]);
        let kept = store.projects()[0].id;
        let removed = store.projects()[1].id;
        store.select(Some(kept));

        assert!(store.delete(removed));
        assert_eq!(store.selected(), Some(kept));
    }

    #[test]
    fn duplicate_resets_progress_and_status() {
        let mut store = store_with(&["Alpha"]);
        let id = store.projects()[0].id;
        store.update(
            id,
            &ProjectPatch {
                progress: Some(80),
                status: Some(ProjectStatus::OnHold),
                priority: Some(Priority::High),
                ..ProjectPatch::default()
            },
            now(),
        );

        let copy = store.duplicate(id, now()).expect("duplicate");
        assert_eq!(copy.name, "Alpha (Copy)");
        assert_eq!(copy.progress, 0);
        assert_eq!(copy.status, ProjectStatus::Active);
        assert_eq!(copy.priority, Priority::High, "shallow copy keeps priority");

        let original = store.get(id).expect("original");
        assert_eq!(original.progress, 80);
        assert_eq!(original.status, ProjectStatus::OnHold);

        assert!(store.duplicate(Uuid::new_v4(), now()).is_none());
    }

    #[test]
    fn bulk_status_ignores_unknown_ids() {
        let mut store = store_with(&["Alpha", "Beta", "Gamma"]);
        let ids: Vec<Uuid> = store.projects()[..2].iter().map(|p| p.id).collect();
        let mut with_bogus = ids.clone();
        with_bogus.push(Uuid::new_v4());

        let touched = store.bulk_update_status(&with_bogus, ProjectStatus::OnHold, now());
        assert_eq!(touched, 2);
        assert_eq!(store.projects()[2].status, ProjectStatus::Active);
    }

    #[test]
    fn bulk_delete_clears_selection_when_included() {
        let mut store = store_with(&["Alpha", "Beta", "Gamma"]);
        let doomed: Vec<Uuid> = store.projects()[..2].iter().map(|p| p.id).collect();
        store.select(Some(doomed[1]));

        assert_eq!(store.bulk_delete(&doomed), 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn team_and_tags_have_set_semantics() {
        let mut store = store_with(&["Alpha"]);
        let id = store.projects()[0].id;
        let member = Uuid::new_v4();

        assert!(store.add_team_member(id, member, now()));
        assert!(!store.add_team_member(id, member, now()));
        assert!(store.remove_team_member(id, member, now()));
        assert!(!store.remove_team_member(id, member, now()));

        assert!(store.add_tag(id, "design", now()));
        assert!(!store.add_tag(id, "design", now()));
        assert!(!store.add_tag(id, "  ", now()));
        assert!(store.remove_tag(id, "design", now()));
        assert!(!store.remove_tag(id, "design", now()));
    }

    #[test]
    fn create_drops_repeated_tags_and_team_members() {
        let mut store = ProjectStore::default();
        let member = Uuid::new_v4();
        let mut draft = ProjectDraft::new("Tagged", "desc");
        // non-adjacent repeat must collapse too
        draft.tags = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        draft.team = vec![member, member];

        let project = store.create(draft, now()).expect("create");
        assert_eq!(project.tags, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(project.team, vec![member]);
    }

    #[test]
    fn create_drops_repeated_assignees() {
        let mut store = TaskStore::default();
        let member = Uuid::new_v4();
        let mut draft = TaskDraft::new("Review designs");
        draft.assignees = vec![member, member];

        let task = store.create(draft, now()).expect("create");
        assert_eq!(task.assignees, vec![member]);
    }

    #[test]
    fn task_duplicate_and_selection_mirror_projects() {
        let mut store = TaskStore::default();
        let mut draft = TaskDraft::new("Design mockups");
        draft.status = TaskStatus::InProgress;
        draft.progress = 60;
        let task = store.create(draft, now()).expect("create task");

        store.select(Some(task.id));
        let copy = store.duplicate(task.id, now()).expect("duplicate");
        assert_eq!(copy.title, "Design mockups (Copy)");
        assert_eq!(copy.status, TaskStatus::Todo);
        assert_eq!(copy.progress, 0);

        assert!(store.delete(task.id));
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn task_counts_are_derived_per_project() {
        let project = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut store = TaskStore::default();
        for title in ["a", "b", "c"] {
            let mut draft = TaskDraft::new(title);
            draft.project = Some(project);
            store.create(draft, now()).expect("create");
        }
        let mut stray = TaskDraft::new("stray");
        stray.project = Some(other);
        let stray = store.create(stray, now()).expect("create");

        assert_eq!(store.count_for_project(project), 3);
        assert_eq!(store.count_for_project(other), 1);

        assert!(store.delete(stray.id));
        assert_eq!(store.count_for_project(other), 0);
    }

    #[test]
    fn task_update_missing_id_is_noop() {
        let mut store = TaskStore::default();
        store
            .create(TaskDraft::new("only"), now())
            .expect("create");
        let patch = TaskPatch {
            status: Some(TaskStatus::Done),
            ..TaskPatch::default()
        };
        assert!(!store.update(Uuid::new_v4(), &patch, now()));
        assert_eq!(store.tasks()[0].status, TaskStatus::Todo);
    }
}
