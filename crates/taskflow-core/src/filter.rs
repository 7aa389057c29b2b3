use tracing::trace;
use uuid::Uuid;

use crate::project::{Priority, Project, ProjectStatus};
use crate::task::{Task, TaskStatus};
use crate::user::{Member, Presence, Role};

/// Filters are AND-composed across dimensions; an empty accept-set means the
/// dimension is inactive. Applying a filter preserves store iteration order.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub query: Option<String>,
    pub statuses: Vec<ProjectStatus>,
    pub priorities: Vec<Priority>,
    pub tags_include: Vec<String>,
    pub tags_exclude: Vec<String>,
}

impl ProjectFilter {
    /// Term syntax: `status:`/`priority:` add accept-set entries,
    /// `+tag`/`-tag` include or exclude a tag, everything else accumulates
    /// into the text query. Unknown `key:` values fall back to query text.
    pub fn parse(terms: &[String]) -> Self {
        let mut filter = Self::default();
        let mut words: Vec<String> = Vec::new();

        for term in terms {
            if let Some(value) = term.strip_prefix("status:") {
                if let Some(status) = ProjectStatus::parse(value) {
                    filter.statuses.push(status);
                    continue;
                }
            }
            if let Some(value) = term.strip_prefix("priority:") {
                if let Some(priority) = Priority::parse(value) {
                    filter.priorities.push(priority);
                    continue;
                }
            }
            if let Some(tag) = term.strip_prefix('+') {
                if !tag.is_empty() {
                    filter.tags_include.push(tag.to_string());
                    continue;
                }
            }
            if let Some(tag) = term.strip_prefix('-') {
                if !tag.is_empty() {
                    filter.tags_exclude.push(tag.to_string());
                    continue;
                }
            }
            words.push(term.clone());
        }

        if !words.is_empty() {
            filter.query = Some(words.join(" "));
        }
        filter
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_none()
            && self.statuses.is_empty()
            && self.priorities.is_empty()
            && self.tags_include.is_empty()
            && self.tags_exclude.is_empty()
    }

    pub fn matches(&self, project: &Project) -> bool {
        let ok = self
            .query
            .as_deref()
            .map(|query| {
                text_contains(&project.name, query) || text_contains(&project.description, query)
            })
            .unwrap_or(true)
            && accepts(&self.statuses, &project.status)
            && accepts(&self.priorities, &project.priority)
            && self
                .tags_include
                .iter()
                .all(|tag| project.tags.iter().any(|t| t == tag))
            && self
                .tags_exclude
                .iter()
                .all(|tag| project.tags.iter().all(|t| t != tag));

        trace!(id = %project.id, ok, "project filter evaluation");
        ok
    }

    pub fn apply<'a>(&self, projects: &'a [Project]) -> Vec<&'a Project> {
        projects.iter().filter(|p| self.matches(p)).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub query: Option<String>,
    pub statuses: Vec<TaskStatus>,
    pub priorities: Vec<Priority>,
    pub categories: Vec<String>,
    /// Resolved by the caller; `project:` terms need the project store.
    pub project: Option<Uuid>,
}

impl TaskFilter {
    pub fn parse(terms: &[String]) -> Self {
        let mut filter = Self::default();
        let mut words: Vec<String> = Vec::new();

        for term in terms {
            if let Some(value) = term.strip_prefix("status:") {
                if let Some(status) = TaskStatus::parse(value) {
                    filter.statuses.push(status);
                    continue;
                }
            }
            if let Some(value) = term.strip_prefix("priority:") {
                if let Some(priority) = Priority::parse(value) {
                    filter.priorities.push(priority);
                    continue;
                }
            }
            if let Some(value) = term.strip_prefix("category:") {
                if !value.is_empty() {
                    filter.categories.push(value.to_string());
                    continue;
                }
            }
            words.push(term.clone());
        }

        if !words.is_empty() {
            filter.query = Some(words.join(" "));
        }
        filter
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_none()
            && self.statuses.is_empty()
            && self.priorities.is_empty()
            && self.categories.is_empty()
            && self.project.is_none()
    }

    pub fn matches(&self, task: &Task) -> bool {
        let ok = self
            .query
            .as_deref()
            .map(|query| text_contains(&task.title, query) || text_contains(&task.category, query))
            .unwrap_or(true)
            && accepts(&self.statuses, &task.status)
            && accepts(&self.priorities, &task.priority)
            && (self.categories.is_empty()
                || self
                    .categories
                    .iter()
                    .any(|category| task.category.eq_ignore_ascii_case(category)))
            && self
                .project
                .map(|project| task.project == Some(project))
                .unwrap_or(true);

        trace!(id = %task.id, ok, "task filter evaluation");
        ok
    }

    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|t| self.matches(t)).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemberFilter {
    pub query: Option<String>,
    pub roles: Vec<Role>,
    pub departments: Vec<String>,
    pub presence: Vec<Presence>,
}

impl MemberFilter {
    pub fn parse(terms: &[String]) -> Self {
        let mut filter = Self::default();
        let mut words: Vec<String> = Vec::new();

        for term in terms {
            if let Some(value) = term.strip_prefix("role:") {
                if let Some(role) = Role::parse(value) {
                    filter.roles.push(role);
                    continue;
                }
            }
            if let Some(value) = term.strip_prefix("department:") {
                if !value.is_empty() {
                    filter.departments.push(value.to_string());
                    continue;
                }
            }
            if let Some(value) = term.strip_prefix("status:") {
                if let Some(presence) = Presence::parse(value) {
                    filter.presence.push(presence);
                    continue;
                }
            }
            words.push(term.clone());
        }

        if !words.is_empty() {
            filter.query = Some(words.join(" "));
        }
        filter
    }

    pub fn matches(&self, member: &Member) -> bool {
        self.query
            .as_deref()
            .map(|query| text_contains(&member.name, query) || text_contains(&member.email, query))
            .unwrap_or(true)
            && accepts(&self.roles, &member.role)
            && (self.departments.is_empty()
                || self
                    .departments
                    .iter()
                    .any(|dep| member.department.eq_ignore_ascii_case(dep)))
            && accepts(&self.presence, &member.status)
    }

    pub fn apply<'a>(&self, members: &'a [Member]) -> Vec<&'a Member> {
        members.iter().filter(|m| self.matches(m)).collect()
    }
}

fn accepts<T: PartialEq>(accepted: &[T], value: &T) -> bool {
    accepted.is_empty() || accepted.contains(value)
}

fn text_contains(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{ProjectFilter, TaskFilter};
    use crate::project::{Priority, Project, ProjectDraft, ProjectPatch, ProjectStatus};
    use crate::store::ProjectStore;
    use crate::task::{Task, TaskDraft};

    fn seed() -> Vec<Project> {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let mut store = ProjectStore::default();
        for (name, status, priority) in [
            ("Website Redesign", ProjectStatus::Active, Priority::High),
            ("Mobile App", ProjectStatus::Active, Priority::Low),
            ("Brand Refresh", ProjectStatus::OnHold, Priority::High),
            ("Archive Cleanup", ProjectStatus::Archived, Priority::Medium),
        ] {
            let mut draft = ProjectDraft::new(name, format!("Description for {name}"));
            draft.status = status;
            draft.priority = priority;
            store.create(draft, now).expect("create");
        }
        store.projects().to_vec()
    }

    #[test]
    fn empty_filter_accepts_everything_in_store_order() {
        let projects = seed();
        let filter = ProjectFilter::default();
        let out = filter.apply(&projects);
        assert_eq!(out.len(), projects.len());
        let names: Vec<&str> = out.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Archive Cleanup",
                "Brand Refresh",
                "Mobile App",
                "Website Redesign"
            ]
        );
    }

    #[test]
    fn search_is_case_insensitive_over_name_and_description() {
        let projects = seed();
        let filter = ProjectFilter::parse(&["WEBSITE".to_string()]);
        assert_eq!(filter.apply(&projects).len(), 1);

        // matches the generated description text too
        let filter = ProjectFilter::parse(&["description".to_string()]);
        assert_eq!(filter.apply(&projects).len(), projects.len());
    }

    #[test]
    fn dimensions_compose_commutatively() {
        let projects = seed();
        let both = ProjectFilter::parse(&["status:active".to_string(), "priority:high".to_string()]);
        let reversed =
            ProjectFilter::parse(&["priority:high".to_string(), "status:active".to_string()]);

        let a: Vec<_> = both.apply(&projects).iter().map(|p| p.id).collect();
        let b: Vec<_> = reversed.apply(&projects).iter().map(|p| p.id).collect();
        assert_eq!(a, b);
        assert_eq!(a.len(), 1);

        // sequential application equals simultaneous application
        let status_only = ProjectFilter::parse(&["status:active".to_string()]);
        let priority_only = ProjectFilter::parse(&["priority:high".to_string()]);
        let sequential: Vec<_> = projects
            .iter()
            .filter(|p| status_only.matches(p))
            .filter(|p| priority_only.matches(p))
            .map(|p| p.id)
            .collect();
        assert_eq!(a, sequential);
    }

    #[test]
    fn multiple_values_in_one_dimension_union() {
        let projects = seed();
        let filter = ProjectFilter::parse(&[
            "status:active".to_string(),
            "status:on-hold".to_string(),
        ]);
        assert_eq!(filter.apply(&projects).len(), 3);
    }

    #[test]
    fn tag_include_and_exclude() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let mut store = ProjectStore::default();
        let mut tagged = ProjectDraft::new("Tagged", "desc");
        tagged.tags = vec!["design".to_string()];
        store.create(tagged, now).expect("create");
        store
            .create(ProjectDraft::new("Plain", "desc"), now)
            .expect("create");
        let projects = store.projects().to_vec();

        let include = ProjectFilter::parse(&["+design".to_string()]);
        let names: Vec<&str> = include.apply(&projects).iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Tagged"]);

        let exclude = ProjectFilter::parse(&["-design".to_string()]);
        let names: Vec<&str> = exclude.apply(&projects).iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Plain"]);
    }

    #[test]
    fn unknown_key_terms_become_query_text() {
        let filter = ProjectFilter::parse(&["status:nonsense".to_string()]);
        assert!(filter.statuses.is_empty());
        assert_eq!(filter.query.as_deref(), Some("status:nonsense"));
    }

    #[test]
    fn task_filter_matches_title_category_and_project() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let project = uuid::Uuid::new_v4();
        let mut draft = TaskDraft::new("Design new ui presentation");
        draft.category = "Dribbble shot".to_string();
        draft.project = Some(project);
        let task = Task::from_draft(draft, now);

        let by_title = TaskFilter::parse(&["presentation".to_string()]);
        assert!(by_title.matches(&task));

        let by_category = TaskFilter::parse(&["category:dribbble shot".to_string()]);
        assert!(by_category.matches(&task));

        let mut by_project = TaskFilter::default();
        by_project.project = Some(project);
        assert!(by_project.matches(&task));
        by_project.project = Some(uuid::Uuid::new_v4());
        assert!(!by_project.matches(&task));
    }

    #[test]
    fn filtered_view_is_a_projection_not_a_mutation() {
        let projects = seed();
        let filter = ProjectFilter::parse(&["status:active".to_string()]);
        let _ = filter.apply(&projects);
        assert_eq!(projects.len(), 4);
    }

    #[test]
    fn scenario_status_update_moves_between_filtered_views() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let mut store = ProjectStore::default();
        let created = store
            .create(ProjectDraft::new("One", "first"), now)
            .expect("create");
        let mut on_hold = ProjectDraft::new("Two", "second");
        on_hold.status = ProjectStatus::OnHold;
        store.create(on_hold, now).expect("create");

        let active = ProjectFilter::parse(&["status:active".to_string()]);
        assert_eq!(active.apply(store.projects()).len(), 1);

        let patch = ProjectPatch {
            status: Some(ProjectStatus::Completed),
            ..ProjectPatch::default()
        };
        assert!(store.update(created.id, &patch, now));
        assert_eq!(active.apply(store.projects()).len(), 0);

        let completed = ProjectFilter::parse(&["status:completed".to_string()]);
        let hits = completed.apply(store.projects());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].progress, 0, "progress untouched by status update");
    }
}
