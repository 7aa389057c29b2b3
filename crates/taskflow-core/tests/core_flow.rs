use chrono::Utc;
use taskflow_core::filter::{ProjectFilter, TaskFilter};
use taskflow_core::notification::{NotificationDraft, NotificationFeed, NotificationKind};
use taskflow_core::project::{ProjectDraft, ProjectStatus};
use taskflow_core::repository::{Repository, Selection};
use taskflow_core::stats::{ProjectStats, TaskStats};
use taskflow_core::store::{ProjectStore, TaskStore};
use taskflow_core::task::{TaskDraft, TaskStatus};
use tempfile::tempdir;

#[test]
fn repository_roundtrip_and_filtering() {
    let temp = tempdir().expect("tempdir");
    let repo = Repository::open(temp.path()).expect("open repository");

    let now = Utc::now();
    let mut projects = ProjectStore::default();
    let mut draft = ProjectDraft::new("Website Redesign", "Revamp the marketing site");
    draft.tags = vec!["design".to_string()];
    let project = projects.create(draft, now).expect("create project");

    let mut tasks = TaskStore::default();
    let mut task = TaskDraft::new("Design new landing page");
    task.project = Some(project.id);
    task.status = TaskStatus::InProgress;
    let task = tasks.create(task, now).expect("create task");

    projects.select(Some(project.id));

    repo.save_projects(projects.projects()).expect("save projects");
    repo.save_tasks(tasks.tasks()).expect("save tasks");
    repo.save_selection(&Selection {
        project: projects.selected(),
        task: None,
    })
    .expect("save selection");

    // fresh handle, as the next CLI invocation would see it
    let repo = Repository::open(temp.path()).expect("reopen repository");
    let selection = repo.load_selection().expect("load selection");
    assert_eq!(selection.project, Some(project.id));

    let projects = ProjectStore::new(repo.load_projects().expect("load projects"), selection.project);
    let tasks = TaskStore::new(repo.load_tasks().expect("load tasks"), selection.task);

    assert_eq!(projects.len(), 1);
    assert_eq!(tasks.count_for_project(project.id), 1);

    let loaded = projects.get(project.id).expect("project survives reload");
    assert_eq!(loaded.name, "Website Redesign");
    assert_eq!(loaded.status, ProjectStatus::Active);
    assert_eq!(loaded.tags, vec!["design".to_string()]);

    let filter = ProjectFilter::parse(&["+design".to_string(), "status:active".to_string()]);
    assert_eq!(filter.apply(projects.projects()).len(), 1);

    let by_project = TaskFilter {
        project: Some(project.id),
        ..TaskFilter::default()
    };
    let hits = by_project.apply(tasks.tasks());
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, task.id);

    let stats = TaskStats::compute(tasks.tasks());
    assert_eq!(stats.in_progress, 1);
    assert_eq!(stats.completion_rate, 0.0);
    assert_eq!(ProjectStats::compute(projects.projects()).active, 1);
}

#[test]
fn notification_feed_survives_reload() {
    let temp = tempdir().expect("tempdir");
    let repo = Repository::open(temp.path()).expect("open repository");

    let now = Utc::now();
    let mut feed = NotificationFeed::default();
    feed.add(
        NotificationDraft::new(NotificationKind::Mention, "New Mention", "Alex mentioned you"),
        now,
    );
    let read_one = feed.add(
        NotificationDraft::new(NotificationKind::System, "Welcome", "Workspace ready"),
        now,
    );
    feed.mark_as_read(read_one.id);

    repo.save_notifications(feed.items()).expect("save notifications");

    let reloaded = NotificationFeed::new(repo.load_notifications().expect("load notifications"));
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.unread_count(), 1);
    assert!(reloaded.get(read_one.id).expect("record survives").read);
}

#[test]
fn empty_repository_loads_defaults() {
    let temp = tempdir().expect("tempdir");
    let repo = Repository::open(temp.path()).expect("open repository");

    assert!(repo.load_projects().expect("load projects").is_empty());
    assert!(repo.load_tasks().expect("load tasks").is_empty());
    assert!(repo.load_members().expect("load members").is_empty());

    let profile = repo.load_profile().expect("load profile");
    assert_eq!(profile.name, "New User");

    let selection = repo.load_selection().expect("load selection");
    assert!(selection.project.is_none());
    assert!(selection.task.is_none());
}
