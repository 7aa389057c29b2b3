use std::io::{self, BufRead, Write};

use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::cli::Invocation;
use crate::config::Config;
use crate::datetime::{parse_due, today};
use crate::filter::{MemberFilter, ProjectFilter, TaskFilter};
use crate::notification::{NotificationDraft, NotificationFeed, NotificationKind};
use crate::project::{Budget, Priority, ProjectDraft, ProjectPatch, ProjectStatus};
use crate::render::{Renderer, short_id};
use crate::repository::{Repository, Selection};
use crate::stats::{ProjectStats, TaskStats};
use crate::store::{ProjectStore, TaskStore};
use crate::task::{TaskDraft, TaskPatch, TaskStatus};
use crate::user::{MemberDraft, Presence, ProfilePatch, Role, ThemePref, UserDirectory, UserProfile};

pub fn known_scopes() -> Vec<&'static str> {
    vec![
        "project",
        "task",
        "member",
        "inbox",
        "profile",
        "search",
        "overview",
        "help",
        "version",
        "_commands",
    ]
}

pub fn known_actions(scope: &str) -> Vec<&'static str> {
    match scope {
        "project" => vec![
            "add",
            "list",
            "info",
            "modify",
            "delete",
            "duplicate",
            "select",
            "archive",
            "restore",
            "bulk-status",
            "bulk-delete",
        ],
        "task" => vec![
            "add",
            "list",
            "info",
            "modify",
            "delete",
            "duplicate",
            "select",
            "status",
            "assign",
            "unassign",
            "bulk-status",
            "bulk-delete",
        ],
        "member" => vec!["add", "list", "remove"],
        "inbox" => vec!["list", "read", "read-all", "remove"],
        "profile" => vec![
            "show",
            "edit",
            "status",
            "skill-add",
            "skill-remove",
            "notify",
            "theme",
        ],
        _ => vec![],
    }
}

pub fn default_action(scope: &str) -> &'static str {
    match scope {
        "profile" => "show",
        _ => "list",
    }
}

pub fn expand_command_abbrev<'a>(token: &'a str, known: &[&'a str]) -> Option<&'a str> {
    if known.contains(&token) {
        return Some(token);
    }

    let mut matches = known.iter().copied().filter(|name| name.starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() {
        None
    } else {
        Some(first)
    }
}

/// Everything a command can touch, loaded once per invocation and written
/// back once after the mutation.
struct App {
    projects: ProjectStore,
    tasks: TaskStore,
    directory: UserDirectory,
    feed: NotificationFeed,
    profile: UserProfile,
}

impl App {
    fn load(repo: &Repository) -> anyhow::Result<Self> {
        let selection = repo.load_selection()?;
        Ok(Self {
            projects: ProjectStore::new(repo.load_projects()?, selection.project),
            tasks: TaskStore::new(repo.load_tasks()?, selection.task),
            directory: UserDirectory::new(repo.load_members()?),
            feed: NotificationFeed::new(repo.load_notifications()?),
            profile: repo.load_profile()?,
        })
    }

    fn save(&self, repo: &Repository) -> anyhow::Result<()> {
        repo.save_projects(self.projects.projects())?;
        repo.save_tasks(self.tasks.tasks())?;
        repo.save_members(self.directory.members())?;
        repo.save_notifications(self.feed.items())?;
        repo.save_profile(&self.profile)?;
        repo.save_selection(&Selection {
            project: self.projects.selected(),
            task: self.tasks.selected(),
        })
    }
}

#[instrument(skip(repo, cfg, renderer, inv))]
pub fn dispatch(
    repo: &Repository,
    cfg: &Config,
    renderer: &mut Renderer,
    inv: Invocation,
) -> anyhow::Result<()> {
    let now = Utc::now();
    let today = today();
    let mut app = App::load(repo)?;

    debug!(
        scope = %inv.scope,
        action = %inv.action,
        args = ?inv.args,
        "dispatching command"
    );

    let changed = match (inv.scope.as_str(), inv.action.as_str()) {
        ("project", "add") => cmd_project_add(&mut app, &inv.args, now, today)?,
        ("project", "list") => cmd_project_list(&mut app, renderer, &inv.args, today)?,
        ("project", "info") => cmd_project_info(&app, renderer, &inv.args)?,
        ("project", "modify") => cmd_project_modify(&mut app, &inv.args, now, today)?,
        ("project", "delete") => cmd_project_delete(&mut app, cfg, &inv.args)?,
        ("project", "duplicate") => cmd_project_duplicate(&mut app, &inv.args, now)?,
        ("project", "select") => cmd_project_select(&mut app, &inv.args)?,
        ("project", "archive") => cmd_project_archive(&mut app, &inv.args, now, true)?,
        ("project", "restore") => cmd_project_archive(&mut app, &inv.args, now, false)?,
        ("project", "bulk-status") => cmd_project_bulk_status(&mut app, &inv.args, now)?,
        ("project", "bulk-delete") => cmd_project_bulk_delete(&mut app, cfg, &inv.args)?,
        ("task", "add") => cmd_task_add(&mut app, &inv.args, now, today)?,
        ("task", "list") => cmd_task_list(&mut app, renderer, &inv.args, today)?,
        ("task", "info") => cmd_task_info(&app, renderer, &inv.args)?,
        ("task", "modify") => cmd_task_modify(&mut app, &inv.args, now, today)?,
        ("task", "delete") => cmd_task_delete(&mut app, cfg, &inv.args)?,
        ("task", "duplicate") => cmd_task_duplicate(&mut app, &inv.args, now)?,
        ("task", "select") => cmd_task_select(&mut app, &inv.args)?,
        ("task", "status") => cmd_task_status(&mut app, &inv.args, now)?,
        ("task", "assign") => cmd_task_assign(&mut app, &inv.args, now, true)?,
        ("task", "unassign") => cmd_task_assign(&mut app, &inv.args, now, false)?,
        ("task", "bulk-status") => cmd_task_bulk_status(&mut app, &inv.args, now)?,
        ("task", "bulk-delete") => cmd_task_bulk_delete(&mut app, cfg, &inv.args)?,
        ("member", "add") => cmd_member_add(&mut app, &inv.args)?,
        ("member", "list") => cmd_member_list(&app, renderer, &inv.args)?,
        ("member", "remove") => cmd_member_remove(&mut app, cfg, &inv.args)?,
        ("inbox", "list") => cmd_inbox_list(&mut app, renderer, now, today)?,
        ("inbox", "read") => cmd_inbox_read(&mut app, &inv.args)?,
        ("inbox", "read-all") => cmd_inbox_read_all(&mut app)?,
        ("inbox", "remove") => cmd_inbox_remove(&mut app, &inv.args)?,
        ("profile", "show") => cmd_profile_show(&app, renderer)?,
        ("profile", "edit") => cmd_profile_edit(&mut app, &inv.args)?,
        ("profile", "status") => cmd_profile_status(&mut app, &inv.args)?,
        ("profile", "skill-add") => cmd_profile_skill(&mut app, &inv.args, true)?,
        ("profile", "skill-remove") => cmd_profile_skill(&mut app, &inv.args, false)?,
        ("profile", "notify") => cmd_profile_notify(&mut app, &inv.args)?,
        ("profile", "theme") => cmd_profile_theme(&mut app, &inv.args)?,
        ("search", _) => cmd_search(&app, cfg, renderer, &inv.args)?,
        ("overview", _) => cmd_overview(&mut app, renderer, now, today)?,
        ("help", _) => {
            cmd_help()?;
            false
        }
        ("version", _) => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            false
        }
        ("_commands", _) => {
            for scope in known_scopes() {
                println!("{scope}");
            }
            false
        }
        (scope, action) => return Err(anyhow!("unknown command: {scope} {action}")),
    };

    if changed {
        app.save(repo)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// projects

#[instrument(skip(app, args, now, today))]
fn cmd_project_add(
    app: &mut App,
    args: &[String],
    now: DateTime<Utc>,
    today: NaiveDate,
) -> anyhow::Result<bool> {
    info!("command project add");

    let (words, mods) = parse_project_mods(args, today)?;
    let mut draft = ProjectDraft::new(words.join(" "), String::new());
    let mut budget = BudgetMods::default();

    for m in mods {
        match m {
            ProjectMod::Name(name) => draft.name = name,
            ProjectMod::Desc(desc) => draft.description = desc,
            ProjectMod::Status(status) => draft.status = status,
            ProjectMod::Priority(priority) => draft.priority = priority,
            ProjectMod::Progress(progress) => draft.progress = progress,
            ProjectMod::Due(due) => draft.due = due,
            ProjectMod::AddTag(tag) => draft.tags.push(tag),
            ProjectMod::AddTeam(token) => {
                draft.team.push(resolve_member(&app.directory, &token)?);
            }
            ProjectMod::RemoveTag(_) | ProjectMod::RemoveTeam(_) => {
                return Err(anyhow!("nothing to remove on a new project"));
            }
            ProjectMod::Budget(change) => budget.collect(change),
        }
    }
    draft.budget = budget.merge(None)?;

    let project = app.projects.create(draft, now)?;
    println!("Created project {}.", short_id(project.id));
    Ok(true)
}

#[instrument(skip_all)]
fn cmd_project_list(
    app: &mut App,
    renderer: &mut Renderer,
    args: &[String],
    today: NaiveDate,
) -> anyhow::Result<bool> {
    let filter = ProjectFilter::parse(args);
    let visible = filter.apply(app.projects.projects());
    debug!(total = app.projects.len(), visible = visible.len(), "project list");
    renderer.print_project_table(&visible, &app.tasks, app.projects.selected(), today)?;
    Ok(false)
}

fn cmd_project_info(app: &App, renderer: &mut Renderer, args: &[String]) -> anyhow::Result<bool> {
    let id = project_target(app, args)?;
    let project = app
        .projects
        .get(id)
        .ok_or_else(|| anyhow!("no project with id {id}"))?;
    renderer.print_project_info(project, &app.tasks, &app.directory)?;
    Ok(false)
}

#[instrument(skip(app, args, now, today))]
fn cmd_project_modify(
    app: &mut App,
    args: &[String],
    now: DateTime<Utc>,
    today: NaiveDate,
) -> anyhow::Result<bool> {
    info!("command project modify");

    let (target, rest) = split_target(args)?;
    let id = resolve_project(&app.projects, target)?;
    let (words, mods) = parse_project_mods(&rest, today)?;
    if !words.is_empty() {
        return Err(anyhow!("unexpected arguments: {}", words.join(" ")));
    }

    let mut patch = ProjectPatch::default();
    let mut budget = BudgetMods::default();
    let mut tag_ops: Vec<(bool, String)> = Vec::new();
    let mut team_ops: Vec<(bool, Uuid)> = Vec::new();

    for m in mods {
        match m {
            ProjectMod::Name(name) => patch.name = Some(name),
            ProjectMod::Desc(desc) => patch.description = Some(desc),
            ProjectMod::Status(status) => patch.status = Some(status),
            ProjectMod::Priority(priority) => patch.priority = Some(priority),
            ProjectMod::Progress(progress) => patch.progress = Some(progress),
            ProjectMod::Due(due) => patch.due = Some(due),
            ProjectMod::AddTag(tag) => tag_ops.push((true, tag)),
            ProjectMod::RemoveTag(tag) => tag_ops.push((false, tag)),
            ProjectMod::AddTeam(token) => {
                team_ops.push((true, resolve_member(&app.directory, &token)?));
            }
            ProjectMod::RemoveTeam(token) => {
                team_ops.push((false, resolve_member(&app.directory, &token)?));
            }
            ProjectMod::Budget(change) => budget.collect(change),
        }
    }

    if patch.is_empty() && tag_ops.is_empty() && team_ops.is_empty() && budget.is_empty() {
        return Err(anyhow!("nothing to modify"));
    }

    patch.validate()?;
    let mut changed = false;
    if !patch.is_empty() {
        if !app.projects.update(id, &patch, now) {
            return Err(anyhow!("no project with id {id}"));
        }
        changed = true;
    }
    for (add, tag) in tag_ops {
        let applied = if add {
            app.projects.add_tag(id, &tag, now)
        } else {
            app.projects.remove_tag(id, &tag, now)
        };
        changed = changed || applied;
    }
    for (add, member) in team_ops {
        let applied = if add {
            app.projects.add_team_member(id, member, now)
        } else {
            app.projects.remove_team_member(id, member, now)
        };
        changed = changed || applied;
    }
    if !budget.is_empty() {
        let current = app.projects.get(id).and_then(|p| p.budget.clone());
        if !app.projects.set_budget(id, budget.merge(current)?, now)? {
            return Err(anyhow!("no project with id {id}"));
        }
        changed = true;
    }

    if !changed {
        println!("No change.");
        return Ok(false);
    }
    println!("Modified project {}.", short_id(id));
    Ok(true)
}

fn cmd_project_delete(app: &mut App, cfg: &Config, args: &[String]) -> anyhow::Result<bool> {
    let id = project_target(app, args)?;
    let name = app
        .projects
        .get(id)
        .map(|p| p.name.clone())
        .ok_or_else(|| anyhow!("no project with id {id}"))?;

    if !confirm(cfg, &format!("Delete project '{name}'?"))? {
        println!("Aborted.");
        return Ok(false);
    }

    if !app.projects.delete(id) {
        return Err(anyhow!("no project with id {id}"));
    }
    println!("Deleted project {}.", short_id(id));
    Ok(true)
}

fn cmd_project_duplicate(
    app: &mut App,
    args: &[String],
    now: DateTime<Utc>,
) -> anyhow::Result<bool> {
    let id = project_target(app, args)?;
    let copy = app
        .projects
        .duplicate(id, now)
        .ok_or_else(|| anyhow!("no project with id {id}"))?;
    println!("Created project {} ({}).", short_id(copy.id), copy.name);
    Ok(true)
}

fn cmd_project_select(app: &mut App, args: &[String]) -> anyhow::Result<bool> {
    match args.first().map(|s| s.as_str()) {
        None | Some("none") => {
            app.projects.select(None);
            println!("Cleared project selection.");
        }
        Some(token) => {
            let id = resolve_project(&app.projects, token)?;
            app.projects.select(Some(id));
            println!("Selected project {}.", short_id(id));
        }
    }
    Ok(true)
}

fn cmd_project_archive(
    app: &mut App,
    args: &[String],
    now: DateTime<Utc>,
    archive: bool,
) -> anyhow::Result<bool> {
    let id = project_target(app, args)?;
    let done = if archive {
        app.projects.archive(id, now)
    } else {
        app.projects.restore(id, now)
    };
    if !done {
        return Err(anyhow!("no project with id {id}"));
    }
    println!(
        "{} project {}.",
        if archive { "Archived" } else { "Restored" },
        short_id(id)
    );
    Ok(true)
}

fn cmd_project_bulk_status(
    app: &mut App,
    args: &[String],
    now: DateTime<Utc>,
) -> anyhow::Result<bool> {
    let (status, rest) = split_target(args)?;
    let status = ProjectStatus::parse(status)
        .ok_or_else(|| anyhow!("unknown project status: {status}"))?;
    let ids = resolve_many(&rest, |token| resolve_project(&app.projects, token))?;
    let touched = app.projects.bulk_update_status(&ids, status, now);
    println!("Updated {touched} project(s).");
    Ok(touched > 0)
}

fn cmd_project_bulk_delete(app: &mut App, cfg: &Config, args: &[String]) -> anyhow::Result<bool> {
    let ids = resolve_many(args, |token| resolve_project(&app.projects, token))?;
    if ids.is_empty() {
        return Err(anyhow!("no projects given"));
    }
    if !confirm(cfg, &format!("Delete {} project(s)?", ids.len()))? {
        println!("Aborted.");
        return Ok(false);
    }
    let removed = app.projects.bulk_delete(&ids);
    println!("Deleted {removed} project(s).");
    Ok(removed > 0)
}

// ---------------------------------------------------------------------------
// tasks

#[instrument(skip(app, args, now, today))]
fn cmd_task_add(
    app: &mut App,
    args: &[String],
    now: DateTime<Utc>,
    today: NaiveDate,
) -> anyhow::Result<bool> {
    info!("command task add");

    let (words, mods) = parse_task_mods(args, today)?;
    let mut draft = TaskDraft::new(words.join(" "));
    // tasks created with no explicit project land in the selected one
    draft.project = app.projects.selected();

    for m in mods {
        match m {
            TaskMod::Title(title) => draft.title = title,
            TaskMod::Category(category) => draft.category = category,
            TaskMod::Status(status) => draft.status = status,
            TaskMod::Priority(priority) => draft.priority = priority,
            TaskMod::Progress(progress) => draft.progress = progress,
            TaskMod::Due(due) => draft.due = due,
            TaskMod::Project(None) => draft.project = None,
            TaskMod::Project(Some(token)) => {
                draft.project = Some(resolve_project(&app.projects, &token)?);
            }
            TaskMod::AddAssignee(token) => {
                draft.assignees.push(resolve_member(&app.directory, &token)?);
            }
            TaskMod::RemoveAssignee(_) => {
                return Err(anyhow!("nothing to unassign on a new task"));
            }
        }
    }

    let assignees = draft.assignees.clone();
    let task = app.tasks.create(draft, now)?;
    for member in assignees {
        notify_assignment(app, task.id, &task.title, member, now);
    }
    println!("Created task {}.", short_id(task.id));
    Ok(true)
}

#[instrument(skip_all)]
fn cmd_task_list(
    app: &mut App,
    renderer: &mut Renderer,
    args: &[String],
    today: NaiveDate,
) -> anyhow::Result<bool> {
    // `project:` terms need the project store to resolve, so they are
    // peeled off before the generic parser sees the rest
    let mut terms: Vec<String> = Vec::new();
    let mut project_token: Option<String> = None;
    for term in args {
        if let Some(token) = term.strip_prefix("project:") {
            project_token = Some(token.to_string());
        } else {
            terms.push(term.clone());
        }
    }

    let mut filter = TaskFilter::parse(&terms);
    if let Some(token) = project_token {
        filter.project = Some(resolve_project(&app.projects, &token)?);
    }

    let visible = filter.apply(app.tasks.tasks());
    debug!(total = app.tasks.len(), visible = visible.len(), "task list");
    renderer.print_task_table(
        &visible,
        app.projects.projects(),
        &app.directory,
        app.tasks.selected(),
        today,
    )?;
    Ok(false)
}

fn cmd_task_info(app: &App, renderer: &mut Renderer, args: &[String]) -> anyhow::Result<bool> {
    let id = task_target(app, args)?;
    let task = app
        .tasks
        .get(id)
        .ok_or_else(|| anyhow!("no task with id {id}"))?;
    renderer.print_task_info(task, app.projects.projects(), &app.directory)?;
    Ok(false)
}

#[instrument(skip(app, args, now, today))]
fn cmd_task_modify(
    app: &mut App,
    args: &[String],
    now: DateTime<Utc>,
    today: NaiveDate,
) -> anyhow::Result<bool> {
    info!("command task modify");

    let (target, rest) = split_target(args)?;
    let id = resolve_task(&app.tasks, target)?;
    let (words, mods) = parse_task_mods(&rest, today)?;
    if !words.is_empty() {
        return Err(anyhow!("unexpected arguments: {}", words.join(" ")));
    }

    let mut patch = TaskPatch::default();
    let mut assign_ops: Vec<(bool, Uuid)> = Vec::new();

    for m in mods {
        match m {
            TaskMod::Title(title) => patch.title = Some(title),
            TaskMod::Category(category) => patch.category = Some(category),
            TaskMod::Status(status) => patch.status = Some(status),
            TaskMod::Priority(priority) => patch.priority = Some(priority),
            TaskMod::Progress(progress) => patch.progress = Some(progress),
            TaskMod::Due(due) => patch.due = Some(due),
            TaskMod::Project(None) => patch.project = Some(None),
            TaskMod::Project(Some(token)) => {
                patch.project = Some(Some(resolve_project(&app.projects, &token)?));
            }
            TaskMod::AddAssignee(token) => {
                assign_ops.push((true, resolve_member(&app.directory, &token)?));
            }
            TaskMod::RemoveAssignee(token) => {
                assign_ops.push((false, resolve_member(&app.directory, &token)?));
            }
        }
    }

    if patch.is_empty() && assign_ops.is_empty() {
        return Err(anyhow!("nothing to modify"));
    }

    patch.validate()?;
    let mut changed = false;
    if !patch.is_empty() {
        if !app.tasks.update(id, &patch, now) {
            return Err(anyhow!("no task with id {id}"));
        }
        changed = true;
    }
    for (add, member) in assign_ops {
        if add {
            if app.tasks.assign(id, member, now) {
                changed = true;
                if let Some(task) = app.tasks.get(id) {
                    let title = task.title.clone();
                    notify_assignment(app, id, &title, member, now);
                }
            }
        } else if app.tasks.unassign(id, member, now) {
            changed = true;
        }
    }

    if !changed {
        println!("No change.");
        return Ok(false);
    }
    println!("Modified task {}.", short_id(id));
    Ok(true)
}

fn cmd_task_delete(app: &mut App, cfg: &Config, args: &[String]) -> anyhow::Result<bool> {
    let id = task_target(app, args)?;
    let title = app
        .tasks
        .get(id)
        .map(|t| t.title.clone())
        .ok_or_else(|| anyhow!("no task with id {id}"))?;

    if !confirm(cfg, &format!("Delete task '{title}'?"))? {
        println!("Aborted.");
        return Ok(false);
    }

    if !app.tasks.delete(id) {
        return Err(anyhow!("no task with id {id}"));
    }
    println!("Deleted task {}.", short_id(id));
    Ok(true)
}

fn cmd_task_duplicate(app: &mut App, args: &[String], now: DateTime<Utc>) -> anyhow::Result<bool> {
    let id = task_target(app, args)?;
    let copy = app
        .tasks
        .duplicate(id, now)
        .ok_or_else(|| anyhow!("no task with id {id}"))?;
    println!("Created task {} ({}).", short_id(copy.id), copy.title);
    Ok(true)
}

fn cmd_task_select(app: &mut App, args: &[String]) -> anyhow::Result<bool> {
    match args.first().map(|s| s.as_str()) {
        None | Some("none") => {
            app.tasks.select(None);
            println!("Cleared task selection.");
        }
        Some(token) => {
            let id = resolve_task(&app.tasks, token)?;
            app.tasks.select(Some(id));
            println!("Selected task {}.", short_id(id));
        }
    }
    Ok(true)
}

fn cmd_task_status(app: &mut App, args: &[String], now: DateTime<Utc>) -> anyhow::Result<bool> {
    let (target, rest) = split_target(args)?;
    let id = resolve_task(&app.tasks, target)?;
    let status = rest
        .first()
        .and_then(|token| TaskStatus::parse(token))
        .ok_or_else(|| anyhow!("expected a status: todo, inprogress or done"))?;
    if !app.tasks.set_status(id, status, now) {
        return Err(anyhow!("no task with id {id}"));
    }
    println!("Task {} is now {}.", short_id(id), status.label());
    Ok(true)
}

fn cmd_task_assign(
    app: &mut App,
    args: &[String],
    now: DateTime<Utc>,
    assign: bool,
) -> anyhow::Result<bool> {
    let (target, rest) = split_target(args)?;
    let id = resolve_task(&app.tasks, target)?;
    let member_token = rest.first().ok_or_else(|| anyhow!("expected a member"))?;
    let member = resolve_member(&app.directory, member_token)?;

    let done = if assign {
        app.tasks.assign(id, member, now)
    } else {
        app.tasks.unassign(id, member, now)
    };
    if !done {
        println!("No change.");
        return Ok(false);
    }

    if assign && let Some(task) = app.tasks.get(id) {
        let title = task.title.clone();
        notify_assignment(app, id, &title, member, now);
    }
    println!(
        "{} {} {} task {}.",
        if assign { "Assigned" } else { "Unassigned" },
        app.directory.display_name(member),
        if assign { "to" } else { "from" },
        short_id(id)
    );
    Ok(true)
}

fn cmd_task_bulk_status(
    app: &mut App,
    args: &[String],
    now: DateTime<Utc>,
) -> anyhow::Result<bool> {
    let (status, rest) = split_target(args)?;
    let status =
        TaskStatus::parse(status).ok_or_else(|| anyhow!("unknown task status: {status}"))?;
    let ids = resolve_many(&rest, |token| resolve_task(&app.tasks, token))?;
    let touched = app.tasks.bulk_update_status(&ids, status, now);
    println!("Updated {touched} task(s).");
    Ok(touched > 0)
}

fn cmd_task_bulk_delete(app: &mut App, cfg: &Config, args: &[String]) -> anyhow::Result<bool> {
    let ids = resolve_many(args, |token| resolve_task(&app.tasks, token))?;
    if ids.is_empty() {
        return Err(anyhow!("no tasks given"));
    }
    if !confirm(cfg, &format!("Delete {} task(s)?", ids.len()))? {
        println!("Aborted.");
        return Ok(false);
    }
    let removed = app.tasks.bulk_delete(&ids);
    println!("Deleted {removed} task(s).");
    Ok(removed > 0)
}

// ---------------------------------------------------------------------------
// members

fn cmd_member_add(app: &mut App, args: &[String]) -> anyhow::Result<bool> {
    let mut words: Vec<String> = Vec::new();
    let mut draft = MemberDraft::new("", "");

    for term in args {
        if let Some(value) = term.strip_prefix("email:") {
            draft.email = value.to_string();
        } else if let Some(value) = term.strip_prefix("role:") {
            draft.role =
                Role::parse(value).ok_or_else(|| anyhow!("unknown role: {value}"))?;
        } else if let Some(value) = term.strip_prefix("department:") {
            draft.department = value.to_string();
        } else if let Some(value) = term.strip_prefix("avatar:") {
            draft.avatar = Some(value.to_string());
        } else {
            words.push(term.clone());
        }
    }
    draft.name = words.join(" ");

    let member = app.directory.add(draft)?;
    println!("Added member {} ({}).", short_id(member.id), member.name);
    Ok(true)
}

fn cmd_member_list(app: &App, renderer: &mut Renderer, args: &[String]) -> anyhow::Result<bool> {
    let filter = MemberFilter::parse(args);
    let visible = filter.apply(app.directory.members());
    renderer.print_member_table(&visible)?;
    Ok(false)
}

fn cmd_member_remove(app: &mut App, cfg: &Config, args: &[String]) -> anyhow::Result<bool> {
    let token = args.first().ok_or_else(|| anyhow!("expected a member"))?;
    let id = resolve_member(&app.directory, token)?;
    let name = app.directory.display_name(id);

    if !confirm(cfg, &format!("Remove member '{name}'?"))? {
        println!("Aborted.");
        return Ok(false);
    }

    // team and assignee references stay behind and render as placeholders
    if !app.directory.remove(id) {
        return Err(anyhow!("no member with id {id}"));
    }
    println!("Removed member {name}.");
    Ok(true)
}

// ---------------------------------------------------------------------------
// inbox

#[instrument(skip_all)]
fn cmd_inbox_list(
    app: &mut App,
    renderer: &mut Renderer,
    now: DateTime<Utc>,
    today: NaiveDate,
) -> anyhow::Result<bool> {
    let added = scan_deadlines(app, now, today);
    renderer.print_notification_table(app.feed.items())?;
    println!("{} unread.", app.feed.unread_count());
    Ok(added > 0)
}

fn cmd_inbox_read(app: &mut App, args: &[String]) -> anyhow::Result<bool> {
    let token = args.first().ok_or_else(|| anyhow!("expected a notification id"))?;
    let id = resolve_notification(&app.feed, token)?;
    if !app.feed.mark_as_read(id) {
        return Err(anyhow!("no notification with id {id}"));
    }
    println!("Marked {} as read.", short_id(id));
    Ok(true)
}

fn cmd_inbox_read_all(app: &mut App) -> anyhow::Result<bool> {
    let marked = app.feed.mark_all_as_read();
    println!("Marked {marked} notification(s) as read.");
    Ok(marked > 0)
}

fn cmd_inbox_remove(app: &mut App, args: &[String]) -> anyhow::Result<bool> {
    let token = args.first().ok_or_else(|| anyhow!("expected a notification id"))?;
    let id = resolve_notification(&app.feed, token)?;
    if !app.feed.remove(id) {
        return Err(anyhow!("no notification with id {id}"));
    }
    println!("Removed notification {}.", short_id(id));
    Ok(true)
}

/// One urgent alert per task with a deadline inside the next day; an unread
/// alert for the same task suppresses a duplicate.
fn scan_deadlines(app: &mut App, now: DateTime<Utc>, today: NaiveDate) -> usize {
    if !app.profile.prefs.deadlines {
        return 0;
    }

    let due_soon: Vec<(Uuid, String)> = app
        .tasks
        .tasks()
        .iter()
        .filter(|task| task.due_within(today, 1))
        .filter(|task| !app.feed.has_unread_for_task(NotificationKind::Deadline, task.id))
        .map(|task| (task.id, task.title.clone()))
        .collect();

    let added = due_soon.len();
    for (id, title) in due_soon {
        app.feed.add(
            NotificationDraft::new(
                NotificationKind::Deadline,
                "Deadline Approaching",
                format!("'{title}' is due soon"),
            )
            .urgent()
            .for_task(id),
            now,
        );
    }
    debug!(added, "deadline scan");
    added
}

fn notify_assignment(app: &mut App, task: Uuid, title: &str, member: Uuid, now: DateTime<Utc>) {
    if !app.profile.prefs.task_updates {
        return;
    }
    let name = app.directory.display_name(member);
    app.feed.add(
        NotificationDraft::new(
            NotificationKind::Task,
            "Task Assigned",
            format!("{name} assigned to '{title}'"),
        )
        .for_task(task),
        now,
    );
}

// ---------------------------------------------------------------------------
// profile

fn cmd_profile_show(app: &App, renderer: &mut Renderer) -> anyhow::Result<bool> {
    renderer.print_profile(&app.profile)?;
    Ok(false)
}

fn cmd_profile_edit(app: &mut App, args: &[String]) -> anyhow::Result<bool> {
    let mut patch = ProfilePatch::default();
    for term in args {
        if let Some(value) = term.strip_prefix("name:") {
            patch.name = Some(value.to_string());
        } else if let Some(value) = term.strip_prefix("email:") {
            patch.email = Some(value.to_string());
        } else if let Some(value) = term.strip_prefix("avatar:") {
            patch.avatar = Some(value.to_string());
        } else if let Some(value) = term.strip_prefix("department:") {
            patch.department = Some(value.to_string());
        } else if let Some(value) = term.strip_prefix("timezone:") {
            patch.timezone = Some(value.to_string());
        } else if let Some(value) = term.strip_prefix("bio:") {
            patch.bio = Some(value.to_string());
        } else {
            return Err(anyhow!("unknown profile field: {term}"));
        }
    }

    if patch.is_empty() {
        return Err(anyhow!("nothing to edit"));
    }
    app.profile.apply(&patch)?;
    println!("Updated profile.");
    Ok(true)
}

fn cmd_profile_status(app: &mut App, args: &[String]) -> anyhow::Result<bool> {
    let token = args.first().ok_or_else(|| anyhow!("expected a status"))?;
    let status = Presence::parse(token)
        .ok_or_else(|| anyhow!("unknown status: {token} (online, away, busy, offline)"))?;
    app.profile.set_status(status);
    println!("Status set to {}.", status.label());
    Ok(true)
}

fn cmd_profile_skill(app: &mut App, args: &[String], add: bool) -> anyhow::Result<bool> {
    if args.is_empty() {
        return Err(anyhow!("expected a skill"));
    }
    let skill = args.join(" ");
    let changed = if add {
        app.profile.add_skill(&skill)
    } else {
        app.profile.remove_skill(&skill)
    };
    if changed {
        println!("{} skill '{skill}'.", if add { "Added" } else { "Removed" });
    } else {
        println!("No change.");
    }
    Ok(changed)
}

fn cmd_profile_notify(app: &mut App, args: &[String]) -> anyhow::Result<bool> {
    let key = args.first().ok_or_else(|| anyhow!("expected a preference key"))?;
    let value = args.get(1).ok_or_else(|| anyhow!("expected on or off"))?;
    let enabled = match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => true,
        "off" | "false" | "no" | "0" => false,
        other => return Err(anyhow!("expected on or off, got: {other}")),
    };
    app.profile.set_notification_pref(key, enabled)?;
    println!("Preference {key} set to {}.", if enabled { "on" } else { "off" });
    Ok(true)
}

fn cmd_profile_theme(app: &mut App, args: &[String]) -> anyhow::Result<bool> {
    let token = args.first().ok_or_else(|| anyhow!("expected a theme"))?;
    let theme = ThemePref::parse(token)
        .ok_or_else(|| anyhow!("unknown theme: {token} (light, dark, system)"))?;
    app.profile.theme = theme;
    println!("Theme set to {}.", theme.label());
    Ok(true)
}

// ---------------------------------------------------------------------------
// cross-entity

#[instrument(skip(app, cfg, renderer, args))]
fn cmd_search(
    app: &App,
    cfg: &Config,
    renderer: &mut Renderer,
    args: &[String],
) -> anyhow::Result<bool> {
    if args.is_empty() {
        return Err(anyhow!("expected a search query"));
    }
    let query = args.join(" ").to_ascii_lowercase();
    let limit = cfg.get_usize("search.limit").unwrap_or(10);
    let mut remaining = limit;

    let projects: Vec<_> = app
        .projects
        .projects()
        .iter()
        .filter(|p| {
            p.name.to_ascii_lowercase().contains(&query)
                || p.description.to_ascii_lowercase().contains(&query)
        })
        .take(remaining)
        .collect();
    remaining = remaining.saturating_sub(projects.len());

    let tasks: Vec<_> = app
        .tasks
        .tasks()
        .iter()
        .filter(|t| {
            t.title.to_ascii_lowercase().contains(&query)
                || t.category.to_ascii_lowercase().contains(&query)
        })
        .take(remaining)
        .collect();
    remaining = remaining.saturating_sub(tasks.len());

    let members: Vec<_> = app
        .directory
        .members()
        .iter()
        .filter(|m| {
            m.name.to_ascii_lowercase().contains(&query)
                || m.email.to_ascii_lowercase().contains(&query)
        })
        .take(remaining)
        .collect();

    if !projects.is_empty() {
        println!("Projects");
        for project in &projects {
            println!(
                "  {} {}",
                renderer.paint(&short_id(project.id), "33"),
                project.name
            );
        }
    }
    if !tasks.is_empty() {
        println!("Tasks");
        for task in &tasks {
            println!("  {} {}", renderer.paint(&short_id(task.id), "33"), task.title);
        }
    }
    if !members.is_empty() {
        println!("Members");
        for member in &members {
            println!(
                "  {} {}",
                renderer.paint(&short_id(member.id), "33"),
                member.name
            );
        }
    }
    if projects.is_empty() && tasks.is_empty() && members.is_empty() {
        println!("No matches.");
    }
    Ok(false)
}

fn cmd_overview(
    app: &mut App,
    renderer: &mut Renderer,
    now: DateTime<Utc>,
    today: NaiveDate,
) -> anyhow::Result<bool> {
    let added = scan_deadlines(app, now, today);

    let project_stats = ProjectStats::compute(app.projects.projects());
    let task_stats = TaskStats::compute(app.tasks.tasks());
    renderer.print_stats(&project_stats, &task_stats, app.feed.unread_count())?;

    if let Some(selected) = app.projects.selected().and_then(|id| app.projects.get(id)) {
        println!();
        println!("Selected project: {} ({}%)", selected.name, selected.progress);
    }
    Ok(added > 0)
}

fn cmd_help() -> anyhow::Result<()> {
    println!("usage: taskflow [options] <command> [action] [args]");
    println!();
    for scope in known_scopes() {
        let actions = known_actions(scope);
        if actions.is_empty() {
            println!("  {scope}");
        } else {
            println!("  {scope} {}", actions.join("|"));
        }
    }
    println!();
    println!("Commands and actions may be abbreviated to any unambiguous prefix.");
    Ok(())
}

// ---------------------------------------------------------------------------
// helpers

fn confirm(cfg: &Config, prompt: &str) -> anyhow::Result<bool> {
    if !cfg.get_bool("confirmation").unwrap_or(true) {
        return Ok(true);
    }
    print!("{prompt} (yes/no) ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

fn split_target(args: &[String]) -> anyhow::Result<(&str, Vec<String>)> {
    let target = args.first().ok_or_else(|| anyhow!("expected a target"))?;
    Ok((target.as_str(), args[1..].to_vec()))
}

fn project_target(app: &App, args: &[String]) -> anyhow::Result<Uuid> {
    match args.first() {
        Some(token) => resolve_project(&app.projects, token),
        None => app
            .projects
            .selected()
            .ok_or_else(|| anyhow!("no project given and none selected")),
    }
}

fn task_target(app: &App, args: &[String]) -> anyhow::Result<Uuid> {
    match args.first() {
        Some(token) => resolve_task(&app.tasks, token),
        None => app
            .tasks
            .selected()
            .ok_or_else(|| anyhow!("no task given and none selected")),
    }
}

fn resolve_project(store: &ProjectStore, token: &str) -> anyhow::Result<Uuid> {
    let candidates: Vec<(Uuid, String)> = store
        .projects()
        .iter()
        .map(|p| (p.id, p.name.clone()))
        .collect();
    resolve_ref(token, "project", &candidates)
}

fn resolve_task(store: &TaskStore, token: &str) -> anyhow::Result<Uuid> {
    let candidates: Vec<(Uuid, String)> = store
        .tasks()
        .iter()
        .map(|t| (t.id, t.title.clone()))
        .collect();
    resolve_ref(token, "task", &candidates)
}

fn resolve_member(directory: &UserDirectory, token: &str) -> anyhow::Result<Uuid> {
    let candidates: Vec<(Uuid, String)> = directory
        .members()
        .iter()
        .map(|m| (m.id, m.name.clone()))
        .collect();
    resolve_ref(token, "member", &candidates)
}

fn resolve_notification(feed: &NotificationFeed, token: &str) -> anyhow::Result<Uuid> {
    let candidates: Vec<(Uuid, String)> = feed
        .items()
        .iter()
        .map(|n| (n.id, n.title.clone()))
        .collect();
    resolve_ref(token, "notification", &candidates)
}

/// Accepts a full uuid, an unambiguous short-id prefix, or an exact
/// case-insensitive display name.
fn resolve_ref(token: &str, kind: &str, candidates: &[(Uuid, String)]) -> anyhow::Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(token) {
        if candidates.iter().any(|(cid, _)| *cid == id) {
            return Ok(id);
        }
        return Err(anyhow!("no {kind} with id {token}"));
    }

    let lowered = token.to_ascii_lowercase();
    let matches: Vec<Uuid> = candidates
        .iter()
        .filter(|(id, name)| {
            id.simple().to_string().starts_with(&lowered) || name.eq_ignore_ascii_case(token)
        })
        .map(|(id, _)| *id)
        .collect();

    match matches.len() {
        0 => Err(anyhow!("no {kind} matches: {token}")),
        1 => Ok(matches[0]),
        n => Err(anyhow!("{token} is ambiguous: {n} {kind}s match")),
    }
}

fn resolve_many(
    tokens: &[String],
    mut resolve: impl FnMut(&str) -> anyhow::Result<Uuid>,
) -> anyhow::Result<Vec<Uuid>> {
    let mut ids = Vec::with_capacity(tokens.len());
    for token in tokens {
        let id = resolve(token.as_str())?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

// ---------------------------------------------------------------------------
// mod terms

#[derive(Debug, Clone)]
enum ProjectMod {
    Name(String),
    Desc(String),
    Status(ProjectStatus),
    Priority(Priority),
    Progress(u8),
    Due(Option<NaiveDate>),
    AddTag(String),
    RemoveTag(String),
    AddTeam(String),
    RemoveTeam(String),
    Budget(BudgetMod),
}

#[derive(Debug, Clone)]
enum BudgetMod {
    Allocated(f64),
    Spent(f64),
    Currency(String),
    Clear,
}

#[derive(Debug, Default)]
struct BudgetMods {
    allocated: Option<f64>,
    spent: Option<f64>,
    currency: Option<String>,
    clear: bool,
}

impl BudgetMods {
    fn collect(&mut self, change: BudgetMod) {
        match change {
            BudgetMod::Allocated(value) => self.allocated = Some(value),
            BudgetMod::Spent(value) => self.spent = Some(value),
            BudgetMod::Currency(value) => self.currency = Some(value),
            BudgetMod::Clear => self.clear = true,
        }
    }

    fn is_empty(&self) -> bool {
        self.allocated.is_none() && self.spent.is_none() && self.currency.is_none() && !self.clear
    }

    /// Merges partial changes over the existing budget, if any.
    fn merge(self, current: Option<Budget>) -> anyhow::Result<Option<Budget>> {
        if self.clear {
            return Ok(None);
        }
        if self.is_empty() {
            return Ok(current);
        }
        let base = current.unwrap_or(Budget {
            allocated: 0.0,
            spent: 0.0,
            currency: "USD".to_string(),
        });
        let budget = Budget {
            allocated: self.allocated.unwrap_or(base.allocated),
            spent: self.spent.unwrap_or(base.spent),
            currency: self.currency.unwrap_or(base.currency),
        };
        budget.validate()?;
        Ok(Some(budget))
    }
}

fn parse_project_mods(
    args: &[String],
    today: NaiveDate,
) -> anyhow::Result<(Vec<String>, Vec<ProjectMod>)> {
    let mut words = Vec::new();
    let mut mods = Vec::new();

    for tok in args {
        if let Some(value) = tok.strip_prefix("name:") {
            mods.push(ProjectMod::Name(value.to_string()));
        } else if let Some(value) = tok.strip_prefix("desc:") {
            mods.push(ProjectMod::Desc(value.to_string()));
        } else if let Some(value) = tok.strip_prefix("status:") {
            let status = ProjectStatus::parse(value)
                .ok_or_else(|| anyhow!("unknown project status: {value}"))?;
            mods.push(ProjectMod::Status(status));
        } else if let Some(value) = tok.strip_prefix("priority:") {
            let priority =
                Priority::parse(value).ok_or_else(|| anyhow!("unknown priority: {value}"))?;
            mods.push(ProjectMod::Priority(priority));
        } else if let Some(value) = tok.strip_prefix("progress:") {
            let progress: u8 = value
                .parse()
                .map_err(|_| anyhow!("progress must be 0-100, got: {value}"))?;
            mods.push(ProjectMod::Progress(progress));
        } else if let Some(value) = tok.strip_prefix("due:") {
            mods.push(ProjectMod::Due(parse_due(value, today)?));
        } else if let Some(value) = tok.strip_prefix("team+:") {
            mods.push(ProjectMod::AddTeam(value.to_string()));
        } else if let Some(value) = tok.strip_prefix("team-:") {
            mods.push(ProjectMod::RemoveTeam(value.to_string()));
        } else if let Some(value) = tok.strip_prefix("budget:") {
            if value.eq_ignore_ascii_case("none") {
                mods.push(ProjectMod::Budget(BudgetMod::Clear));
            } else {
                let amount: f64 = value
                    .parse()
                    .map_err(|_| anyhow!("budget must be a number, got: {value}"))?;
                mods.push(ProjectMod::Budget(BudgetMod::Allocated(amount)));
            }
        } else if let Some(value) = tok.strip_prefix("spent:") {
            let amount: f64 = value
                .parse()
                .map_err(|_| anyhow!("spent must be a number, got: {value}"))?;
            mods.push(ProjectMod::Budget(BudgetMod::Spent(amount)));
        } else if let Some(value) = tok.strip_prefix("currency:") {
            mods.push(ProjectMod::Budget(BudgetMod::Currency(value.to_string())));
        } else if let Some(tag) = tok.strip_prefix('+') {
            if tag.is_empty() {
                return Err(anyhow!("empty tag"));
            }
            mods.push(ProjectMod::AddTag(tag.to_string()));
        } else if let Some(tag) = tok.strip_prefix('-') {
            if tag.is_empty() {
                return Err(anyhow!("empty tag"));
            }
            mods.push(ProjectMod::RemoveTag(tag.to_string()));
        } else {
            words.push(tok.clone());
        }
    }

    Ok((words, mods))
}

#[derive(Debug, Clone)]
enum TaskMod {
    Title(String),
    Category(String),
    Status(TaskStatus),
    Priority(Priority),
    Progress(u8),
    Due(Option<NaiveDate>),
    Project(Option<String>),
    AddAssignee(String),
    RemoveAssignee(String),
}

fn parse_task_mods(
    args: &[String],
    today: NaiveDate,
) -> anyhow::Result<(Vec<String>, Vec<TaskMod>)> {
    let mut words = Vec::new();
    let mut mods = Vec::new();

    for tok in args {
        if let Some(value) = tok.strip_prefix("title:") {
            mods.push(TaskMod::Title(value.to_string()));
        } else if let Some(value) = tok.strip_prefix("category:") {
            mods.push(TaskMod::Category(value.to_string()));
        } else if let Some(value) = tok.strip_prefix("status:") {
            let status =
                TaskStatus::parse(value).ok_or_else(|| anyhow!("unknown task status: {value}"))?;
            mods.push(TaskMod::Status(status));
        } else if let Some(value) = tok.strip_prefix("priority:") {
            let priority =
                Priority::parse(value).ok_or_else(|| anyhow!("unknown priority: {value}"))?;
            mods.push(TaskMod::Priority(priority));
        } else if let Some(value) = tok.strip_prefix("progress:") {
            let progress: u8 = value
                .parse()
                .map_err(|_| anyhow!("progress must be 0-100, got: {value}"))?;
            mods.push(TaskMod::Progress(progress));
        } else if let Some(value) = tok.strip_prefix("due:") {
            mods.push(TaskMod::Due(parse_due(value, today)?));
        } else if let Some(value) = tok.strip_prefix("project:") {
            if value.eq_ignore_ascii_case("none") {
                mods.push(TaskMod::Project(None));
            } else {
                mods.push(TaskMod::Project(Some(value.to_string())));
            }
        } else if let Some(value) = tok.strip_prefix("assignee+:") {
            mods.push(TaskMod::AddAssignee(value.to_string()));
        } else if let Some(value) = tok.strip_prefix("assignee-:") {
            mods.push(TaskMod::RemoveAssignee(value.to_string()));
        } else {
            words.push(tok.clone());
        }
    }

    Ok((words, mods))
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    use super::{
        App, ProjectMod, cmd_project_modify, expand_command_abbrev, known_actions, known_scopes,
        parse_project_mods, parse_task_mods, resolve_ref,
    };
    use crate::notification::NotificationFeed;
    use crate::project::ProjectDraft;
    use crate::store::{ProjectStore, TaskStore};
    use crate::user::{UserDirectory, UserProfile};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap()
    }

    fn strings(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    fn app_with_project(name: &str) -> (App, Uuid) {
        let mut projects = ProjectStore::default();
        let project = projects
            .create(ProjectDraft::new(name, "desc"), now())
            .expect("create project");
        let app = App {
            projects,
            tasks: TaskStore::default(),
            directory: UserDirectory::new(vec![]),
            feed: NotificationFeed::new(vec![]),
            profile: UserProfile::default(),
        };
        (app, project.id)
    }

    #[test]
    fn abbreviations_expand_only_when_unambiguous() {
        let known = known_scopes();
        assert_eq!(expand_command_abbrev("task", &known), Some("task"));
        assert_eq!(expand_command_abbrev("in", &known), Some("inbox"));
        assert_eq!(expand_command_abbrev("p", &known), None);
        assert_eq!(expand_command_abbrev("bogus", &known), None);
    }

    #[test]
    fn every_scope_with_actions_has_a_default() {
        for scope in known_scopes() {
            if !known_actions(scope).is_empty() {
                let default = super::default_action(scope);
                assert!(
                    known_actions(scope).contains(&default),
                    "{scope} default {default} missing"
                );
            }
        }
    }

    #[test]
    fn project_mods_split_words_from_terms() {
        let (words, mods) = parse_project_mods(
            &strings(&["Website", "Redesign", "status:on-hold", "+design", "due:+7d"]),
            today(),
        )
        .expect("parse");

        assert_eq!(words, strings(&["Website", "Redesign"]));
        assert_eq!(mods.len(), 3);
        assert!(matches!(mods[1], ProjectMod::AddTag(ref t) if t == "design"));
    }

    #[test]
    fn invalid_mod_values_are_rejected() {
        assert!(parse_project_mods(&strings(&["status:bogus"]), today()).is_err());
        assert!(parse_project_mods(&strings(&["progress:abc"]), today()).is_err());
        assert!(parse_task_mods(&strings(&["status:started"]), today()).is_err());
    }

    #[test]
    fn task_project_mod_distinguishes_none_from_reference() {
        let (_, mods) =
            parse_task_mods(&strings(&["project:none", "project:abc123"]), today()).expect("parse");
        assert!(matches!(mods[0], super::TaskMod::Project(None)));
        assert!(matches!(mods[1], super::TaskMod::Project(Some(_))));
    }

    #[test]
    fn modify_with_only_noop_ops_reports_no_change() {
        let (mut app, id) = app_with_project("Alpha");
        let target = id.to_string();

        // removing a tag the project never had touches nothing
        let args = vec![target.clone(), "-missing".to_string()];
        let changed = cmd_project_modify(&mut app, &args, now(), today()).expect("modify");
        assert!(!changed);
        assert!(app.projects.get(id).expect("project").tags.is_empty());

        let args = vec![target.clone(), "+design".to_string()];
        assert!(cmd_project_modify(&mut app, &args, now(), today()).expect("modify"));

        // a second add of the same tag is a no-op again
        let args = vec![target, "+design".to_string()];
        assert!(!cmd_project_modify(&mut app, &args, now(), today()).expect("modify"));
    }

    #[test]
    fn refs_resolve_by_uuid_prefix_and_name() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let candidates = vec![(a, "Website Redesign".to_string()), (b, "Mobile App".to_string())];

        assert_eq!(resolve_ref(&a.to_string(), "project", &candidates).unwrap(), a);
        let prefix = &a.simple().to_string()[..8];
        assert_eq!(resolve_ref(prefix, "project", &candidates).unwrap(), a);
        assert_eq!(
            resolve_ref("mobile app", "project", &candidates).unwrap(),
            b
        );
        assert!(resolve_ref("nothing", "project", &candidates).is_err());
        assert!(resolve_ref(&Uuid::new_v4().to_string(), "project", &candidates).is_err());
    }
}
