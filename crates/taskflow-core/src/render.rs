use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use chrono::NaiveDate;
use unicode_width::UnicodeWidthStr;
use uuid::Uuid;

use crate::config::Config;
use crate::datetime::format_due;
use crate::notification::Notification;
use crate::project::Project;
use crate::stats::{ProjectStats, TaskStats};
use crate::store::TaskStore;
use crate::task::Task;
use crate::user::{Member, UserDirectory, UserProfile};

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

/// First eight hex digits of the uuid; enough to address records on the
/// command line without the full 36-character form.
pub fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self { color })
    }

    #[tracing::instrument(skip_all)]
    pub fn print_project_table(
        &mut self,
        projects: &[&Project],
        tasks: &TaskStore,
        selected: Option<Uuid>,
        today: NaiveDate,
    ) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        let headers = vec![
            "".to_string(),
            "ID".to_string(),
            "Name".to_string(),
            "Status".to_string(),
            "Pri".to_string(),
            "Prog".to_string(),
            "Due".to_string(),
            "Tasks".to_string(),
            "Tags".to_string(),
        ];

        let mut rows = Vec::with_capacity(projects.len());

        for project in projects {
            let marker = if selected == Some(project.id) { "*" } else { "" };
            let id = self.paint(&short_id(project.id), "33");

            let due = format_due(project.due);
            let due = if project.is_overdue(today) {
                self.paint(&due, "31")
            } else {
                due
            };

            let tags = project
                .tags
                .iter()
                .map(|tag| format!("+{tag}"))
                .collect::<Vec<_>>()
                .join(" ");

            rows.push(vec![
                marker.to_string(),
                id,
                project.name.clone(),
                project.status.label().to_string(),
                project.priority.label().to_string(),
                format!("{}%", project.progress),
                due,
                tasks.count_for_project(project.id).to_string(),
                tags,
            ]);
        }

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    #[tracing::instrument(skip_all)]
    pub fn print_task_table(
        &mut self,
        tasks: &[&Task],
        projects: &[Project],
        directory: &UserDirectory,
        selected: Option<Uuid>,
        today: NaiveDate,
    ) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        let headers = vec![
            "".to_string(),
            "ID".to_string(),
            "Title".to_string(),
            "Status".to_string(),
            "Pri".to_string(),
            "Prog".to_string(),
            "Due".to_string(),
            "Project".to_string(),
            "Assignees".to_string(),
        ];

        let mut rows = Vec::with_capacity(tasks.len());

        for task in tasks {
            let marker = if selected == Some(task.id) { "*" } else { "" };
            let id = self.paint(&short_id(task.id), "33");

            let due = format_due(task.due);
            let due = if task.is_overdue(today) {
                self.paint(&due, "31")
            } else {
                due
            };

            let project = task
                .project
                .and_then(|pid| projects.iter().find(|p| p.id == pid))
                .map(|p| p.name.clone())
                .unwrap_or_default();

            let assignees = task
                .assignees
                .iter()
                .map(|id| directory.display_name(*id))
                .collect::<Vec<_>>()
                .join(", ");

            rows.push(vec![
                marker.to_string(),
                id,
                task.title.clone(),
                task.status.label().to_string(),
                task.priority.label().to_string(),
                format!("{}%", task.progress),
                due,
                project,
                assignees,
            ]);
        }

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    #[tracing::instrument(skip_all)]
    pub fn print_member_table(&mut self, members: &[&Member]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        let headers = vec![
            "ID".to_string(),
            "Name".to_string(),
            "Email".to_string(),
            "Role".to_string(),
            "Department".to_string(),
            "Status".to_string(),
        ];

        let mut rows = Vec::with_capacity(members.len());
        for member in members {
            rows.push(vec![
                self.paint(&short_id(member.id), "33"),
                member.name.clone(),
                member.email.clone(),
                member.role.label().to_string(),
                member.department.clone(),
                member.status.label().to_string(),
            ]);
        }

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    #[tracing::instrument(skip_all)]
    pub fn print_project_info(
        &mut self,
        project: &Project,
        tasks: &TaskStore,
        directory: &UserDirectory,
    ) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        writeln!(out, "id         {}", project.id)?;
        writeln!(out, "name       {}", project.name)?;
        writeln!(out, "desc       {}", project.description)?;
        writeln!(out, "status     {}", project.status.label())?;
        writeln!(out, "priority   {}", project.priority.label())?;
        writeln!(out, "progress   {}%", project.progress)?;
        writeln!(out, "due        {}", format_due(project.due))?;
        writeln!(out, "tasks      {}", tasks.count_for_project(project.id))?;
        writeln!(
            out,
            "team       {}",
            project
                .team
                .iter()
                .map(|id| directory.display_name(*id))
                .collect::<Vec<_>>()
                .join(", ")
        )?;
        writeln!(out, "tags       {}", project.tags.join(", "))?;

        if let Some(budget) = &project.budget {
            writeln!(
                out,
                "budget     {:.2} {} allocated, {:.2} spent",
                budget.allocated, budget.currency, budget.spent
            )?;
        }

        writeln!(out, "created    {}", project.created_at.format("%Y-%m-%dT%H:%M:%SZ"))?;
        writeln!(out, "updated    {}", project.updated_at.format("%Y-%m-%dT%H:%M:%SZ"))?;

        Ok(())
    }

    #[tracing::instrument(skip_all)]
    pub fn print_task_info(
        &mut self,
        task: &Task,
        projects: &[Project],
        directory: &UserDirectory,
    ) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        writeln!(out, "id          {}", task.id)?;
        writeln!(out, "title       {}", task.title)?;
        writeln!(out, "category    {}", task.category)?;
        writeln!(out, "status      {}", task.status.label())?;
        writeln!(out, "priority    {}", task.priority.label())?;
        writeln!(out, "progress    {}%", task.progress)?;
        writeln!(out, "due         {}", format_due(task.due))?;
        writeln!(
            out,
            "project     {}",
            task.project
                .and_then(|pid| projects.iter().find(|p| p.id == pid))
                .map(|p| p.name.clone())
                .unwrap_or_default()
        )?;
        writeln!(
            out,
            "assignees   {}",
            task.assignees
                .iter()
                .map(|id| directory.display_name(*id))
                .collect::<Vec<_>>()
                .join(", ")
        )?;
        writeln!(out, "comments    {}", task.comments)?;
        writeln!(out, "attachments {}", task.attachments)?;
        writeln!(out, "created     {}", task.created_at.format("%Y-%m-%dT%H:%M:%SZ"))?;
        writeln!(out, "updated     {}", task.updated_at.format("%Y-%m-%dT%H:%M:%SZ"))?;

        Ok(())
    }

    #[tracing::instrument(skip_all)]
    pub fn print_notification_table(
        &mut self,
        notifications: &[Notification],
    ) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        let headers = vec![
            "".to_string(),
            "ID".to_string(),
            "Kind".to_string(),
            "Title".to_string(),
            "Message".to_string(),
            "When".to_string(),
        ];

        let mut rows = Vec::with_capacity(notifications.len());
        for item in notifications {
            let marker = if item.read { "" } else { "*" };
            let title = if item.urgent {
                self.paint(&item.title, "31")
            } else {
                item.title.clone()
            };

            rows.push(vec![
                marker.to_string(),
                self.paint(&short_id(item.id), "33"),
                item.kind.label().to_string(),
                title,
                item.message.clone(),
                item.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            ]);
        }

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    #[tracing::instrument(skip_all)]
    pub fn print_profile(&mut self, profile: &UserProfile) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        writeln!(out, "name        {}", profile.name)?;
        writeln!(out, "email       {}", profile.email)?;
        writeln!(out, "role        {}", profile.role.label())?;
        writeln!(out, "department  {}", profile.department)?;
        writeln!(out, "timezone    {}", profile.timezone)?;
        writeln!(out, "bio         {}", profile.bio)?;
        writeln!(out, "status      {}", profile.status.label())?;
        writeln!(out, "joined      {}", profile.join_date.format("%Y-%m-%d"))?;
        writeln!(out, "skills      {}", profile.skills.join(", "))?;
        writeln!(out, "theme       {}", profile.theme.label())?;
        writeln!(
            out,
            "notify      email={} push={} mentions={} task-updates={} deadlines={}",
            profile.prefs.email,
            profile.prefs.push,
            profile.prefs.mentions,
            profile.prefs.task_updates,
            profile.prefs.deadlines
        )?;

        Ok(())
    }

    #[tracing::instrument(skip_all)]
    pub fn print_stats(
        &mut self,
        projects: &ProjectStats,
        tasks: &TaskStats,
        unread: usize,
    ) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        writeln!(out, "Projects")?;
        writeln!(out, "  total      {}", projects.total)?;
        writeln!(out, "  active     {}", projects.active)?;
        writeln!(out, "  completed  {}", projects.completed)?;
        writeln!(out, "  on hold    {}", projects.on_hold)?;
        writeln!(out, "  archived   {}", projects.archived)?;
        writeln!(out, "  high pri   {}", projects.high_priority)?;
        writeln!(out, "  avg prog   {:.1}%", projects.average_progress)?;
        writeln!(out)?;
        writeln!(out, "Tasks")?;
        writeln!(out, "  total      {}", tasks.total)?;
        writeln!(out, "  todo       {}", tasks.todo)?;
        writeln!(out, "  doing      {}", tasks.in_progress)?;
        writeln!(out, "  done       {}", tasks.done)?;
        writeln!(out, "  completed  {:.0}%", tasks.completion_rate * 100.0)?;
        writeln!(out, "  avg prog   {:.1}%", tasks.average_progress)?;
        writeln!(out)?;
        writeln!(out, "Inbox")?;
        writeln!(out, "  unread     {unread}")?;

        Ok(())
    }

    pub fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for idx in 0..column_count {
        write!(writer, "{:-<width$} ", "", width = widths[idx])?;
    }
    writeln!(writer)?;

    for row in rows {
        for idx in 0..column_count {
            let cell = &row[idx];
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::{short_id, strip_ansi, write_table};
    use uuid::Uuid;

    #[test]
    fn short_id_is_eight_hex_chars() {
        let id = Uuid::new_v4();
        let short = short_id(id);
        assert_eq!(short.len(), 8);
        assert!(short.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(id.simple().to_string().starts_with(&short));
    }

    #[test]
    fn strip_ansi_removes_color_codes() {
        assert_eq!(strip_ansi("\x1b[31mlate\x1b[0m"), "late");
        assert_eq!(strip_ansi("plain"), "plain");
    }

    #[test]
    fn table_columns_align_on_visible_width() {
        let mut buf = Vec::new();
        write_table(
            &mut buf,
            vec!["A".to_string(), "B".to_string()],
            vec![
                vec!["\x1b[33mred\x1b[0m".to_string(), "x".to_string()],
                vec!["longer".to_string(), "y".to_string()],
            ],
        )
        .expect("write");

        let text = String::from_utf8(buf).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "A      B ");
        assert!(lines[2].contains("red"));
        assert_eq!(strip_ansi(lines[2]), "red    x ");
    }
}
