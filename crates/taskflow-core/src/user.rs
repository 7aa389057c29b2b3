use anyhow::anyhow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Member,
}

impl Role {
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "manager" => Some(Self::Manager),
            "member" => Some(Self::Member),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Member => "member",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Online,
    Away,
    Busy,
    Offline,
}

impl Presence {
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "online" => Some(Self::Online),
            "away" => Some(Self::Away),
            "busy" => Some(Self::Busy),
            "offline" => Some(Self::Offline),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Away => "away",
            Self::Busy => "busy",
            Self::Offline => "offline",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar: Option<String>,
    pub role: Role,
    pub department: String,
    pub status: Presence,
}

#[derive(Debug, Clone)]
pub struct MemberDraft {
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub role: Role,
    pub department: String,
}

impl MemberDraft {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            avatar: None,
            role: Role::Member,
            department: "general".to_string(),
        }
    }
}

/// Directory of `{id, name, avatar}`-style lookups for team and assignee
/// rendering. Project teams and task assignees hold weak references into
/// this directory; removing a member here does not cascade.
#[derive(Debug, Default)]
pub struct UserDirectory {
    members: Vec<Member>,
}

impl UserDirectory {
    pub fn new(members: Vec<Member>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn add(&mut self, draft: MemberDraft) -> anyhow::Result<Member> {
        if draft.name.trim().is_empty() {
            return Err(anyhow!("member name is required"));
        }
        if draft.email.trim().is_empty() {
            return Err(anyhow!("member email is required"));
        }
        let member = Member {
            id: Uuid::new_v4(),
            name: draft.name,
            email: draft.email,
            avatar: draft.avatar,
            role: draft.role,
            department: draft.department,
            status: Presence::Offline,
        };
        self.members.push(member.clone());
        Ok(member)
    }

    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.members.len();
        self.members.retain(|member| member.id != id);
        self.members.len() < before
    }

    pub fn get(&self, id: Uuid) -> Option<&Member> {
        self.members.iter().find(|member| member.id == id)
    }

    /// Dangling references render as a placeholder instead of failing.
    pub fn display_name(&self, id: Uuid) -> String {
        self.get(id)
            .map(|member| member.name.clone())
            .unwrap_or_else(|| "(unknown)".to_string())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationPrefs {
    pub email: bool,
    pub push: bool,
    pub mentions: bool,
    pub task_updates: bool,
    pub deadlines: bool,
}

impl Default for NotificationPrefs {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
            mentions: true,
            task_updates: true,
            deadlines: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemePref {
    Light,
    Dark,
    System,
}

impl ThemePref {
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            "system" => Some(Self::System),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar: Option<String>,
    pub role: Role,
    pub department: String,
    pub join_date: NaiveDate,
    pub timezone: String,
    #[serde(default)]
    pub bio: String,
    pub status: Presence,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub prefs: NotificationPrefs,
    pub theme: ThemePref,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "New User".to_string(),
            email: String::new(),
            avatar: None,
            role: Role::Member,
            department: "general".to_string(),
            join_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            timezone: "UTC".to_string(),
            bio: String::new(),
            status: Presence::Offline,
            skills: vec![],
            prefs: NotificationPrefs::default(),
            theme: ThemePref::System,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub department: Option<String>,
    pub timezone: Option<String>,
    pub bio: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.avatar.is_none()
            && self.department.is_none()
            && self.timezone.is_none()
            && self.bio.is_none()
    }
}

impl UserProfile {
    pub fn apply(&mut self, patch: &ProfilePatch) -> anyhow::Result<()> {
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(anyhow!("profile name cannot be empty"));
            }
            self.name = name.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(avatar) = &patch.avatar {
            self.avatar = Some(avatar.clone());
        }
        if let Some(department) = &patch.department {
            self.department = department.clone();
        }
        if let Some(timezone) = &patch.timezone {
            self.timezone = timezone.clone();
        }
        if let Some(bio) = &patch.bio {
            self.bio = bio.clone();
        }
        Ok(())
    }

    pub fn set_status(&mut self, status: Presence) {
        self.status = status;
    }

    pub fn add_skill(&mut self, skill: &str) -> bool {
        let skill = skill.trim();
        if skill.is_empty()
            || self
                .skills
                .iter()
                .any(|existing| existing.eq_ignore_ascii_case(skill))
        {
            return false;
        }
        self.skills.push(skill.to_string());
        true
    }

    pub fn remove_skill(&mut self, skill: &str) -> bool {
        let before = self.skills.len();
        self.skills
            .retain(|existing| !existing.eq_ignore_ascii_case(skill.trim()));
        self.skills.len() < before
    }

    pub fn set_notification_pref(&mut self, key: &str, enabled: bool) -> anyhow::Result<()> {
        match key.to_ascii_lowercase().as_str() {
            "email" => self.prefs.email = enabled,
            "push" => self.prefs.push = enabled,
            "mentions" => self.prefs.mentions = enabled,
            "task-updates" | "taskupdates" => self.prefs.task_updates = enabled,
            "deadlines" => self.prefs.deadlines = enabled,
            other => return Err(anyhow!("unknown notification preference: {other}")),
        }
        Ok(())
    }
}
