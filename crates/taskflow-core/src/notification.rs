use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Task,
    Mention,
    Deadline,
    Comment,
    System,
}

impl NotificationKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Mention => "mention",
            Self::Deadline => "deadline",
            Self::Comment => "comment",
            Self::System => "system",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
    pub urgent: bool,
    #[serde(default)]
    pub task: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct NotificationDraft {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub urgent: bool,
    pub task: Option<Uuid>,
}

impl NotificationDraft {
    pub fn new(
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            urgent: false,
            task: None,
        }
    }

    pub fn urgent(mut self) -> Self {
        self.urgent = true;
        self
    }

    pub fn for_task(mut self, task: Uuid) -> Self {
        self.task = Some(task);
        self
    }
}

/// Time-ordered feed, newest first. The unread count is always recomputed
/// from the list so it cannot drift from the underlying records.
#[derive(Debug, Default)]
pub struct NotificationFeed {
    items: Vec<Notification>,
}

impl NotificationFeed {
    pub fn new(items: Vec<Notification>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn add(&mut self, draft: NotificationDraft, now: DateTime<Utc>) -> Notification {
        let notification = Notification {
            id: Uuid::new_v4(),
            kind: draft.kind,
            title: draft.title,
            message: draft.message,
            timestamp: now,
            read: false,
            urgent: draft.urgent,
            task: draft.task,
        };
        self.items.insert(0, notification.clone());
        notification
    }

    pub fn mark_as_read(&mut self, id: Uuid) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.read = true;
                true
            }
            None => false,
        }
    }

    /// Returns how many notifications were newly marked.
    pub fn mark_all_as_read(&mut self) -> usize {
        let mut marked = 0;
        for item in &mut self.items {
            if !item.read {
                item.read = true;
                marked += 1;
            }
        }
        marked
    }

    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() < before
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|item| !item.read).count()
    }

    pub fn has_unread_for_task(&self, kind: NotificationKind, task: Uuid) -> bool {
        self.items
            .iter()
            .any(|item| !item.read && item.kind == kind && item.task == Some(task))
    }

    pub fn get(&self, id: Uuid) -> Option<&Notification> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::{NotificationDraft, NotificationFeed, NotificationKind};

    fn feed_with(n: usize) -> NotificationFeed {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let mut feed = NotificationFeed::default();
        for i in 0..n {
            feed.add(
                NotificationDraft::new(NotificationKind::System, format!("n{i}"), "msg"),
                now,
            );
        }
        feed
    }

    #[test]
    fn add_prepends_and_counts_unread() {
        let mut feed = feed_with(2);
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let newest = feed.add(
            NotificationDraft::new(NotificationKind::Comment, "latest", "msg"),
            now,
        );

        assert_eq!(feed.items()[0].id, newest.id);
        assert_eq!(feed.unread_count(), 3);
    }

    #[test]
    fn unread_count_matches_recount_after_every_mutation() {
        let mut feed = feed_with(3);
        let recount =
            |feed: &NotificationFeed| feed.items().iter().filter(|n| !n.read).count();

        let first = feed.items()[0].id;
        assert!(feed.mark_as_read(first));
        assert_eq!(feed.unread_count(), recount(&feed));

        assert!(feed.remove(first));
        assert_eq!(feed.unread_count(), recount(&feed));

        assert_eq!(feed.mark_all_as_read(), 2);
        assert_eq!(feed.unread_count(), 0);
        assert_eq!(feed.unread_count(), recount(&feed));
    }

    #[test]
    fn mark_missing_id_is_reported() {
        let mut feed = feed_with(1);
        assert!(!feed.mark_as_read(Uuid::new_v4()));
        assert!(!feed.remove(Uuid::new_v4()));
        assert_eq!(feed.len(), 1);
    }

    #[test]
    fn unread_deadline_alerts_are_deduplicated_per_task() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let task = Uuid::new_v4();
        let mut feed = NotificationFeed::default();
        assert!(!feed.has_unread_for_task(NotificationKind::Deadline, task));

        feed.add(
            NotificationDraft::new(NotificationKind::Deadline, "Deadline Approaching", "due")
                .urgent()
                .for_task(task),
            now,
        );
        assert!(feed.has_unread_for_task(NotificationKind::Deadline, task));
    }
}
