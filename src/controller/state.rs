use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

use crate::config::{AppConfig, ListMode};
use crate::contact::total_pages;
use crate::validation::FormMode;

/// What the list screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    List,
    Loading,
    FormOpen(FormMode),
    DetailModalOpen,
    DeleteConfirmOpen,
    Error,
    /// Terminal; nothing else happens once reached
    RedirectToLogin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Success,
    Warning,
    Error,
    Info,
}

/// Transient notice shown above the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
    pub posted_at: Instant,
}

impl Message {
    pub fn new(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            posted_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.posted_at.elapsed() >= ttl
    }
}

/// Position within the paged listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total_count: u64,
}

impl Pagination {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total_count: 0,
        }
    }

    pub fn total_pages(&self) -> u32 {
        total_pages(self.total_count, self.page_size)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn clamp(&self, page: u32) -> u32 {
        page.clamp(1, self.total_pages())
    }
}

/// Search text plus the column filters of the paged listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilters {
    pub search: Option<String>,
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

/// Identifies one list fetch; only the newest may land
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(pub(crate) u64);

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub list_mode: ListMode,
    pub page_size: u32,
    pub message_ttl: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            list_mode: ListMode::All,
            page_size: 10,
            message_ttl: Duration::from_secs(3),
        }
    }
}

impl ControllerSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            list_mode: config.view.list_mode,
            page_size: config.view.page_size,
            message_ttl: config.message_ttl(),
        }
    }
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_bounds() {
        let mut p = Pagination::new(10);
        assert_eq!(p.total_pages(), 1);
        assert!(!p.has_previous());
        assert!(!p.has_next());

        p.total_count = 25;
        assert_eq!(p.total_pages(), 3);
        assert!(p.has_next());
        assert_eq!(p.clamp(0), 1);
        assert_eq!(p.clamp(7), 3);

        p.page = 3;
        assert!(p.has_previous());
        assert!(!p.has_next());
    }

    #[tokio::test(start_paused = true)]
    async fn messages_expire_after_their_ttl() {
        let message = Message::new(MessageKind::Info, "hello");
        let ttl = Duration::from_secs(3);
        assert!(!message.is_expired(ttl));

        tokio::time::advance(Duration::from_millis(2999)).await;
        assert!(!message.is_expired(ttl));

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(message.is_expired(ttl));
    }

    #[test]
    fn blank_filters_become_none() {
        assert_eq!(non_empty(Some("  ")), None);
        assert_eq!(non_empty(Some(" wa ")), Some("wa".to_string()));
        assert_eq!(non_empty(None), None);
    }
}
