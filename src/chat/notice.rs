//! Transient user-facing notifications
//!
//! Failures on user-triggered paths are reported as notices rather than
//! propagated: the frontend drains them and shows them once.

use colored::Colorize;
use std::fmt;

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Informational confirmation
    Info,
    /// Something the user tried did not work
    Error,
}

/// A notification for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Short headline
    pub title: String,
    /// Optional detail line
    pub description: Option<String>,
}

impl Notice {
    /// Informational notice
    pub fn info(title: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            description: description.map(str::to_string),
        }
    }

    /// Error notice
    pub fn error(title: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            description: description.map(str::to_string),
        }
    }

    /// `true` for error notices
    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }

    /// Render with terminal colors
    pub fn colored(&self) -> String {
        let text = self.to_string();
        match self.level {
            NoticeLevel::Info => text.green().to_string(),
            NoticeLevel::Error => text.red().to_string(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(description) => write!(f, "{}: {}", self.title, description),
            None => f.write_str(&self.title),
        }
    }
}

/// Queue of notices waiting to be shown
#[derive(Debug, Default)]
pub struct Notices {
    pending: Vec<Notice>,
}

impl Notices {
    /// Queue a notice
    pub fn push(&mut self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => tracing::debug!("notice: {}", notice),
            NoticeLevel::Error => tracing::warn!("notice: {}", notice),
        }
        self.pending.push(notice);
    }

    /// Take every pending notice, oldest first
    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.pending)
    }

    /// Pending notices without draining
    pub fn pending(&self) -> &[Notice] {
        &self.pending
    }
}
