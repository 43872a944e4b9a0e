use log::{error, info, warn};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A transient, user-visible notification. Notices never block; they are the
/// surfacing channel for recoverable failures.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

/// Sink for transient notices. The embedding shell provides one that renders
/// toasts; headless embedders can fall back to [`LogNotifier`].
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);

    fn success(&self, text: &str) {
        self.notify(Notice::new(NoticeLevel::Success, text));
    }

    fn info(&self, text: &str) {
        self.notify(Notice::new(NoticeLevel::Info, text));
    }

    fn warning(&self, text: &str) {
        self.notify(Notice::new(NoticeLevel::Warning, text));
    }

    fn error(&self, text: &str) {
        self.notify(Notice::new(NoticeLevel::Error, text));
    }
}

/// Routes notices to the log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success | NoticeLevel::Info => info!("{}", notice.text),
            NoticeLevel::Warning => warn!("{}", notice.text),
            NoticeLevel::Error => error!("{}", notice.text),
        }
    }
}
