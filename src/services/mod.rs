pub mod api_client;
pub mod assistant;
pub mod config_service;
pub mod notify;

pub use api_client::ApiClient;
pub use assistant::{AssistantBackend, AssistantOrchestrator, OpenParams, SessionSnapshot};
pub use notify::{LogNotifier, Notice, NoticeLevel, Notifier};
