pub mod config;
pub mod dispatch;
pub mod mail;
pub mod report;
pub mod routes;
pub mod store;

pub use config::{Config, ConfigError};
pub use dispatch::{DispatchError, DispatchSummary, Dispatcher};
pub use mail::{MailError, ReportMail, SendGridClient};
pub use store::{StoreError, SupabaseClient, UserIdentity};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub dispatcher: Dispatcher,
}
