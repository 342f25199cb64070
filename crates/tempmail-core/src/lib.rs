/// Tempmail Core - consistency and query layer of the temporary mail admin API
///
/// This crate holds the store seam, paginated list retrieval, the address
/// cascade, settings, send permissions, impersonation tokens and statistics.
/// HTTP routing lives in `tempmail-api`.
pub mod address;
pub mod collections;
pub mod config;
pub mod constants;
pub mod error;
pub mod impersonation;
pub mod list_query;
pub mod notify;
pub mod sender;
pub mod settings;
pub mod statistics;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use address::{AddressLifecycle, AddressNamer, CascadeReport, ConfiguredNamer, MailCascade};
pub use config::AdminConfig;
pub use error::AdminError;
pub use impersonation::ImpersonationIssuer;
pub use list_query::{ListQuery, ListResponse, Page};
pub use notify::{InternalMailNotifier, Notifier};
pub use settings::{AccountSettings, SettingsStore};
pub use store::{Database, SqliteDatabase};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
