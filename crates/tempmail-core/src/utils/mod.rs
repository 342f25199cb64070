/// Utility modules
pub mod logging;

pub use logging::redact_address;
