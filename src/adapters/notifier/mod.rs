//! Notifier adapters.
//!
//! - `LogNotifier` - Writes notifications to the log only
//! - `HttpNotifier` - Posts notifications to a delivery endpoint

mod http_notifier;
mod log_notifier;

pub use http_notifier::HttpNotifier;
pub use log_notifier::LogNotifier;
