//! User-facing notification boundary.
//!
//! Toast delivery is a UI concern; the core only emits fire-and-forget
//! success/error messages through this interface and never consumes a
//! return value.

use log::{error, info};

pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Notifier that writes through the log. Used when no UI transport is
/// attached (server mode, tests).
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        info!("notify(success): {}", message);
    }

    fn error(&self, message: &str) {
        error!("notify(error): {}", message);
    }
}
