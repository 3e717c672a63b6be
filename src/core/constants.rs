use std::time::Duration;

/// Library version reported by the controller.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum time a starting session waits for its first location fix.
pub const LOCATION_FIX_TIMEOUT: Duration = Duration::from_secs(5);

/// Idle delay between source polls while a session is active.
pub const SOURCE_POLL_INTERVAL: Duration = Duration::from_millis(50);
