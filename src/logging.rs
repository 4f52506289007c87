//! Logging setup
//!
//! Diagnostics are emitted through `tracing`. Hosts that already install a
//! subscriber can skip `init`; the CLI calls it once at startup.

use tracing::Level;
use tracing_subscriber::fmt;

/// Install a stderr fmt subscriber. Debug level when `debug` is set, info
/// otherwise. Returns false if a global subscriber was already installed.
pub fn init(debug: bool) -> bool {
    let level = if debug { Level::DEBUG } else { Level::INFO };
    fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .try_init()
        .is_ok()
}
