//! Panic logging and runtime counters.
//!
//! The panic hook makes sure the reason reaches the console before the
//! chip resets; the stats line is printed when the run loop ends.

use crate::app::service::EngineStats;

/// Log the panic reason before the default ESP-IDF abort path runs.
pub fn install_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        let reason = if let Some(msg) = info.payload().downcast_ref::<&str>() {
            *msg
        } else if let Some(msg) = info.payload().downcast_ref::<String>() {
            msg.as_str()
        } else {
            "unknown panic"
        };

        match info.location() {
            Some(loc) => log::error!("PANIC: {} at {}:{}", reason, loc.file(), loc.line()),
            None => log::error!("PANIC: {}", reason),
        }
    }));
}

/// One-line summary of engine activity.
pub fn stats_line(stats: &EngineStats, uptime_secs: u64) -> String {
    format!(
        "uptime={}s scans={} matches={} expired={} replaced={} dispatch_failures={}",
        uptime_secs,
        stats.scans,
        stats.matches,
        stats.expiries,
        stats.replaced,
        stats.dispatch_failures
    )
}
