//! Task Watchdog Timer (TWDT) driver.
//!
//! Resets the device if the run loop stops iterating.  The loop feeds it
//! twice per iteration, so the timeout only has to cover the longer of two
//! windows:
//!
//! - reader read + baseline query after a scan
//! - check query + command dispatch + inter-tick pause
//!
//! The HTTP client applies its timeout to each socket operation (connect,
//! write, read), so every request is budgeted at three times its timeout.
//! DNS resolution is not bounded by it; configure the printer host by IP.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::config::SystemConfig;

/// Slack on top of the worst-case window.
const MARGIN_MS: u32 = 5_000;

/// Connect, write and read each get the full request timeout.
const SOCKET_OPS_PER_REQUEST: u32 = 3;

fn request_budget(timeout_ms: u32) -> u32 {
    timeout_ms.saturating_mul(SOCKET_OPS_PER_REQUEST)
}

/// Longest a healthy window between two feeds can take, plus margin.
pub fn timeout_for(config: &SystemConfig) -> u32 {
    let scan_window = config
        .serial_read_timeout_ms
        .saturating_add(request_budget(config.query_timeout_ms));
    let tick_window = request_budget(config.query_timeout_ms)
        .saturating_add(request_budget(config.dispatch_timeout_ms))
        .saturating_add(config.tick_interval_ms);
    scan_window.max(tick_window).saturating_add(MARGIN_MS)
}

pub struct Watchdog {
    timeout_ms: u32,
    #[cfg(target_os = "espidf")]
    subscribed: bool,
}

impl Watchdog {
    /// Reconfigure the TWDT and subscribe the current task.
    pub fn new(timeout_ms: u32) -> Self {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called once from the main task before the run loop.
            unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK {
                    log::warn!(
                        "TWDT reconfigure returned {} (may already be configured)",
                        ret
                    );
                }

                let ret = esp_task_wdt_add(core::ptr::null_mut());
                let subscribed = ret == ESP_OK;
                if subscribed {
                    log::info!("Watchdog: subscribed ({}ms timeout)", timeout_ms);
                } else {
                    log::warn!("Watchdog: failed to subscribe ({})", ret);
                }

                Self {
                    timeout_ms,
                    subscribed,
                }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            log::info!("Watchdog(sim): no-op ({}ms)", timeout_ms);
            Self { timeout_ms }
        }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Feed the watchdog once per loop iteration.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        {
            if self.subscribed {
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }
    }
}
