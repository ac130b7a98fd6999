//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter            | Implements      | Connects to                  |
//! |--------------------|-----------------|------------------------------|
//! | `http`             | HttpTransport   | ESP-IDF HTTP client          |
//! | `log_sink`         | EventSink       | Serial log output            |
//! | `moonraker_client` | GateSensorPort  | Moonraker objects query      |
//! |                    | CommandSink     | Moonraker G-code script      |
//! | `time`             | TimePort        | ESP32 system timer           |
//! | `uart`             | ScanSource      | NFC reader UART / simulation |
//! | `wifi`             | —               | ESP-IDF WiFi STA bring-up    |

#[cfg(target_os = "espidf")]
pub mod http;
pub mod log_sink;
pub mod moonraker_client;
pub mod time;
pub mod uart;
#[cfg(target_os = "espidf")]
pub mod wifi;
