//! WiFi station bring-up.
//!
//! Credentials come from the build environment (`WIFI_SSID`, `WIFI_PASS`).
//! An empty password selects an open network.  Connection failure at boot
//! is fatal: without the printer host there is nothing to correlate.

use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use log::info;

use crate::error::{Error, Result};

const WIFI_SSID: &str = match option_env!("WIFI_SSID") {
    Some(s) => s,
    None => "",
};
const WIFI_PASS: &str = match option_env!("WIFI_PASS") {
    Some(s) => s,
    None => "",
};

/// Connect in station mode and wait for an IP.  Keep the returned handle
/// alive for as long as the network is needed.
pub fn connect(modem: Modem) -> Result<BlockingWifi<EspWifi<'static>>> {
    if WIFI_SSID.is_empty() {
        return Err(Error::Config("WIFI_SSID not set at build time"));
    }

    let sys_loop = EspSystemEventLoop::take().map_err(|_| Error::Init("system event loop"))?;
    let nvs = EspDefaultNvsPartition::take().ok();
    let esp_wifi =
        EspWifi::new(modem, sys_loop.clone(), nvs).map_err(|_| Error::Init("wifi driver"))?;
    let mut wifi =
        BlockingWifi::wrap(esp_wifi, sys_loop).map_err(|_| Error::Init("wifi driver"))?;

    let auth_method = if WIFI_PASS.is_empty() {
        AuthMethod::None
    } else {
        AuthMethod::WPA2Personal
    };
    let client = ClientConfiguration {
        ssid: WIFI_SSID
            .try_into()
            .map_err(|_| Error::Config("WIFI_SSID longer than 32 bytes"))?,
        password: WIFI_PASS
            .try_into()
            .map_err(|_| Error::Config("WIFI_PASS longer than 64 bytes"))?,
        auth_method,
        ..Default::default()
    };

    wifi.set_configuration(&Configuration::Client(client))
        .map_err(|_| Error::Init("wifi configuration"))?;
    wifi.start().map_err(|_| Error::Init("wifi start"))?;
    info!("WiFi started, connecting to '{}'", WIFI_SSID);
    wifi.connect().map_err(|_| Error::Init("wifi connect"))?;
    wifi.wait_netif_up()
        .map_err(|_| Error::Init("wifi netif"))?;
    info!("WiFi connected");
    Ok(wifi)
}
