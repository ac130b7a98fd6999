fn main() {
    println!("cargo:rerun-if-env-changed=MOONRAKER_URL");
    println!("cargo:rerun-if-env-changed=SPOOLGATE_GATES");
    println!("cargo:rerun-if-env-changed=SPOOLGATE_MACRO");
    println!("cargo:rerun-if-env-changed=SPOOLGATE_TIMEOUT_SECS");
    println!("cargo:rerun-if-env-changed=WIFI_SSID");
    println!("cargo:rerun-if-env-changed=WIFI_PASS");

    // Host builds (tests, fuzzing) have no ESP-IDF environment to export.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
