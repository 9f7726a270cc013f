// src/logging.rs

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize the logging system.
/// Safe to call more than once; only the first call installs the logger.
pub fn init_logger() {
    INIT.call_once(|| {
        let installed = env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .filter_module("serialhub", log::LevelFilter::Debug)
            .filter_module("r2d2", log::LevelFilter::Warn)
            .format_timestamp_secs()
            .format_module_path(false)
            .try_init();

        match installed {
            Ok(()) => log::info!("Logging system initialized"),
            // another logger (test harness, embedding app) already owns the facade
            Err(e) => eprintln!("serialhub: logger not installed: {}", e),
        }
    });
}
