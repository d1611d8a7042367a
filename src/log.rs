use std::env;

use log::LevelFilter;

/// Initialize logging for the command-line tool.
///
/// Logs at `Info` by default and at `Debug` when `debug_enabled` is set. An explicit `RUST_LOG`
/// overrides both.
pub fn init_logger(debug_enabled: bool) {
    let level = if debug_enabled {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter(None, level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);

    if let Ok(spec) = env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }

    // A logger may already be installed when embedded in another program.
    if builder.try_init().is_ok() {
        log::debug!("Logger initialized at {level:?} level");
    }
}
