//! Console logging setup.

use chrono::Local;
use std::io::Write;

/// Install the global logger
///
/// `RUST_LOG` overrides the default level (`info`, or `debug` when the game
/// runs in debug mode). Calling this twice is harmless; the second call is
/// ignored.
pub fn init(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };

    let result = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_level),
    )
    .format(|buf, record| {
        writeln!(
            buf,
            "{} [{:<5}] {}: {}",
            Local::now().format("%H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        )
    })
    .try_init();

    if result.is_err() {
        log::debug!("Logger already initialized");
    }
}
