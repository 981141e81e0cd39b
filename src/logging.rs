//! Logging setup (`log` facade, `env_logger` backend, stderr).

use std::io::Write;

fn level_label(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "ERROR",
        log::Level::Warn => "WARN ",
        log::Level::Info => "INFO ",
        log::Level::Debug => "DEBUG",
        log::Level::Trace => "TRACE",
    }
}

/// Default filter for the given verbosity flags. `--debug` wins over `--quiet`.
pub fn default_level(quiet: bool, debug: bool) -> &'static str {
    if debug {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    }
}

/// Initialize the global logger. `RUST_LOG` overrides the default level.
///
/// Calling this twice is harmless; the second call is ignored.
pub fn init_logging(quiet: bool, debug: bool) {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_level(quiet, debug)),
    )
    .format(|buf, record| writeln!(buf, "[{}] {}", level_label(record.level()), record.args()))
    .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_wins() {
        assert_eq!(default_level(true, true), "debug");
        assert_eq!(default_level(true, false), "warn");
        assert_eq!(default_level(false, false), "info");
    }
}
