//! Logging initialization.
//!
//! Uses the `tracing` ecosystem with human-readable or JSON output.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the logging subsystem.
///
/// # Arguments
///
/// * `verbose` - If true, enables DEBUG level logging; otherwise INFO level.
/// * `json_format` - If true, outputs structured JSON logs; otherwise pretty-printed.
///
/// # Notes
///
/// - Log output goes to stderr (stdout is reserved for ingest results)
/// - The RUST_LOG environment variable can override the log level
pub fn init(verbose: bool, json_format: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from the `[logging]` config section.
///
/// CLI flags can only raise verbosity or switch to JSON, never turn them off.
pub fn init_from_config(
    config: &darkroom_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
) {
    let (verbose, json_format) = resolve(config, verbose_override, json_logs_override);
    init(verbose, json_format);
}

fn resolve(config: &darkroom_core::Config, verbose: bool, json_logs: bool) -> (bool, bool) {
    let level = config.logging.level.to_lowercase();
    (
        verbose || level == "debug" || level == "trace",
        json_logs || config.logging.format.eq_ignore_ascii_case("json"),
    )
}

fn default_level(verbose: bool) -> &'static str {
    // Dependencies stay at warn so decoder chatter doesn't drown pipeline events.
    if verbose {
        "warn,darkroom=debug,darkroom_core=debug"
    } else {
        "warn,darkroom=info,darkroom_core=info"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use darkroom_core::Config;

    #[test]
    fn test_resolve_from_config() {
        let mut config = Config::default();
        assert_eq!(resolve(&config, false, false), (false, false));

        config.logging.level = "DEBUG".to_string();
        config.logging.format = "json".to_string();
        assert_eq!(resolve(&config, false, false), (true, true));
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config::default();
        assert_eq!(resolve(&config, true, true), (true, true));
    }

    #[test]
    fn test_default_level_parses() {
        assert!(EnvFilter::try_new(default_level(true)).is_ok());
        assert!(EnvFilter::try_new(default_level(false)).is_ok());
    }
}
