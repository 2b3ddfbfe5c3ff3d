// Structured logging setup
//
// Logs always go to stderr so stdout stays clean for JSON output.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{ConfigError, LogFormat, LoggingConfig};

/// Overrides `logging.level` when set, same syntax as RUST_LOG.
pub const LOG_ENV: &str = "MEDIA_RESOLVER_LOG";

/// Install the global subscriber. `verbose` forces debug level.
pub fn init_logging(config: &LoggingConfig, verbose: bool) -> Result<(), ConfigError> {
    let env = std::env::var(LOG_ENV).ok();
    let env_filter = build_filter(&config.level, verbose, env.as_deref())?;

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_file(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    result.map_err(|e| ConfigError::Invalid(format!("logging already initialized: {}", e)))
}

/// Filter from the env override, else `verbose`, else the configured directive.
fn build_filter(level: &str, verbose: bool, env: Option<&str>) -> Result<EnvFilter, ConfigError> {
    if let Some(filter) = env
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| EnvFilter::try_new(v).ok())
    {
        return Ok(filter);
    }
    if verbose {
        return Ok(EnvFilter::new("debug"));
    }
    EnvFilter::try_new(level.trim())
        .map_err(|e| ConfigError::Invalid(format!("logging.level {:?}: {}", level, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_plain_levels_and_directives_are_accepted() {
        for level in ["info", " Debug ", "warn", "media_resolver_lib=debug", "info,rusty_ytdl=warn"] {
            assert!(build_filter(level, false, None).is_ok(), "{level}");
        }
    }

    #[test]
    fn test_malformed_directive_is_rejected() {
        assert!(matches!(
            build_filter("media_resolver_lib=loud", false, None),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_env_and_verbose_take_precedence() {
        let filter = build_filter("media_resolver_lib=loud", false, Some("trace")).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
        let filter = build_filter("media_resolver_lib=loud", true, None).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
