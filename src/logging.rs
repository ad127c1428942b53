/*!
 * Logging and tracing initialization
 */

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::config::ExportConfig;
use crate::error::{ExportError, Result};

/// Select the effective log level: verbose wins over the configured level
fn effective_level(config: &ExportConfig) -> tracing::Level {
    if config.verbose {
        tracing::Level::DEBUG
    } else {
        config.log_level.to_tracing_level()
    }
}

/// Initialize structured logging based on configuration
pub fn init_logging(config: &ExportConfig) -> Result<()> {
    let log_level = effective_level(config);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("medex={}", log_level)))
        .map_err(|e| ExportError::Config(format!("Failed to create log filter: {}", e)))?;

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_verbose_overrides_log_level() {
        let config = ExportConfig {
            log_level: LogLevel::Error,
            verbose: true,
            ..Default::default()
        };

        assert_eq!(effective_level(&config), tracing::Level::DEBUG);
    }

    #[test]
    fn test_configured_level_used_without_verbose() {
        let config = ExportConfig {
            log_level: LogLevel::Warn,
            verbose: false,
            ..Default::default()
        };

        assert_eq!(effective_level(&config), tracing::Level::WARN);
    }
}
