use tracing_subscriber::{fmt, EnvFilter};

use crate::core::config::Settings;

/// `RUST_LOG` wins; otherwise the configured level with sqlx statement noise capped at warn.
fn default_directives(level: &str) -> String {
    format!("{level},sqlx=warn")
}

pub(crate) fn init_tracing(settings: &Settings) -> anyhow::Result<()> {
    let telemetry = settings.telemetry();
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directives(&telemetry.log_level))?,
    };

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(fmt::format::FmtSpan::CLOSE);

    let installed =
        if telemetry.json { subscriber.json().try_init() } else { subscriber.try_init() };
    installed.map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_parse() {
        assert_eq!(default_directives("debug"), "debug,sqlx=warn");
        assert!(EnvFilter::try_new(default_directives("info")).is_ok());
    }
}
