use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled || PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

pub(crate) fn record_enrollment(created: bool) {
    metrics::counter!("enrollments_total", "created" => created.to_string()).increment(1);
}

pub(crate) fn record_lesson_completion(created: bool) {
    metrics::counter!("lesson_completions_total", "created" => created.to_string()).increment(1);
}

pub(crate) fn record_quiz_attempt(passed: bool) {
    metrics::counter!("quiz_attempts_total", "passed" => passed.to_string()).increment(1);
}

pub(crate) fn record_certificate_issued() {
    metrics::counter!("certificates_issued_total").increment(1);
}
