//! Prometheus metrics for portal observability.

use metrics::{counter, histogram};

/// Initialize metrics exporter (Prometheus).
pub fn init_metrics() {
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    if let Err(e) = builder.install() {
        tracing::warn!("Failed to install Prometheus exporter: {}", e);
    }
}

/// Record a request rejected with a client error status.
pub fn request_rejected(status: u16) {
    counter!("portal_requests_rejected_total", "status" => status.to_string()).increment(1);
}

/// Record a login attempt.
pub fn login_attempt(outcome: &'static str) {
    counter!("portal_logins_total", "outcome" => outcome).increment(1);
}

/// Record a password reset stage (`requested`, `completed`, `expired`, `invalid`).
pub fn password_reset(stage: &'static str) {
    counter!("portal_password_resets_total", "stage" => stage).increment(1);
}

/// Record a stored upload.
pub fn upload_stored(kind: &str, size_bytes: usize) {
    counter!("portal_uploads_total", "kind" => kind.to_string()).increment(1);
    histogram!("portal_upload_bytes").record(size_bytes as f64);
}

/// Record an outgoing email.
pub fn mail_sent(kind: &'static str, ok: bool) {
    let outcome = if ok { "sent" } else { "failed" };
    counter!("portal_mail_total", "kind" => kind, "outcome" => outcome).increment(1);
}

/// Record a newsletter subscription change.
pub fn subscription_changed(action: &'static str) {
    counter!("portal_subscriptions_total", "action" => action).increment(1);
}

/// Record a submitted admission or career application.
pub fn application_received(kind: &'static str) {
    counter!("portal_applications_total", "kind" => kind).increment(1);
}
