//! Prometheus metrics for billing-frontend.

use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

/// HTTP request counter by method, route and status.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "billing_http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .expect("Failed to register http_requests_total")
});

pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "billing_http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("Failed to register http_request_duration")
});

/// Backend calls by operation and outcome (ok, backend_error, transport_error).
pub static BACKEND_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "billing_backend_requests_total",
        "Total number of calls to the billing backend",
        &["operation", "outcome"]
    )
    .expect("Failed to register backend_requests_total")
});

pub static BACKEND_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "billing_backend_request_duration_seconds",
        "Billing backend call duration in seconds",
        &["operation"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to register backend_request_duration")
});

/// Documents rendered by kind (invoice_html, invoice_pdf, statement_html, statement_pdf).
pub static DOCUMENTS_RENDERED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "billing_documents_rendered_total",
        "Total number of printable documents rendered",
        &["kind"]
    )
    .expect("Failed to register documents_rendered_total")
});

/// Touch every metric so `/metrics` lists them before first use.
pub fn init_metrics() {
    Lazy::force(&HTTP_REQUESTS_TOTAL);
    Lazy::force(&HTTP_REQUEST_DURATION);
    Lazy::force(&BACKEND_REQUESTS_TOTAL);
    Lazy::force(&BACKEND_REQUEST_DURATION);
    Lazy::force(&DOCUMENTS_RENDERED_TOTAL);
}

pub fn record_backend_call(operation: &str, outcome: &str, seconds: f64) {
    BACKEND_REQUESTS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
    BACKEND_REQUEST_DURATION
        .with_label_values(&[operation])
        .observe(seconds);
}

pub fn record_document(kind: &str) {
    DOCUMENTS_RENDERED_TOTAL.with_label_values(&[kind]).inc();
}

/// Text exposition of the default registry.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_calls_show_up_in_exposition() {
        init_metrics();
        record_backend_call("list_buyers", "ok", 0.02);
        record_document("invoice_pdf");

        let text = get_metrics();
        assert!(text.contains("billing_backend_requests_total"));
        assert!(text.contains("operation=\"list_buyers\""));
        assert!(text.contains("billing_documents_rendered_total"));
    }
}
