use axum::http::StatusCode;
use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge, Encoder, IntCounter,
    IntCounterVec, IntGauge, TextEncoder,
};

// Prometheus metrics (default registry)
pub static OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "docstore_operations_total",
        "Store operations served over HTTP",
        &["op"]
    )
    .expect("register operations_total")
});

pub static REJECTED_BODIES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "docstore_rejected_bodies_total",
        "Request bodies rejected before reaching the store"
    )
    .expect("register rejected_bodies_total")
});

pub static DOCUMENTS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("docstore_documents", "Documents currently stored")
        .expect("register documents")
});

pub fn record_op(op: &str) {
    OPERATIONS_TOTAL.with_label_values(&[op]).inc();
}

pub fn encode_metrics() -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
}
