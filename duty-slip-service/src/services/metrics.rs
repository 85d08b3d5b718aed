//! Metrics module for duty-slip-service.
//! Prometheus counters for settlements, rate catalog operations and upstream failures.

use prometheus::{opts, register_int_counter_vec, IntCounterVec};
use std::sync::OnceLock;

/// Settlements by outcome (settled, rate_not_found, invalid_range, ...)
pub static SETTLEMENTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Settlement warnings by kind
pub static SETTLEMENT_WARNINGS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Rate catalog operations (search, create, update, delete, plans)
pub static RATE_OPERATIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Failed calls to the upstream rate API
pub static UPSTREAM_ERRORS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize all metrics. Safe to call more than once.
pub fn init_metrics() {
    SETTLEMENTS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!("duty_settlements_total", "Total duty slip settlements by outcome"),
            &["outcome"]
        )
        .expect("Failed to register SETTLEMENTS_TOTAL")
    });

    SETTLEMENT_WARNINGS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "duty_settlement_warnings_total",
                "Settlement warnings by kind"
            ),
            &["kind"]
        )
        .expect("Failed to register SETTLEMENT_WARNINGS_TOTAL")
    });

    RATE_OPERATIONS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "duty_rate_operations_total",
                "Total customer rate operations by type"
            ),
            &["operation"]
        )
        .expect("Failed to register RATE_OPERATIONS_TOTAL")
    });

    UPSTREAM_ERRORS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "duty_upstream_errors_total",
                "Failed rate API calls by operation"
            ),
            &["operation"]
        )
        .expect("Failed to register UPSTREAM_ERRORS_TOTAL")
    });
}

pub fn record_settlement(outcome: &str) {
    if let Some(counter) = SETTLEMENTS_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}

pub fn record_settlement_warning(kind: &str) {
    if let Some(counter) = SETTLEMENT_WARNINGS_TOTAL.get() {
        counter.with_label_values(&[kind]).inc();
    }
}

pub fn record_rate_operation(operation: &str) {
    if let Some(counter) = RATE_OPERATIONS_TOTAL.get() {
        counter.with_label_values(&[operation]).inc();
    }
}

pub fn record_upstream_error(operation: &str) {
    if let Some(counter) = UPSTREAM_ERRORS_TOTAL.get() {
        counter.with_label_values(&[operation]).inc();
    }
}
