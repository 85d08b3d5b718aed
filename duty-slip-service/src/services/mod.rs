//! Services module for duty-slip-service.

pub mod metrics;
pub mod rate_client;
pub mod rate_lookup;
pub mod settlement;

pub use metrics::{
    init_metrics, record_rate_operation, record_settlement, record_settlement_warning,
    record_upstream_error,
};
pub use rate_client::RateClient;
pub use settlement::{settle, SettlementPolicy};
