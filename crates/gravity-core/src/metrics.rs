//! # Bridge Metrics
//!
//! Prometheus counters, enabled with the `metrics` feature:
//! ```toml
//! gravity-core = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `gravity_events_observed_total` - Events that crossed the vote threshold
//! - `gravity_votes_rejected_total` - Rejected event votes (by reason)
//! - `gravity_batches_created_total` - Outgoing batches built
//! - `gravity_confirmations_stored_total` - Checkpoint signatures stored (by subject kind)
//! - `gravity_validators_slashed_total` - Liveness penalties (by category)
//! - `gravity_last_observed_event_nonce` - Current global event nonce

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_counter_vec, register_gauge, register_int_counter, CounterVec, Gauge, IntCounter,
};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref EVENTS_OBSERVED: IntCounter = register_int_counter!(
        "gravity_events_observed_total",
        "Total number of external events observed"
    )
    .expect("Failed to create EVENTS_OBSERVED metric");

    pub static ref VOTES_REJECTED: CounterVec = register_counter_vec!(
        "gravity_votes_rejected_total",
        "Total number of rejected event votes",
        &["reason"]
    )
    .expect("Failed to create VOTES_REJECTED metric");

    pub static ref BATCHES_CREATED: IntCounter = register_int_counter!(
        "gravity_batches_created_total",
        "Total number of outgoing batches created"
    )
    .expect("Failed to create BATCHES_CREATED metric");

    pub static ref CONFIRMATIONS_STORED: CounterVec = register_counter_vec!(
        "gravity_confirmations_stored_total",
        "Total number of checkpoint confirmations stored",
        &["subject"]
    )
    .expect("Failed to create CONFIRMATIONS_STORED metric");

    pub static ref VALIDATORS_SLASHED: CounterVec = register_counter_vec!(
        "gravity_validators_slashed_total",
        "Total number of liveness penalties applied",
        &["category"]
    )
    .expect("Failed to create VALIDATORS_SLASHED metric");

    pub static ref LAST_OBSERVED_EVENT_NONCE: Gauge = register_gauge!(
        "gravity_last_observed_event_nonce",
        "Last observed external event nonce"
    )
    .expect("Failed to create LAST_OBSERVED_EVENT_NONCE metric");
}

#[cfg(feature = "metrics")]
pub fn record_event_observed(nonce: u64) {
    EVENTS_OBSERVED.inc();
    LAST_OBSERVED_EVENT_NONCE.set(nonce as f64);
}

#[cfg(feature = "metrics")]
pub fn record_vote_rejected(reason: &str) {
    VOTES_REJECTED.with_label_values(&[reason]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_batch_created() {
    BATCHES_CREATED.inc();
}

#[cfg(feature = "metrics")]
pub fn record_confirmation_stored(subject_kind: &str) {
    CONFIRMATIONS_STORED.with_label_values(&[subject_kind]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_validator_slashed(category: &str) {
    VALIDATORS_SLASHED.with_label_values(&[category]).inc();
}

#[cfg(not(feature = "metrics"))]
pub fn record_event_observed(_nonce: u64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_vote_rejected(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_batch_created() {}

#[cfg(not(feature = "metrics"))]
pub fn record_confirmation_stored(_subject_kind: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_validator_slashed(_category: &str) {}
