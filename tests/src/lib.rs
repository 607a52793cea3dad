//! # Gravity Bridge Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # TestNet: service + in-memory staking/bank/accounts
//! └── integration/      # End-to-end flows driven block by block
//!     ├── attestation_flow.rs
//!     ├── batch_flow.rs
//!     ├── liveness_flow.rs
//!     └── genesis_flow.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p gravity-tests
//!
//! # With logs
//! RUST_LOG=gravity_core=debug cargo test -p gravity-tests -- --nocapture
//!
//! # Benchmarks
//! cargo bench -p gravity-tests
//! ```

pub mod fixtures;
pub mod integration;
