//! # gravity-core
//!
//! Consensus core of a two-way bridge between this chain and an
//! Ethereum-like external chain.
//!
//! ## Overview
//!
//! - **Delegate Key Registry**: binds each validator to one orchestrator
//!   account and one external signing address, proven by a personal-sign
//!   signature over `{validator_address, nonce}`
//! - **Attestation Engine**: validator-weighted votes on claimed external
//!   events; an event applies exactly once when 2/3 of bonded power agrees
//!   and its nonce is the next one in sequence (cascading)
//! - **Outgoing Batches**: pending transfers ranked by fee into per-asset
//!   batches with monotonic nonces and ABI-encoded checkpoints
//! - **Signer Sets**: normalized snapshots of the bonded set for the
//!   external contract
//! - **Confirmation Collector**: external-chain signatures over signer-set
//!   and batch checkpoints, one per (subject, signer)
//! - **Liveness Monitor**: slashes and jails validators that skip every
//!   duty of a category over a window
//!
//! ## Architecture
//!
//! ```text
//! Orchestrators ──BridgeMsg──→ BridgeService ──→ VotingPowerSource (staking)
//!                                   │        └──→ TokenLedger (bank)
//!                                   │
//!                 end_block(height) ┴──→ height consensus, timeouts,
//!                                        auto-batching, signer sets, slashing
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use gravity_core::{BridgeDependencies, BridgeService, Params};
//! use gravity_core::adapters::{InMemoryAccounts, InMemoryBank, InMemoryStaking};
//! use gravity_core::ports::{BridgeApi, BridgeMsg};
//!
//! let service = BridgeService::new(BridgeDependencies {
//!     staking: Arc::new(InMemoryStaking::with_validators(&validators)),
//!     ledger: Arc::new(InMemoryBank::new()),
//!     accounts: Arc::new(InMemoryAccounts::new()),
//!     params: Params::default(),
//! })?;
//!
//! service.begin_block(1);
//! service.deliver(BridgeMsg::SubmitEthereumEvent(msg))?;
//! let report = service.end_block(1);
//! let events = service.drain_events();
//! ```

pub mod adapters;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod events;
pub mod genesis;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod state;

pub use domain::{
    Attestation, BatchTx, Confirmation, EthereumEvent, OrchestratorBinding, Params,
    SendToEthereum, SignerSetTx, SubjectRef,
};
pub use error::{BridgeError, BridgeResult};
pub use events::BridgeEvent;
pub use genesis::GenesisState;
pub use service::{BridgeDependencies, BridgeService};
