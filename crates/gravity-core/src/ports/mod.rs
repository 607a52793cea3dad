//! Ports for the bridge core

pub mod inbound;
pub mod outbound;

pub use inbound::{BridgeApi, BridgeMsg, BridgeQuery, EndBlockReport, EventVoteResult, MsgResponse};
pub use outbound::{AccountSequenceSource, LedgerError, TokenLedger, VotingPowerSource};
