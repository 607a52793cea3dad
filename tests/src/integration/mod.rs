//! # Integration Flows
//!
//! Each flow drives `BridgeService` through the public message and query
//! ports, block by block, the way the host chain would.

pub mod attestation_flow;
pub mod batch_flow;
pub mod liveness_flow;
