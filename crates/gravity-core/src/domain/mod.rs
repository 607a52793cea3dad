//! Domain layer: pure state and rules, no collaborators.

pub mod attestation;
pub mod batch;
pub mod confirmation;
pub mod delegate_keys;
pub mod denom;
pub mod ethereum_event;
pub mod height_vote;
pub mod liveness;
pub mod nonces;
pub mod params;
pub mod signer_set;
pub mod transfer;

pub use attestation::{meets_threshold, Attestation, AttestationKey, AttestationStore};
pub use batch::{BatchStore, BatchTx};
pub use confirmation::{Confirmation, ConfirmationStore, SubjectRef};
pub use delegate_keys::{DelegateKeysSignMsg, KeyRegistry, OrchestratorBinding};
pub use denom::{parse_voucher_denom, voucher_denom, AssetOrigin, DenomMap, DenomMapping};
pub use ethereum_event::{
    AssetContractDeployed, AssetDeposited, BatchExecuted, ContractCallExecuted, EthereumEvent,
    SignerSetExecuted,
};
pub use height_vote::{HeightVotes, LatestEthereumHeight};
pub use liveness::{Duty, LivenessCategory, LivenessMonitor};
pub use nonces::{NonceArena, NonceKey};
pub use params::{Params, BPS_DENOMINATOR, MAX_GRAVITY_ID_LEN};
pub use signer_set::{normalize_signers, EthereumSigner, SignerSetStore, SignerSetTx};
pub use transfer::{Page, Pagination, SendToEthereum, TransferPool};
