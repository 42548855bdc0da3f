//! Contract templates and external message construction.
//!
//! Each managed contract kind pairs an embedded code cell with its
//! persistent-data layout and operation encodings. From those this crate
//! derives deployment addresses and assembles the signed external messages
//! the network accepts:
//!
//! - **deploy**: signing message at seqno 0, wrapped with the state-init
//!   (code + data) so the first message activates the account
//! - **operation**: signing message at the account's current seqno, no
//!   state-init
//!
//! The signature always covers the signing-message cell hash. Fee
//! estimation uses the same construction with a zeroed signature, so the
//! estimated and submitted messages are byte-identical apart from the
//! signature bits.

mod codes;
mod contract;
mod message;
mod ops;

pub use codes::{bridge_code, example_code, lottery_code, wallet_code};
pub use contract::{BridgeConfig, Contract, ContractKind};
pub use message::{
    common_msg_info, create_state_init, derive_address, external_message_header, ExternalMessage,
};
pub use ops::{build_comment, Operation, Transfer};

use thiserror::Error;

/// Errors from contract template and message construction.
#[derive(Debug, Error)]
pub enum ContractError {
    /// Underlying cell construction failed.
    #[error("cell error: {0}")]
    Cell(#[from] tonctl_cell::CellError),

    /// A data cell or address was requested before the public key was set.
    #[error("public key is not set")]
    MissingPublicKey,

    /// Bridge initialization parameters are required for this template.
    #[error("bridge init parameters are not set")]
    MissingBridgeConfig,

    /// The operation does not exist on this contract kind.
    #[error("operation {op} is not supported by the {kind} contract")]
    UnsupportedOperation { kind: &'static str, op: &'static str },
}

/// Result type for contract operations.
pub type ContractResult<T> = Result<T, ContractError>;
