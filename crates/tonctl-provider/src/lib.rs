//! HTTP JSON-RPC provider client.
//!
//! The node endpoint speaks a JSON-RPC-like protocol: requests are
//! `{id, jsonrpc, method, params}` envelopes, responses come back as
//! `{ok, result}`. Errors surface either as `ok: false` or as a
//! `{"@type": "error"}` result; both map to [`ProviderError::Remote`].
//!
//! The client is a thin transport: it never retries, and it does not
//! interpret the payloads beyond the typed response models.

mod provider;
mod types;

pub use provider::HttpProvider;
pub use types::{
    AccountState, AddressInfo, FeeRequest, Fees, GetMethodResult, SourceFees, Transaction,
    TransactionId, TxMessage,
};

use thiserror::Error;

/// Errors from the provider client.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The HTTP request itself failed.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint returned an error envelope.
    #[error("remote error (code {code}): {message}")]
    Remote {
        /// Numeric error code from the endpoint.
        code: i64,
        /// Error message from the endpoint.
        message: String,
    },

    /// The response did not match the expected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
