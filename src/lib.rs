//! Credential passthrough and forced-streaming hooks for an LLM gateway.
//!
//! The host gateway authenticates a request in one pipeline stage and
//! dispatches it to the downstream provider in another, with no explicit
//! request handle passed between the two. This crate bridges the gap with an
//! explicit correlation key assigned at the transport layer and a
//! concurrency-safe credential store with take-once semantics and TTL
//! eviction:
//!
//! 1. [`middleware::tag_request`] tags every request with a
//!    [`CorrelationKey`]
//! 2. [`middleware::RequireRelayAuth`] captures the client's API key into
//!    [`CREDENTIAL_STORE`] under that key
//! 3. [`middleware::prepare_dispatch`] forces `stream = true` on the
//!    outgoing payload and re-attaches the captured key immediately before
//!    the provider call

pub mod config;
pub mod correlation;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod types;
pub mod utils;

pub use correlation::{CREDENTIAL_STORE, CorrelationKey, Credential, CredentialStore, spawn_sweeper};
pub use error::RelayError;
pub use middleware::{
    CredentialSource, Principal, RelayIdentity, RequireRelayAuth, prepare_dispatch, tag_request,
};
pub use types::ChatPayload;

use std::sync::LazyLock;
use tokio_util::sync::CancellationToken;

/// Cancelled by the host on shutdown; background tasks run on child tokens.
pub static SHUTDOWN_TOKEN: LazyLock<CancellationToken> = LazyLock::new(CancellationToken::new);
