use strum::Display;
use tracing::{info, warn};

use crate::{
    correlation::{CorrelationKey, CredentialStore},
    types::ChatPayload,
    utils::enabled,
};

/// Where the outgoing credential came from, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CredentialSource {
    /// The client set `api_key` in the request body itself; explicit intent
    /// wins and the store is not consulted.
    ClientPayload,
    /// Re-attached from the credential captured at authentication time.
    Store,
    /// Nothing to inject; the request goes out bare and will fail at the
    /// provider boundary.
    Missing,
}

/// Pre-dispatch hook: force streaming and re-attach the request's
/// credential.
///
/// The streaming override is unconditional and intentional: the downstream
/// provider mangles responses in non-streaming mode, so every payload goes
/// out with `stream = true` no matter what the client asked for.
///
/// Credential injection stops at the first source that yields one. A miss is
/// reported through the returned [`CredentialSource`] and a warning event
/// keyed by the correlation key; the payload is dispatched regardless.
pub async fn prepare_dispatch(
    store: &CredentialStore,
    key: &CorrelationKey,
    payload: &mut ChatPayload,
) -> CredentialSource {
    payload.stream = Some(true);

    let source = if payload.api_key.as_deref().is_some_and(|k| !k.is_empty()) {
        CredentialSource::ClientPayload
    } else if let Some(credential) = store.take(key).await {
        payload.api_key = Some(credential.into_inner());
        CredentialSource::Store
    } else {
        warn!(key = %key, "no credential available, dispatching without api key");
        CredentialSource::Missing
    };

    info!(
        key = %key,
        "[DISPATCH] stream: {} (forced), credential source: {source}",
        enabled(true),
    );
    source
}
