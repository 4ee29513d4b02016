use axum::extract::FromRequestParts;
use http::{HeaderMap, header::AUTHORIZATION, request::Parts};
use tracing::debug;

use crate::{
    correlation::{CREDENTIAL_STORE, CorrelationKey, Credential, CredentialStore},
    error::RelayError,
};

/// Who this request is acting as, from the relay's point of view.
///
/// Deliberately never carries the credential text: the secret travels only
/// through the store's dedicated channel, so identity fields stay safe to
/// log and index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Principal {
    /// No credential presented, e.g. a health-check probe.
    Anonymous,
    /// A client credential was captured for downstream passthrough.
    Passthrough,
}

/// Authentication result handed to downstream host logic.
#[derive(Debug, Clone)]
pub struct RelayIdentity {
    pub key: CorrelationKey,
    pub principal: Principal,
}

impl RelayIdentity {
    pub fn is_authenticated(&self) -> bool {
        self.principal == Principal::Passthrough
    }
}

/// Core of the authentication-stage hook: observe the validated client
/// credential and park it under the request's correlation key.
///
/// Empty credentials (health checks) produce an anonymous identity and no
/// store write.
pub async fn capture(store: &CredentialStore, key: &CorrelationKey, raw: &str) -> RelayIdentity {
    if raw.is_empty() {
        debug!(key = %key, "no client credential presented");
        return RelayIdentity {
            key: key.clone(),
            principal: Principal::Anonymous,
        };
    }
    let credential = Credential::new(raw);
    debug!(key = %key, credential = %credential, "captured client credential");
    store.put(key.clone(), credential).await;
    RelayIdentity {
        key: key.clone(),
        principal: Principal::Passthrough,
    }
}

fn presented_credential(headers: &HeaderMap) -> String {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(token) = bearer {
        return token.to_owned();
    }
    headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or_default()
        .to_owned()
}

/// Extractor the host mounts on chat routes to run the capture hook.
///
/// Reads the credential from `Authorization: Bearer`, falling back to
/// `x-api-key`, and requires the correlation key extension set by
/// [`tag_request`](super::tag_request); its absence is a wiring bug and is
/// answered with a 500 rather than silently losing the credential.
pub struct RequireRelayAuth(pub RelayIdentity);

impl<S> FromRequestParts<S> for RequireRelayAuth
where
    S: Send + Sync,
{
    type Rejection = RelayError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let key = parts
            .extensions
            .get::<CorrelationKey>()
            .cloned()
            .ok_or(RelayError::MissingCorrelation)?;
        let raw = presented_credential(&parts.headers);
        let identity = capture(&CREDENTIAL_STORE, &key, &raw).await;
        parts.extensions.insert(identity.clone());
        Ok(Self(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::tag_request;
    use axum::{Router, body::Body, extract::Request, routing::get};
    use http::StatusCode;
    use std::time::Duration;
    use tower::ServiceExt;

    #[tokio::test]
    async fn empty_credential_writes_nothing() {
        let store = CredentialStore::new(Duration::from_secs(60));
        let key = CorrelationKey::new();

        let identity = capture(&store, &key, "").await;

        assert_eq!(identity.principal, Principal::Anonymous);
        assert!(!identity.is_authenticated());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn captured_credential_lands_in_store() {
        let store = CredentialStore::new(Duration::from_secs(60));
        let key = CorrelationKey::new();

        let identity = capture(&store, &key, "sk-live-abc123").await;

        assert_eq!(identity.principal, Principal::Passthrough);
        assert_eq!(
            store.take(&key).await.map(Credential::into_inner).as_deref(),
            Some("sk-live-abc123")
        );
    }

    #[tokio::test]
    async fn identity_never_embeds_the_secret() {
        let store = CredentialStore::new(Duration::from_secs(60));
        let key = CorrelationKey::new();

        let identity = capture(&store, &key, "sk-live-abc123-super-secret").await;

        let debugged = format!("{identity:?}");
        assert!(!debugged.contains("sk-live-abc123-super-secret"));
    }

    fn router() -> Router {
        async fn probe(RequireRelayAuth(identity): RequireRelayAuth) -> String {
            format!("{}:{}", identity.key, identity.is_authenticated())
        }
        Router::new()
            .route("/", get(probe))
            .layer(axum::middleware::from_fn(tag_request))
    }

    #[tokio::test]
    async fn bearer_header_is_captured_through_the_router() {
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("x-request-id", "auth-bearer-1")
                    .header(AUTHORIZATION, "Bearer sk-bearer-xyz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let key = CorrelationKey::from_client("auth-bearer-1").unwrap();
        assert_eq!(
            CREDENTIAL_STORE
                .take(&key)
                .await
                .map(Credential::into_inner)
                .as_deref(),
            Some("sk-bearer-xyz")
        );
    }

    #[tokio::test]
    async fn x_api_key_header_is_the_fallback() {
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("x-request-id", "auth-xapikey-1")
                    .header("x-api-key", "sk-xapikey-xyz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let key = CorrelationKey::from_client("auth-xapikey-1").unwrap();
        assert_eq!(
            CREDENTIAL_STORE
                .take(&key)
                .await
                .map(Credential::into_inner)
                .as_deref(),
            Some("sk-xapikey-xyz")
        );
    }

    #[tokio::test]
    async fn missing_correlation_extension_is_a_wiring_bug() {
        async fn probe(RequireRelayAuth(_): RequireRelayAuth) -> &'static str {
            "unreachable"
        }
        // No tag_request layer: the extractor must refuse to run.
        let router = Router::new().route("/", get(probe));

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(AUTHORIZATION, "Bearer sk-lost")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
