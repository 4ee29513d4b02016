/// Request processing middleware for the relay
///
/// This module contains the per-request hooks the host gateway mounts on its
/// chat routes:
///
/// - Request tagging: assign every inbound request a stable correlation key
/// - Authentication capture: observe the client-presented API key and park it
///   in the credential store under the request's correlation key
/// - Policy injection: force streaming on the outgoing payload and re-attach
///   the captured credential immediately before dispatch
mod auth;
mod policy;
mod request_id;

pub use auth::{Principal, RelayIdentity, RequireRelayAuth, capture};
pub use policy::{CredentialSource, prepare_dispatch};
pub use request_id::{X_REQUEST_ID, tag_request};
