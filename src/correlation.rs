use std::{
    collections::HashMap,
    sync::LazyLock,
    time::{Duration, Instant},
};

use tokio::{
    sync::RwLock,
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::KEYRELAY_CONFIG;

/// Stable per-request identifier linking the authentication stage to the
/// pre-dispatch stage.
///
/// Derived from the transport layer (client-supplied `x-request-id` or a
/// fresh UUID), never from the address of a transient object, so a key is
/// unique for the lifetime of its request and cannot be reused while any
/// stage of that request is still pending.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationKey(String);

impl Default for CorrelationKey {
    fn default() -> Self {
        Self::new()
    }
}

impl CorrelationKey {
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Accepts a client-supplied request id, rejecting empty values.
    pub fn from_client(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        Some(Self(value.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CorrelationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque client-presented secret authorizing downstream calls.
///
/// `Display` and `Debug` render a short masked prefix only; the full value
/// leaves this type solely through [`Credential::into_inner`] at the point
/// where it is written into an outgoing payload.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Masked preview for log output, e.g. `sk-live-…`.
    pub fn ellipse(&self) -> String {
        let prefix: String = self.0.chars().take(8).collect();
        format!("{prefix}…")
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ellipse())
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential({})", self.ellipse())
    }
}

/// A captured credential awaiting its pre-dispatch consumer.
#[derive(Debug, Clone)]
struct CredentialEntry {
    credential: Credential,
    inserted_at: Instant,
}

/// Process-wide store correlating authentication-time credentials with their
/// pre-dispatch consumers.
///
/// One live entry per key; `take` removes atomically so a credential is
/// delivered at most once. Entries whose request never reaches dispatch
/// (client aborted in between) are orphans and are reclaimed by the TTL
/// sweep.
pub struct CredentialStore {
    entries: RwLock<HashMap<CorrelationKey, CredentialEntry>>,
    ttl: Duration,
}

impl CredentialStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Inserts or overwrites the entry for `key`; last writer wins.
    pub async fn put(&self, key: CorrelationKey, credential: Credential) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            CredentialEntry {
                credential,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Atomically removes and returns the entry for `key`.
    ///
    /// `None` means missing or already consumed; callers treat both the
    /// same way, so the distinction is not surfaced.
    pub async fn take(&self, key: &CorrelationKey) -> Option<Credential> {
        let mut entries = self.entries.write().await;
        entries.remove(key).map(|entry| entry.credential)
    }

    /// Removes entries older than the configured TTL, returning how many
    /// were evicted.
    pub async fn sweep(&self, now: Instant) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, entry| {
            let stale = now.saturating_duration_since(entry.inserted_at) > self.ttl;
            if stale {
                info!(key = %key, "[SWEEP] evicting stale credential entry");
            }
            !stale
        });
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Global credential store instance, TTL taken from configuration.
pub static CREDENTIAL_STORE: LazyLock<CredentialStore> =
    LazyLock::new(|| CredentialStore::new(KEYRELAY_CONFIG.load().ttl()));

/// Spawns the periodic sweep for orphaned entries.
///
/// Runs until `token` is cancelled; the host derives `token` from its
/// shutdown token so the task dies with the process, not with any single
/// request.
pub fn spawn_sweeper(store: &'static CredentialStore, token: CancellationToken) -> JoinHandle<()> {
    let period = KEYRELAY_CONFIG.load().sweep_interval();
    tokio::spawn(async move {
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let evicted = store.sweep(Instant::now()).await;
                    if evicted > 0 {
                        warn!(evicted, "[SWEEP] reclaimed orphaned credential entries");
                    }
                }
                _ = token.cancelled() => {
                    debug!("[SWEEP] sweeper stopped");
                    break;
                }
            }
        }
    })
}
