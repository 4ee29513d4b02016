use std::{sync::LazyLock, time::Duration};

use arc_swap::ArcSwap;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Name of the optional config file, looked up in the working directory.
pub const CONFIG_NAME: &str = "keyrelay.toml";

/// Tunables for the credential correlation store.
///
/// The TTL bounds how long an orphaned entry may linger: far longer than any
/// reasonable authentication-to-dispatch latency, short enough to keep the
/// store from growing without bound.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyRelayConfig {
    /// Seconds an unconsumed entry survives before the sweep reclaims it.
    pub ttl_secs: u64,
    /// Seconds between sweep passes.
    pub sweep_secs: u64,
}

impl Default for KeyRelayConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 60,
            sweep_secs: 15,
        }
    }
}

impl KeyRelayConfig {
    fn load() -> Self {
        Figment::from(Serialized::defaults(KeyRelayConfig::default()))
            .merge(Toml::file(CONFIG_NAME))
            .merge(Env::prefixed("KEYRELAY_"))
            .extract()
            .unwrap_or_else(|e| {
                warn!("Failed to load config, falling back to defaults: {e}");
                Self::default()
            })
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        // tokio::time::interval panics on a zero period
        Duration::from_secs(self.sweep_secs.max(1))
    }
}

pub static KEYRELAY_CONFIG: LazyLock<ArcSwap<KeyRelayConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(KeyRelayConfig::load()));
