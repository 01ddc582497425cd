//! Top-level process configuration, loaded from the RON file located by
//! [`harvester_common::config::find_config_file`].
//!
//! Only the pieces that are plain data live here; the trait-object
//! dependencies (queue, object store, state tables, credential provider,
//! article extractor) are concrete adapters wired up in [`crate::Harvester::run`]
//! and aren't configuration in this sense.

use serde::Deserialize;

use harvester_health::HealthConfig;
use harvester_metrics::MetricsConfig;
use harvester_queue::ConsumerEngine;
use harvester_scheduler::RssScheduler;

fn default_control_listen_address() -> String {
    "[::]:8081".to_string()
}

fn default_credential_endpoint() -> String {
    "http://localhost:9000/token".to_string()
}

#[derive(Deserialize)]
pub struct HarvesterConfig {
    #[serde(default)]
    pub consumer: ConsumerEngine,

    #[serde(default)]
    pub scheduler: RssScheduler,

    #[serde(default)]
    pub health: HealthConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Address the operator-facing control surface binds to.
    #[serde(default = "default_control_listen_address")]
    pub control_listen_address: String,

    /// HTTP endpoint the credential refresher polls for a fresh token.
    #[serde(default = "default_credential_endpoint")]
    pub credential_endpoint: String,
}

impl Default for HarvesterConfig {
    fn default() -> Self {
        Self {
            consumer: ConsumerEngine::default(),
            scheduler: RssScheduler::default(),
            health: HealthConfig::default(),
            metrics: MetricsConfig::default(),
            control_listen_address: default_control_listen_address(),
            credential_endpoint: default_credential_endpoint(),
        }
    }
}
