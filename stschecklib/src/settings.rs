//! Tunable values governing a health check run

use std::{path::Path, time::Duration};

use log::error;
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::STS_HTTPS_PORT,
    network::TIMEOUT,
    setup_mode::DirectorySetupMode,
    trust_store::{VKS_KEYSTORE_INSTANCE, VKS_KEYSTORE_NAME},
    Result,
};

/// Maximum time to wait for all endpoints to come up, measured from the start of the check
pub static MAX_TIME_TO_WAIT_SECS: u64 = 120;

/// Time to wait between attempts against an endpoint that is not yet available
pub static WAIT_TIME_PER_ITERATION_SECS: u64 = 5;

/// Smallest wait between attempts; lower configured values are raised to this
pub static MIN_WAIT_TIME_PER_ITERATION_SECS: u64 = 1;

/// Settings for a health check. The defaults are the values expected by the installer; a JSON
/// file may override any subset of them.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthCheckSettings {
    pub port: u16,
    pub deadline_secs: u64,
    pub retry_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub store_instance: String,
    pub store_name: String,
    pub setup_mode: Option<DirectorySetupMode>,
}

impl Default for HealthCheckSettings {
    fn default() -> Self {
        HealthCheckSettings {
            port: STS_HTTPS_PORT,
            deadline_secs: MAX_TIME_TO_WAIT_SECS,
            retry_interval_secs: WAIT_TIME_PER_ITERATION_SECS,
            request_timeout_secs: TIMEOUT,
            store_instance: VKS_KEYSTORE_INSTANCE.to_string(),
            store_name: VKS_KEYSTORE_NAME.to_string(),
            setup_mode: None,
        }
    }
}

impl HealthCheckSettings {
    /// Reads settings from a JSON file. Fields absent from the file take default values.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to read settings from {}: {e}", path.display());
                return Err(e.into());
            }
        };
        Ok(serde_json::from_str(&json)?)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }

    /// Wait between attempts, never less than [MIN_WAIT_TIME_PER_ITERATION_SECS]
    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(
            self.retry_interval_secs
                .max(MIN_WAIT_TIME_PER_ITERATION_SECS),
        )
    }
}
