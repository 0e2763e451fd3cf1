use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::MAX_IN_FLIGHT;
use crate::error::MailDnsError;

/// Tuning for the resolution engine, loadable from a JSON file. Every field
/// has a default so an empty object is a valid configuration.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct DnsConfig {
    /// Ceiling on concurrently tracked requests; anything above it is shed
    /// with a retry status.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
    /// Depth of the inbound request queue created by
    /// [crate::lookup::request_channel].
    #[serde(default = "default_request_queue")]
    pub request_queue: usize,
}

fn default_max_in_flight() -> usize {
    MAX_IN_FLIGHT
}

fn default_request_queue() -> usize {
    64
}

impl Default for DnsConfig {
    fn default() -> Self {
        DnsConfig {
            max_in_flight: default_max_in_flight(),
            request_queue: default_request_queue(),
        }
    }
}

impl DnsConfig {
    /// Load the configuration from a JSON file.
    pub fn try_from_file(path: &Path) -> Result<Self, MailDnsError> {
        let config = Config::builder().add_source(File::from(path)).build()?;
        Ok(config.try_deserialize()?)
    }
}
