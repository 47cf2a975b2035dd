//! Dispatcher configuration.
//!
//! The origin and the certificate policy have no defaults; a config that
//! omits either is rejected. Values are layered with figment: a YAML file
//! first, then `DISPATCH_`-prefixed environment variables on top.

use std::path::Path;
use std::time::Duration;

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::transport::TlsPolicy;

pub const ENV_PREFIX: &str = "DISPATCH_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherConfig {
    pub base_url: String,
    pub tls: TlsPolicy,
    /// Client-wide request timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl DispatcherConfig {
    pub fn new(base_url: impl Into<String>, tls: TlsPolicy) -> Self {
        Self {
            base_url: base_url.into(),
            tls,
            timeout_ms: None,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        Ok(figment.extract()?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX));
        Self::from_figment(figment)
    }
}
