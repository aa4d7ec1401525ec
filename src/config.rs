use std::{collections::HashMap, path::PathBuf, time::Duration};

use config::{Config as ConfigLib, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub trust_store: TrustStoreConfig,
    pub tls: TlsConfig,
    pub crl: CrlConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrustStoreConfig {
    /// Directory holding the trusted certificates and their CRL sidecars.
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TlsConfig {
    /// PEM bundle of roots used to verify peer chains.
    pub ca_bundle: PathBuf,
    pub port: u16,
    pub handshake_timeout_secs: u64,
}

impl TlsConfig {
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrlConfig {
    pub request_timeout_secs: u64,
}

impl CrlConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_sources(None)
    }

    pub fn load_with_sources(
        env_vars: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = ConfigLib::builder()
            .set_default("trust_store.directory", "/etc/ssl/certs")?
            .set_default("tls.ca_bundle", "/etc/ssl/cert.pem")?
            .set_default("tls.port", 443)?
            .set_default("tls.handshake_timeout_secs", 30)?
            .set_default("crl.request_timeout_secs", 30)?
            .add_source(File::with_name("config/settings").required(false));

        // Explicit overrides replace the process environment so tests stay isolated
        if let Some(vars) = env_vars {
            for (key, value) in vars {
                builder = builder.set_override(&key, value)?;
            }
        } else {
            // Format: CRL_FETCH_TLS__PORT or CRL_FETCH_TRUST_STORE__DIRECTORY
            builder = builder.add_source(
                Environment::with_prefix("CRL_FETCH")
                    .prefix_separator("_")
                    .separator("__"),
            );
        }

        builder.build()?.try_deserialize()
    }
}
