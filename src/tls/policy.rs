use std::path::{Path, PathBuf};
use std::time::Duration;

use openssl::ssl::{SslConnector, SslMethod, SslVerifyMode, SslVersion};
use openssl::x509::X509;
use openssl::x509::store::X509StoreBuilder;
use tracing::debug;

use super::errors::{TlsError, TlsResult};
use crate::config::TlsConfig;

/// Signature schemes the peer may use for its handshake signature. A peer
/// that can only sign with older schemes (SHA-1, PKCS#1 v1.5 RSA) fails the
/// handshake. Signatures inside the certificate chain are not restricted.
pub const SIGNATURE_ALGORITHMS: &str = "ECDSA+SHA256:ECDSA+SHA384:ECDSA+SHA512:ed25519:ed448:\
rsa_pss_pss_sha256:rsa_pss_pss_sha384:rsa_pss_pss_sha512:\
rsa_pss_rsae_sha256:rsa_pss_rsae_sha384:rsa_pss_rsae_sha512";

/// Immutable connection policy built once per run and shared by every
/// connection: signature allow-list, root bundle, port and timeout.
#[derive(Clone)]
pub struct TlsPolicy {
    ca_bundle: PathBuf,
    ca_bundle_pem: Vec<u8>,
    port: u16,
    timeout: Duration,
    connector: SslConnector,
}

impl TlsPolicy {
    pub fn from_config(config: &TlsConfig) -> TlsResult<Self> {
        Self::new(&config.ca_bundle, config.port, config.handshake_timeout())
    }

    /// Load the root bundle and build the connector.
    ///
    /// Only the roots in `ca_bundle` are trusted; the system default paths are
    /// not consulted.
    pub fn new(ca_bundle: impl AsRef<Path>, port: u16, timeout: Duration) -> TlsResult<Self> {
        let ca_bundle = ca_bundle.as_ref().to_path_buf();
        let ca_bundle_pem = std::fs::read(&ca_bundle).map_err(|e| TlsError::CaBundle {
            path: ca_bundle.clone(),
            reason: e.to_string(),
        })?;

        let roots = X509::stack_from_pem(&ca_bundle_pem).map_err(|e| TlsError::CaBundle {
            path: ca_bundle.clone(),
            reason: e.to_string(),
        })?;
        if roots.is_empty() {
            return Err(TlsError::CaBundle {
                path: ca_bundle,
                reason: "no certificates found".to_string(),
            });
        }

        let mut store = X509StoreBuilder::new()?;
        for root in roots.iter() {
            store.add_cert(root.to_owned())?;
        }
        debug!(
            "Loaded {} trusted roots from {}",
            roots.len(),
            ca_bundle.display()
        );

        let mut builder = SslConnector::builder(SslMethod::tls_client())?;
        builder.set_min_proto_version(Some(SslVersion::TLS1_2))?;
        builder.set_sigalgs_list(SIGNATURE_ALGORITHMS)?;
        builder.set_cert_store(store.build());
        builder.set_verify(SslVerifyMode::PEER);

        Ok(Self {
            ca_bundle,
            ca_bundle_pem,
            port,
            timeout,
            connector: builder.build(),
        })
    }

    pub fn ca_bundle(&self) -> &Path {
        &self.ca_bundle
    }

    /// Raw PEM of the trusted roots, shared with the CRL download client.
    pub fn ca_bundle_pem(&self) -> &[u8] {
        &self.ca_bundle_pem
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn connector(&self) -> &SslConnector {
        &self.connector
    }
}

impl std::fmt::Debug for TlsPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsPolicy")
            .field("ca_bundle", &self.ca_bundle)
            .field("port", &self.port)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
