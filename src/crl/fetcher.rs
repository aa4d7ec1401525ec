use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Certificate, Client, tls};
use tokio::time::timeout;
use tracing::debug;
use url::Url;

use super::errors::{CrlError, CrlResult};
use crate::tls::TlsPolicy;

/// Downloads raw CRL bodies.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CrlFetcher: Send + Sync {
    /// Fetch the body published at `uri`. Only 2xx responses succeed.
    async fn fetch(&self, uri: &str) -> CrlResult<Vec<u8>>;
}

/// HTTP(S) CRL downloads, trusting the same roots as chain capture.
#[derive(Debug, Clone)]
pub struct HttpCrlFetcher {
    client: Client,
    request_timeout: Duration,
}

impl HttpCrlFetcher {
    /// Create a fetcher that trusts only the roots in `ca_bundle_pem`.
    pub fn new(ca_bundle_pem: &[u8], request_timeout: Duration) -> CrlResult<Self> {
        let mut builder = Client::builder()
            .timeout(request_timeout)
            .min_tls_version(tls::Version::TLS_1_2)
            .tls_built_in_root_certs(false)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));

        for root in Certificate::from_pem_bundle(ca_bundle_pem)? {
            builder = builder.add_root_certificate(root);
        }

        Ok(Self {
            client: builder.build()?,
            request_timeout,
        })
    }

    pub fn from_policy(policy: &TlsPolicy, request_timeout: Duration) -> CrlResult<Self> {
        Self::new(policy.ca_bundle_pem(), request_timeout)
    }
}

#[async_trait]
impl CrlFetcher for HttpCrlFetcher {
    async fn fetch(&self, uri: &str) -> CrlResult<Vec<u8>> {
        let url = Url::parse(uri).map_err(|e| CrlError::InvalidUrl(format!("{uri}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CrlError::InvalidUrl(format!(
                "unsupported scheme {:?}",
                url.scheme()
            )));
        }

        let response = match timeout(self.request_timeout, self.client.get(url).send()).await {
            Ok(result) => result?,
            Err(_) => return Err(CrlError::Timeout),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(CrlError::Status(status));
        }

        let body = response.bytes().await?.to_vec();
        debug!("Fetched {} bytes from {}", body.len(), uri);
        Ok(body)
    }
}
