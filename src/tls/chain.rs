use std::pin::Pin;

use async_trait::async_trait;
use openssl::x509::X509Ref;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_openssl::SslStream;
use tracing::{debug, error, info, instrument, warn};

use super::Domain;
use super::errors::{TlsError, TlsResult};
use super::policy::TlsPolicy;

/// Upper bound on the bytes read while waiting for the response status line.
const MAX_STATUS_LINE: u64 = 8 * 1024;

/// Source of verified certificate chains.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainFetcher: Send + Sync {
    /// Returns the chain validated during the handshake, leaf first, each
    /// certificate PEM encoded.
    async fn fetch_chain(&self, domain: &Domain) -> TlsResult<Vec<String>>;
}

/// Captures chains over real TLS connections using a shared [`TlsPolicy`].
#[derive(Debug, Clone)]
pub struct TlsChainFetcher {
    policy: TlsPolicy,
}

impl TlsChainFetcher {
    pub fn new(policy: TlsPolicy) -> Self {
        Self { policy }
    }

    async fn capture(&self, domain: &Domain) -> TlsResult<Vec<String>> {
        let stream = TcpStream::connect((domain.as_str(), self.policy.port())).await?;

        let ssl = self
            .policy
            .connector()
            .configure()?
            .into_ssl(domain.as_str())?;
        let mut tls = SslStream::new(ssl, stream)?;
        Pin::new(&mut tls).connect().await?;
        debug!("Handshake with {} complete", domain);

        // Only the response head is read; the body is never consumed.
        let request = format!(
            "GET / HTTP/1.1\r\nHost: {domain}\r\nConnection: close\r\nAccept: */*\r\n\r\n"
        );
        tls.write_all(request.as_bytes()).await?;
        tls.flush().await?;

        let mut status_line = String::new();
        {
            let mut reader = BufReader::new((&mut tls).take(MAX_STATUS_LINE));
            reader.read_line(&mut status_line).await?;
        }
        if !status_line.starts_with("HTTP/") {
            return Err(TlsError::Protocol(status_line.trim_end().to_string()));
        }
        debug!("{} answered {}", domain, status_line.trim_end());

        let chain = tls.ssl().verified_chain().ok_or(TlsError::NoVerifiedChain)?;
        chain.iter().map(encode_pem).collect()
    }
}

#[async_trait]
impl ChainFetcher for TlsChainFetcher {
    #[instrument(skip(self))]
    async fn fetch_chain(&self, domain: &Domain) -> TlsResult<Vec<String>> {
        let limit = self.policy.timeout();
        match timeout(limit, self.capture(domain)).await {
            Ok(result) => result,
            Err(_) => Err(TlsError::Timeout(limit)),
        }
    }
}

fn encode_pem(cert: &X509Ref) -> TlsResult<String> {
    let pem = cert.to_pem()?;
    Ok(String::from_utf8_lossy(&pem).into_owned())
}

/// Collect the verified chains of all `domains`, in input order.
///
/// IP literals are refused without touching the network. A domain that
/// fails for any reason contributes nothing; the remaining domains are
/// still processed.
pub async fn fetch_chains<F>(fetcher: &F, domains: &[String]) -> Vec<String>
where
    F: ChainFetcher + ?Sized,
{
    let mut certificates = Vec::new();

    for input in domains {
        let domain = match Domain::parse(input) {
            Ok(domain) => domain,
            Err(e) => {
                warn!("[!!] {}", e);
                continue;
            }
        };

        let url = domain.url();
        info!("[i] fetch certificate for {}", url);
        match fetcher.fetch_chain(&domain).await {
            Ok(chain) => {
                debug!("{} yielded {} certificates", url, chain.len());
                certificates.extend(chain);
            }
            Err(e) => {
                error!("[!!] Chain fetch failed for {} ({})", url, e);
            }
        }
    }

    certificates
}
