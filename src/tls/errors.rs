use std::path::PathBuf;
use std::time::Duration;

use openssl::error::ErrorStack;
use thiserror::Error;

/// Errors that can occur while capturing a peer's certificate chain.
#[derive(Error, Debug)]
pub enum TlsError {
    #[error("refusing to fetch from ip address {0}")]
    IpLiteral(String),

    #[error("empty domain name")]
    EmptyDomain,

    #[error("unable to load CA bundle {path}: {reason}")]
    CaBundle { path: PathBuf, reason: String },

    #[error(transparent)]
    OpenSSL(#[from] ErrorStack),

    #[error("TLS handshake failed: {0}")]
    Handshake(#[from] openssl::ssl::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected response from peer: {0:?}")]
    Protocol(String),

    #[error("peer did not yield a verified chain")]
    NoVerifiedChain,
}

pub type TlsResult<T> = Result<T, TlsError>;
