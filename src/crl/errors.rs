use reqwest::StatusCode;
use thiserror::Error;
use x509_parser::prelude::X509Error;

/// CRL-related errors
#[derive(Error, Debug)]
pub enum CrlError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error {0}")]
    Status(StatusCode),

    #[error("X.509 parsing failed: {0}")]
    Parse(#[from] X509Error),

    #[error("PEM decoding failed: {0}")]
    Pem(#[from] pem::PemError),

    #[error("unexpected PEM block {0:?}")]
    UnexpectedPemTag(String),

    #[error("unusable CRL distribution point: {0}")]
    UnsupportedName(String),

    #[error("CRL distribution point has no name")]
    NoDistributionPoint,

    #[error("Timeout while fetching CRL")]
    Timeout,

    #[error("Invalid CRL URL: {0}")]
    InvalidUrl(String),
}

/// Convenient Result type alias
pub type CrlResult<T> = Result<T, CrlError>;
