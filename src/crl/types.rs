use ::pem::{EncodeConfig, LineEnding, Pem};
use x509_parser::prelude::*;

use super::errors::{CrlError, CrlResult};

/// PEM label of a certificate revocation list.
pub const CRL_PEM_TAG: &str = "X509 CRL";

/// A decoded Certificate Revocation List
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrlDocument {
    /// The raw CRL data in DER format
    der_data: Vec<u8>,
    /// Issuer distinguished name, for diagnostics
    issuer: String,
    /// Serial numbers of the revoked certificates, big endian
    revoked_serials: Vec<Vec<u8>>,
}

impl CrlDocument {
    /// Decode a DER encoded CRL.
    ///
    /// Bytes following the CRL structure are discarded so the normalized
    /// form holds exactly one CRL.
    pub fn from_der(der_data: impl AsRef<[u8]>) -> CrlResult<Self> {
        let der_data = der_data.as_ref();
        let (rest, crl) = CertificateRevocationList::from_der(der_data)
            .map_err(|e| CrlError::Parse(e.into()))?;

        let issuer = crl.issuer().to_string();
        let revoked_serials = crl
            .iter_revoked_certificates()
            .map(|revoked_cert| revoked_cert.user_certificate.to_bytes_be())
            .collect();
        let consumed = der_data.len() - rest.len();

        Ok(Self {
            der_data: der_data[..consumed].to_vec(),
            issuer,
            revoked_serials,
        })
    }

    /// Decode a PEM encoded CRL, as found in the trust store or the bundle.
    pub fn from_pem(text: &str) -> CrlResult<Self> {
        let pem = ::pem::parse(text)?;
        if pem.tag() != CRL_PEM_TAG {
            return Err(CrlError::UnexpectedPemTag(pem.tag().to_string()));
        }
        Self::from_der(pem.contents())
    }

    pub fn der(&self) -> &[u8] {
        &self.der_data
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn revoked_serials(&self) -> &[Vec<u8>] {
        &self.revoked_serials
    }

    /// Normalized text form: a single `X509 CRL` PEM block with 64 column
    /// lines and LF line endings, without trailing newline.
    pub fn to_pem(&self) -> String {
        let pem = Pem::new(CRL_PEM_TAG, self.der_data.clone());
        let config = EncodeConfig::new().set_line_ending(LineEnding::LF);
        ::pem::encode_config(&pem, config).trim().to_string()
    }
}
