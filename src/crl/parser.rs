use tracing::{debug, warn};
use x509_parser::oid_registry::OID_X509_EXT_CRL_DISTRIBUTION_POINTS;
use x509_parser::prelude::*;

use super::errors::{CrlError, CrlResult};

/// Position of the name used from a distribution point's `fullName` list.
///
/// Only this name is fetched; the remaining names are never tried as
/// fallbacks.
pub const FULL_NAME_INDEX: usize = 0;

const CERTIFICATE_PEM_TAG: &str = "CERTIFICATE";

/// What the harvester needs to know about a captured certificate.
#[derive(Debug)]
pub struct CertificateInfo {
    pub subject: String,
    pub issuer: String,
    /// One entry per distribution point, in extension order.
    pub distribution_points: Vec<CrlResult<String>>,
}

impl CertificateInfo {
    /// Decode a PEM certificate and collect its distribution point URIs.
    pub fn from_pem(text: &str) -> CrlResult<Self> {
        let pem = ::pem::parse(text)?;
        if pem.tag() != CERTIFICATE_PEM_TAG {
            return Err(CrlError::UnexpectedPemTag(pem.tag().to_string()));
        }

        let (_, cert) =
            X509Certificate::from_der(pem.contents()).map_err(|e| CrlError::Parse(e.into()))?;

        Ok(Self {
            subject: cert.subject().to_string(),
            issuer: cert.issuer().to_string(),
            distribution_points: distribution_point_uris(&cert),
        })
    }
}

/// Extract CRL distribution points from a certificate
///
/// Extensions are selected by OID (2.5.29.31). A certificate without the
/// extension yields nothing.
pub fn distribution_point_uris(cert: &X509Certificate<'_>) -> Vec<CrlResult<String>> {
    let mut uris = Vec::new();

    for ext in cert.extensions() {
        if ext.oid != OID_X509_EXT_CRL_DISTRIBUTION_POINTS {
            continue;
        }

        match ext.parsed_extension() {
            ParsedExtension::CRLDistributionPoints(points) => {
                debug!("Found {} CRL distribution points", points.points.len());
                uris.extend(points.points.iter().map(first_uri));
            }
            other => {
                warn!("Malformed CRL Distribution Points extension: {:?}", other);
                uris.push(Err(CrlError::UnsupportedName(
                    "malformed CRL Distribution Points extension".to_string(),
                )));
            }
        }
    }

    uris
}

fn first_uri(point: &CRLDistributionPoint<'_>) -> CrlResult<String> {
    match &point.distribution_point {
        Some(DistributionPointName::FullName(names)) => match names.get(FULL_NAME_INDEX) {
            Some(GeneralName::URI(uri)) => Ok(uri.to_string()),
            Some(other) => Err(CrlError::UnsupportedName(format!("{other:?}"))),
            None => Err(CrlError::NoDistributionPoint),
        },
        Some(DistributionPointName::NameRelativeToCRLIssuer(_)) => Err(
            CrlError::UnsupportedName("name relative to CRL issuer".to_string()),
        ),
        None => Err(CrlError::NoDistributionPoint),
    }
}
