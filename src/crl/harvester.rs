use tracing::{debug, error, info, warn};

use super::errors::CrlResult;
use super::fetcher::CrlFetcher;
use super::parser::CertificateInfo;
use super::types::CrlDocument;
use crate::bundle::Bundle;

/// Issuer shown in diagnostics for a certificate that could not be decoded.
pub const UNKNOWN_ISSUER: &str = "<unknown>";

/// Outcome counters of one harvesting pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HarvestReport {
    pub certificates: usize,
    pub rejected_certificates: usize,
    pub fetched: usize,
    pub failed: usize,
}

/// Walks captured certificates and appends the CRLs they point to.
pub struct CrlHarvester<F> {
    fetcher: F,
}

impl<F: CrlFetcher> CrlHarvester<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Append the CRL of every distribution point of every certificate to
    /// `bundle`, in certificate then extension order.
    ///
    /// A certificate that cannot be decoded, or a distribution point that
    /// cannot be fetched or decoded, is reported and skipped.
    pub async fn harvest(&self, certificates: &[String], bundle: &mut Bundle) -> HarvestReport {
        let mut report = HarvestReport::default();

        for (position, pem) in certificates.iter().enumerate() {
            report.certificates += 1;

            let info = match CertificateInfo::from_pem(pem) {
                Ok(info) => info,
                Err(e) => {
                    warn!(
                        "[!!] Error processing certificate #{} (issuer {}): {}",
                        position, UNKNOWN_ISSUER, e
                    );
                    report.rejected_certificates += 1;
                    continue;
                }
            };

            if info.distribution_points.is_empty() {
                debug!("No CRL distribution points in {}", info.subject);
            }

            for point in info.distribution_points {
                let uri = match point {
                    Ok(uri) => uri,
                    Err(e) => {
                        warn!("[!!] CRL fetch issue ({}) ({})", info.issuer, e);
                        report.failed += 1;
                        continue;
                    }
                };

                match self.fetch_point(&uri).await {
                    Ok(crl) => {
                        bundle.push(crl.to_pem());
                        report.fetched += 1;
                    }
                    Err(e) => {
                        error!("[!!] CRL fetch failed for {} ({})", uri, e);
                        report.failed += 1;
                    }
                }
            }
        }

        report
    }

    /// Fetch and decode the CRL published at `uri`.
    pub async fn fetch_point(&self, uri: &str) -> CrlResult<CrlDocument> {
        info!("[i] fetch CRL from {}", uri);
        let body = self.fetcher.fetch(uri).await?;
        let crl = CrlDocument::from_der(body)?;
        debug!(
            "CRL from {} issued by {} lists {} revoked certificates",
            uri,
            crl.issuer(),
            crl.revoked_serials().len()
        );
        Ok(crl)
    }
}
