//! CRL harvesting
//!
//! Certificates captured from TLS peers are inspected for their CRL
//! Distribution Points; every referenced CRL is downloaded, validated and
//! normalized to PEM before it joins the bundle.

mod errors;
mod fetcher;
mod harvester;
mod parser;
mod types;

pub use errors::{CrlError, CrlResult};
pub use fetcher::{CrlFetcher, HttpCrlFetcher};
#[cfg(test)]
pub use fetcher::MockCrlFetcher;
pub use harvester::{CrlHarvester, HarvestReport, UNKNOWN_ISSUER};
pub use parser::{CertificateInfo, FULL_NAME_INDEX, distribution_point_uris};
pub use types::{CRL_PEM_TAG, CrlDocument};
