//! The bundle update run: trust store CRLs first, then the CRLs published by
//! the certificates of each domain.

use tracing::{error, info, instrument};

use crate::bundle::Bundle;
use crate::config::Config;
use crate::crl::{CrlFetcher, CrlHarvester, HarvestReport, HttpCrlFetcher};
use crate::tls::{ChainFetcher, TlsChainFetcher, TlsPolicy, fetch_chains};
use crate::trust_store;

/// Build the complete bundle. Individual failures are reported and never
/// abort the run.
#[instrument(skip_all, fields(domains = domains.len()))]
pub async fn run(config: &Config, domains: &[String]) -> Bundle {
    let mut bundle = Bundle::default();
    bundle.extend(trust_store::load_crls(&config.trust_store.directory).await);
    let local = bundle.len();
    let mut report = HarvestReport::default();

    if !domains.is_empty() {
        match network_sources(config) {
            Ok((chains, harvester)) => {
                report = collect(&chains, &harvester, domains, &mut bundle).await;
            }
            Err(e) => {
                error!(
                    "[!!] TLS setup failed, skipping {} domains ({})",
                    domains.len(),
                    e
                );
            }
        }
    }

    info!(
        "[i] bundle holds {} CRLs ({} from trust store, {} fetched, {} failed, {} certificates rejected)",
        bundle.len(),
        local,
        report.fetched,
        report.failed,
        report.rejected_certificates
    );
    bundle
}

fn network_sources(
    config: &Config,
) -> color_eyre::Result<(TlsChainFetcher, CrlHarvester<HttpCrlFetcher>)> {
    let policy = TlsPolicy::from_config(&config.tls)?;
    let crl_fetcher = HttpCrlFetcher::from_policy(&policy, config.crl.request_timeout())?;
    Ok((
        TlsChainFetcher::new(policy),
        CrlHarvester::new(crl_fetcher),
    ))
}

/// Fetch the chains of `domains` and append the CRLs they reference.
pub async fn collect<C, F>(
    chains: &C,
    harvester: &CrlHarvester<F>,
    domains: &[String],
    bundle: &mut Bundle,
) -> HarvestReport
where
    C: ChainFetcher + ?Sized,
    F: CrlFetcher,
{
    let certificates = fetch_chains(chains, domains).await;
    harvester.harvest(&certificates, bundle).await
}
