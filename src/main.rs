use std::path::PathBuf;

use clap::Parser;
use crl_fetch::{bundle::Target, config::Config, telemetry, update};

/// Merge the CRLs of the local trust store with the CRLs published by the
/// certificate chains of the given domains.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "crl-fetch")]
struct Cli {
    /// Target file name, standard output when omitted
    #[arg(short = 't', long = "target", value_name = "PATH")]
    target: Option<PathBuf>,

    /// Domains whose certificate chains are inspected for CRL distribution points
    #[arg(value_name = "DOMAIN")]
    domains: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    telemetry::init_tracing();

    let config = Config::load()?;
    tracing::debug!("Loaded configuration: {:?}", config);

    let bundle = update::run(&config, &cli.domains).await;
    bundle.write_to(&Target::from(cli.target)).await?;

    Ok(())
}
