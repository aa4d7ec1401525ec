mod chain;
mod errors;
mod policy;

pub use chain::{ChainFetcher, TlsChainFetcher, fetch_chains};
#[cfg(test)]
pub use chain::MockChainFetcher;
pub use errors::{TlsError, TlsResult};
pub use policy::{SIGNATURE_ALGORITHMS, TlsPolicy};

use std::fmt;
use std::net::IpAddr;

/// A host name accepted for chain capture.
///
/// IP literals are refused: chain capture is host-name oriented and the
/// certificates are verified against the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain(String);

impl Domain {
    pub fn parse(input: &str) -> TlsResult<Self> {
        let name = input.trim();
        if name.is_empty() {
            return Err(TlsError::EmptyDomain);
        }

        let literal = name
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(name);
        // Scoped IPv6 addresses (fe80::1%eth0) are literals too
        let literal = literal.split('%').next().unwrap_or(literal);
        if literal.parse::<IpAddr>().is_ok() {
            return Err(TlsError::IpLiteral(name.to_string()));
        }

        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The URL the chain is fetched from, used in diagnostics.
    pub fn url(&self) -> String {
        format!("https://{}", self.0)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
