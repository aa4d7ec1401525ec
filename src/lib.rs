pub mod bundle;
pub mod config;
pub mod crl;
pub mod telemetry;
pub mod tls;
pub mod trust_store;
pub mod update;

#[cfg(test)]
mod test_utils;
