//! CRLs already present in the local trust store.
//!
//! Trust store tooling stores the CRL of a trusted certificate next to it as
//! `<subject hash>.r<n>`. Those files are already PEM and are copied verbatim.

use std::path::Path;

use tokio::fs;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Whether `path` names a CRL sidecar: an extension of `r` followed by digits.
pub fn is_crl_sidecar(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| ext.strip_prefix('r'))
        .is_some_and(|index| !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()))
}

/// Read every CRL sidecar in `directory`, ordered by file name.
///
/// Files that vanish or cannot be read between listing and reading are
/// reported and skipped.
pub async fn load_crls(directory: &Path) -> Vec<String> {
    let mut crls = Vec::new();

    if !directory.is_dir() {
        warn!(
            "[!!] trust store directory {} not found",
            directory.display()
        );
        return crls;
    }

    let entries = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("[!!] skipping trust store entry ({})", e);
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_crl_sidecar(entry.path()) {
            continue;
        }

        match fs::read_to_string(entry.path()).await {
            Ok(content) => {
                debug!("Loaded CRL {}", entry.path().display());
                crls.push(content.trim().to_string());
            }
            Err(e) => {
                warn!("[!!] skipping {} ({})", entry.path().display(), e);
            }
        }
    }

    info!(
        "[i] {} CRLs found in trust store {}",
        crls.len(),
        directory.display()
    );
    crls
}
