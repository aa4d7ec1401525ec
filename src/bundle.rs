use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::debug;

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("unable to write bundle to {target}: {source}")]
    Write {
        target: Target,
        source: std::io::Error,
    },
}

pub type BundleResult<T> = Result<T, BundleError>;

/// Where the bundle is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Stdout,
    File(PathBuf),
}

impl From<Option<PathBuf>> for Target {
    fn from(path: Option<PathBuf>) -> Self {
        path.map_or(Self::Stdout, Self::File)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("standard output"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Ordered, append-only list of PEM CRL blocks.
///
/// Duplicates are kept: the same CRL may legitimately be published by more
/// than one certificate.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Bundle {
    entries: Vec<String>,
}

impl Bundle {
    /// Append one block, stripped of surrounding whitespace.
    pub fn push(&mut self, block: impl AsRef<str>) {
        self.entries.push(block.as_ref().trim().to_string());
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Blocks joined by a single newline, plus one trailing newline.
    pub fn render(&self) -> String {
        let mut content = self.entries.join("\n");
        content.push('\n');
        content
    }

    /// Write the rendered bundle in a single write, replacing any previous
    /// content of `target`.
    pub async fn write_to(&self, target: &Target) -> BundleResult<()> {
        let content = self.render();
        let result = match target {
            Target::Stdout => {
                let mut stdout = tokio::io::stdout();
                match stdout.write_all(content.as_bytes()).await {
                    Ok(()) => stdout.flush().await,
                    Err(e) => Err(e),
                }
            }
            Target::File(path) => tokio::fs::write(path, content.as_bytes()).await,
        };

        result.map_err(|source| BundleError::Write {
            target: target.clone(),
            source,
        })?;
        debug!("Wrote {} CRLs to {}", self.len(), target);
        Ok(())
    }
}

impl Extend<String> for Bundle {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        for block in iter {
            self.push(block);
        }
    }
}
