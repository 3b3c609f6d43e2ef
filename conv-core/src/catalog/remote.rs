use async_trait::async_trait;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};
use tempfile::NamedTempFile;

use super::{CatalogOrigin, CatalogSource, CurrencyCatalog};
use crate::http::HttpFetch;

/// Downloads the canonical currency list and, when it parses, refreshes the
/// local cache file with the raw body.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    http: Arc<dyn HttpFetch>,
    url: String,
    cache_path: Option<PathBuf>,
}

impl RemoteSource {
    pub fn new(http: Arc<dyn HttpFetch>, url: String, cache_path: Option<PathBuf>) -> Self {
        Self {
            http,
            url,
            cache_path,
        }
    }
}

#[async_trait]
impl CatalogSource for RemoteSource {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn try_load(&self) -> Option<CurrencyCatalog> {
        let body = match self.http.get(&self.url).await {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(url = %self.url, error = %err, "error fetching currencies");
                return None;
            }
        };

        let catalog = match CurrencyCatalog::from_json(CatalogOrigin::Remote, &body) {
            Ok(catalog) => catalog,
            Err(err) => {
                tracing::warn!(url = %self.url, error = %err, "error parsing currency data");
                return None;
            }
        };

        if let Some(path) = &self.cache_path {
            match write_atomic(path, body.as_bytes()) {
                Ok(()) => tracing::debug!(path = %path.display(), "currency cache refreshed"),
                Err(err) => tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "error saving currencies to cache"
                ),
            }
        }

        Some(catalog)
    }
}

/// Write through a temporary sibling file renamed over `path`, so a crash
/// mid-write never leaves a truncated cache behind.
fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
