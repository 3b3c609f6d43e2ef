use async_trait::async_trait;
use std::{fs, path::PathBuf};

use super::{CatalogOrigin, CatalogSource, CurrencyCatalog};

/// Local cache file written by [`super::remote::RemoteSource`].
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl CatalogSource for FileSource {
    fn name(&self) -> &'static str {
        "cache"
    }

    async fn try_load(&self) -> Option<CurrencyCatalog> {
        let body = match fs::read_to_string(&self.path) {
            Ok(body) => body,
            Err(err) => {
                tracing::debug!(path = %self.path.display(), error = %err, "no cached currencies");
                return None;
            }
        };

        match CurrencyCatalog::from_json(CatalogOrigin::Cache, &body) {
            Ok(catalog) => Some(catalog),
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "error parsing cached currencies"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn reads_valid_cache_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("currencies.json");
        fs::write(&path, r#"{"usd":"US Dollar","eur":"Euro"}"#).unwrap();

        let source = FileSource::new(path);
        let catalog = source.try_load().await.expect("cache should load");
        assert_eq!(catalog.origin(), CatalogOrigin::Cache);
        assert_eq!(catalog.len(), 2);
    }

    #[tokio::test]
    async fn missing_or_corrupt_file_yields_none() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(FileSource::new(missing).try_load().await.is_none());

        let corrupt = dir.path().join("corrupt.json");
        fs::write(&corrupt, "{\"usd\":").unwrap();
        assert!(FileSource::new(corrupt).try_load().await.is_none());
    }
}
