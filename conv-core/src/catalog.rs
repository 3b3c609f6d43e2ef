//! Currency catalog: the set of known codes and their display names.
//!
//! The catalog is resolved through an ordered list of [`CatalogSource`]s.
//! The first source that yields a non-empty catalog wins outright; sources
//! are never merged. When every source fails, a builtin minimal catalog is
//! used so validation keeps working.

use async_trait::async_trait;
use std::{collections::BTreeMap, fmt::Debug, path::PathBuf, sync::Arc};
use tokio::sync::OnceCell;

use crate::{
    catalog::{embedded::EmbeddedSource, file::FileSource, remote::RemoteSource},
    error::{ConvError, Result},
    http::HttpFetch,
    model::CurrencyCode,
};

pub mod embedded;
pub mod file;
pub mod remote;

const BUILTIN_CODES: &[&str] = &["usd", "eur", "brl"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogOrigin {
    Embedded,
    Cache,
    Remote,
    Builtin,
}

impl CatalogOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogOrigin::Embedded => "embedded",
            CatalogOrigin::Cache => "cache",
            CatalogOrigin::Remote => "remote",
            CatalogOrigin::Builtin => "builtin",
        }
    }
}

impl std::fmt::Display for CatalogOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower-case code -> display name, ordered by code.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyCatalog {
    origin: CatalogOrigin,
    entries: BTreeMap<String, String>,
}

impl CurrencyCatalog {
    /// Parse a flat `{"usd": "US Dollar", ...}` object.
    ///
    /// An empty object is rejected so an empty file never shadows the
    /// sources behind it.
    pub fn from_json(origin: CatalogOrigin, body: &str) -> Result<Self> {
        let raw: BTreeMap<String, String> = serde_json::from_str(body)?;
        if raw.is_empty() {
            return Err(ConvError::Format("currency catalog is empty".into()));
        }

        let entries = raw
            .into_iter()
            .map(|(code, name)| (code.to_lowercase(), name))
            .collect();
        Ok(Self { origin, entries })
    }

    /// Minimal catalog used when no source could be loaded. Names are empty.
    pub fn builtin() -> Self {
        let entries = BUILTIN_CODES
            .iter()
            .map(|c| (c.to_string(), String::new()))
            .collect();
        Self {
            origin: CatalogOrigin::Builtin,
            entries,
        }
    }

    pub fn origin(&self) -> CatalogOrigin {
        self.origin
    }

    pub fn contains(&self, code: &CurrencyCode) -> bool {
        self.entries.contains_key(&code.to_lowercase())
    }

    pub fn name(&self, code: &CurrencyCode) -> Option<&str> {
        self.entries.get(&code.to_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(code, name)` pairs sorted by code; codes are lower-case.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(c, n)| (c.as_str(), n.as_str()))
    }
}

#[async_trait]
pub trait CatalogSource: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    /// Attempt to produce a catalog. Failures are logged by the source and
    /// reported as `None`.
    async fn try_load(&self) -> Option<CurrencyCatalog>;
}

/// Owns the fallback chain and the lazily loaded catalog.
#[derive(Debug)]
pub struct CatalogStore {
    sources: Vec<Box<dyn CatalogSource>>,
    catalog: OnceCell<CurrencyCatalog>,
}

impl CatalogStore {
    pub fn new(sources: Vec<Box<dyn CatalogSource>>) -> Self {
        Self {
            sources,
            catalog: OnceCell::new(),
        }
    }

    /// The standard chain: bundled snapshot, then the cache file, then the
    /// remote endpoint (which refreshes the cache file on success).
    pub fn standard(http: Arc<dyn HttpFetch>, catalog_url: String, cache_path: PathBuf) -> Self {
        Self::new(vec![
            Box::new(EmbeddedSource::new()),
            Box::new(FileSource::new(cache_path.clone())),
            Box::new(RemoteSource::new(http, catalog_url, Some(cache_path))),
        ])
    }

    /// Resolve the catalog on first use; later calls return the same value.
    pub async fn ensure_loaded(&self) -> &CurrencyCatalog {
        self.catalog.get_or_init(|| self.load()).await
    }

    pub async fn is_valid(&self, code: &CurrencyCode) -> bool {
        self.ensure_loaded().await.contains(code)
    }

    pub async fn list(&self) -> &CurrencyCatalog {
        self.ensure_loaded().await
    }

    async fn load(&self) -> CurrencyCatalog {
        for source in &self.sources {
            if let Some(catalog) = source.try_load().await {
                tracing::debug!(
                    source = source.name(),
                    origin = %catalog.origin(),
                    currencies = catalog.len(),
                    "currency catalog loaded"
                );
                return catalog;
            }
            tracing::debug!(source = source.name(), "catalog source unavailable");
        }

        tracing::warn!("all currency catalog sources failed; using builtin fallback");
        CurrencyCatalog::builtin()
    }
}
