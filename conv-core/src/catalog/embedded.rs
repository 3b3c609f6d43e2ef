use async_trait::async_trait;

use super::{CatalogOrigin, CatalogSource, CurrencyCatalog};

/// Snapshot of the upstream currency list shipped inside the binary.
pub const SNAPSHOT: &str = include_str!("../../assets/currencies.json");

#[derive(Debug, Clone)]
pub struct EmbeddedSource {
    data: &'static str,
}

impl EmbeddedSource {
    pub fn new() -> Self {
        Self { data: SNAPSHOT }
    }

    pub fn from_static(data: &'static str) -> Self {
        Self { data }
    }
}

impl Default for EmbeddedSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogSource for EmbeddedSource {
    fn name(&self) -> &'static str {
        "embedded"
    }

    async fn try_load(&self) -> Option<CurrencyCatalog> {
        match CurrencyCatalog::from_json(CatalogOrigin::Embedded, self.data) {
            Ok(catalog) => Some(catalog),
            Err(err) => {
                tracing::warn!(error = %err, "error parsing embedded currencies");
                None
            }
        }
    }
}
