//! Core library for the `conv` currency converter.
//!
//! This crate defines:
//! - The currency catalog and its fallback chain of sources
//! - Rate fetching from the per-currency JSON endpoint
//! - The conversion engine tying validation, rates and arithmetic together
//! - Configuration handling
//!
//! It is used by `conv-cli`, but can also be reused by other binaries or services.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod model;
pub mod rates;

use std::sync::Arc;

pub use catalog::{CatalogOrigin, CatalogSource, CatalogStore, CurrencyCatalog};
pub use config::Config;
pub use engine::ConversionEngine;
pub use error::{ConvError, Result};
pub use http::{HttpFetch, ReqwestFetch};
pub use model::{Conversion, ConversionInput, CurrencyCode, RateTable};
pub use rates::{RateClient, RateProvider};

/// Catalog store and rate client wired to the endpoints named in `config`,
/// sharing one HTTP client.
pub fn services_from_config(config: &Config) -> Result<(CatalogStore, RateClient)> {
    let http: Arc<dyn HttpFetch> = Arc::new(ReqwestFetch::new(config.timeout())?);

    let catalog = CatalogStore::standard(
        http.clone(),
        config.catalog_url().to_string(),
        config.catalog_cache_path(),
    );
    let rates = RateClient::new(http, config.rates_url().to_string());

    Ok((catalog, rates))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_services_validate_from_embedded_snapshot() {
        let (catalog, rates) = services_from_config(&Config::default()).unwrap();

        assert!(CurrencyCode::new("usd").is_valid(&catalog).await);
        assert_eq!(catalog.list().await.origin(), CatalogOrigin::Embedded);
        assert_eq!(
            rates.url_for(&CurrencyCode::new("BTC")),
            "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@latest/v1/currencies/btc.json"
        );
    }
}
