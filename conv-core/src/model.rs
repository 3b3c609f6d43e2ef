use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};

use crate::{
    catalog::CatalogStore,
    error::{ConvError, Result},
};

/// Upper-cased currency identifier, e.g. "USD" or "BTC".
///
/// Construction never consults the catalog; use [`CurrencyCode::is_valid`]
/// to check membership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-case form, as used for catalog keys and rate endpoints.
    pub fn to_lowercase(&self) -> String {
        self.0.to_lowercase()
    }

    pub async fn is_valid(&self, store: &CatalogStore) -> bool {
        store.is_valid(self).await
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionInput {
    pub amount: f64,
    pub from: CurrencyCode,
    pub to: CurrencyCode,
}

impl ConversionInput {
    pub fn new(amount: f64, from: impl Into<CurrencyCode>, to: impl Into<CurrencyCode>) -> Self {
        Self {
            amount,
            from: from.into(),
            to: to.into(),
        }
    }

    /// Build an input from raw command-line strings.
    ///
    /// An omitted or blank target falls back to `default_currency`; when that
    /// is unset as well the input is rejected with [`ConvError::MissingTarget`].
    pub fn parse(
        raw_amount: &str,
        raw_from: &str,
        raw_to: Option<&str>,
        default_currency: Option<&str>,
    ) -> Result<Self> {
        let amount = parse_amount(raw_amount)?;

        let to = raw_to
            .filter(|s| !s.trim().is_empty())
            .or(default_currency.filter(|s| !s.trim().is_empty()))
            .ok_or(ConvError::MissingTarget)?;

        Ok(Self::new(amount, raw_from, to))
    }
}

pub fn parse_amount(raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ConvError::InvalidAmount(raw.to_string()))
}

/// Rates for a single source currency: one unit of the source equals
/// `rates[code]` units of `code`.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    pub date: Option<String>,
    pub rates: HashMap<String, f64>,
}

impl RateTable {
    pub fn rate(&self, code: &CurrencyCode) -> Option<f64> {
        self.rates.get(&code.to_lowercase()).copied()
    }

    /// Provenance date, when the upstream supplied a `YYYY-MM-DD` value.
    pub fn as_of(&self) -> Option<NaiveDate> {
        self.date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub amount: f64,
    pub rate: f64,
    pub value: f64,
    pub as_of: Option<NaiveDate>,
}
