use async_trait::async_trait;
use serde_json::{Map, Value};
use std::{collections::HashMap, fmt::Debug, sync::Arc};

use crate::{
    error::{ConvError, Result},
    http::HttpFetch,
    model::{CurrencyCode, RateTable},
};

/// Placeholder substituted with the lower-cased source code in rate URL templates.
pub const CODE_PLACEHOLDER: &str = "{code}";

#[async_trait]
pub trait RateProvider: Send + Sync + Debug {
    async fn fetch_rates(&self, source: &CurrencyCode) -> Result<RateTable>;
}

/// Client for per-currency rate tables shaped like
/// `{"date": "2024-01-01", "usd": {"eur": 0.91, ...}}`.
#[derive(Debug, Clone)]
pub struct RateClient {
    http: Arc<dyn HttpFetch>,
    url_template: String,
}

impl RateClient {
    pub fn new(http: Arc<dyn HttpFetch>, url_template: String) -> Self {
        Self { http, url_template }
    }

    pub fn url_for(&self, source: &CurrencyCode) -> String {
        self.url_template
            .replace(CODE_PLACEHOLDER, &source.to_lowercase())
    }
}

#[async_trait]
impl RateProvider for RateClient {
    async fn fetch_rates(&self, source: &CurrencyCode) -> Result<RateTable> {
        let url = self.url_for(source);
        let body = self
            .http
            .get(&url)
            .await
            .map_err(|e| e.context(format!("fetching {source} rates")))?;

        parse_rate_table(&body, source)
            .map_err(|e| e.context(format!("parsing {source} rates")))
    }
}

/// Decode a rate response for `source`.
///
/// The body is read as a generic object and `date` is kept as metadata. The
/// field named after `source` (case-insensitive) holds the rate map; when no
/// such field exists, the first other object-valued field is used instead.
/// Non-numeric entries inside the map are skipped.
pub fn parse_rate_table(body: &str, source: &CurrencyCode) -> Result<RateTable> {
    let raw: Map<String, Value> = serde_json::from_str(body)?;

    let date = raw.get("date").and_then(Value::as_str).map(str::to_string);

    let wanted = source.to_lowercase();
    let values = raw
        .iter()
        .find(|(key, _)| key.to_lowercase() == wanted)
        .and_then(|(_, value)| value.as_object())
        .or_else(|| {
            raw.iter()
                .filter(|(key, _)| key.as_str() != "date")
                .find_map(|(_, value)| value.as_object())
        })
        .ok_or_else(|| ConvError::Format("missing currency conversion map".into()))?;

    let rates: HashMap<String, f64> = values
        .iter()
        .filter_map(|(code, v)| v.as_f64().map(|rate| (code.clone(), rate)))
        .collect();

    Ok(RateTable { date, rates })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    type StubBody = std::result::Result<&'static str, &'static str>;

    #[derive(Debug)]
    struct StubHttp {
        body: StubBody,
        urls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl HttpFetch for StubHttp {
        async fn get(&self, url: &str) -> Result<String> {
            self.urls.lock().unwrap().push(url.to_string());
            self.body
                .map(str::to_string)
                .map_err(|e| ConvError::Network(e.to_string()))
        }
    }

    fn stub_client(body: StubBody) -> (RateClient, Arc<StubHttp>) {
        let http = Arc::new(StubHttp {
            body,
            urls: Mutex::new(Vec::new()),
        });
        let client = RateClient::new(http.clone(), "https://rates/{code}.json".into());
        (client, http)
    }

    fn usd() -> CurrencyCode {
        CurrencyCode::new("usd")
    }

    #[test]
    fn parses_rate_map_under_source_key() {
        let body = r#"{"date":"2024-01-01","usd":{"eur":0.91,"brl":5.0}}"#;
        let table = parse_rate_table(body, &usd()).unwrap();

        assert_eq!(table.date.as_deref(), Some("2024-01-01"));
        assert_eq!(table.rates.len(), 2);
        assert_eq!(table.rates["eur"], 0.91);
        assert_eq!(table.rates["brl"], 5.0);
    }

    #[test]
    fn source_key_wins_over_earlier_object_fields() {
        let body = r#"{"date":"2024-01-01","meta":{"eur":123.0},"usd":{"eur":0.9}}"#;
        let table = parse_rate_table(body, &CurrencyCode::new("USD")).unwrap();

        assert_eq!(table.rates["eur"], 0.9);
    }

    #[test]
    fn source_key_matches_case_insensitively() {
        let body = r#"{"aaa":{"eur":7.0},"USD":{"eur":0.8}}"#;
        let table = parse_rate_table(body, &usd()).unwrap();

        assert_eq!(table.rates["eur"], 0.8);
    }

    #[test]
    fn falls_back_to_first_object_when_source_key_absent() {
        let body = r#"{"values":{"eur":0.9},"date":"2024-01-01"}"#;
        let table = parse_rate_table(body, &usd()).unwrap();

        assert_eq!(table.rates["eur"], 0.9);
    }

    #[test]
    fn scalar_fields_are_skipped_and_date_is_optional() {
        let body = r#"{"source":"cdn","btc":{"usd":65000}}"#;
        let table = parse_rate_table(body, &CurrencyCode::new("btc")).unwrap();

        assert_eq!(table.date, None);
        assert_eq!(table.rates["usd"], 65000.0);
    }

    #[test]
    fn non_numeric_rates_are_dropped() {
        let body = r#"{"usd":{"eur":0.9,"xxx":null,"yyy":"1.0"}}"#;
        let table = parse_rate_table(body, &usd()).unwrap();

        assert_eq!(table.rates.len(), 1);
    }

    #[test]
    fn missing_rate_map_is_a_format_error() {
        let err = parse_rate_table(r#"{"date":"2024-01-01"}"#, &usd()).unwrap_err();

        assert!(matches!(err, ConvError::Format(_)));
        assert!(err.to_string().contains("missing currency conversion map"));
    }

    #[test]
    fn scalar_under_source_key_is_a_format_error() {
        let err = parse_rate_table(r#"{"usd":"n/a"}"#, &usd()).unwrap_err();

        assert!(matches!(err, ConvError::Format(_)));
    }

    #[test]
    fn invalid_json_is_a_format_error() {
        for body in ["", "not json", "[1,2,3]", r#"{"usd":"#] {
            let err = parse_rate_table(body, &usd()).unwrap_err();
            assert!(
                matches!(err, ConvError::Format(_)),
                "{body:?} should be a format error"
            );
        }
    }

    #[tokio::test]
    async fn fetch_substitutes_lowercase_code_into_url() {
        let (client, http) = stub_client(Ok(r#"{"date":"2024-01-01","usd":{"eur":0.5}}"#));
        let table = client.fetch_rates(&CurrencyCode::new("USD")).await.unwrap();

        assert_eq!(table.rate(&CurrencyCode::new("EUR")), Some(0.5));
        assert_eq!(
            http.urls.lock().unwrap().as_slice(),
            ["https://rates/usd.json"]
        );
    }

    #[tokio::test]
    async fn fetch_reports_network_and_format_errors() {
        let (client, _) = stub_client(Err("connection refused"));
        let err = client.fetch_rates(&usd()).await.unwrap_err();
        assert!(matches!(err, ConvError::Network(_)));
        assert!(err.to_string().contains("fetching USD rates"));

        let (client, _) = stub_client(Ok("<html>oops</html>"));
        let err = client.fetch_rates(&usd()).await.unwrap_err();
        assert!(matches!(err, ConvError::Format(_)));
    }
}
