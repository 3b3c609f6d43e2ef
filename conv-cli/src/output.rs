use anyhow::Context;
use conv_core::{CatalogOrigin, Config, Conversion, CurrencyCatalog, CurrencyCode};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Debug, Serialize)]
struct CatalogEntry<'a> {
    code: String,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct ConfigView<'a> {
    default_currency: Option<&'a str>,
    timeout_secs: u64,
    rates_url: &'a str,
    catalog_url: &'a str,
    catalog_cache: String,
}

pub fn print_conversion(conversion: &Conversion, json: bool) -> anyhow::Result<()> {
    to_stdout(|out| write_conversion(out, conversion, json))
}

pub fn print_catalog(catalog: &CurrencyCatalog, json: bool) -> anyhow::Result<()> {
    to_stdout(|out| write_catalog(out, catalog, json))
}

pub fn print_default_currency(code: Option<&str>, json: bool) -> anyhow::Result<()> {
    to_stdout(|out| {
        if json {
            return write_json(out, &serde_json::json!({ "default_currency": code }));
        }

        match code {
            Some(code) => writeln!(out, "Default currency: {code}"),
            None => writeln!(out, "No default currency set"),
        }
    })
}

pub fn print_default_currency_saved(code: &CurrencyCode) -> anyhow::Result<()> {
    to_stdout(|out| writeln!(out, "Default currency set to: {code}"))
}

pub fn print_config(config: &Config, json: bool) -> anyhow::Result<()> {
    let view = ConfigView {
        default_currency: config.default_currency(),
        timeout_secs: config.timeout().as_secs(),
        rates_url: config.rates_url(),
        catalog_url: config.catalog_url(),
        catalog_cache: config.catalog_cache_path().display().to_string(),
    };

    to_stdout(|out| {
        if json {
            return write_json(out, &view);
        }

        let default_currency = view.default_currency.unwrap_or("(not set)");
        writeln!(out, "Configuration:")?;
        writeln!(out, "  Default currency: {default_currency}")?;
        writeln!(out, "  Request timeout: {}s", view.timeout_secs)?;
        writeln!(out, "  Rates URL: {}", view.rates_url)?;
        writeln!(out, "  Catalog URL: {}", view.catalog_url)?;
        writeln!(out, "  Catalog cache: {}", view.catalog_cache)
    })
}

/// `USD - US Dollar`, or just the code when no name is known.
pub fn entry_line(code: &str, name: &str) -> String {
    if name.is_empty() {
        code.to_uppercase()
    } else {
        format!("{} - {}", code.to_uppercase(), name)
    }
}

fn write_conversion(out: &mut dyn Write, conversion: &Conversion, json: bool) -> io::Result<()> {
    if json {
        return write_json(out, conversion);
    }

    writeln!(
        out,
        "{} {} is {} {}",
        conversion.amount, conversion.from, conversion.value, conversion.to
    )
}

fn write_catalog(out: &mut dyn Write, catalog: &CurrencyCatalog, json: bool) -> io::Result<()> {
    if json {
        let entries: Vec<_> = catalog
            .iter()
            .map(|(code, name)| CatalogEntry {
                code: code.to_uppercase(),
                name,
            })
            .collect();
        return write_json(out, &entries);
    }

    if catalog.origin() == CatalogOrigin::Builtin {
        let codes: Vec<_> = catalog
            .iter()
            .map(|(code, _)| code.to_uppercase())
            .collect();
        return writeln!(out, "Fallback - Supported currencies: {}", codes.join(", "));
    }

    writeln!(out, "Available currencies ({} total):", catalog.len())?;
    for (code, name) in catalog.iter() {
        writeln!(out, "  {}", entry_line(code, name))?;
    }
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

/// Render into a locked stdout and flush.
fn to_stdout<F>(render: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let mut out = io::stdout().lock();
    let res = render(&mut out).and_then(|()| out.flush());
    ignore_broken_pipe(res)
}

/// A reader that went away (`conv list | head`) ends output quietly.
fn ignore_broken_pipe(res: io::Result<()>) -> anyhow::Result<()> {
    match res {
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other.context("Failed to write to stdout"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn snapshot_catalog() -> CurrencyCatalog {
        let body = r#"{"usd":"US Dollar","eur":"Euro"}"#;
        CurrencyCatalog::from_json(CatalogOrigin::Embedded, body).unwrap()
    }

    fn rendered(render: impl FnOnce(&mut dyn Write) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        render(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn entry_line_upper_cases_code() {
        assert_eq!(entry_line("usd", "US Dollar"), "USD - US Dollar");
    }

    #[test]
    fn entry_line_without_name_is_bare_code() {
        assert_eq!(entry_line("brl", ""), "BRL");
    }

    #[test]
    fn conversion_text_line() {
        let conversion = Conversion {
            from: CurrencyCode::new("usd"),
            to: CurrencyCode::new("eur"),
            amount: 100.0,
            rate: 0.85,
            value: 85.0,
            as_of: None,
        };

        let text = rendered(|out| write_conversion(out, &conversion, false));
        assert_eq!(text, "100 USD is 85 EUR\n");
    }

    #[test]
    fn catalog_text_lists_entries_sorted() {
        let catalog = snapshot_catalog();

        let text = rendered(|out| write_catalog(out, &catalog, false));
        assert_eq!(
            text,
            "Available currencies (2 total):\n  EUR - Euro\n  USD - US Dollar\n"
        );
    }

    #[test]
    fn builtin_catalog_prints_fallback_line() {
        let catalog = CurrencyCatalog::builtin();

        let text = rendered(|out| write_catalog(out, &catalog, false));
        assert_eq!(text, "Fallback - Supported currencies: BRL, EUR, USD\n");
    }

    #[test]
    fn catalog_json_is_an_array_of_entries() {
        let catalog = snapshot_catalog();

        let text = rendered(|out| write_catalog(out, &catalog, true));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["code"], "EUR");
        assert_eq!(value[1]["name"], "US Dollar");
    }

    #[test]
    fn closed_pipe_is_not_an_error() {
        let catalog = snapshot_catalog();

        let res = write_catalog(&mut ClosedPipe, &catalog, false);
        assert_eq!(res.as_ref().unwrap_err().kind(), io::ErrorKind::BrokenPipe);
        assert!(ignore_broken_pipe(res).is_ok());

        let res = write_catalog(&mut ClosedPipe, &catalog, true);
        assert!(ignore_broken_pipe(res).is_ok());
    }

    #[test]
    fn other_write_errors_are_reported() {
        let res = Err(io::ErrorKind::PermissionDenied.into());
        let err = ignore_broken_pipe(res).unwrap_err();
        assert!(err.to_string().contains("Failed to write to stdout"));
    }
}
