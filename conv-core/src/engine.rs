use crate::{
    catalog::CatalogStore,
    error::{ConvError, Result},
    model::{Conversion, ConversionInput},
    rates::RateProvider,
};

/// Validates an input against the catalog, fetches the source currency's
/// rate table and scales the amount. Each call fetches fresh rates.
#[derive(Debug)]
pub struct ConversionEngine<'a> {
    catalog: &'a CatalogStore,
    rates: &'a dyn RateProvider,
}

impl<'a> ConversionEngine<'a> {
    pub fn new(catalog: &'a CatalogStore, rates: &'a dyn RateProvider) -> Self {
        Self { catalog, rates }
    }

    pub async fn convert(&self, input: &ConversionInput) -> Result<f64> {
        self.quote(input).await.map(|c| c.value)
    }

    pub async fn quote(&self, input: &ConversionInput) -> Result<Conversion> {
        for code in [&input.from, &input.to] {
            if !self.catalog.is_valid(code).await {
                return Err(ConvError::UnsupportedCurrency(code.to_string()));
            }
        }

        if input.from == input.to {
            tracing::debug!(code = %input.from, "self-conversion, skipping rate fetch");
            return Ok(Conversion {
                from: input.from.clone(),
                to: input.to.clone(),
                amount: input.amount,
                rate: 1.0,
                value: input.amount,
                as_of: None,
            });
        }

        let table = self.rates.fetch_rates(&input.from).await?;

        let rate = table
            .rate(&input.to)
            .ok_or_else(|| ConvError::UnsupportedTarget(input.to.to_string()))?;

        tracing::debug!(
            from = %input.from,
            to = %input.to,
            rate,
            as_of = ?table.as_of(),
            "rate resolved"
        );

        Ok(Conversion {
            from: input.from.clone(),
            to: input.to.clone(),
            amount: input.amount,
            rate,
            value: rate * input.amount,
            as_of: table.as_of(),
        })
    }
}
