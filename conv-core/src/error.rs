use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConvError>;

/// Failures surfaced by validation, rate fetching and conversion.
#[derive(Debug, Error)]
pub enum ConvError {
    #[error("unsupported currency: {0}")]
    UnsupportedCurrency(String),

    #[error("unsupported target currency: {0}")]
    UnsupportedTarget(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid response format: {0}")]
    Format(String),

    #[error("invalid amount '{0}': must be a valid number")]
    InvalidAmount(String),

    #[error(
        "no target currency specified and no default currency set.\n\
         Hint: run `conv config set default-currency <CURRENCY>` to set a default."
    )]
    MissingTarget,
}

impl ConvError {
    /// Prefix the cause of a transport or format failure with call-site context.
    pub fn context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            ConvError::Network(cause) => ConvError::Network(format!("{ctx}: {cause}")),
            ConvError::Format(cause) => ConvError::Format(format!("{ctx}: {cause}")),
            other => other,
        }
    }
}

impl From<serde_json::Error> for ConvError {
    fn from(err: serde_json::Error) -> Self {
        ConvError::Format(err.to_string())
    }
}
