//! Exchange rates quoted against the Belarusian ruble.

use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::Settings;

/// Currency every benchmark figure is normalized into.
pub const REFERENCE_CURRENCY: &str = "BYN";

/// Legacy codes the upstream sources still emit for the reference currency.
const REFERENCE_ALIASES: &[&str] = &["BYR"];

/// Supported codes with the branch field that quotes them and the quoted unit size.
const CURRENCY_QUOTES: &[(&str, &str, f64)] = &[
    ("USD", "USD_in", 1.0),
    ("EUR", "EUR_in", 1.0),
    ("RUR", "RUB_in", 100.0),
    ("RUB", "RUB_in", 100.0),
    ("GBP", "GBP_in", 1.0),
    ("CAD", "CAD_in", 1.0),
    ("PLN", "PLN_in", 1.0),
    ("UAH", "UAH_in", 100.0),
    ("SEK", "SEK_in", 10.0),
    ("CHF", "CHF_in", 10.0),
    ("JPY", "JPY_in", 100.0),
    ("CNY", "CNY_in", 10.0),
    ("CZK", "CZK_in", 100.0),
    ("NOK", "NOK_in", 10.0),
];

static FALLBACK_RATES: Lazy<IndexMap<&'static str, f64>> = Lazy::new(|| {
    IndexMap::from([
        ("USD", 2.85),
        ("EUR", 3.38),
        ("RUR", 3.705 / 100.0),
        ("RUB", 3.705 / 100.0),
    ])
});

/// Where a rate table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    Live,
    Fallback,
    Supplied,
}

/// Point-in-time snapshot: 1 unit of a currency equals `rate` units of the reference currency.
#[derive(Debug, Clone, Serialize)]
pub struct ExchangeRateTable {
    reference: String,
    rates: IndexMap<String, f64>,
    as_of: DateTime<Utc>,
    source: RateSource,
}

impl ExchangeRateTable {
    /// Empty table for the reference currency; only reference amounts convert.
    pub fn new(as_of: DateTime<Utc>, source: RateSource) -> Self {
        Self {
            reference: REFERENCE_CURRENCY.to_string(),
            rates: IndexMap::new(),
            as_of,
            source,
        }
    }

    /// Build a table from caller-provided pairs, skipping unusable rates.
    pub fn from_pairs<I, S>(pairs: I, as_of: DateTime<Utc>, source: RateSource) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut table = Self::new(as_of, source);
        for (code, rate) in pairs {
            if !table.insert(code.as_ref(), rate) {
                warn!(code = code.as_ref(), rate, "ignoring unusable exchange rate");
            }
        }
        table
    }

    /// Record a rate; returns false for non-finite or non-positive values.
    pub fn insert(&mut self, code: &str, rate: f64) -> bool {
        if !rate.is_finite() || rate <= 0.0 {
            return false;
        }
        let code = code.trim().to_ascii_uppercase();
        if self.is_reference(&code) {
            return false;
        }
        self.rates.insert(code, rate);
        true
    }

    pub fn is_reference(&self, code: &str) -> bool {
        let code = code.trim();
        code.eq_ignore_ascii_case(&self.reference)
            || REFERENCE_ALIASES
                .iter()
                .any(|alias| code.eq_ignore_ascii_case(alias))
    }

    /// Multiplier into the reference currency, if the code is known.
    pub fn rate_for(&self, code: &str) -> Option<f64> {
        if self.is_reference(code) {
            return Some(1.0);
        }
        self.rates.get(&code.trim().to_ascii_uppercase()).copied()
    }

    /// True once at least one non-reference rate is available.
    pub fn has_foreign_rates(&self) -> bool {
        !self.rates.is_empty()
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn rates(&self) -> &IndexMap<String, f64> {
        &self.rates
    }

    pub fn as_of(&self) -> DateTime<Utc> {
        self.as_of
    }

    pub fn source(&self) -> RateSource {
        self.source
    }
}

/// Static rates used only when the live source fails and fallback is enabled.
pub fn fallback_table(as_of: DateTime<Utc>) -> ExchangeRateTable {
    ExchangeRateTable::from_pairs(
        FALLBACK_RATES.iter().map(|(code, rate)| (*code, *rate)),
        as_of,
        RateSource::Fallback,
    )
}

#[derive(Debug, Error)]
pub enum RatesError {
    #[error("rate source request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("rate source returned no usable rates")]
    Empty,
    #[error("rate source payload is not a list of branches")]
    Malformed,
}

/// Client for the Belarusbank exchange-rate endpoint.
#[derive(Debug, Clone)]
pub struct RateClient {
    client: Client,
    url: String,
    city: String,
    allow_fallback: bool,
}

impl RateClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("salary-bench/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(settings.rates_timeout_secs))
            .gzip(true)
            .build()?;
        Ok(Self {
            client,
            url: settings.rates_api_url.clone(),
            city: settings.rates_city.clone(),
            allow_fallback: settings.rates_fallback,
        })
    }

    /// Fetch a fresh snapshot from the live source.
    #[instrument(skip(self), fields(city = %self.city))]
    pub async fn fetch(&self) -> Result<ExchangeRateTable, RatesError> {
        let url = format!(
            "{base}?city={city}",
            base = self.url,
            city = urlencoding::encode(&self.city)
        );
        let body: Value = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let table = parse_branches(&body, Utc::now())?;
        info!(currencies = table.rates().len(), "fetched exchange rates");
        Ok(table)
    }

    /// Never fails: degrades to the fallback table or a reference-only table.
    pub async fn load(&self) -> ExchangeRateTable {
        match self.fetch().await {
            Ok(table) => table,
            Err(err) if self.allow_fallback => {
                warn!(%err, "rate source unavailable, using fallback rates");
                fallback_table(Utc::now())
            }
            Err(err) => {
                warn!(%err, "rate source unavailable, continuing without foreign rates");
                ExchangeRateTable::new(Utc::now(), RateSource::Live)
            }
        }
    }
}

/// Read the branch list: the first branch quoting a positive rate wins for each currency.
pub fn parse_branches(body: &Value, as_of: DateTime<Utc>) -> Result<ExchangeRateTable, RatesError> {
    let branches = body.as_array().ok_or(RatesError::Malformed)?;
    let mut table = ExchangeRateTable::new(as_of, RateSource::Live);
    for (code, field, unit) in CURRENCY_QUOTES {
        let quoted = branches
            .iter()
            .filter_map(|branch| branch.get(*field).and_then(parse_quote))
            .find(|value| *value > 0.0);
        match quoted {
            Some(value) => {
                table.insert(code, value / unit);
            }
            None => debug!(code, "no branch quotes currency"),
        }
    }
    if table.has_foreign_rates() {
        Ok(table)
    } else {
        Err(RatesError::Empty)
    }
}

fn parse_quote(raw: &Value) -> Option<f64> {
    let value = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().replace(',', ".").parse().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_positive_branch_wins_and_units_are_divided() {
        let body = json!([
            {"USD_in": "0", "RUB_in": "3,70"},
            {"USD_in": "2,95", "EUR_in": 3.4, "RUB_in": "3,80"}
        ]);
        let table = parse_branches(&body, Utc::now()).unwrap();
        assert_eq!(table.rate_for("usd"), Some(2.95));
        assert_eq!(table.rate_for("EUR"), Some(3.4));
        assert!((table.rate_for("RUR").unwrap() - 0.037).abs() < 1e-12);
        assert!((table.rate_for("RUB").unwrap() - 0.037).abs() < 1e-12);
        assert_eq!(table.rate_for("GBP"), None);
    }

    #[test]
    fn reference_and_alias_convert_at_par() {
        let table = ExchangeRateTable::new(Utc::now(), RateSource::Supplied);
        assert_eq!(table.rate_for("BYN"), Some(1.0));
        assert_eq!(table.rate_for("byr"), Some(1.0));
        assert!(!table.has_foreign_rates());
    }

    #[test]
    fn empty_or_malformed_payloads_are_errors() {
        assert!(matches!(
            parse_branches(&json!([{"city": "x"}]), Utc::now()),
            Err(RatesError::Empty)
        ));
        assert!(matches!(
            parse_branches(&json!({"USD_in": "2.9"}), Utc::now()),
            Err(RatesError::Malformed)
        ));
    }

    #[test]
    fn unusable_rates_are_rejected() {
        let table = ExchangeRateTable::from_pairs(
            [("USD", f64::NAN), ("EUR", -1.0), ("PLN", 0.75)],
            Utc::now(),
            RateSource::Supplied,
        );
        assert_eq!(table.rates().len(), 1);
        assert_eq!(table.rate_for("PLN"), Some(0.75));
    }

    #[test]
    fn fallback_table_is_tagged() {
        let table = fallback_table(Utc::now());
        assert_eq!(table.source(), RateSource::Fallback);
        assert_eq!(table.rate_for("USD"), Some(2.85));
    }
}
