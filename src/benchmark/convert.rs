//! Currency conversion into the reference currency.

use crate::data::rates::ExchangeRateTable;

/// Convert one salary bound; `None` when the bound, the code, or its rate is missing.
pub fn to_reference(
    amount: Option<f64>,
    currency: Option<&str>,
    rates: &ExchangeRateTable,
) -> Option<f64> {
    let amount = sanitize(amount?)?;
    let rate = rates.rate_for(currency?)?;
    sanitize(amount * rate)
}

/// Only finite, strictly positive figures count as a published salary.
pub fn sanitize(amount: f64) -> Option<f64> {
    (amount.is_finite() && amount > 0.0).then_some(amount)
}

/// True when converting this code depends on a fetched foreign rate.
pub fn needs_rate(currency: Option<&str>, rates: &ExchangeRateTable) -> bool {
    currency.is_some_and(|code| !rates.is_reference(code))
}
