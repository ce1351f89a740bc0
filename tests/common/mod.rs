#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use salary_bench::data::{
    posting::{Posting, SalaryKind},
    rates::{ExchangeRateTable, RateSource},
};

pub fn posting(
    id: &str,
    from: Option<f64>,
    to: Option<f64>,
    currency: &str,
    kind: SalaryKind,
) -> Posting {
    Posting {
        id: id.to_string(),
        title: format!("Vacancy {id}"),
        employer: "Acme".to_string(),
        location: "Минск".to_string(),
        specialization: "Программист".to_string(),
        experience: "1–3 года".to_string(),
        salary_from: from,
        salary_to: to,
        currency: Some(currency.to_string()),
        salary_kind: kind,
        published_at: Some(Utc.with_ymd_and_hms(2024, 5, 14, 6, 30, 0).unwrap()),
        fetched_at: Utc.with_ymd_and_hms(2024, 5, 15, 8, 0, 0).unwrap(),
        url: format!("https://rabota.by/vacancy/{id}"),
        logo_url: None,
    }
}

pub fn byn(id: &str, from: f64, to: f64) -> Posting {
    posting(id, Some(from), Some(to), "BYN", SalaryKind::Gross)
}

pub fn rates(pairs: &[(&str, f64)]) -> ExchangeRateTable {
    ExchangeRateTable::from_pairs(pairs.iter().copied(), Utc::now(), RateSource::Supplied)
}
