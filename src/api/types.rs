//! Shared DTOs for JSON requests and responses.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    benchmark::{
        stats::{HistogramBins, StatisticsSummary},
        table::{to_table_rows, TableRow},
        BenchmarkOutcome,
    },
    data::{
        posting::Posting,
        rates::{ExchangeRateTable, RateSource},
    },
};

/// Postings supplied directly by the caller, with optional rates (code → BYN per unit).
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub postings: Vec<Posting>,
    #[serde(default)]
    pub rates: Option<IndexMap<String, f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    NoData,
    Partial,
    Full,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FilterCounts {
    pub without_salary: usize,
    pub unconvertible: usize,
    pub below_floor: usize,
    pub outside_fence: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkResponse {
    pub status: OutcomeStatus,
    pub total_postings: usize,
    pub filtered_count: usize,
    pub counts: FilterCounts,
    pub gross: StatisticsSummary,
    pub net: StatisticsSummary,
    pub gross_histogram: HistogramBins,
    pub net_histogram: HistogramBins,
    pub rates_as_of: Option<DateTime<Utc>>,
    pub table: Vec<TableRow>,
}

impl From<&BenchmarkOutcome> for BenchmarkResponse {
    fn from(outcome: &BenchmarkOutcome) -> Self {
        let filter = outcome.filter();
        let status = match outcome {
            BenchmarkOutcome::NoData { .. } => OutcomeStatus::NoData,
            BenchmarkOutcome::Partial(_) => OutcomeStatus::Partial,
            BenchmarkOutcome::Full(_) => OutcomeStatus::Full,
        };
        let report = outcome.report();
        BenchmarkResponse {
            status,
            total_postings: filter.total_in,
            filtered_count: filter.total_kept(),
            counts: FilterCounts {
                without_salary: filter.without_value,
                unconvertible: outcome.unconvertible(),
                below_floor: filter.below_floor,
                outside_fence: filter.outside_fence,
            },
            gross: report.map(|r| r.gross.clone()).unwrap_or_default(),
            net: report.map(|r| r.net.clone()).unwrap_or_default(),
            gross_histogram: report
                .map(|r| r.gross_histogram.clone())
                .unwrap_or_default(),
            net_histogram: report.map(|r| r.net_histogram.clone()).unwrap_or_default(),
            rates_as_of: report.map(|r| r.rates_as_of),
            table: to_table_rows(outcome.kept()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RatesDto {
    pub source: RateSource,
    pub reference: String,
    pub as_of: DateTime<Utc>,
    pub rates: IndexMap<String, f64>,
}

impl From<&ExchangeRateTable> for RatesDto {
    fn from(table: &ExchangeRateTable) -> Self {
        RatesDto {
            source: table.source(),
            reference: table.reference().to_string(),
            as_of: table.as_of(),
            rates: table
                .rates()
                .iter()
                .map(|(code, rate)| (code.clone(), (rate * 10_000.0).round() / 10_000.0))
                .collect(),
        }
    }
}
