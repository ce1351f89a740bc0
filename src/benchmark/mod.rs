//! Salary normalization and statistics pipeline.
//!
//! A single pass over the fetched postings: convert every bound into BYN,
//! derive gross and net views, drop outliers on the configured basis, then
//! summarize and bin what is left. Nothing here performs I/O; the rate table
//! is fetched by the caller.

pub mod convert;
pub mod outliers;
pub mod reconcile;
pub mod stats;
pub mod table;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::data::{
    posting::{Posting, SalaryKind},
    rates::ExchangeRateTable,
};

use self::{
    outliers::FilterResult,
    stats::{HistogramBins, StatisticsSummary},
};

/// Parameters of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Statutory withholding rate (NDFL).
    pub ndfl_rate: f64,
    /// Values strictly below this many BYN are dropped before the fence.
    pub salary_floor: f64,
    pub fence_multiplier: f64,
    /// Below this many values the fence step is skipped.
    pub min_fence_sample: usize,
    pub histogram_bins: usize,
    /// Salary view used as the representative value when filtering.
    pub basis: SalaryKind,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ndfl_rate: 0.14,
            salary_floor: 500.0,
            fence_multiplier: 1.5,
            min_fence_sample: 4,
            histogram_bins: 8,
            basis: SalaryKind::Gross,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(0.0..1.0).contains(&self.ndfl_rate) {
            return Err(PipelineError::InvalidConfig(format!(
                "withholding rate must be in [0, 1), got {}",
                self.ndfl_rate
            )));
        }
        if !self.salary_floor.is_finite() || self.salary_floor < 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "salary floor must be a non-negative number, got {}",
                self.salary_floor
            )));
        }
        if !self.fence_multiplier.is_finite() || self.fence_multiplier < 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "fence multiplier must be a non-negative number, got {}",
                self.fence_multiplier
            )));
        }
        if self.histogram_bins == 0 {
            return Err(PipelineError::InvalidConfig(
                "histogram needs at least one bin".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no exchange rates available while {pending} postings need conversion")]
    RatesUnavailable { pending: usize },
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}

/// Salary bounds of one posting in BYN, in both gross and net views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NormalizedSalary {
    pub gross_from: Option<f64>,
    pub gross_to: Option<f64>,
    pub net_from: Option<f64>,
    pub net_to: Option<f64>,
}

impl NormalizedSalary {
    pub fn normalize(posting: &Posting, rates: &ExchangeRateTable, config: &PipelineConfig) -> Self {
        let currency = posting.currency.as_deref();
        let from = convert::to_reference(posting.salary_from, currency, rates);
        let to = convert::to_reference(posting.salary_to, currency, rates);
        let from = reconcile::reconcile(from, posting.salary_kind, config.ndfl_rate);
        let to = reconcile::reconcile(to, posting.salary_kind, config.ndfl_rate);
        Self {
            gross_from: from.gross,
            gross_to: to.gross,
            net_from: from.net,
            net_to: to.net,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.gross_from.is_none() && self.gross_to.is_none()
    }

    /// Midpoint of the range in the given view, or the single bound present.
    pub fn average(&self, kind: SalaryKind) -> Option<f64> {
        let (from, to) = match kind {
            SalaryKind::Gross => (self.gross_from, self.gross_to),
            SalaryKind::Net => (self.net_from, self.net_to),
        };
        match (from, to) {
            (Some(a), Some(b)) => convert::sanitize(a / 2.0 + b / 2.0),
            (one, other) => one.or(other),
        }
    }
}

/// A posting carried through the pipeline with its normalized salary.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedPosting {
    #[serde(flatten)]
    pub posting: Posting,
    pub salary: NormalizedSalary,
}

/// Everything a run produces when at least one salary survived.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport {
    pub filter: FilterResult<NormalizedPosting>,
    /// Postings that published a salary we could not convert.
    pub unconvertible: usize,
    pub gross: StatisticsSummary,
    pub net: StatisticsSummary,
    pub gross_histogram: HistogramBins,
    pub net_histogram: HistogramBins,
    pub rates_as_of: DateTime<Utc>,
}

impl BenchmarkReport {
    pub fn kept(&self) -> &[NormalizedPosting] {
        &self.filter.kept
    }
}

/// Result of a run, tagged by how much of the input carried usable salaries.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BenchmarkOutcome {
    /// No salary value survived; the filter counts and pass-through postings remain.
    NoData {
        filter: FilterResult<NormalizedPosting>,
        unconvertible: usize,
    },
    /// Some postings lacked a usable salary.
    Partial(BenchmarkReport),
    Full(BenchmarkReport),
}

impl BenchmarkOutcome {
    pub fn report(&self) -> Option<&BenchmarkReport> {
        match self {
            Self::NoData { .. } => None,
            Self::Partial(report) | Self::Full(report) => Some(report),
        }
    }

    pub fn total_postings(&self) -> usize {
        match self {
            Self::NoData { filter, .. } => filter.total_in,
            Self::Partial(report) | Self::Full(report) => report.filter.total_in,
        }
    }

    pub fn filter(&self) -> &FilterResult<NormalizedPosting> {
        match self {
            Self::NoData { filter, .. } => filter,
            Self::Partial(report) | Self::Full(report) => &report.filter,
        }
    }

    pub fn unconvertible(&self) -> usize {
        match self {
            Self::NoData { unconvertible, .. } => *unconvertible,
            Self::Partial(report) | Self::Full(report) => report.unconvertible,
        }
    }

    pub fn kept(&self) -> &[NormalizedPosting] {
        &self.filter().kept
    }
}

/// Convert, reconcile, filter and summarize one batch of postings.
pub fn run(
    postings: Vec<Posting>,
    rates: &ExchangeRateTable,
    config: &PipelineConfig,
) -> Result<BenchmarkOutcome, PipelineError> {
    config.validate()?;

    let total_postings = postings.len();
    let pending = postings
        .iter()
        .filter(|p| p.has_salary() && convert::needs_rate(p.currency.as_deref(), rates))
        .count();
    if pending > 0 && !rates.has_foreign_rates() {
        return Err(PipelineError::RatesUnavailable { pending });
    }

    let normalized: Vec<NormalizedPosting> = postings
        .into_iter()
        .map(|posting| {
            let salary = NormalizedSalary::normalize(&posting, rates, config);
            NormalizedPosting { posting, salary }
        })
        .collect();
    let unconvertible = normalized
        .iter()
        .filter(|n| n.posting.has_salary() && n.salary.is_empty())
        .count();

    let basis = config.basis;
    let filter = outliers::filter_outliers(normalized, |n| n.salary.average(basis), config);

    let gross_values = series(&filter.kept, SalaryKind::Gross);
    let net_values = series(&filter.kept, SalaryKind::Net);
    if gross_values.is_empty() {
        debug!(
            total_postings,
            unconvertible,
            below_floor = filter.below_floor,
            "no salary values to summarize"
        );
        return Ok(BenchmarkOutcome::NoData {
            filter,
            unconvertible,
        });
    }

    let complete = filter.without_value == 0;
    let report = BenchmarkReport {
        unconvertible,
        gross: stats::summarize(&gross_values),
        net: stats::summarize(&net_values),
        gross_histogram: stats::histogram(&gross_values, config.histogram_bins),
        net_histogram: stats::histogram(&net_values, config.histogram_bins),
        rates_as_of: rates.as_of(),
        filter,
    };
    debug!(
        total_postings,
        kept = report.filter.total_kept(),
        unconvertible,
        "benchmark computed"
    );

    Ok(if complete {
        BenchmarkOutcome::Full(report)
    } else {
        BenchmarkOutcome::Partial(report)
    })
}

/// Representative values of the kept postings in one view.
fn series(kept: &[NormalizedPosting], kind: SalaryKind) -> Vec<f64> {
    kept.iter().filter_map(|n| n.salary.average(kind)).collect()
}
