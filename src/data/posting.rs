//! Job posting model shared by the sources and the benchmark pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a posting quotes its salary before or after withholding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalaryKind {
    #[default]
    Gross,
    Net,
}

impl SalaryKind {
    /// Map the upstream `gross` flag; the vacancies API treats a missing flag as gross.
    pub fn from_gross_flag(gross: Option<bool>) -> Self {
        match gross {
            Some(false) => Self::Net,
            _ => Self::Gross,
        }
    }
}

/// One job listing as fetched for a single search query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub employer: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub salary_from: Option<f64>,
    #[serde(default)]
    pub salary_to: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub salary_kind: SalaryKind,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default = "Utc::now")]
    pub fetched_at: DateTime<Utc>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl Posting {
    /// True when at least one salary bound was published.
    pub fn has_salary(&self) -> bool {
        self.salary_from.is_some() || self.salary_to.is_some()
    }
}
