//! Runtime configuration utilities for salary-bench.

use std::{
    env,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Context;
use serde::Deserialize;

use crate::benchmark::PipelineConfig;
use crate::data::posting::SalaryKind;

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Vacancies search endpoint.
    pub hh_api_url: String,
    /// Application-level bearer token for the vacancies API.
    pub hh_app_token: Option<String>,
    /// Request timeout for the vacancies API, in seconds.
    pub source_timeout_secs: u64,
    /// Exchange-rate endpoint quoting branch rates in BYN.
    pub rates_api_url: String,
    /// City whose bank branches quote the rates.
    pub rates_city: String,
    pub rates_timeout_secs: u64,
    /// Use static rates when the live source fails.
    pub rates_fallback: bool,
    /// Statutory withholding rate used to reconcile gross and net.
    pub ndfl_rate: f64,
    /// Salaries below this (in BYN) are treated as data errors.
    pub salary_floor: f64,
    pub histogram_bins: usize,
    /// Which salary view drives outlier filtering.
    pub filter_basis: SalaryKind,
    /// Root folder for fetched postings.
    pub data_dir: PathBuf,
    /// Root folder for exports.
    pub outputs_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        let pipeline = PipelineConfig::default();
        Self {
            hh_api_url: "https://api.hh.ru/vacancies".to_string(),
            hh_app_token: None,
            source_timeout_secs: 15,
            rates_api_url: "https://belarusbank.by/api/kursExchange".to_string(),
            rates_city: "Минск".to_string(),
            rates_timeout_secs: 10,
            rates_fallback: false,
            ndfl_rate: pipeline.ndfl_rate,
            salary_floor: pipeline.salary_floor,
            histogram_bins: pipeline.histogram_bins,
            filter_basis: pipeline.basis,
            data_dir: PathBuf::from("./data"),
            outputs_dir: PathBuf::from("./outputs"),
        }
    }
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();
        let settings = Self {
            hh_api_url: env::var("HH_API_URL").unwrap_or(defaults.hh_api_url),
            hh_app_token: env::var("HH_APP_TOKEN").ok().filter(|t| !t.trim().is_empty()),
            source_timeout_secs: parse_env("SOURCE_TIMEOUT_SECS", defaults.source_timeout_secs)?,
            rates_api_url: env::var("RATES_API_URL").unwrap_or(defaults.rates_api_url),
            rates_city: env::var("RATES_CITY").unwrap_or(defaults.rates_city),
            rates_timeout_secs: parse_env("RATES_TIMEOUT_SECS", defaults.rates_timeout_secs)?,
            rates_fallback: parse_env("RATES_FALLBACK", defaults.rates_fallback)?,
            ndfl_rate: parse_env("NDFL_RATE", defaults.ndfl_rate)?,
            salary_floor: parse_env("SALARY_FLOOR", defaults.salary_floor)?,
            histogram_bins: parse_env("HISTOGRAM_BINS", defaults.histogram_bins)?,
            filter_basis: match env::var("FILTER_BASIS").as_deref() {
                Ok("net") => SalaryKind::Net,
                Ok("gross") | Err(_) => SalaryKind::Gross,
                Ok(other) => anyhow::bail!("FILTER_BASIS must be gross or net, got {other:?}"),
            },
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            outputs_dir: env::var("OUTPUTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.outputs_dir),
        };

        settings
            .pipeline_config()
            .validate()
            .context("validating pipeline settings")?;
        std::fs::create_dir_all(&settings.data_dir).context("creating data dir")?;
        std::fs::create_dir_all(&settings.outputs_dir).context("creating outputs dir")?;

        Ok(settings)
    }

    /// Pipeline parameters derived from these settings.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            ndfl_rate: self.ndfl_rate,
            salary_floor: self.salary_floor,
            histogram_bins: self.histogram_bins,
            basis: self.filter_basis,
            ..PipelineConfig::default()
        }
    }

    /// Convenience helper for derived path segments.
    pub fn join_data<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.data_dir.join(path)
    }

    /// Convenience helper for derived output path segments.
    pub fn join_output<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.outputs_dir.join(path)
    }
}

fn parse_env<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value {raw:?}")),
        Err(_) => Ok(default),
    }
}
