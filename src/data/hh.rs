//! HeadHunter vacancies API client producing [`Posting`] lists.

use std::{collections::HashMap, time::Duration};

use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::{
    config::Settings,
    data::posting::{Posting, SalaryKind},
};

const PER_PAGE: usize = 50;
const MAX_PER_AREA: usize = 2000;
const DEFAULT_PERIOD: u32 = 30;
/// Minsk; the only area served from the Belarusian host.
const HOME_AREA: u32 = 16;
const ALL_AREAS: &[u32] = &[16, 1, 2];
/// Accepted publication windows in days.
pub const PERIOD_OPTIONS: &[u32] = &[1, 7, 14, 30, 60, 90, 180, 365];
/// Currency the upstream API implies when a salary omits one.
const DEFAULT_CURRENCY: &str = "RUR";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("vacancy title must not be empty")]
    EmptyQuery,
    #[error("vacancy source request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Raw search form as submitted by a caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub include: String,
    #[serde(default)]
    pub exclude: String,
    #[serde(default = "default_area")]
    pub area: String,
    #[serde(default)]
    pub experience: String,
    #[serde(default = "default_period")]
    pub period: u32,
}

fn default_area() -> String {
    HOME_AREA.to_string()
}

fn default_period() -> u32 {
    DEFAULT_PERIOD
}

/// Validated search parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    pub text: String,
    pub excluded_text: Option<String>,
    pub areas: Vec<u32>,
    pub experience: Option<String>,
    pub period: u32,
}

impl SearchRequest {
    pub fn into_query(self) -> Result<SearchQuery, SourceError> {
        let text = self.include.trim().to_string();
        if text.is_empty() {
            return Err(SourceError::EmptyQuery);
        }
        let excluded = self.exclude.trim().replace(' ', ",");
        let areas = match self.area.trim() {
            "all" => ALL_AREAS.to_vec(),
            other => vec![other.parse().unwrap_or(HOME_AREA)],
        };
        let experience = Some(self.experience.trim().to_string()).filter(|e| !e.is_empty());
        let period = if PERIOD_OPTIONS.contains(&self.period) {
            self.period
        } else {
            DEFAULT_PERIOD
        };
        Ok(SearchQuery {
            text,
            excluded_text: Some(excluded).filter(|e| !e.is_empty()),
            areas,
            experience,
            period,
        })
    }
}

pub fn host_for_area(area: u32) -> &'static str {
    if area == HOME_AREA {
        "rabota.by"
    } else {
        "hh.ru"
    }
}

/// Vacancy search client authenticated with the application token.
#[derive(Debug, Clone)]
pub struct VacancyClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl VacancyClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("salary-bench/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(settings.source_timeout_secs))
            .gzip(true)
            .build()?;
        Ok(Self {
            client,
            base_url: settings.hh_api_url.clone(),
            token: settings.hh_app_token.clone(),
        })
    }

    /// Fetch every page for each area; a failing page ends that area with what was collected.
    ///
    /// Fails only when every area fails on its first request.
    #[instrument(skip(self), fields(text = %query.text))]
    pub async fn fetch(&self, query: &SearchQuery) -> Result<Vec<Posting>, SourceError> {
        let per_area = stream::iter(query.areas.iter().copied())
            .map(|area| self.fetch_area(query, area))
            .buffered(2)
            .collect::<Vec<_>>()
            .await;

        let mut postings = Vec::new();
        let mut first_error = None;
        let mut reached = 0usize;
        for result in per_area {
            match result {
                Ok(items) => {
                    reached += 1;
                    postings.extend(items);
                }
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }
        if reached == 0 {
            if let Some(err) = first_error {
                return Err(err);
            }
        }
        info!(count = postings.len(), reached, "fetched postings");
        Ok(postings)
    }

    async fn fetch_area(&self, query: &SearchQuery, area: u32) -> Result<Vec<Posting>, SourceError> {
        let mut postings = Vec::new();
        let mut page = 0usize;
        while postings.len() < MAX_PER_AREA {
            let url = self.page_url(query, area, page);
            let mut request = self.client.get(&url);
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }
            let body = match request.send().await.and_then(|r| r.error_for_status()) {
                Ok(resp) => resp.text().await,
                Err(err) => Err(err),
            };
            let items = match body.map(|text| parse_page(&text, Utc::now())) {
                Ok(Ok(items)) => items,
                Ok(Err(err)) => {
                    warn!(area, page, %err, "malformed vacancies page");
                    break;
                }
                Err(err) if page == 0 => {
                    warn!(area, %err, "vacancies request failed");
                    return Err(err.into());
                }
                Err(err) => {
                    warn!(area, page, %err, "vacancies request failed");
                    break;
                }
            };
            let received = items.len();
            postings.extend(items);
            if received < PER_PAGE {
                break;
            }
            page += 1;
        }
        postings.truncate(MAX_PER_AREA);
        Ok(postings)
    }

    fn page_url(&self, query: &SearchQuery, area: u32, page: usize) -> String {
        let mut url = format!(
            "{base}?host={host}&text={text}&search_field=name&area={area}&only_with_salary=true&per_page={PER_PAGE}&page={page}&period={period}",
            base = self.base_url,
            host = host_for_area(area),
            text = urlencoding::encode(&query.text),
            period = query.period,
        );
        if let Some(experience) = &query.experience {
            url.push_str(&format!("&experience={}", urlencoding::encode(experience)));
        }
        if let Some(excluded) = &query.excluded_text {
            url.push_str(&format!("&excluded_text={}", urlencoding::encode(excluded)));
        }
        url
    }
}

#[derive(Debug, Default, Deserialize)]
struct VacancyPage {
    #[serde(default)]
    items: Vec<VacancyItem>,
}

#[derive(Debug, Deserialize)]
struct VacancyItem {
    id: String,
    name: Option<String>,
    employer: Option<Employer>,
    area: Option<Named>,
    #[serde(default)]
    professional_roles: Vec<Named>,
    experience: Option<Named>,
    salary: Option<SalaryBlock>,
    published_at: Option<String>,
    alternate_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Employer {
    name: Option<String>,
    logo_urls: Option<HashMap<String, Option<String>>>,
}

#[derive(Debug, Default, Deserialize)]
struct Named {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct SalaryBlock {
    from: Option<f64>,
    to: Option<f64>,
    currency: Option<String>,
    gross: Option<bool>,
}

/// Map one vacancies response body into postings.
pub fn parse_page(body: &str, fetched_at: DateTime<Utc>) -> Result<Vec<Posting>, serde_json::Error> {
    let page: VacancyPage = serde_json::from_str(body)?;
    Ok(page
        .items
        .into_iter()
        .map(|item| item.into_posting(fetched_at))
        .collect())
}

impl VacancyItem {
    fn into_posting(self, fetched_at: DateTime<Utc>) -> Posting {
        let (employer, logo_url) = match self.employer {
            Some(employer) => {
                let logo = employer.logo_urls.and_then(|mut urls| {
                    urls.remove("90")
                        .flatten()
                        .or_else(|| urls.remove("240").flatten())
                });
                (employer.name.unwrap_or_default(), logo)
            }
            None => (String::new(), None),
        };
        let specialization = self
            .professional_roles
            .into_iter()
            .map(|role| role.name)
            .collect::<Vec<_>>()
            .join(", ");
        let (salary_from, salary_to, currency, salary_kind) = match self.salary {
            Some(salary) => (
                salary.from,
                salary.to,
                Some(salary.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string())),
                SalaryKind::from_gross_flag(salary.gross),
            ),
            None => (None, None, None, SalaryKind::Gross),
        };
        Posting {
            id: self.id,
            title: self.name.unwrap_or_default(),
            employer,
            location: self.area.unwrap_or_default().name,
            specialization,
            experience: self.experience.unwrap_or_default().name,
            salary_from,
            salary_to,
            currency,
            salary_kind,
            published_at: self.published_at.as_deref().and_then(parse_timestamp),
            fetched_at,
            url: self.alternate_url.unwrap_or_default(),
            logo_url,
        }
    }
}

/// The API emits `+0300` style offsets, which RFC 3339 parsing rejects.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}
