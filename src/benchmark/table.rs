//! Tabular projection of kept postings and its CSV export.

use std::{fs::File, io::Write, path::Path};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::NormalizedPosting;

const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M";

pub const HEADERS: [&str; 13] = [
    "logo_url",
    "name",
    "employer_name",
    "area_name",
    "specialization",
    "experience",
    "salary_net_from_byn",
    "salary_net_to_byn",
    "salary_gross_from_byn",
    "salary_gross_to_byn",
    "url",
    "published_at",
    "loaded_at",
];

/// One display/export row; salaries rounded to whole BYN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub logo_url: Option<String>,
    pub name: String,
    pub employer_name: String,
    pub area_name: String,
    pub specialization: String,
    pub experience: String,
    pub salary_net_from_byn: Option<i64>,
    pub salary_net_to_byn: Option<i64>,
    pub salary_gross_from_byn: Option<i64>,
    pub salary_gross_to_byn: Option<i64>,
    pub url: String,
    pub published_at: Option<String>,
    pub loaded_at: String,
}

impl From<&NormalizedPosting> for TableRow {
    fn from(value: &NormalizedPosting) -> Self {
        let posting = &value.posting;
        let salary = &value.salary;
        TableRow {
            logo_url: posting.logo_url.clone(),
            name: posting.title.clone(),
            employer_name: posting.employer.clone(),
            area_name: posting.location.clone(),
            specialization: posting.specialization.clone(),
            experience: posting.experience.clone(),
            salary_net_from_byn: round(salary.net_from),
            salary_net_to_byn: round(salary.net_to),
            salary_gross_from_byn: round(salary.gross_from),
            salary_gross_to_byn: round(salary.gross_to),
            url: posting.url.clone(),
            published_at: posting.published_at.as_ref().map(format_timestamp),
            loaded_at: format_timestamp(&posting.fetched_at),
        }
    }
}

pub fn to_table_rows(postings: &[NormalizedPosting]) -> Vec<TableRow> {
    postings.iter().map(TableRow::from).collect()
}

/// Write rows as CSV with a header line, even when there are no rows.
pub fn write_csv<W: Write>(rows: &[TableRow], writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(HEADERS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_csv_file(rows: &[TableRow], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path).with_context(|| format!("create {path:?}"))?;
    write_csv(rows, file).with_context(|| format!("write {path:?}"))?;
    info!(path = %path.display(), rows = rows.len(), "wrote benchmark table");
    Ok(())
}

fn round(value: Option<f64>) -> Option<i64> {
    value.map(|v| v.round() as i64)
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}
