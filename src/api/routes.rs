//! HTTP route handlers for Axum.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::{info, warn};

use crate::{
    api::types::{AnalyzeRequest, BenchmarkResponse, RatesDto},
    benchmark::{self, table, BenchmarkOutcome, PipelineError},
    data::{
        hh::{SearchRequest, SourceError},
        posting::Posting,
        rates::{ExchangeRateTable, RateSource, RatesError},
    },
};

use super::AppState;

type ApiError = (StatusCode, String);
type ApiResult<T> = Result<Json<T>, ApiError>;

pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<BenchmarkResponse> {
    let postings = fetch_postings(&state, request).await?;
    let rates = state.rates.load().await;
    let outcome = run_pipeline(&state, postings, &rates)?;
    Ok(Json(BenchmarkResponse::from(&outcome)))
}

pub async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<BenchmarkResponse> {
    let rates = match request.rates {
        Some(pairs) => ExchangeRateTable::from_pairs(pairs, Utc::now(), RateSource::Supplied),
        None => state.rates.load().await,
    };
    let outcome = run_pipeline(&state, request.postings, &rates)?;
    Ok(Json(BenchmarkResponse::from(&outcome)))
}

pub async fn export(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Response, ApiError> {
    let postings = fetch_postings(&state, request).await?;
    let rates = state.rates.load().await;
    let outcome = run_pipeline(&state, postings, &rates)?;
    if outcome.kept().is_empty() {
        return Err((StatusCode::NOT_FOUND, "no postings to export".to_string()));
    }

    let rows = table::to_table_rows(outcome.kept());
    let mut body = Vec::new();
    table::write_csv(&rows, &mut body)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let filename = format!("vacancies_{}.csv", Utc::now().format("%Y%m%d_%H%M"));
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        body,
    )
        .into_response())
}

pub async fn rates(State(state): State<AppState>) -> ApiResult<RatesDto> {
    match state.rates.fetch().await {
        Ok(table) => Ok(Json(RatesDto::from(&table))),
        Err(err) if state.settings.rates_fallback => {
            warn!(%err, "serving fallback rates");
            let table = crate::data::rates::fallback_table(Utc::now());
            Ok(Json(RatesDto::from(&table)))
        }
        Err(err) => Err(rates_error(err)),
    }
}

async fn fetch_postings(state: &AppState, request: SearchRequest) -> Result<Vec<Posting>, ApiError> {
    let query = request.into_query().map_err(source_error)?;
    let postings = state.vacancies.fetch(&query).await.map_err(source_error)?;
    info!(text = %query.text, count = postings.len(), "postings fetched for benchmark");
    Ok(postings)
}

fn run_pipeline(
    state: &AppState,
    postings: Vec<Posting>,
    rates: &ExchangeRateTable,
) -> Result<BenchmarkOutcome, ApiError> {
    benchmark::run(postings, rates, &state.settings.pipeline_config()).map_err(|err| match err {
        PipelineError::RatesUnavailable { .. } => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
        PipelineError::InvalidConfig(_) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    })
}

fn source_error(err: SourceError) -> ApiError {
    match err {
        SourceError::EmptyQuery => (StatusCode::BAD_REQUEST, err.to_string()),
        SourceError::Http(_) => (StatusCode::BAD_GATEWAY, err.to_string()),
    }
}

fn rates_error(err: RatesError) -> ApiError {
    (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
}
