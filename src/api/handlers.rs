use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        ConnectInfo, Path, Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use ipnet::IpNet;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use super::error::{ApiError, ErrorResponse, SuccessResponse};
use super::extract::Lang;
use crate::analytics::{extract_client_ip, GeoLookup, ReportEngine};
use crate::export::encode_visits;
use crate::i18n::{Catalog, MessageKey, Translations};
use crate::models::{BlacklistRequest, Visit, VisitQuery, VisitResponse};
use crate::storage::Storage;

pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub reports: ReportEngine<dyn Storage>,
    pub geo: Arc<dyn GeoLookup>,
    pub translations: Arc<Translations>,
    pub trusted_proxies: Vec<IpNet>,
}

impl AppState {
    pub fn new(
        storage: Arc<dyn Storage>,
        geo: Arc<dyn GeoLookup>,
        translations: Arc<Translations>,
        trusted_proxies: Vec<IpNet>,
    ) -> Self {
        Self {
            reports: ReportEngine::new(Arc::clone(&storage)),
            storage,
            geo,
            translations,
            trusted_proxies,
        }
    }
}

type ApiResult<T> = Result<T, (StatusCode, Json<ErrorResponse>)>;

/// Wrap `visits` under a single localized label
fn labelled_visits(messages: &Catalog, label: MessageKey, visits: Vec<Visit>) -> ApiResult<Json<Value>> {
    let visits = serde_json::to_value(visits)
        .map_err(|e| ApiError::Internal(e.into()).localize(messages))?;

    let mut body = Map::new();
    body.insert(messages.get(label).to_string(), visits);
    Ok(Json(Value::Object(body)))
}

/// Record a visit from the calling client
pub async fn log_visit(
    State(state): State<Arc<AppState>>,
    Lang(lang): Lang,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> ApiResult<Json<VisitResponse>> {
    let messages = state.translations.catalog(&lang);
    let Query(pairs) =
        query.map_err(|e| ApiError::BadRequest(e.body_text()).localize(messages))?;
    let query = VisitQuery::from_pairs(pairs);
    let ip = extract_client_ip(&headers, addr.ip(), &state.trusted_proxies);

    let location = if query.include_location() {
        Some(state.geo.resolve(&ip).await)
    } else {
        None
    };

    let visit = state
        .storage
        .record(&ip, location.as_deref())
        .await
        .map_err(|e| ApiError::from(e).localize(messages))?;

    tracing::info!(id = visit.id, ip = %visit.ip_address, location = ?visit.location, "visit logged");

    Ok(Json(VisitResponse {
        message: messages.get(MessageKey::VisitLogged).to_string(),
        ip: visit.ip_address,
        location: visit.location,
    }))
}

/// List all recorded visits
pub async fn list_visits(
    State(state): State<Arc<AppState>>,
    Lang(lang): Lang,
) -> ApiResult<Json<Value>> {
    let messages = state.translations.catalog(&lang);

    let visits = state
        .storage
        .list_visits()
        .await
        .map_err(|e| ApiError::from(e).localize(messages))?;

    labelled_visits(messages, MessageKey::Visits, visits)
}

/// List visits recorded for one address
pub async fn visit_details(
    State(state): State<Arc<AppState>>,
    Lang(lang): Lang,
    path: Result<Path<(String, String)>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let messages = state.translations.catalog(&lang);
    let Path((_, ip)) = path.map_err(|e| ApiError::BadRequest(e.body_text()).localize(messages))?;

    let visits = state
        .storage
        .list_visits_by_ip(&ip)
        .await
        .map_err(|e| ApiError::from(e).localize(messages))?;

    labelled_visits(messages, MessageKey::VisitDetails, visits)
}

/// Total and unique visitor counts
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Lang(lang): Lang,
) -> ApiResult<Json<Value>> {
    let messages = state.translations.catalog(&lang);

    let stats = state
        .reports
        .stats()
        .await
        .map_err(|e| ApiError::from(e).localize(messages))?;

    let mut body = Map::new();
    body.insert(
        messages.get(MessageKey::TotalVisits).to_string(),
        Value::from(stats.total),
    );
    body.insert(
        messages.get(MessageKey::UniqueVisitors).to_string(),
        Value::from(stats.unique_visitors),
    );

    Ok(Json(Value::Object(body)))
}

/// Add an address to the blacklist
pub async fn add_to_blacklist(
    State(state): State<Arc<AppState>>,
    Lang(lang): Lang,
    payload: Result<Json<BlacklistRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SuccessResponse>)> {
    let messages = state.translations.catalog(&lang);

    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable blacklist request body");
            BlacklistRequest::default()
        }
    };

    let Some(ip) = payload.ip() else {
        return Err(ApiError::InvalidInput.localize(messages));
    };

    let entry = state
        .storage
        .add_to_blacklist(ip)
        .await
        .map_err(|e| ApiError::from(e).localize(messages))?;

    tracing::info!(id = entry.id, ip = %entry.ip_address, "ip blacklisted");

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse {
            message: messages.with_ip(MessageKey::IpBlacklisted, &entry.ip_address),
        }),
    ))
}

/// List blacklisted addresses
pub async fn get_blacklist(
    State(state): State<Arc<AppState>>,
    Lang(lang): Lang,
) -> ApiResult<Json<Vec<String>>> {
    let messages = state.translations.catalog(&lang);

    let ips = state
        .storage
        .list_blacklist()
        .await
        .map_err(|e| ApiError::from(e).localize(messages))?;

    Ok(Json(ips))
}

/// Visit counts grouped by address
pub async fn get_report(
    State(state): State<Arc<AppState>>,
    Lang(lang): Lang,
) -> ApiResult<Json<BTreeMap<String, i64>>> {
    let messages = state.translations.catalog(&lang);

    let report = state
        .reports
        .report()
        .await
        .map_err(|e| ApiError::from(e).localize(messages))?;

    Ok(Json(report))
}

/// All visits as a CSV attachment
pub async fn download_visits(
    State(state): State<Arc<AppState>>,
    Lang(lang): Lang,
) -> ApiResult<impl IntoResponse> {
    let messages = state.translations.catalog(&lang);

    let visits = state
        .storage
        .list_visits()
        .await
        .map_err(|e| ApiError::from(e).localize(messages))?;

    let body = encode_visits(&visits).map_err(|e| ApiError::from(e).localize(messages))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (header::CONTENT_DISPOSITION, "attachment; filename=visits.csv"),
        ],
        body,
    ))
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        message: "OK".to_string(),
    })
}
