use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, ConnectInfo, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tracing::error;

use super::maintenance::DatabaseMaintenance;
use super::rate_limit::{client_key, RateLimitStore};
use super::service::{CompanyDirectory, ListingError, ListingQuery};
use super::store::{CompanyStore, SchemaStore};

const LISTING_CACHE_CONTROL: &str = "public, max-age=300";

/// Router builder exposing the public company listing.
pub fn directory_router<S, L>(service: Arc<CompanyDirectory<S, L>>) -> Router
where
    S: CompanyStore + 'static,
    L: RateLimitStore + 'static,
{
    Router::new()
        .route("/api/companies", get(list_handler::<S, L>))
        .with_state(service)
}

/// Router builder exposing connectivity, health, and initialization endpoints.
pub fn maintenance_router<S>(maintenance: Arc<DatabaseMaintenance<S>>) -> Router
where
    S: SchemaStore + 'static,
{
    Router::new()
        .route("/api/test-connection", get(test_connection_handler::<S>))
        .route(
            "/api/init-db",
            get(health_handler::<S>).post(initialize_handler::<S>),
        )
        .with_state(maintenance)
}

pub(crate) async fn list_handler<S, L>(
    State(service): State<Arc<CompanyDirectory<S, L>>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    query: Result<Query<ListingQuery>, QueryRejection>,
) -> Response
where
    S: CompanyStore + 'static,
    L: RateLimitStore + 'static,
{
    let client = client_key(&headers, peer.map(|ConnectInfo(addr)| addr));
    let expose_details = service.environment().exposes_error_details();

    if let Err(error) = service.admit(&client).await {
        return listing_error_response(error, expose_details);
    }

    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            let payload = json!({
                "error": "Invalid search parameters",
                "details": [{ "field": "query", "message": rejection.body_text() }],
            });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
    };

    match service.list(&query).await {
        Ok(page) => (
            StatusCode::OK,
            [(header::CACHE_CONTROL, LISTING_CACHE_CONTROL)],
            Json(page),
        )
            .into_response(),
        Err(error) => listing_error_response(error, expose_details),
    }
}

pub(crate) fn listing_error_response(error: ListingError, expose_details: bool) -> Response {
    match error {
        ListingError::RateLimited { retry_after } => {
            let payload = json!({ "error": "Rate limit exceeded. Please try again later." });
            let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(payload)).into_response();
            let seconds = retry_after.as_secs().max(1).to_string();
            if let Ok(value) = HeaderValue::from_str(&seconds) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
            response
        }
        ListingError::InvalidSearch(errors) => {
            let payload = json!({
                "error": "Invalid search parameters",
                "details": errors,
            });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
        ListingError::InvalidPagination(errors) => {
            let payload = json!({
                "error": "Invalid pagination parameters",
                "details": errors,
            });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
        other @ (ListingError::Store(_) | ListingError::RateLimitStore(_)) => {
            error!(error = %other, "failed to fetch companies");
            let payload = if expose_details {
                json!({ "error": "Failed to fetch companies", "details": other.to_string() })
            } else {
                json!({ "error": "Failed to fetch companies" })
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn test_connection_handler<S>(
    State(maintenance): State<Arc<DatabaseMaintenance<S>>>,
) -> Response
where
    S: SchemaStore + 'static,
{
    let probe = maintenance.test_connection().await;
    (StatusCode::OK, Json(probe)).into_response()
}

pub(crate) async fn health_handler<S>(
    State(maintenance): State<Arc<DatabaseMaintenance<S>>>,
) -> Response
where
    S: SchemaStore + 'static,
{
    let health = maintenance.check_health().await;
    let status = if health.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(health)).into_response()
}

pub(crate) async fn initialize_handler<S>(
    State(maintenance): State<Arc<DatabaseMaintenance<S>>>,
) -> Response
where
    S: SchemaStore + 'static,
{
    match maintenance.initialize().await {
        Ok(outcome) => {
            let payload = json!({
                "success": true,
                "message": "Database initialized successfully",
                "seeded": outcome.seeded,
                "existing": outcome.existing,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => {
            error!(error = %err, "database initialization failed");
            let payload = if maintenance.environment().exposes_error_details() {
                json!({
                    "success": false,
                    "message": "Database initialization failed",
                    "error": err.to_string(),
                })
            } else {
                json!({
                    "success": false,
                    "message": "Database initialization failed",
                })
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
