use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{middleware, Json, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::{cancellable, SubscriptionService};

use super::dto::{
    CostParams, CostResponse, ListParams, ListSubscriptionsResponse, SubscriptionRequest,
    SubscriptionResponse,
};
use super::error::ApiError;
use super::timing::log_timing;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    service: Arc<SubscriptionService>,
    /// Fires on shutdown; in-flight operations then fail with 503.
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(service: Arc<SubscriptionService>, shutdown: CancellationToken) -> Self {
        Self { service, shutdown }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/subscriptions",
            get(list_subscriptions).post(create_subscription),
        )
        .route("/api/subscriptions/cost", get(total_cost))
        .route(
            "/api/subscriptions/{id}",
            get(get_subscription)
                .put(update_subscription)
                .delete(delete_subscription),
        )
        .layer(middleware::from_fn(log_timing))
        .with_state(state)
}

/// Serves the API until Ctrl-C.
pub async fn serve(
    service: Arc<SubscriptionService>,
    host: &str,
    port: u16,
) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();
    let app = router(AppState::new(service, shutdown.clone()));

    let address = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&address).await?;
    info!("Starting server on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutting down, cancelling in-flight requests");
            shutdown.cancel();
        })
        .await?;

    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn create_subscription(
    State(state): State<AppState>,
    body: Result<Json<SubscriptionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubscriptionResponse>), ApiError> {
    let Json(request) =
        body.map_err(|e| ApiError::bad_request(format!("invalid request body: {}", e)))?;
    let subscription = request.into_model()?;

    let created = cancellable(&state.shutdown, state.service.create(subscription)).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn get_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let id = parse_id(&id)?;
    let subscription = cancellable(&state.shutdown, state.service.get_by_id(id)).await?;
    Ok(Json(subscription.into()))
}

async fn update_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<SubscriptionRequest>, JsonRejection>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let id = parse_id(&id)?;
    let Json(request) =
        body.map_err(|e| ApiError::bad_request(format!("invalid request body: {}", e)))?;
    let subscription = request.into_model()?.with_id(id);

    let updated = cancellable(&state.shutdown, state.service.update(subscription)).await?;
    Ok(Json(updated.into()))
}

async fn delete_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    cancellable(&state.shutdown, state.service.delete(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_subscriptions(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListSubscriptionsResponse>, ApiError> {
    let page = cancellable(
        &state.shutdown,
        state.service.list_page(params.limit(), params.offset()),
    )
    .await?;

    let items: Vec<SubscriptionResponse> = page.items.into_iter().map(Into::into).collect();
    Ok(Json(ListSubscriptionsResponse {
        total: items.len(),
        items,
        limit: page.limit,
        offset: page.offset,
    }))
}

async fn total_cost(
    State(state): State<AppState>,
    Query(params): Query<CostParams>,
) -> Result<Json<CostResponse>, ApiError> {
    let filter = params.into_filter()?;
    let total_cost = cancellable(&state.shutdown, state.service.total_cost(&filter)).await?;
    Ok(Json(CostResponse { total_cost }))
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request("invalid subscription id"))
}
