// In crates/web-server/src/lib.rs

use analytics::{
    aggregate_summaries, normalize_trades, NamedSummary, RunSummary, SeriesBuilder, TradeSeries,
};
use app_config::{DataSettings, Settings};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use core_types::Mode;
use result_store::{ping_line, PingLog, ResultBundle, ResultName, ResultStore};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use types::{AggregateResponse, MessageResponse, ModeParams, PingLogsResponse, ResultDetails};

pub mod charts;
pub mod error;
pub mod format;
pub mod sections;
pub mod types;

// Re-export our custom error type for convenience.
pub use error::{Error, Result};

use charts::ChartData;
use format::format_metrics;
use sections::summary_sections;

/// The shared application state that is available to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub data: Arc<DataSettings>,
    pub series_builder: SeriesBuilder,
    pub ping_log: PingLog,
    /// Offset from UTC, in minutes, used to stamp ping lines.
    pub ping_utc_offset_minutes: i32,
}

impl AppState {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            data: Arc::new(settings.data.clone()),
            series_builder: SeriesBuilder::new(settings.analytics.initial_capital),
            ping_log: PingLog::new(&settings.ping.log_path, settings.ping.capacity),
            ping_utc_offset_minutes: settings.ping.utc_offset_minutes,
        }
    }

    /// The store for the requested mode, or the configured default.
    fn store(&self, mode: Option<Mode>) -> ResultStore {
        ResultStore::for_mode(&self.data, mode.unwrap_or(self.data.default_mode))
    }

    /// Loads a named result. Every failure reads as "not found" to the client.
    async fn load_result(&self, name: &str, mode: Option<Mode>) -> Result<ResultBundle> {
        let name = ResultName::parse(name).map_err(|e| {
            tracing::warn!(error = %e, "Rejected result name.");
            Error::ResultNotFound
        })?;
        self.store(mode).load_result(&name).await.map_err(|e| {
            if e.is_not_found() {
                tracing::debug!(name = name.as_str(), "Result not found.");
            } else {
                tracing::error!(name = name.as_str(), error = ?e, "Failed to load result.");
            }
            Error::ResultNotFound
        })
    }

    async fn load_summaries(&self, mode: Option<Mode>) -> Result<Vec<NamedSummary>> {
        self.store(mode).load_all_summaries().await.map_err(|e| {
            tracing::error!(error = ?e, "Failed to list summaries.");
            Error::ListFailed
        })
    }
}

/// Creates the main application router with all routes and middleware.
pub fn create_router(app_state: AppState) -> Router {
    // The dashboard may be served from a different origin.
    let cors = tower_http::cors::CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    let api_router = Router::new()
        .route("/results", get(list_results_handler))
        .route("/results/{name}", get(get_result_handler))
        .route("/results/{name}/series", get(get_result_series_handler))
        .route("/results/{name}/chart", get(get_result_chart_handler))
        .route("/summaries", get(list_summaries_handler))
        .route("/summaries/aggregate", get(aggregate_summaries_handler))
        .route("/ping", post(ping_handler).fallback(method_not_allowed_handler))
        .route("/ping-logs", get(ping_logs_handler));

    Router::new()
        .route("/health", get(health_check_handler))
        .nest("/api", api_router)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

async fn health_check_handler() -> &'static str {
    "OK"
}

/// Handler for `GET /api/results`
async fn list_results_handler(
    State(state): State<AppState>,
    Query(params): Query<ModeParams>,
) -> Result<Json<Vec<String>>> {
    let names = state.store(params.mode).list_results().await.map_err(|e| {
        tracing::error!(error = ?e, "Failed to list results.");
        Error::ListFailed
    })?;
    Ok(Json(names))
}

/// Handler for `GET /api/results/{name}`
async fn get_result_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<ModeParams>,
) -> Result<Json<ResultDetails>> {
    let bundle = state.load_result(&name, params.mode).await?;

    Ok(Json(ResultDetails {
        sections: summary_sections(&bundle.summary),
        trades: normalize_trades(&bundle.trades),
        name: bundle.name,
        summary: bundle.summary,
        raw_data: bundle.raw_data,
    }))
}

/// Handler for `GET /api/results/{name}/series`
async fn get_result_series_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<ModeParams>,
) -> Result<Json<TradeSeries>> {
    let bundle = state.load_result(&name, params.mode).await?;
    let trades = normalize_trades(&bundle.trades);
    Ok(Json(state.series_builder.build(&trades)))
}

/// Handler for `GET /api/results/{name}/chart`
async fn get_result_chart_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<ModeParams>,
) -> Result<Json<ChartData>> {
    let bundle = state.load_result(&name, params.mode).await?;
    let trades = normalize_trades(&bundle.trades);
    let series = state.series_builder.build(&trades);
    Ok(Json(ChartData::build(&bundle.raw_data, &trades, &series)))
}

/// Handler for `GET /api/summaries`
async fn list_summaries_handler(
    State(state): State<AppState>,
    Query(params): Query<ModeParams>,
) -> Result<Json<Vec<NamedSummary>>> {
    Ok(Json(state.load_summaries(params.mode).await?))
}

/// Handler for `GET /api/summaries/aggregate`
async fn aggregate_summaries_handler(
    State(state): State<AppState>,
    Query(params): Query<ModeParams>,
) -> Result<Json<AggregateResponse>> {
    let summaries: Vec<RunSummary> = state
        .load_summaries(params.mode)
        .await?
        .into_iter()
        .map(|s| s.summary)
        .collect();

    let aggregate = aggregate_summaries(&summaries).ok_or(Error::NoSummaries)?;
    tracing::info!(runs = aggregate.total_runs, "Aggregated backtest summaries.");

    Ok(Json(AggregateResponse {
        formatted: format_metrics(&aggregate.metrics()),
        aggregate,
    }))
}

/// Handler for `POST /api/ping`
async fn ping_handler(State(state): State<AppState>) -> Result<Json<MessageResponse>> {
    let line = ping_line(Utc::now(), state.ping_utc_offset_minutes);
    state.ping_log.append(&line).await.map_err(|e| {
        tracing::error!(error = ?e, "Failed to record ping.");
        Error::PingWriteFailed
    })?;

    Ok(Json(MessageResponse {
        message: "Ping logged successfully",
    }))
}

async fn method_not_allowed_handler() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
}

/// Handler for `GET /api/ping-logs`
async fn ping_logs_handler(State(state): State<AppState>) -> Result<Json<PingLogsResponse>> {
    let mut logs = state.ping_log.read_all().await.map_err(|e| {
        tracing::error!(error = ?e, "Failed to read ping log.");
        Error::PingReadFailed
    })?;
    logs.reverse();
    Ok(Json(PingLogsResponse { logs }))
}

/// The main entry point for running the web server.
///
/// Serves until the process receives Ctrl-C.
pub async fn run(settings: &Settings) -> Result<()> {
    let app = create_router(AppState::from_settings(settings));

    let address = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&address)
        .await
        .map_err(Error::ServerBindError)?;
    tracing::info!(%address, "Web server listening.");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(Error::ServerError)?;

    tracing::info!("Web server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for the shutdown signal.");
        std::future::pending::<()>().await;
    }
}
