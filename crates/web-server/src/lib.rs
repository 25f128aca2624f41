// In crates/web-server/src/lib.rs

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use analytics::{
    WeekStart, balance_drawdown, chart_points, compute_calendar, compute_equity_curve,
    compute_metrics, compute_radar_and_score, equity_drawdown, filter_by_period,
};
use app_config::types::ServerSettings;
use core_types::{CalendarTrade, InsightFilters, Period, UserId};
use database::{Db, TradeFilters};
use insights::{ChatClient, InsightService};

pub mod error;
pub mod types;

// Re-export our custom error type for convenience.
pub use error::{Error, Result};
use types::{
    CalendarParams, DrawdownResponse, InsightRequest, InsightResponseBody, MetricsResponse,
    RangeParams, ScoreResponse,
};

/// The shared application state that is available to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub insights: Arc<InsightService<Db, ChatClient>>,
}

/// Creates the main application router with all routes and middleware.
pub fn create_router(app_state: AppState) -> Router {
    let cors = tower_http::cors::CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    let api_router = Router::new()
        .route("/users/{userId}/metrics", get(get_metrics_handler))
        .route("/users/{userId}/equity-curve", get(get_equity_curve_handler))
        .route("/users/{userId}/calendar", get(get_calendar_handler))
        .route("/users/{userId}/drawdown", get(get_drawdown_handler))
        .route("/users/{userId}/score", get(get_score_handler))
        .route("/users/{userId}/insights", post(post_insight_handler));

    Router::new()
        .route("/health", get(health_check_handler))
        .nest("/api", api_router)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Binds the listener and serves the router until shutdown.
pub async fn run(settings: &ServerSettings, app_state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", settings.host, settings.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "web server listening");
    axum::serve(listener, create_router(app_state)).await?;
    Ok(())
}

/// A simple health check handler.
async fn health_check_handler() -> &'static str {
    "OK"
}

/// Loads, normalizes, and window-filters a user's trades for one request.
async fn load_trades(
    state: &AppState,
    user_id: &UserId,
    range: &RangeParams,
) -> Result<Vec<CalendarTrade>> {
    let filters = TradeFilters {
        import_id: range.import_id.clone(),
        account_id: range.account_id.clone(),
        ..Default::default()
    };
    let raw = state.db.list_trades(user_id, &filters).await?;
    let normalized: Vec<CalendarTrade> = raw.iter().map(CalendarTrade::from_raw).collect();

    let period = Period::parse(range.period.as_deref().unwrap_or_default());
    Ok(filter_by_period(
        &normalized,
        period,
        Utc::now().date_naive(),
    ))
}

/// Handler for `GET /api/users/{userId}/metrics`.
async fn get_metrics_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(range): Query<RangeParams>,
) -> Result<Json<MetricsResponse>> {
    let user = UserId(user_id);
    let trades = load_trades(&state, &user, &range).await?;
    let use_dollar = range.use_dollar();

    let metrics = compute_metrics(&trades, use_dollar);
    let curve = compute_equity_curve(&trades, use_dollar);

    Ok(Json(MetricsResponse {
        metrics,
        equity_curve: chart_points(&curve),
    }))
}

/// Handler for `GET /api/users/{userId}/equity-curve`.
async fn get_equity_curve_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(range): Query<RangeParams>,
) -> Result<Json<Vec<analytics::ChartPoint>>> {
    let user = UserId(user_id);
    let trades = load_trades(&state, &user, &range).await?;
    let curve = compute_equity_curve(&trades, range.use_dollar());
    Ok(Json(chart_points(&curve)))
}

/// Handler for `GET /api/users/{userId}/calendar`.
async fn get_calendar_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<CalendarParams>,
) -> Result<Json<analytics::CalendarData>> {
    if !(1..=12).contains(&params.month) {
        return Err(Error::BadRequest(format!(
            "month must be 1-12, got {}",
            params.month
        )));
    }

    let user = UserId(user_id);
    // The calendar is month-scoped on its own; no period filter applies.
    let raw = state.db.list_trades(&user, &TradeFilters::default()).await?;
    let trades: Vec<CalendarTrade> = raw.iter().map(CalendarTrade::from_raw).collect();

    let week_start = match params.week_start.as_deref() {
        Some("monday") => WeekStart::Monday,
        _ => WeekStart::Sunday,
    };
    let calendar = compute_calendar(
        &trades,
        params.year,
        params.month,
        params.use_dollar.unwrap_or(true),
        week_start,
    );
    Ok(Json(calendar))
}

/// Handler for `GET /api/users/{userId}/drawdown`.
///
/// The balance drawdown needs an initial balance, which the engine cannot
/// know on its own: an import's stated starting balance wins, else a linked
/// account's current balance minus the window's net P&L.
async fn get_drawdown_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(range): Query<RangeParams>,
) -> Result<Json<DrawdownResponse>> {
    let user = UserId(user_id);
    let trades = load_trades(&state, &user, &range).await?;
    let use_dollar = range.use_dollar();

    let curve = compute_equity_curve(&trades, use_dollar);
    let equity = equity_drawdown(&curve);

    let net_pnl = curve
        .last()
        .map(|p| p.cumulative_pnl)
        .unwrap_or(Decimal::ZERO);
    let initial_balance = resolve_initial_balance(&state, &range, net_pnl).await?;
    let balance = match initial_balance {
        Some(start) => balance_drawdown(start, &trades, use_dollar),
        None => analytics::Drawdown::default(),
    };

    Ok(Json(DrawdownResponse { equity, balance }))
}

async fn resolve_initial_balance(
    state: &AppState,
    range: &RangeParams,
    net_pnl: Decimal,
) -> Result<Option<Decimal>> {
    if let Some(import_id) = &range.import_id {
        if let Some(summary) = state.db.get_import_summary(import_id).await? {
            if let Some(start) = summary.starting_balance {
                return Ok(Some(start));
            }
        }
    }
    if let Some(account_id) = &range.account_id {
        if let Some(current) = state.db.get_linked_account_balance(account_id).await? {
            return Ok(Some(current - net_pnl));
        }
    }
    Ok(None)
}

/// Handler for `GET /api/users/{userId}/score`.
async fn get_score_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(range): Query<RangeParams>,
) -> Result<Json<ScoreResponse>> {
    let user = UserId(user_id);
    let trades = load_trades(&state, &user, &range).await?;
    let metrics = compute_metrics(&trades, range.use_dollar());
    let breakdown = compute_radar_and_score(&metrics);
    Ok(Json(ScoreResponse { breakdown }))
}

/// Handler for `POST /api/users/{userId}/insights`.
///
/// Computes the metrics for the requested window, renders them into the
/// generation prompt, and runs the cache/credit-gated insight flow.
async fn post_insight_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<InsightRequest>,
) -> Result<Json<InsightResponseBody>> {
    let user = UserId(user_id);
    let trades = load_trades(&state, &user, &request.range).await?;
    let metrics = compute_metrics(&trades, request.range.use_dollar());

    let period = Period::parse(request.range.period.as_deref().unwrap_or_default());
    let filters = InsightFilters {
        import_id: request.range.import_id.clone(),
        account_id: request.range.account_id.clone(),
        period,
        locale: request.locale.clone(),
        report_type: request.report_type.clone(),
    };

    let prompt = build_prompt(&metrics, period, request.question.as_deref());
    let response = state
        .insights
        .request(&user, request.agent, &filters, &prompt)
        .await?;

    Ok(Json(InsightResponseBody {
        text: response.text,
        cached: response.cached,
    }))
}

/// Renders the computed metrics into the structured prompt the generator
/// receives. The model never sees raw trades, only the aggregates.
fn build_prompt(
    metrics: &analytics::PerformanceMetrics,
    period: Period,
    question: Option<&str>,
) -> String {
    let mut prompt = format!(
        "Trading performance over the '{}' window:\n\
         trades: {} ({} wins / {} losses), win rate {:.1}%\n\
         net P&L: {}, profit factor {:.2}\n\
         average win {} / average loss {}\n\
         longest streaks: {} wins, {} losses\n\
         days: {} winning, {} losing, {} breakeven\n\
         max drawdown: {} ({:.1}%)",
        period.as_str(),
        metrics.total_trades,
        metrics.wins,
        metrics.losses,
        metrics.win_rate,
        metrics.net_pnl,
        metrics.profit_factor,
        metrics.avg_win_dollar,
        metrics.avg_loss_dollar,
        metrics.max_consecutive_wins,
        metrics.max_consecutive_losses,
        metrics.win_days,
        metrics.loss_days,
        metrics.breakeven_days,
        metrics.max_daily_drawdown,
        metrics.max_drawdown_pct,
    );
    if let Some(question) = question {
        prompt.push_str("\n\nTrader's question: ");
        prompt.push_str(question);
    }
    prompt
}
