// In app/src/main.rs

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use analytics::{
    chart_points, compute_equity_curve, compute_metrics, compute_radar_and_score, filter_by_period,
};
use core_types::{CalendarTrade, Period, UserId};
use database::TradeFilters;
use insights::{ChatClient, InsightService};
use web_server::AppState;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "Trading-journal analytics service.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs the HTTP API server.
    Serve,

    /// Prints a user's performance report as JSON.
    Report {
        /// The user to report on.
        #[arg(short, long)]
        user: String,

        /// Reporting window token (e.g. "30d", "ytd", "all").
        #[arg(short, long, default_value = "30d")]
        period: String,
    },

    /// Prints a user's radar breakdown and composite score as JSON.
    Score {
        #[arg(short, long)]
        user: String,

        #[arg(short, long, default_value = "30d")]
        period: String,
    },
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let settings = app_config::load_settings()?;
    let db = database::connect(&settings.database).await?;

    match cli.command {
        Commands::Serve => {
            let client = ChatClient::new(&settings.insights)?;
            let cache_ttl = chrono::Duration::seconds(settings.insights.cache_ttl_secs as i64);
            let insights = Arc::new(InsightService::new(db.clone(), client, cache_ttl));

            info!("starting web server");
            web_server::run(&settings.server, AppState { db, insights }).await?;
        }

        Commands::Report { user, period } => {
            let trades = load_trades(&db, &user, &period).await?;
            let metrics = compute_metrics(&trades, true);
            let curve = compute_equity_curve(&trades, true);
            let report = serde_json::json!({
                "metrics": metrics,
                "equity_curve": chart_points(&curve),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Score { user, period } => {
            let trades = load_trades(&db, &user, &period).await?;
            let metrics = compute_metrics(&trades, true);
            let breakdown = compute_radar_and_score(&metrics);
            println!("{}", serde_json::to_string_pretty(&breakdown)?);
        }
    }

    Ok(())
}

async fn load_trades(
    db: &database::Db,
    user: &str,
    period: &str,
) -> Result<Vec<CalendarTrade>> {
    let user = UserId(user.to_string());
    let raw = db.list_trades(&user, &TradeFilters::default()).await?;
    let normalized: Vec<CalendarTrade> = raw.iter().map(CalendarTrade::from_raw).collect();
    Ok(filter_by_period(
        &normalized,
        Period::parse(period),
        Utc::now().date_naive(),
    ))
}
