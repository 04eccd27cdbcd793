//! Wiring & DI. Entry point: bootstrap stores, inject into the summary service, run UI.
//! No business logic here.

use chrono::{Local, TimeZone};
use dotenv::dotenv;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use study_pulse::adapters::persistence::{SnapshotStore, SqliteRepo};
use study_pulse::adapters::ui::tui::TuiInputPort;
use study_pulse::domain::WeekCalendar;
use study_pulse::ports::{InputPort, SessionStatsPort, TaskStorePort};
use study_pulse::shared::config::AppConfig;
use study_pulse::usecases::WeeklySummaryService;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    study_pulse::adapters::ui::init_ui();

    let cfg = AppConfig::load().unwrap_or_default();
    let first_day = cfg.first_day_of_week_or_default();

    let (tasks, sessions) = open_stores(&cfg).await?;

    // --- Week calendar: named zone when configured, host local zone otherwise ---
    match cfg.timezone() {
        Some(tz) => {
            info!(timezone = %tz, ?first_day, "week calendar configured");
            run(WeekCalendar::new(tz, first_day), tasks, sessions, cfg.user_id).await
        }
        None => {
            info!(timezone = "local", ?first_day, "week calendar configured");
            run(WeekCalendar::new(Local, first_day), tasks, sessions, cfg.user_id).await
        }
    }
}

/// JSON snapshot store when configured, SQLite otherwise. One instance serves both ports.
async fn open_stores(
    cfg: &AppConfig,
) -> anyhow::Result<(Arc<dyn TaskStorePort>, Arc<dyn SessionStatsPort>)> {
    if let (Some(path), true) = (cfg.snapshot_path.as_deref(), cfg.uses_snapshot()) {
        let store = Arc::new(SnapshotStore::new(path));
        store
            .load()
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        let tasks: Arc<dyn TaskStorePort> = store.clone();
        let sessions: Arc<dyn SessionStatsPort> = store;
        return Ok((tasks, sessions));
    }

    let data_path = PathBuf::from(cfg.data_dir_or_default());
    let repo = Arc::new(
        SqliteRepo::connect(&data_path)
            .await
            .map_err(|e| anyhow::anyhow!("SQLite connect failed: {}", e))?,
    );
    info!(path = %repo.db_path().display(), "using SQLite store");
    let tasks: Arc<dyn TaskStorePort> = repo.clone();
    let sessions: Arc<dyn SessionStatsPort> = repo;
    Ok((tasks, sessions))
}

async fn run<Tz>(
    calendar: WeekCalendar<Tz>,
    tasks: Arc<dyn TaskStorePort>,
    sessions: Arc<dyn SessionStatsPort>,
    user_id: Option<i64>,
) -> anyhow::Result<()>
where
    Tz: TimeZone + Send + Sync + 'static,
    Tz::Offset: fmt::Display + Send + Sync,
{
    let service = Arc::new(WeeklySummaryService::new(tasks, sessions, calendar));
    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(service, user_id));

    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
