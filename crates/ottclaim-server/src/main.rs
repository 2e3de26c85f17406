//! `OTTclaim` server
//!
//! HTTP API for claim intake, payment verification and OTT key fulfillment,
//! plus the background automation loop.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing::{info, warn};

use ottclaim_core::config::{database_path, load_config};
use ottclaim_core::tracing_init::init_tracing;

use ottclaim_server::auth::{AdminCredentials, JwtManager};
use ottclaim_server::fulfillment::{FulfillmentOptions, FulfillmentService, spawn_automation_task};
use ottclaim_server::http::{ApiSettings, AppState, build_router};
use ottclaim_server::notifications::Notifier;
use ottclaim_server::payment::PaymentClient;
use ottclaim_server::storage::ClaimDatabase;

#[derive(Parser, Debug)]
#[command(name = "ottclaim-server")]
#[command(version, about = "OTTclaim server - claim intake, payment verification and OTT key fulfillment")]
struct Args {
    /// Settings file (JSON). Defaults to the global settings file if present.
    #[arg(long, env = "OTTCLAIM_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on. Overrides `server.addr`.
    #[arg(long)]
    addr: Option<SocketAddr>,

    /// Path to SQLite database file. Overrides `server.database_path`.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Emit logs as JSON.
    #[arg(long, env = "OTTCLAIM_LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(addr) = args.addr {
        config.server.addr = addr.to_string();
    }
    if let Some(path) = args.db_path {
        config.server.database_path = Some(path);
    }

    init_tracing(&config.server.log_level, args.log_json || config.server.log_json);

    if config.uses_dev_jwt_secret() {
        warn!("Using the development JWT secret, set OTTCLAIM_JWT_SECRET in production");
    }

    let db_path = match config.server.database_path.clone() {
        Some(path) => path,
        None => database_path().ok_or_else(|| anyhow::anyhow!("Cannot determine data directory"))?,
    };
    let db = ClaimDatabase::open(&db_path, &config.database).await?;

    let notifier = Notifier::from_config(&config.email, &config.whatsapp)?;
    info!(
        email = notifier.email_enabled(),
        whatsapp = notifier.whatsapp_enabled(),
        "Notification channels configured"
    );

    let payment = PaymentClient::from_config(&config.payment)?.map(Arc::new);
    if payment.is_none() {
        warn!("Payment gateway not configured, payment verification disabled");
    }

    let admin = AdminCredentials::new(
        config.admin.username.clone(),
        config.admin.password_hash.clone(),
    );
    if !admin.login_enabled() {
        warn!("No admin password hash configured, admin login disabled");
    }

    let fulfillment = Arc::new(FulfillmentService::new(
        db.clone(),
        notifier,
        FulfillmentOptions::from(&config.fulfillment),
    ));

    let state = AppState {
        db,
        fulfillment: Arc::clone(&fulfillment),
        payment,
        jwt: Arc::new(JwtManager::new(
            config.admin.jwt_secret.as_bytes(),
            config.admin.token_ttl_secs,
        )),
        admin: Arc::new(admin),
        settings: Arc::new(ApiSettings::from(&config)),
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let automation = spawn_automation_task(
        fulfillment,
        Duration::from_secs(config.fulfillment.automation_interval_secs),
        config.fulfillment.batch_size,
        shutdown_rx,
    );

    let addr: SocketAddr = config
        .server
        .addr
        .parse()
        .with_context(|| format!("Invalid listen address {}", config.server.addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, db = %db_path.display(), "OTTclaim server listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    if let Some(handle) = automation {
        let _ = handle.await;
    }

    info!("OTTclaim server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
