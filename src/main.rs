use leaddrive::config::Config;
use leaddrive::drive::{DriveGateway, GoogleDriveClient};
use leaddrive::leads::{LeadDriveService, LeadDriveSettings};
use leaddrive::server::{LeadDriveState, leaddrive_router};
use mimalloc::MiMalloc;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.basic.database_url,
        listen_addr = %cfg.basic.listen_addr,
        listen_port = cfg.basic.listen_port,
        loglevel = %cfg.basic.loglevel,
        leads_folder = %cfg.drive.folders.leads,
        projects_folder = %cfg.drive.folders.projects,
        numbering_seed = cfg.numbering.seed,
        won_stage_id = ?cfg.leads.won_stage_id,
        proxy = %cfg.drive.proxy.as_ref().map_or("<none>", |u| u.as_str()),
    );
    if cfg.leads.won_stage_id.is_none() {
        warn!("leads.won_stage_id is not set; moving folders to Projects is not gated by stage");
    }

    let db = leaddrive::db::spawn(&cfg.basic.database_url).await?;
    let gateway: Arc<dyn DriveGateway> = Arc::new(GoogleDriveClient::new(&cfg.drive)?);
    let service = LeadDriveService::new(db, gateway, LeadDriveSettings::from(&cfg));

    let app = leaddrive_router(LeadDriveState::new(service));

    let addr = SocketAddr::from((cfg.basic.listen_addr, cfg.basic.listen_port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server has shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
