use clap::Parser;
use tracing::{error, info};

use skylark_rs::app::AppStore;
use skylark_rs::client::{CmsClient, SyncConfig};
use skylark_rs::models::{SessionStatus, SyncStatus};

#[derive(Parser)]
#[command(name = "sync_session")]
#[command(about = "Upload one finished session to the configured CMS backend")]
struct Args {
    /// Id of the session to upload
    #[arg(short, long)]
    session_id: String,

    /// Database path (or set SKYLARK_DB_PATH env var)
    #[arg(long)]
    db_path: Option<String>,

    /// Also upload sessions that are still active
    #[arg(long, default_value = "false")]
    allow_active: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(format!("skylark_rs={}", args.log_level))
        .init();

    let db_path = args.db_path.unwrap_or_else(|| {
        std::env::var("SKYLARK_DB_PATH").unwrap_or_else(|_| "skylark.db".to_string())
    });

    let mut app = AppStore::open(&db_path)?;

    let Some(session) = app.session(&args.session_id) else {
        error!("No session with id {}", args.session_id);
        std::process::exit(1);
    };
    if session.status == SessionStatus::Active && !args.allow_active {
        error!(
            "Session {} is still active; finish it first or pass --allow-active",
            args.session_id
        );
        std::process::exit(1);
    }

    info!("🚀 Starting session upload");
    info!("   Session: {} ({})", session.name, session.id);
    info!("   Sightings: {}", session.sightings.len());

    let config = match SyncConfig::from_account_or_env(app.user()) {
        Ok(config) => config,
        Err(e) => {
            error!("No usable credentials: {}", e);
            std::process::exit(1);
        }
    };
    let client = CmsClient::new(config)?;

    if !client.authenticate().await? {
        error!("Credentials rejected by the backend");
        std::process::exit(1);
    }

    let status = app.sync_session(&args.session_id, &client).await?;
    match status {
        SyncStatus::Synced => {
            let remote_id = app.session(&args.session_id).and_then(|s| s.remote_id);
            info!("✅ Session synced, remote id {:?}", remote_id);
        }
        _ => {
            error!("❌ Sync failed; session marked with sync_status = error");
            std::process::exit(1);
        }
    }

    Ok(())
}
