use anyhow::{Context, Result};
use clap::Parser;
use huddle_core::IceServerConfig;
use huddle_server::{AppState, DEFAULT_MAX_UPLOAD_BYTES, HubConfig, UploadSettings, router};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "huddle", version, about = "Room chat and WebRTC signaling server")]
struct Config {
    #[arg(long, env = "HUDDLE_BIND", default_value = "0.0.0.0:3000")]
    bind: SocketAddr,

    /// Used when RUST_LOG is not set.
    #[arg(long, env = "HUDDLE_LOG", default_value = "info")]
    log_level: String,

    #[arg(long, env = "HUDDLE_TYPING_TIMEOUT_MS", default_value_t = 3000)]
    typing_timeout_ms: u64,

    #[arg(long, env = "HUDDLE_ROOM_IDLE_SECS", default_value_t = 60)]
    room_idle_secs: u64,

    #[arg(long, env = "HUDDLE_UPLOAD_DIR", default_value = "./uploads")]
    upload_dir: PathBuf,

    #[arg(long, env = "HUDDLE_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    max_upload_bytes: usize,

    #[arg(long, env = "STUN_URL", default_value = "stun:stun.l.google.com:19302")]
    stun_url: String,

    #[arg(long, env = "TURN_URL")]
    turn_url: Option<String>,

    #[arg(long, env = "TURN_USERNAME", requires = "turn_url")]
    turn_username: Option<String>,

    #[arg(long, env = "TURN_CREDENTIAL", requires = "turn_url")]
    turn_credential: Option<String>,
}

impl Config {
    fn ice_servers(&self) -> Vec<IceServerConfig> {
        let mut servers = vec![IceServerConfig::stun(self.stun_url.clone())];
        if let Some(url) = &self.turn_url {
            servers.push(IceServerConfig {
                urls: vec![url.clone()],
                username: self.turn_username.clone(),
                credential: self.turn_credential.clone(),
            });
        }
        servers
    }

    fn hub_config(&self) -> HubConfig {
        HubConfig {
            ice_servers: self.ice_servers(),
            typing_timeout: Duration::from_millis(self.typing_timeout_ms),
            room_idle: Duration::from_secs(self.room_idle_secs),
            ..HubConfig::default()
        }
    }

    fn upload_settings(&self) -> UploadSettings {
        UploadSettings {
            dir: self.upload_dir.clone(),
            max_bytes: self.max_upload_bytes,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let uploads = config.upload_settings();
    tokio::fs::create_dir_all(&uploads.dir)
        .await
        .with_context(|| format!("Failed to create upload dir {}", uploads.dir.display()))?;

    let state = AppState::new(config.hub_config(), uploads);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("Huddle listening on http://{}", config.bind);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
