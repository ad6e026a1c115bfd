use clap::Parser;
use log::{info, warn};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;
use std::sync::Arc;

use cookbot::api::ApiClient;
use cookbot::core::config;
use cookbot::core::session::{self, FileStore};
use cookbot::core::state::App;
use cookbot::tui;

#[derive(Parser)]
#[command(name = "cookbot", about = "Terminal cooking assistant")]
struct Args {
    /// Backend base URL (overrides config file and COOKBOT_SERVER_URL)
    #[arg(short, long)]
    server: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to cookbot.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("cookbot.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            warn!("Falling back to default config: {}", e);
            Default::default()
        }
    };
    let resolved = config::resolve(&file_config, args.server.as_deref());
    info!("Cookbot starting up against {}", resolved.base_url);

    let backend =
        ApiClient::new(resolved.base_url.as_str(), resolved.timeout).map_err(std::io::Error::other)?;

    let store: Arc<FileStore> = Arc::new(match resolved.session_dir.clone() {
        Some(dir) => FileStore::open(dir)?,
        None => FileStore::open_default()?,
    });

    let session_id = session::load_or_create_session_id(&*store);
    let messages = session::load_messages(&*store, &session_id);
    info!(
        "Resumed session {} with {} stored messages",
        session_id,
        messages.len()
    );

    // Startup probe; never fatal; the user can still type and retry.
    let greeting = match backend.health().await {
        Ok(health) => {
            info!("Backend health: {}", health.status);
            String::from("Connected. Ask me anything about cooking!")
        }
        Err(e) => {
            warn!("Backend health check failed: {}", e);
            String::from("Backend unreachable right now. Replies may fail until it comes up.")
        }
    };

    let mut app = App::new(Arc::new(backend), store, session_id, messages);
    app.status_message = greeting;

    tui::run(app)
}
