use std::sync::Arc;

use axum::{routing::get, Router};
use log::{error, info};
use tokio::net::TcpListener;

use wikitheme::handlers::{handle_page, handle_root, handle_static};
use wikitheme::logger::Logger;
use wikitheme::{AppState, Config, ThemeConfig, WikiError};

#[tokio::main]
async fn main() -> Result<(), WikiError> {
    if let Err(e) = Logger::init() {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let config = Config::from_env()?;
    if !config.base_dir.exists() {
        error!("Page directory {:?} does not exist", config.base_dir);
        return Err(WikiError::NotFound);
    }
    let theme = ThemeConfig::from_env();
    info!("Serving '{}' with theme '{}'", theme.sitename, theme.theme_name);

    let state = AppState {
        base_dir: config.base_dir.clone(),
        static_dir: config.static_dir.clone(),
        theme: Arc::new(theme),
        allow_write: config.allow_write,
    };

    let app = Router::new()
        .route("/", get(handle_root))
        .route("/static/*path", get(handle_static))
        .route("/*path", get(handle_page))
        .with_state(state);

    let addr = config.socket_addr();
    info!("Wiki listening on http://{}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await.map_err(WikiError::from)
}
