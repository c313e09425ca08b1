use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use axum::routing::get;
use axum::Router;
use clap::Parser;
use tower_http::services::ServeDir;

mod handlers;
mod history;
mod hub;
mod sessions;
mod state;
mod wire;

use crate::handlers::{
    default_ws_handler, ping_handler, root_handler, session_handler, ws_handler,
};
use crate::state::AppState;

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,
    #[arg(long, default_value = "0.0.0.0")]
    bind: IpAddr,
    #[arg(long)]
    public_dir: Option<PathBuf>,
}

pub fn router(state: AppState, public_dir: PathBuf) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/ping", get(ping_handler))
        .route("/s/:session_id", get(session_handler))
        .route("/ws", get(default_ws_handler))
        .route("/ws/:session_id", get(ws_handler))
        .fallback_service(ServeDir::new(public_dir).append_index_html_on_directories(true))
        .with_state(state)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "driftboard_server=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();
    let public_dir = args
        .public_dir
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../public"));
    let state = AppState::new(public_dir.join("index.html"));
    let app = router(state, public_dir);

    let addr = SocketAddr::new(args.bind, args.port);
    tracing::info!(%addr, "driftboard listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server");
    axum::serve(listener, app).await.expect("Server crashed");
}
