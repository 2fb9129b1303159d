use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use log::info;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use sl_core::descriptor::DESCRIPTOR_PATH;
use sl_core::FilterDescriptor;

pub struct ServeOptions {
    pub bind: String,
    pub port: u16,
    pub static_dir: Option<String>,
}

pub fn run_serve(descriptor: FilterDescriptor, opts: ServeOptions) -> Result<(), String> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to start tokio runtime: {}", e))?;
    runtime.block_on(serve(descriptor, opts))
}

async fn serve(descriptor: FilterDescriptor, opts: ServeOptions) -> Result<(), String> {
    let addr: SocketAddr = format!("{}:{}", opts.bind, opts.port)
        .parse()
        .map_err(|e| format!("Invalid bind address '{}:{}': {}", opts.bind, opts.port, e))?;

    let count = descriptor.count;
    let app = router(descriptor, opts.static_dir.as_deref());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind {}: {}", addr, e))?;

    info!("Serving {} hosts at http://{}{}", count, addr, DESCRIPTOR_PATH);
    println!("Server is running on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| format!("Server error: {}", e))
}

/// The descriptor is built once by the caller and shared read-only.
pub fn router(descriptor: FilterDescriptor, static_dir: Option<&str>) -> Router {
    let state = Arc::new(descriptor);
    let mut app = Router::new()
        .route(DESCRIPTOR_PATH, get(get_descriptor))
        .with_state(state);

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true));
    }

    // Public data; pages on other origins may fetch it
    app.layer(CorsLayer::permissive())
}

async fn get_descriptor(State(descriptor): State<Arc<FilterDescriptor>>) -> Json<FilterDescriptor> {
    Json(descriptor.as_ref().clone())
}
