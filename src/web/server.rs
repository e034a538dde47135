//! HTTP server implementation

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use super::handlers::{
    delete_handler, exists_handler, expire_handler, get_handler, get_key_handler,
    get_unique_handler, help_handler, set_handler, set_unique_handler, ttl_handler,
};
use crate::store::StoreEngine;

/// Run the HTTP server
pub async fn run_web_server(addr: &str, engine: Arc<StoreEngine>) -> anyhow::Result<()> {
    let app = Router::new()
        .route("/get/:key", get(get_handler))
        .route("/getuq/:key", get(get_unique_handler))
        .route("/getkey/:value", get(get_key_handler))
        .route("/set/:key", post(set_handler))
        .route("/setuq/:key", post(set_unique_handler))
        .route("/delete/:key", delete(delete_handler))
        .route("/exists/:key", get(exists_handler))
        .route("/ttl/:key", get(ttl_handler))
        .route("/expire/:key", post(expire_handler))
        .route("/help", get(help_handler))
        .layer(CorsLayer::permissive())
        .with_state(engine);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP interface available at http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
