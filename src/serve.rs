use std::path::PathBuf;

use axum::Router;
use axum::http::{Method, header};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::error::ReviseError;

/// Publishes the data directory over HTTP. The consuming site lives on a
/// different origin, so every response carries permissive CORS headers.
pub fn run(data_dir: PathBuf, host: &str, port: u16) -> Result<(), ReviseError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind((host, port)).await?;
        tracing::info!("serving {} at http://{host}:{port}", data_dir.display());
        axum::serve(listener, router(data_dir)).await
    })?;

    Ok(())
}

fn router(data_dir: PathBuf) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .fallback_service(ServeDir::new(data_dir))
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::router;

    #[test]
    fn router_builds_for_any_directory() {
        let _ = router(std::path::PathBuf::from("./data"));
    }
}
