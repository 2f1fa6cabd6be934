//! HTTP front end of the image server
//!
//! Routes:
//! - `GET /get` - one random image, or 404 when none is available
//! - `GET /status` - status of the server, the blacklist and all crawlers
//! - `GET /status/:what` - one of `server`, `blacklist` or `crawlers`
//! - `GET /reset` - request a reset of the pool
//! - `GET /` - a plain text banner

use crate::server::{ImageResponse, Server};
use crate::pool::ImageExtra;
use axum::extract::{Path, State};
use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::map_response;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;

/// Image as handed out by `/get`
#[derive(Debug, Serialize)]
struct GetResponse {
    uri: String,
    is_generic: bool,
    source: Option<String>,
    extra: ImageExtra,
    crawler: CrawlerRef,
}

#[derive(Debug, Serialize)]
struct CrawlerRef {
    id: usize,
    #[serde(rename = "type")]
    kind: &'static str,
}

impl From<ImageResponse> for GetResponse {
    fn from(response: ImageResponse) -> Self {
        let ImageResponse { image, source } = response;
        Self {
            uri: image.uri().to_string(),
            is_generic: image.is_generic(),
            source: image.source().map(str::to_string),
            extra: image.extra().clone(),
            crawler: CrawlerRef {
                id: source.id(),
                kind: source.kind(),
            },
        }
    }
}

/// Builds the router serving `server`
///
/// # Arguments
///
/// * `server` - The image server to expose
/// * `develop` - Allow cross-origin requests from anywhere
pub fn router(server: Arc<Server>, develop: bool) -> Router {
    let router = Router::new()
        .route("/", get(root))
        .route("/get", get(get_image))
        .route("/status", get(status))
        .route("/status/:what", get(status_of))
        .route("/reset", get(reset))
        .with_state(server)
        .layer(map_response(no_cache));

    if develop {
        router.layer(map_response(allow_any_origin))
    } else {
        router
    }
}

/// Binds `hostname:port` and serves `app` until `shutdown` resolves
pub async fn serve<F>(app: Router, hostname: &str, port: u16, shutdown: F) -> crate::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind((hostname, port)).await?;
    tracing::info!("Serving on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn no_cache(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store"));
    response
}

async fn allow_any_origin(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

async fn root() -> String {
    format!(
        "Image-Soup {}\n\n\
         GET /get            a random image\n\
         GET /status         server, blacklist and crawler status\n\
         GET /status/<what>  one of server, blacklist, crawlers\n\
         GET /reset          reset the pool\n",
        env!("CARGO_PKG_VERSION")
    )
}

async fn get_image(State(server): State<Arc<Server>>) -> Response {
    match server.get_image() {
        Some(image) => Json(GetResponse::from(image)).into_response(),
        None => {
            tracing::debug!("No image available");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

async fn status(State(server): State<Arc<Server>>) -> Json<serde_json::Value> {
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "server": server.server_status(),
        "blacklist": server.blacklist_status(),
        "crawlers": server.crawler_status(),
    }))
}

async fn status_of(
    State(server): State<Arc<Server>>,
    Path(what): Path<String>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let status = match what.as_str() {
        "server" => json!(server.server_status()),
        "blacklist" => json!(server.blacklist_status()),
        "crawlers" => json!(server.crawler_status()),
        _ => return Err(StatusCode::NOT_FOUND),
    };
    Ok(Json(status))
}

async fn reset(State(server): State<Arc<Server>>) -> impl IntoResponse {
    Json(server.request_reset().await)
}
