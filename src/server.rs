use crate::exposition::{
    render,
    CONTENT_TYPE,
};
use axum::{
    extract::State,
    http::{
        header,
        StatusCode,
    },
    response::{
        Html,
        IntoResponse,
    },
    routing::get,
    Router,
};
use color_eyre::{
    eyre::bail,
    Result,
};
use jellyfin_exporter_collector::Scraper;
use std::{
    net::SocketAddr,
    sync::Arc,
    time::Instant,
};
use tokio::net::TcpListener;

#[derive(Clone)]
pub struct AppState {
    pub scraper: Arc<Scraper>,
    pub metrics_path: String,
}

const LANDING_PATH: &str = "/";
const HEALTH_PATH: &str = "/healthz";

/// Fails when `metrics_path` is one of the fixed routes.
pub fn create_router(scraper: Arc<Scraper>, metrics_path: &str) -> Result<Router> {
    if [LANDING_PATH, HEALTH_PATH].contains(&metrics_path) {
        bail!("metrics path {metrics_path:?} collides with a built-in route");
    }

    let state = AppState {
        scraper,
        metrics_path: metrics_path.to_string(),
    };

    Ok(Router::new()
        .route(LANDING_PATH, get(landing))
        .route(HEALTH_PATH, get(healthz))
        .route(metrics_path, get(metrics))
        .with_state(state))
}

pub async fn serve(address: SocketAddr, metrics_path: &str, scraper: Arc<Scraper>) -> Result<()> {
    let app = create_router(scraper, metrics_path)?;
    let listener = TcpListener::bind(address).await?;

    info!("listening on {}{}", address, metrics_path);
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let samples = state.scraper.scrape().await;
    debug!(samples = samples.len(), elapsed = ?start.elapsed(), "scrape finished");
    match render(&samples) {
        Ok(body) => ([(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response(),
        Err(err) => {
            error!("failed to encode metrics: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

async fn landing(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html>\n<head><title>Jellyfin Exporter</title></head>\n<body>\n<h1>Jellyfin Exporter</h1>\n<p><a href=\"{path}\">Metrics</a></p>\n</body>\n</html>\n",
        path = state.metrics_path
    ))
}

async fn healthz() -> &'static str {
    "OK"
}
