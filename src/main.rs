mod config;
mod error;
mod model;
mod registry;
mod routes;
mod utils;

use axum::routing::{get, post};
use axum::{serve, Router};
use config::Config;
use dotenvy::dotenv;
use registry::Registry;
use routes::{
    create_link, get_link_statistics, health, home, list_links, redirect, shorten_form, AppState,
};
use tokio::net::TcpListener;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_TRACING_LEVEL: &str = "url_shortener=debug,tower_http=debug";

#[tokio::main]
async fn main() {
    _ = dotenv();
    configure_tracing();
    let config = Config::from_env().expect("Loading configuration failed");
    let listener = create_listener(&config.server_address).await;
    let state = AppState::new(Registry::new(), config);
    let router = create_router(state.clone());
    serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed to start");
    tracing::info!(
        "Shut down with {} short links in memory",
        state.registry.len()
    );
}

fn configure_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or(DEFAULT_TRACING_LEVEL.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn create_listener(server_address: &str) -> TcpListener {
    let listener = TcpListener::bind(&server_address)
        .await
        .expect("Creating tcp listener failed");
    tracing::info!("Listening on address: {}", server_address);
    listener
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/shorten", post(shorten_form))
        .route("/api/shorten", post(create_link))
        .route("/api/stats/:code", get(get_link_statistics))
        .route("/api/urls", get(list_links))
        .route("/health", get(health))
        .route("/:code", get(redirect))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Listening for ctrl-c failed: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!("Listening for SIGTERM failed: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use serde_json::Value;
    use tower::ServiceExt;

    const BASE_URL: &str = "http://sho.rt";

    fn test_state() -> AppState {
        let config = Config {
            app_name: "Test Shortener".into(),
            base_url: BASE_URL.into(),
            server_address: "127.0.0.1:0".into(),
        };
        AppState::new(Registry::new(), config)
    }

    async fn send(state: &AppState, request: Request<Body>) -> Response {
        create_router(state.clone()).oneshot(request).await.unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn json_post(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn api_shorten_returns_code_and_short_url() {
        let state = test_state();
        let request = json_post("/api/shorten", r#"{"url":"https://example.com/a/b/c"}"#);
        let response = send(&state, request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let code = body["code"].as_str().unwrap();
        assert_eq!(code.len(), 6);
        assert_eq!(body["short_url"], format!("{BASE_URL}/{code}"));
        assert_eq!(body["original_url"], "https://example.com/a/b/c");
        assert!(body["created_at"].is_string());
        assert_eq!(state.registry.len(), 1);
    }

    #[tokio::test]
    async fn api_shorten_rejects_missing_and_invalid_urls() {
        let state = test_state();
        for body in ["{}", "not json", ""] {
            let response = send(&state, json_post("/api/shorten", body)).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body:?}");
            assert_eq!(json_body(response).await["error"], "URL is required");
        }

        let response = send(&state, json_post("/api/shorten", r#"{"url":"ftp://x"}"#)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["error"],
            "Invalid URL. Must start with http:// or https://"
        );
        assert_eq!(state.registry.len(), 0);
    }

    #[tokio::test]
    async fn redirect_counts_clicks() {
        let state = test_state();
        let code = state.registry.shorten("https://example.com/target").unwrap().code;

        for _ in 0..3 {
            let response = send(&state, get_request(&format!("/{code}"))).await;
            assert_eq!(response.status(), StatusCode::FOUND);
            assert_eq!(response.headers()[header::LOCATION], "https://example.com/target");
        }

        let response = send(&state, get_request(&format!("/api/stats/{code}"))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["clicks"], 3);
        assert_eq!(body["original_url"], "https://example.com/target");
        assert_eq!(body["short_url"], format!("{BASE_URL}/{code}"));
        assert_eq!(state.registry.stats(&code).unwrap().click_count, 3);
    }

    #[tokio::test]
    async fn redirect_escapes_control_characters_in_location() {
        let state = test_state();
        let request = json_post("/api/shorten", r#"{"url":"https://example.com/a\nb"}"#);
        let body = json_body(send(&state, request).await).await;
        let code = body["code"].as_str().unwrap().to_string();
        assert_eq!(state.registry.stats(&code).unwrap().target_url, "https://example.com/a\nb");

        let response = send(&state, get_request(&format!("/{code}"))).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "https://example.com/a%0Ab");
        assert_eq!(state.registry.stats(&code).unwrap().click_count, 1);
    }

    #[tokio::test]
    async fn unknown_codes_are_not_found() {
        let state = test_state();

        let response = send(&state, get_request("/doesnotexist")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(&state, get_request("/api/stats/doesnotexist")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"], "URL not found");
    }

    #[tokio::test]
    async fn listing_preserves_creation_order() {
        let state = test_state();
        let codes: Vec<String> = (0..3)
            .map(|i| state.registry.shorten(&format!("https://example.com/{i}")).unwrap().code)
            .collect();

        let body = json_body(send(&state, get_request("/api/urls")).await).await;
        assert_eq!(body["total"], 3);
        let listed: Vec<&str> = body["urls"]
            .as_array()
            .unwrap()
            .iter()
            .map(|url| url["code"].as_str().unwrap())
            .collect();
        assert_eq!(listed, codes);
    }

    #[tokio::test]
    async fn form_submission_redirects_home() {
        let state = test_state();
        let form = |body: &str| {
            Request::post("/shorten")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap()
        };

        let response = send(&state, form("url=https%3A%2F%2Fexample.com")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");

        let response = send(&state, form("url=not-a-url")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let bare = Request::post("/shorten").body(Body::empty()).unwrap();
        let response = send(&state, bare).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");

        let links = state.registry.list_all();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].target_url, "https://example.com");
    }

    #[tokio::test]
    async fn home_shows_totals_and_newest_five() {
        let state = test_state();
        let codes: Vec<String> = (0..7)
            .map(|i| state.registry.shorten(&format!("https://example.com/{i}")).unwrap().code)
            .collect();
        state.registry.resolve(&codes[6]).unwrap();

        let body = json_body(send(&state, get_request("/")).await).await;
        assert_eq!(body["app_name"], "Test Shortener");
        assert_eq!(body["total_urls"], 7);
        assert_eq!(body["total_clicks"], 1);
        let recent: Vec<&str> = body["recent_urls"]
            .as_array()
            .unwrap()
            .iter()
            .map(|url| url["code"].as_str().unwrap())
            .collect();
        let expected: Vec<&str> = codes[2..].iter().rev().map(String::as_str).collect();
        assert_eq!(recent, expected);
        assert_eq!(body["recent_urls"][0]["clicks"], 1);
    }

    #[tokio::test]
    async fn health_reports_in_memory_store() {
        let state = test_state();
        state.registry.shorten("https://example.com").unwrap();

        let response = send(&state, get_request("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["app"], "Test Shortener");
        assert_eq!(body["total_urls"], 1);
        assert_eq!(body["database"], "in-memory");
    }
}
