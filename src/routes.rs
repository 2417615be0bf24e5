use crate::config::Config;
use crate::error::AppError;
use crate::model::{
    HealthStatus, HomeSummary, RecentUrl, ShortLink, ShortenRequest, ShortenResponse,
    StatsResponse, UrlListing,
};
use crate::registry::Registry;
use crate::utils::{location_header, short_url, truncate_for_display};
use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use chrono::Utc;
use std::sync::Arc;

const RECENT_LIMIT: usize = 5;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(registry: Registry, config: Config) -> Self {
        Self {
            registry: Arc::new(registry),
            config: Arc::new(config),
        }
    }

    fn stats_response(&self, link: ShortLink) -> StatsResponse {
        StatsResponse {
            short_url: short_url(&self.config.base_url, &link.code),
            code: link.code,
            original_url: link.target_url,
            clicks: link.click_count,
        }
    }
}

pub async fn home(State(state): State<AppState>) -> Json<HomeSummary> {
    let totals = state.registry.totals();
    let recent_urls = state
        .registry
        .recent(RECENT_LIMIT)
        .into_iter()
        .map(|link| RecentUrl {
            short_url: short_url(&state.config.base_url, &link.code),
            original: truncate_for_display(&link.target_url),
            code: link.code,
            clicks: link.click_count,
        })
        .collect();
    Json(HomeSummary {
        app_name: state.config.app_name.clone(),
        base_url: state.config.base_url.clone(),
        total_urls: totals.links,
        total_clicks: totals.clicks,
        recent_urls,
    })
}

pub async fn redirect(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Response, AppError> {
    let target_url = state.registry.resolve(&code)?;
    tracing::debug!("Redirecting {} to {}", code, target_url);
    let location = HeaderValue::try_from(location_header(&target_url))?;
    Ok((
        StatusCode::FOUND,
        [
            (header::LOCATION, location),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
        ],
    )
        .into_response())
}

// Always lands back on `/`, whatever the body.
pub async fn shorten_form(
    State(state): State<AppState>,
    request: Result<Form<ShortenRequest>, FormRejection>,
) -> Redirect {
    let url = request.ok().and_then(|Form(request)| request.url);
    match url.as_deref() {
        Some(url) => {
            if let Err(err) = state.registry.shorten(url) {
                tracing::debug!("Ignoring form submission: {}", err);
            }
        }
        None => tracing::debug!("Ignoring form submission without url"),
    }
    Redirect::to("/")
}

pub async fn create_link(
    State(state): State<AppState>,
    request: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<Json<ShortenResponse>, AppError> {
    let url = request
        .ok()
        .and_then(|Json(request)| request.url)
        .ok_or(AppError::MissingUrl)?;
    let link = state.registry.shorten(&url)?;
    Ok(Json(ShortenResponse {
        short_url: short_url(&state.config.base_url, &link.code),
        code: link.code,
        original_url: link.target_url,
        created_at: link.created_at,
    }))
}

pub async fn get_link_statistics(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<StatsResponse>, AppError> {
    let stats = state.registry.stats(&code)?;
    Ok(Json(StatsResponse {
        short_url: short_url(&state.config.base_url, &code),
        code,
        original_url: stats.target_url,
        clicks: stats.click_count,
    }))
}

pub async fn list_links(State(state): State<AppState>) -> Json<UrlListing> {
    let urls: Vec<StatsResponse> = state
        .registry
        .list_all()
        .into_iter()
        .map(|link| state.stats_response(link))
        .collect();
    Json(UrlListing {
        total: urls.len(),
        urls,
    })
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthStatus {
        status: "healthy".into(),
        app: state.config.app_name.clone(),
        timestamp: Utc::now(),
        total_urls: state.registry.len(),
        database: "in-memory".into(),
    })
}
