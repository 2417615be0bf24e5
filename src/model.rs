use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortLink {
    pub code: String,
    pub target_url: String,
    pub click_count: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkStats {
    pub target_url: String,
    pub click_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub links: usize,
    pub clicks: u64,
}

#[derive(Deserialize)]
pub struct ShortenRequest {
    pub url: Option<String>,
}

#[derive(Serialize)]
pub struct ShortenResponse {
    pub short_url: String,
    pub code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub code: String,
    pub original_url: String,
    pub clicks: u64,
    pub short_url: String,
}

#[derive(Serialize)]
pub struct UrlListing {
    pub urls: Vec<StatsResponse>,
    pub total: usize,
}

#[derive(Serialize)]
pub struct RecentUrl {
    pub code: String,
    pub short_url: String,
    pub original: String,
    pub clicks: u64,
}

#[derive(Serialize)]
pub struct HomeSummary {
    pub app_name: String,
    pub base_url: String,
    pub total_urls: usize,
    pub total_clicks: u64,
    pub recent_urls: Vec<RecentUrl>,
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub app: String,
    pub timestamp: DateTime<Utc>,
    pub total_urls: usize,
    pub database: String,
}
