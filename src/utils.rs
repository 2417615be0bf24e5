use percent_encoding::{utf8_percent_encode, CONTROLS};
use rand::distributions::Alphanumeric;
use rand::Rng;

const ALLOWED_SCHEMES: [&str; 2] = ["http://", "https://"];
const DISPLAY_URL_MAX_CHARS: usize = 50;

pub fn generate_code(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

// literal prefix check, never normalized
pub fn is_valid_url(text: &str) -> bool {
    ALLOWED_SCHEMES
        .iter()
        .any(|scheme| text.starts_with(scheme))
}

pub fn short_url(base_url: &str, code: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), code)
}

// Control and non-ascii bytes are not allowed in a header value.
pub fn location_header(target_url: &str) -> String {
    utf8_percent_encode(target_url, CONTROLS).to_string()
}

pub fn truncate_for_display(url: &str) -> String {
    match url.char_indices().nth(DISPLAY_URL_MAX_CHARS) {
        Some((cut, _)) => format!("{}...", &url[..cut]),
        None => url.to_string(),
    }
}
