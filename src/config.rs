use crate::error::ConfigError;
use std::env;
use url::Url;

const DEFAULT_APP_NAME: &str = "URL Shortener";
const DEFAULT_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub app_name: String,
    pub base_url: String,
    pub server_address: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(get_env)
    }

    /// Builds the configuration from any variable source. `lookup` returns
    /// `Ok(None)` for unset names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Result<Option<String>, ConfigError>,
    {
        let app_name = lookup("APP_NAME")?.unwrap_or_else(|| DEFAULT_APP_NAME.into());
        let base_url = parse_base_url(
            &lookup("BASE_URL")?.unwrap_or_else(|| DEFAULT_BASE_URL.into()),
        )?;
        let server_address = match lookup("SERVER_ADDRESS")? {
            Some(address) => address,
            None => {
                let port = match lookup("PORT")? {
                    Some(value) => value
                        .trim()
                        .parse::<u16>()
                        .map_err(|_| ConfigError::InvalidPort { value })?,
                    None => DEFAULT_PORT,
                };
                format!("0.0.0.0:{port}")
            }
        };
        Ok(Self {
            app_name,
            base_url,
            server_address,
        })
    }
}

fn get_env(name: &'static str) -> Result<Option<String>, ConfigError> {
    match env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode { name }),
    }
}

fn parse_base_url(text: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        value: text.to_string(),
        reason,
    };
    let url = Url::parse(text).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    Ok(text.trim_end_matches('/').to_string())
}
