use std::env;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use dotenvy::dotenv;
use url::Url;

use crate::error::ConfigError;
use crate::table::PAGE_SIZE_OPTIONS;

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub session_file: PathBuf,
    pub page_size: u32,
    pub timeout: Option<Duration>,
}

pub fn load_env() {
    if let Ok(path) = dotenv() {
        tracing::debug!(path = %path.display(), "loaded .env file");
    }
}

fn get_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = get_env("BROKECOIN_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(&api_url).map_err(|e| ConfigError::Invalid {
            key: "BROKECOIN_API_URL",
            reason: e.to_string(),
        })?;

        let session_file = match get_env("BROKECOIN_SESSION_FILE") {
            Some(path) => PathBuf::from(path),
            None => default_session_file()?,
        };

        let page_size = match get_env("BROKECOIN_PAGE_SIZE") {
            Some(raw) => parse_page_size(&raw)?,
            None => DEFAULT_PAGE_SIZE,
        };

        let timeout = match get_env("BROKECOIN_HTTP_TIMEOUT_SECS") {
            Some(raw) => Some(Duration::from_secs(raw.parse().map_err(|_| {
                ConfigError::Invalid {
                    key: "BROKECOIN_HTTP_TIMEOUT_SECS",
                    reason: format!("`{raw}` is not a number of seconds"),
                }
            })?)),
            None => None,
        };

        Ok(Config {
            api_url,
            session_file,
            page_size,
            timeout,
        })
    }
}

fn default_session_file() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("com", "brokecoin", "brokecoin-admin")
        .ok_or(ConfigError::NoConfigDir)?;
    Ok(dirs.config_dir().join("session.json"))
}

fn parse_page_size(raw: &str) -> Result<u32, ConfigError> {
    let invalid = || ConfigError::Invalid {
        key: "BROKECOIN_PAGE_SIZE",
        reason: format!("`{raw}` is not one of {PAGE_SIZE_OPTIONS:?}"),
    };
    let size: u32 = raw.trim().parse().map_err(|_| invalid())?;
    if PAGE_SIZE_OPTIONS.contains(&size) {
        Ok(size)
    } else {
        Err(invalid())
    }
}
