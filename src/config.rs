//! Environment-driven configuration

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

const DEFAULT_BASE_URL: &str = "https://www.sharewood.tv";
const DEFAULT_DOWNLOAD_DIR: &str = "~/Downloads/Sharewood";
const DEFAULT_BROWSER_TIMEOUT_SECS: u64 = 30;
const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 10;

/// Resolved configuration, built once at startup and passed by reference
/// into each component.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub login_url: String,
    pub logout_url: String,
    pub torrents_url: String,
    pub username: String,
    pub password: String,
    pub download_dir: PathBuf,
    /// Page-load timeout for the browser session.
    pub browser_timeout: Duration,
    /// Bounded-wait timeout for individual elements.
    pub wait_timeout: Duration,
    pub headless: bool,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// Checks a `.env` file in the current directory first, then the user
    /// config directory. `PSEUDO` and `PASSWORD` are required; everything
    /// else has a default derived from `SHAREWOOD_URL`.
    pub fn from_env() -> Result<Self> {
        if dotenvy::dotenv().is_err() {
            if let Some(config_dir) = dirs::config_dir() {
                let config_env = config_dir.join("sharewood-automator").join(".env");
                dotenvy::from_path(&config_env).ok();
            }
        }

        let base_url = var_or("SHAREWOOD_URL", DEFAULT_BASE_URL);
        let login_url = var_or("SHAREWOOD_LOGIN_URL", &format!("{}/login", base_url));
        let logout_url = var_or("SHAREWOOD_LOGOUT_URL", &format!("{}/logout", base_url));
        let torrents_url = var_or("SHAREWOOD_TORRENTS_URL", &format!("{}/torrents", base_url));

        let mut missing = Vec::new();
        let username = env::var("PSEUDO").unwrap_or_default();
        if username.is_empty() {
            missing.push("PSEUDO");
        }
        let password = env::var("PASSWORD").unwrap_or_default();
        if password.is_empty() {
            missing.push("PASSWORD");
        }
        if !missing.is_empty() {
            return Err(Error::Configuration(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let download_dir = expand_home(&var_or("DOWNLOAD_PATH", DEFAULT_DOWNLOAD_DIR));
        let browser_timeout = timeout_var("SHAREWOOD_BROWSER_TIMEOUT", DEFAULT_BROWSER_TIMEOUT_SECS)?;
        let wait_timeout = timeout_var("SHAREWOOD_WAIT_TIMEOUT", DEFAULT_WAIT_TIMEOUT_SECS)?;
        let headless = !matches!(
            env::var("SHAREWOOD_HEADLESS").as_deref(),
            Ok("0") | Ok("false") | Ok("no")
        );

        Ok(Self {
            base_url,
            login_url,
            logout_url,
            torrents_url,
            username,
            password,
            download_dir,
            browser_timeout,
            wait_timeout,
            headless,
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).ok().filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string())
}

fn timeout_var(key: &str, default_secs: u64) -> Result<Duration> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map(Duration::from_secs)
            .map_err(|_| Error::Configuration(format!("{} is not a number of seconds: `{}`", key, raw))),
        Err(_) => Ok(Duration::from_secs(default_secs)),
    }
}

/// Expand a leading `~/` to the user's home directory
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
