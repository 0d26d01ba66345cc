use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Default backend address (the dev server the client was written against)
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Resolved runtime settings: where the backend lives and where the bearer
/// token is kept between invocations.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub token_path: PathBuf,
}

impl Config {
    /// Resolve settings: CLI flag first, then environment, then defaults.
    pub fn resolve(api_url_flag: Option<String>) -> Result<Self> {
        let api_url = api_url_flag
            .or_else(|| env::var("PROPLIST_API_URL").ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let token_path = match env::var_os("PROPLIST_TOKEN_PATH") {
            Some(path) => PathBuf::from(path),
            None => dirs::config_dir()
                .context("Could not determine a config directory for the token file")?
                .join("proplist")
                .join("token"),
        };

        Ok(Self {
            api_url,
            token_path,
        })
    }
}
