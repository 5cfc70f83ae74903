use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

pub const ENV_DATA_DIR: &str = "SPROUT_DATA_DIR";
pub const ENV_REMOTE_URL: &str = "SPROUT_REMOTE_URL";
pub const ENV_USER_ID: &str = "SPROUT_USER_ID";
pub const ENV_GEMINI_API_KEY: &str = "SPROUT_GEMINI_API_KEY";

pub struct Config {
    pub db_path: PathBuf,
    pub server_db_path: PathBuf,
    pub remote_url: Option<String>,
    pub user_id: Option<String>,
    pub gemini_api_key: Option<String>,
}

impl Config {
    /// Resolve paths and credentials. Flags win over the environment.
    pub fn load(remote_url: Option<String>, user_id: Option<String>) -> Result<Self> {
        let data_dir = match env_var(ENV_DATA_DIR) {
            Some(dir) => PathBuf::from(dir),
            None => ProjectDirs::from("", "", "sprout")
                .context("Could not determine home directory")?
                .data_dir()
                .to_path_buf(),
        };
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        Ok(Config {
            db_path: data_dir.join("sprout.db"),
            server_db_path: data_dir.join("sprout-server.db"),
            remote_url: remote_url.or_else(|| env_var(ENV_REMOTE_URL)),
            user_id: non_empty(user_id).or_else(|| env_var(ENV_USER_ID)),
            gemini_api_key: env_var(ENV_GEMINI_API_KEY),
        })
    }
}

fn env_var(name: &str) -> Option<String> {
    non_empty(std::env::var(name).ok())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
