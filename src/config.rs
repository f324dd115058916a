use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// User resolved into the session for user-scoped commands. Set by `login`.
    #[serde(default)]
    pub current_user_id: Option<i64>,

    /// Currency assigned to users created through `login`.
    #[serde(default = "default_currency")]
    pub default_currency: String,

    #[serde(default = "default_transaction_list_limit")]
    pub transaction_list_limit: usize,

    #[serde(default = "default_progress_bar_width")]
    pub progress_bar_width: usize,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_transaction_list_limit() -> usize {
    10
}

fn default_progress_bar_width() -> usize {
    25
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            current_user_id: None,
            default_currency: default_currency(),
            transaction_list_limit: default_transaction_list_limit(),
            progress_bar_width: default_progress_bar_width(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl AppPaths {
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("fintrack.sqlite3")
    }
}

pub fn app_paths(override_home: Option<PathBuf>) -> Result<AppPaths> {
    if let Some(home) = override_home {
        return Ok(AppPaths {
            config_dir: home.join("config"),
            data_dir: home.join("data"),
        });
    }

    let proj = ProjectDirs::from("com", "fintrack", "fintrack")
        .context("Failed to resolve platform directories")?;

    Ok(AppPaths {
        config_dir: proj.config_dir().to_path_buf(),
        data_dir: proj.data_dir().to_path_buf(),
    })
}

pub fn load_or_init_config(paths: &AppPaths) -> Result<(AppConfig, PathBuf)> {
    fs::create_dir_all(&paths.config_dir)
        .with_context(|| format!("Failed to create config dir {}", paths.config_dir.display()))?;

    let cfg_path = paths.config_dir.join("config.json");
    if !cfg_path.exists() {
        let cfg = AppConfig::default();
        write_config(&cfg_path, &cfg)?;
        tracing::debug!(path = %cfg_path.display(), "wrote default config");
        return Ok((cfg, cfg_path));
    }

    let raw = fs::read_to_string(&cfg_path)
        .with_context(|| format!("Failed to read {}", cfg_path.display()))?;
    let cfg: AppConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", cfg_path.display()))?;

    Ok((cfg, cfg_path))
}

pub fn write_config(path: &Path, cfg: &AppConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(cfg)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn older_config_files_get_defaults() {
        let cfg: AppConfig = serde_json::from_str(r#"{"current_user_id": 7}"#).expect("parse");
        assert_eq!(cfg.current_user_id, Some(7));
        assert_eq!(cfg.default_currency, "USD");
        assert_eq!(cfg.transaction_list_limit, 10);
        assert_eq!(cfg.progress_bar_width, 25);
    }

    #[test]
    fn home_override_places_config_and_data_inside() {
        let home = tempfile::tempdir().expect("tempdir");
        let paths = app_paths(Some(home.path().to_path_buf())).expect("paths");
        let (cfg, cfg_path) = load_or_init_config(&paths).expect("config");
        assert!(cfg_path.starts_with(home.path()));
        assert!(cfg_path.exists());
        assert!(cfg.current_user_id.is_none());
        assert_eq!(paths.db_path(), home.path().join("data").join("fintrack.sqlite3"));
    }
}
