use crate::app_dirs::AppDirs;
use crate::game::GameConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub target_radius: f64,
    pub target_dwell_ms: u64,
    pub menu_dwell_ms: u64,
    pub speed_time_limit_secs: u32,
    pub record_stats: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            canvas_width: 640.0,
            canvas_height: 480.0,
            target_radius: 40.0,
            target_dwell_ms: 1000,
            menu_dwell_ms: 2000,
            speed_time_limit_secs: 60,
            record_stats: true,
        }
    }
}

impl From<&Config> for GameConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            width: cfg.canvas_width,
            height: cfg.canvas_height,
            radius: cfg.target_radius,
            target_dwell: Duration::from_millis(cfg.target_dwell_ms),
            menu_dwell: Duration::from_millis(cfg.menu_dwell_ms),
            speed_time_limit: cfg.speed_time_limit_secs,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("snoot_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
