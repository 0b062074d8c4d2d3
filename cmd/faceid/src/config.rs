//! Configuration loading.
//!
//! Configuration is stored in ~/.faceid/config.yaml. Every field is
//! optional; a missing file means all defaults.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use faceid_faceprint::{
    FaceGate, MatchConfig, DEFAULT_DIM, DEFAULT_PAGE_SIZE, DEFAULT_THRESHOLD,
};
use faceid_kv::RedbStore;
use serde::{Deserialize, Serialize};

/// Default base directory name under the home directory.
pub const DEFAULT_BASE_DIR: &str = ".faceid";
/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Default database filename, under `data/`.
pub const DEFAULT_DB_FILE: &str = "faceid.redb";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Embedding dimension produced by the extractor.
    pub dim: usize,

    /// Maximum cosine distance (exclusive) for two faces to match.
    pub threshold: f32,

    /// Database file. Default: ~/.faceid/data/faceid.redb
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,

    /// Prefix for every key this tool writes.
    pub key_prefix: String,

    /// HTTP listen address, e.g. ":8080" or "127.0.0.1:8080".
    pub listen: String,

    /// Records read per storage round trip during a scan.
    pub scan_page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dim: DEFAULT_DIM,
            threshold: DEFAULT_THRESHOLD,
            db_path: None,
            key_prefix: "faceid".to_string(),
            listen: ":8080".to_string(),
            scan_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Gets the default config directory.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(DEFAULT_BASE_DIR))
    }

    /// Gets the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        Self::default_dir().map(|dir| dir.join(DEFAULT_CONFIG_FILE))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.match_config().is_valid() {
            anyhow::bail!(
                "invalid matching config: dim must be positive and threshold in (0, 2], got dim={} threshold={}",
                self.dim,
                self.threshold
            );
        }
        if self.key_prefix.is_empty() || self.key_prefix.contains(':') {
            anyhow::bail!("key_prefix must be non-empty and must not contain ':'");
        }
        if self.scan_page_size == 0 {
            anyhow::bail!("scan_page_size must be positive");
        }
        Ok(())
    }

    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            dim: self.dim,
            threshold: self.threshold,
        }
    }

    /// Returns the configured database path, or the default one.
    pub fn resolve_db_path(&self) -> anyhow::Result<PathBuf> {
        match &self.db_path {
            Some(p) => Ok(p.clone()),
            None => Self::default_dir()
                .map(|dir| dir.join("data").join(DEFAULT_DB_FILE))
                .ok_or_else(|| anyhow::anyhow!("cannot determine home directory for db_path")),
        }
    }

    /// Opens the database and builds the engine on top of it.
    pub fn open_gate(&self) -> anyhow::Result<FaceGate> {
        let path = self.resolve_db_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let kv = RedbStore::open(&path)
            .with_context(|| format!("opening database {}", path.display()))?;
        tracing::debug!(path = %path.display(), "opened database");
        Ok(FaceGate::with_kv(
            self.match_config(),
            Arc::new(kv),
            &self.key_prefix,
            self.scan_page_size,
        ))
    }
}

/// Loads configuration from `custom_path`, or from the default location.
/// A missing file yields the defaults.
pub fn load_config(custom_path: Option<&str>) -> anyhow::Result<Config> {
    let config_path = match custom_path {
        Some(p) => PathBuf::from(p),
        None => Config::default_config_path()
            .ok_or_else(|| anyhow::anyhow!("cannot determine config path"))?,
    };
    let cfg = load_from(&config_path)?;
    cfg.validate()?;
    Ok(cfg)
}

fn load_from(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.yaml");
        let cfg = load_config(path.to_str()).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.dim, 512);
        assert_eq!(cfg.threshold, 0.35);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "threshold: 0.3\ndb_path: /tmp/x.redb\n").unwrap();
        let cfg = load_config(path.to_str()).unwrap();
        assert_eq!(cfg.threshold, 0.3);
        assert_eq!(cfg.dim, 512);
        assert_eq!(cfg.resolve_db_path().unwrap(), PathBuf::from("/tmp/x.redb"));
        assert_eq!(cfg.listen, ":8080");
    }

    #[test]
    fn invalid_threshold_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "threshold: -1.0\n").unwrap();
        assert!(load_config(path.to_str()).is_err());
    }

    #[test]
    fn invalid_prefix_rejected() {
        let cfg = Config {
            key_prefix: "a:b".into(),
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn open_gate_creates_database() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config {
            dim: 4,
            db_path: Some(dir.path().join("nested").join("db.redb")),
            ..Config::default()
        };
        let gate = cfg.open_gate().unwrap();
        assert_eq!(gate.enrolled().unwrap(), 0);
        assert_eq!(gate.config().dim, 4);
        assert!(dir.path().join("nested").join("db.redb").exists());
    }
}
