use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::identity::USERLIST_MAXLINESIZE;

pub const ENV_CONFIG_DIR: &str = "CELLGUARD_CONFIG_DIR";
pub const ENV_LOCAL_DIR: &str = "CELLGUARD_LOCAL_DIR";
pub const ENV_LOCK_TIMEOUT_MS: &str = "CELLGUARD_LOCK_TIMEOUT_MS";
pub const ENV_CELL_NAME: &str = "CELLGUARD_CELL";

/// Identity of the local cell, used to decide whether a ticket realm is local.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CellConfig {
    pub name: String,
    /// Additional realms treated as local besides the upper-cased cell name.
    pub local_realms: Vec<String>,
    /// Principals (`name[.instance]@REALM`) that never count as local even
    /// when their realm does.
    pub excluded_principals: Vec<String>,
}

/// Server-side settings for the super-user gate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GateConfig {
    /// Cell configuration directory holding the user list.
    pub config_dir: PathBuf,
    /// Server-local state directory holding the no-auth marker.
    pub local_dir: PathBuf,
    pub userlist_file: String,
    pub noauth_file: String,
    pub max_line_size: usize,
    /// Upper bound on waiting for the user list lock during one operation.
    pub lock_timeout_ms: u64,
    pub cell: CellConfig,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("/usr/afs/etc"),
            local_dir: PathBuf::from("/usr/afs/local"),
            userlist_file: "UserList".to_string(),
            noauth_file: "NoAuth".to_string(),
            max_line_size: USERLIST_MAXLINESIZE,
            lock_timeout_ms: 5_000,
            cell: CellConfig::default(),
        }
    }
}

impl GateConfig {
    /// Defaults rooted at a single directory; handy for tests and tooling.
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            config_dir: root.join("etc"),
            local_dir: root.join("local"),
            ..Default::default()
        }
    }

    #[inline]
    pub fn userlist_path(&self) -> PathBuf { self.config_dir.join(&self.userlist_file) }

    #[inline]
    pub fn noauth_path(&self) -> PathBuf { self.local_dir.join(&self.noauth_file) }

    #[inline]
    pub fn lock_timeout(&self) -> Duration { Duration::from_millis(self.lock_timeout_ms) }

    /// Read a JSON config file. Missing keys fall back to defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let cfg: GateConfig = serde_json::from_str(&text)
            .with_context(|| format!("parse config {}", path.display()))?;
        Ok(cfg)
    }

    /// Overlay environment variables, looked up through `var`.
    pub fn apply_env_with<F>(mut self, var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = var(ENV_CONFIG_DIR) { self.config_dir = PathBuf::from(dir); }
        if let Some(dir) = var(ENV_LOCAL_DIR) { self.local_dir = PathBuf::from(dir); }
        if let Some(cell) = var(ENV_CELL_NAME) { self.cell.name = cell; }
        if let Some(ms) = var(ENV_LOCK_TIMEOUT_MS) {
            self.lock_timeout_ms = ms
                .trim()
                .parse()
                .with_context(|| format!("{} must be a number of milliseconds, got '{}'", ENV_LOCK_TIMEOUT_MS, ms))?;
        }
        Ok(self)
    }

    /// Defaults, then the optional JSON file, then the process environment.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let base = match file {
            Some(p) => Self::from_json_file(p)?,
            None => Self::default(),
        };
        let cfg = base.apply_env_with(|k| std::env::var(k).ok())?;
        tracing::debug!(
            target: "cellguard::config",
            "config: config_dir='{}' local_dir='{}' cell='{}' lock_timeout_ms={}",
            cfg.config_dir.display(), cfg.local_dir.display(), cfg.cell.name, cfg.lock_timeout_ms
        );
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_paths() {
        let cfg = GateConfig::default();
        assert_eq!(cfg.userlist_path(), PathBuf::from("/usr/afs/etc/UserList"));
        assert_eq!(cfg.noauth_path(), PathBuf::from("/usr/afs/local/NoAuth"));
        assert_eq!(cfg.max_line_size, 2048);
    }

    #[test]
    fn json_file_overrides_only_given_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("gate.json");
        std::fs::write(&p, r#"{ "config_dir": "/srv/etc", "cell": { "name": "example.org" } }"#).unwrap();
        let cfg = GateConfig::from_json_file(&p).unwrap();
        assert_eq!(cfg.config_dir, PathBuf::from("/srv/etc"));
        assert_eq!(cfg.local_dir, PathBuf::from("/usr/afs/local"));
        assert_eq!(cfg.cell.name, "example.org");
        assert!(cfg.cell.local_realms.is_empty());
    }

    #[test]
    fn bad_json_reports_the_path() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("gate.json");
        std::fs::write(&p, "{ nope").unwrap();
        let err = GateConfig::from_json_file(&p).unwrap_err();
        assert!(format!("{:#}", err).contains("gate.json"));
    }

    #[test]
    fn env_layer_wins() {
        let env: HashMap<&str, &str> = [
            (ENV_CONFIG_DIR, "/e/etc"),
            (ENV_LOCK_TIMEOUT_MS, "250"),
            (ENV_CELL_NAME, "other.org"),
        ]
        .into_iter()
        .collect();
        let cfg = GateConfig::default()
            .apply_env_with(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(cfg.config_dir, PathBuf::from("/e/etc"));
        assert_eq!(cfg.local_dir, PathBuf::from("/usr/afs/local"));
        assert_eq!(cfg.lock_timeout(), Duration::from_millis(250));
        assert_eq!(cfg.cell.name, "other.org");
    }

    #[test]
    fn env_rejects_garbage_timeout() {
        let r = GateConfig::default().apply_env_with(|k| {
            (k == ENV_LOCK_TIMEOUT_MS).then(|| "soon".to_string())
        });
        assert!(r.is_err());
    }
}
