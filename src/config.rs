//==================================================
// File: config.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Runner configuration for the clam binary
// Objective: Load interpreter limits and logging defaults from TOML
//==================================================

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up under `<config dir>/clam/`.
const CONFIG_FILE: &str = "clam.toml";

/// Settings read from `clam.toml`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClamConfig {
    /// Nested call limit before a stack overflow error is raised.
    pub max_call_depth: usize,
    /// Stack reserved for the interpreter thread, in megabytes.
    pub stack_size_mb: usize,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// List the host library instead of running a script.
    pub print_docs: bool,
}

impl Default for ClamConfig {
    fn default() -> Self {
        Self {
            max_call_depth: 1000,
            stack_size_mb: 256,
            log_level: "warn".to_string(),
            print_docs: false,
        }
    }
}

impl ClamConfig {
    /// `<config dir>/clam/clam.toml`, when the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("clam").join(CONFIG_FILE))
    }

    /// Load from `path` when given, else from the default location if that
    /// file exists, else fall back to defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading configuration from {}", path.display()))?;
        let cfg: Self = toml::from_str(&data)
            .with_context(|| format!("parsing configuration {}", path.display()))?;
        Ok(cfg)
    }

    /// Persist the configuration back to disk.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let serialized = toml::to_string_pretty(self)?;
        fs::write(path, serialized)
            .with_context(|| format!("writing configuration to {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_files_keep_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "max_call_depth = 42\n").expect("write config");

        let cfg = ClamConfig::load(Some(&path)).expect("load");
        assert_eq!(cfg.max_call_depth, 42);
        assert_eq!(cfg.stack_size_mb, ClamConfig::default().stack_size_mb);
        assert_eq!(cfg.log_level, "warn");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        let cfg = ClamConfig {
            log_level: "debug".into(),
            print_docs: true,
            ..ClamConfig::default()
        };
        cfg.save(&path).expect("save");
        assert_eq!(ClamConfig::load(Some(&path)).expect("load"), cfg);
    }

    #[test]
    fn malformed_files_report_their_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "max_call_depth = \"deep\"").expect("write config");

        let err = ClamConfig::load(Some(&path)).expect_err("invalid type");
        assert!(format!("{err:#}").contains("parsing configuration"));
    }
}
