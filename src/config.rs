//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/topotree/topotree.toml`
//! 3. Local config: file passed with `--config`
//! 4. Environment variables: `TOPOTREE_*` prefix (`__` separates sections)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{DomainError, MovePolicy, NodeKind};

/// Placeholder labels given to freshly added nodes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LabelSettings {
    pub cluster: String,
    pub server: String,
    pub bucket: String,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            cluster: "New cluster".into(),
            server: "New server".into(),
            bucket: "New bucket".into(),
        }
    }
}

impl LabelSettings {
    pub fn placeholder(&self, kind: NodeKind) -> &str {
        match kind {
            NodeKind::Cluster => &self.cluster,
            NodeKind::Server => &self.server,
            NodeKind::Bucket => &self.bucket,
        }
    }
}

/// Drag-and-drop settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct MoveSettings {
    pub policy: MovePolicy,
}

/// Raw label settings for intermediate parsing (None means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLabelSettings {
    pub cluster: Option<String>,
    pub server: Option<String>,
    pub bucket: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawMoveSettings {
    pub policy: Option<MovePolicy>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub labels: RawLabelSettings,
    pub moves: RawMoveSettings,
}

/// Unified configuration for topotree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    pub labels: LabelSettings,
    pub moves: MoveSettings,
}

/// Get the XDG config directory for topotree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "topotree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("topotree.toml"))
}

/// Expand `~`, `$VAR` and `${VAR}` in a user-supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    parse_raw_settings(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn parse_raw_settings(content: &str) -> Result<RawSettings, toml::de::Error> {
    toml::from_str(content)
}

impl Settings {
    /// Overlay wins wherever it specifies a value.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            labels: LabelSettings {
                cluster: overlay
                    .labels
                    .cluster
                    .clone()
                    .unwrap_or_else(|| self.labels.cluster.clone()),
                server: overlay
                    .labels
                    .server
                    .clone()
                    .unwrap_or_else(|| self.labels.server.clone()),
                bucket: overlay
                    .labels
                    .bucket
                    .clone()
                    .unwrap_or_else(|| self.labels.bucket.clone()),
            },
            moves: MoveSettings {
                policy: overlay.moves.policy.unwrap_or(self.moves.policy),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_path` - Optional config file given on the command line; must exist
    pub fn load(local_path: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(local) = local_path {
            let local = expand_path(local);
            let raw = load_raw_settings(&local)?;
            current = current.merge_with(&raw);
        }

        Self::apply_env_overrides(current)
    }

    /// Apply TOPOTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("TOPOTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("labels.cluster") {
            settings.labels.cluster = val;
        }
        if let Ok(val) = config.get_string("labels.server") {
            settings.labels.server = val;
        }
        if let Ok(val) = config.get_string("labels.bucket") {
            settings.labels.bucket = val;
        }
        if let Ok(val) = config.get_string("moves.policy") {
            settings.moves.policy = val
                .parse()
                .map_err(|e: DomainError| ApplicationError::Config {
                    message: e.to_string(),
                })?;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# topotree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/topotree/topotree.toml
#   Local:  file passed with --config
#   Env:    TOPOTREE_* environment variables, e.g. TOPOTREE_MOVES__POLICY=hierarchy

[labels]
# Placeholder labels for newly added nodes
# cluster = "New cluster"
# server = "New server"
# bucket = "New bucket"

[moves]
# same-parent: drag-and-drop only reorders within the current parent
# hierarchy:   also allow reparenting wherever cluster > server > bucket permits
# policy = "same-parent"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
