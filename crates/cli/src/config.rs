use anyhow::{Context, Result};
use archview_graph::GraphBuilderConfig;
use archview_view::LayoutAlgorithm;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "archview.toml";

/// Defaults for `view` requests; command-line flags override them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ViewDefaults {
    pub layout: LayoutAlgorithm,
    pub zoom_scale: f64,
}

impl Default for ViewDefaults {
    fn default() -> Self {
        Self {
            layout: LayoutAlgorithm::Hierarchical,
            zoom_scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub builder: GraphBuilderConfig,
    pub view: ViewDefaults,
}

impl CliConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw).context("Invalid configuration file")?;
        config.validate()?;
        Ok(config)
    }

    /// Explicit path, else `archview.toml` when present, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path: PathBuf = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.is_file() {
                    return Ok(Self::default());
                }
                fallback
            }
        };
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_toml_str(&raw)
            .with_context(|| format!("Failed to load config {}", path.display()))?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.builder.validate()?;
        if !self.view.zoom_scale.is_finite() || self.view.zoom_scale <= 0.0 {
            anyhow::bail!("view.zoom_scale must be a positive number");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = CliConfig::from_toml_str(
            r#"
            [builder]
            min_container_confidence = 0.7

            [view]
            layout = "force"
            "#,
        )
        .unwrap();
        assert_eq!(config.builder.min_container_confidence, 0.7);
        assert!(config.builder.validate_structure);
        assert_eq!(config.view.layout, LayoutAlgorithm::Force);
        assert_eq!(config.view.zoom_scale, 1.0);
    }

    #[test]
    fn out_of_range_values_rejected() {
        assert!(CliConfig::from_toml_str("[builder]\nmin_container_confidence = 2.0\n").is_err());
        assert!(CliConfig::from_toml_str("[view]\nzoom_scale = 0.0\n").is_err());
    }
}
