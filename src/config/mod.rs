use serde::Deserialize;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::domain::DEFAULT_EPSILON;
use crate::geometry::voronoi::DEFAULT_MARGIN_RATIO;
use crate::partition::PartitionOptions;

fn default_epsilon() -> f64 {
    DEFAULT_EPSILON
}
fn default_margin_ratio() -> f64 {
    DEFAULT_MARGIN_RATIO
}
fn default_constrained() -> bool {
    true
}
fn default_project() -> bool {
    true
}
fn default_verbose() -> bool {
    false
}

/// Settings read from `stationzones.toml`. Command-line flags win over these.
#[derive(Debug, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub stations: Option<PathBuf>,
    #[serde(default)]
    pub constraints: Option<PathBuf>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    #[serde(default = "default_margin_ratio")]
    pub margin_ratio: f64,
    /// Filter and clip against the constraint file
    #[serde(default = "default_constrained")]
    pub constrained: bool,
    /// Run the engine in local meters instead of raw degrees
    #[serde(default = "default_project")]
    pub project: bool,
    #[serde(default = "default_verbose")]
    pub verbose: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            stations: None,
            constraints: None,
            output: None,
            epsilon: default_epsilon(),
            margin_ratio: default_margin_ratio(),
            constrained: default_constrained(),
            project: default_project(),
            verbose: default_verbose(),
        }
    }
}

impl FileConfig {
    /// First readable config on the search path, if any
    pub fn load() -> Option<Self> {
        let config_paths = get_config_paths();

        for path in config_paths {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match Self::parse(&contents) {
                    Ok(config) => {
                        tracing::debug!(path = %path.display(), "loaded config");
                        return Some(config);
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config file");
                    }
                }
            }
        }
        None
    }

    /// Load an explicitly named config; unlike [`FileConfig::load`] a bad file is an error
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("Config file not found: {}", path.display());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_options(&self.partition_options())
    }

    pub fn partition_options(&self) -> PartitionOptions {
        PartitionOptions {
            apply_constraints: self.constrained,
            epsilon: self.epsilon,
            margin_ratio: self.margin_ratio,
        }
    }
}

/// Tolerance must be positive: with zero, no two facilities ever coincide
pub fn validate_options(options: &PartitionOptions) -> Result<()> {
    if !(options.epsilon.is_finite() && options.epsilon > 0.0) {
        bail!("epsilon must be a positive number, got {}", options.epsilon);
    }
    if !(options.margin_ratio.is_finite() && options.margin_ratio >= 0.0) {
        bail!(
            "margin_ratio must be a non-negative number, got {}",
            options.margin_ratio
        );
    }
    Ok(())
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("stationzones.toml"));
    paths.push(PathBuf::from(".stationzones.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("stationzones").join("config.toml"));
        paths.push(config_dir.join("stationzones.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".stationzones.toml"));
        paths.push(home.join(".config").join("stationzones").join("config.toml"));
    }

    paths
}
