//! Optional `critic.toml` settings.
//!
//! Every key has a default, so an empty or absent file behaves like:
//!
//! ```toml
//! [reactor]
//! start_marker = "Reactor Summary"
//! end_marker = "BUILD"
//!
//! [highlight]
//! color = "#b22800"
//! min_pen_width = 1.0
//! max_pen_width = 10.0
//!
//! [output]
//! graph_name = "maven build order"
//! title = "Maven build order"
//! ```
//!
//! [`load_config`] reads an explicit `--config` path when one is given,
//! otherwise `critic.toml` in the working directory if it exists.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::CriticError;

/// File name looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "critic.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriticConfig {
    #[serde(default)]
    pub reactor: ReactorConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Markers bounding the reactor summary section of a build log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactorConfig {
    #[serde(default = "default_start_marker")]
    pub start_marker: String,
    #[serde(default = "default_end_marker")]
    pub end_marker: String,
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self {
            start_marker: default_start_marker(),
            end_marker: default_end_marker(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightConfig {
    #[serde(default = "default_highlight_color")]
    pub color: String,
    #[serde(default = "default_min_pen_width")]
    pub min_pen_width: f64,
    #[serde(default = "default_max_pen_width")]
    pub max_pen_width: f64,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            color: default_highlight_color(),
            min_pen_width: default_min_pen_width(),
            max_pen_width: default_max_pen_width(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_graph_name")]
    pub graph_name: String,
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            graph_name: default_graph_name(),
            title: default_title(),
        }
    }
}

/// Parse a config document.
///
/// # Errors
///
/// Returns [`CriticError::ConfigParse`] for invalid TOML, unknown value types
/// or an inverted pen width range.
pub fn parse_config(content: &str) -> Result<CriticConfig, CriticError> {
    let config: CriticConfig =
        toml::from_str(content).map_err(|e| CriticError::ConfigParse(e.to_string()))?;

    let highlight = &config.highlight;
    if !(highlight.min_pen_width > 0.0 && highlight.min_pen_width <= highlight.max_pen_width) {
        return Err(CriticError::ConfigParse(format!(
            "pen width range must satisfy 0 < min_pen_width <= max_pen_width, got {}..{}",
            highlight.min_pen_width, highlight.max_pen_width
        )));
    }

    Ok(config)
}

/// Load the effective config.
///
/// An explicit path must exist. Without one, `critic.toml` in `project_root`
/// is used when present; otherwise defaults apply.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse.
pub fn load_config(explicit: Option<&Path>, project_root: &Path) -> Result<CriticConfig> {
    let path: PathBuf = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = project_root.join(CONFIG_FILE_NAME);
            if !path.exists() {
                return Ok(CriticConfig::default());
            }
            path
        }
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    parse_config(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn default_start_marker() -> String {
    "Reactor Summary".to_string()
}

fn default_end_marker() -> String {
    "BUILD".to_string()
}

fn default_highlight_color() -> String {
    "#b22800".to_string()
}

const fn default_min_pen_width() -> f64 {
    1.0
}

const fn default_max_pen_width() -> f64 {
    10.0
}

fn default_graph_name() -> String {
    "maven build order".to_string()
}

fn default_title() -> String {
    "Maven build order".to_string()
}
