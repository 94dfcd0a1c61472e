use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::interaction::VERTEX_TOLERANCE_PX;
use crate::session::DEFAULT_MAX_BUFFER_M;

fn default_max_buffer_m() -> f64 {
    DEFAULT_MAX_BUFFER_M
}
fn default_vertex_tolerance_px() -> f64 {
    VERTEX_TOLERANCE_PX
}
fn default_min_zoom() -> u8 {
    2
}
fn default_max_zoom() -> u8 {
    22
}
fn default_initial_zoom() -> f64 {
    2.0
}
fn default_tile_size_px() -> f64 {
    256.0
}
fn default_viewport_width_px() -> f64 {
    1024.0
}
fn default_viewport_height_px() -> f64 {
    768.0
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FileConfig {
    /// Largest selectable area; unset disables the check
    #[serde(default)]
    pub max_aoi_sq_km: Option<f64>,
    #[serde(default = "default_max_buffer_m")]
    pub max_buffer_m: f64,
    #[serde(default = "default_vertex_tolerance_px")]
    pub vertex_tolerance_px: f64,
    #[serde(default = "default_min_zoom")]
    pub min_zoom: u8,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,
    #[serde(default = "default_initial_zoom")]
    pub initial_zoom: f64,
    #[serde(default = "default_tile_size_px")]
    pub tile_size_px: f64,
    #[serde(default = "default_viewport_width_px")]
    pub viewport_width_px: f64,
    #[serde(default = "default_viewport_height_px")]
    pub viewport_height_px: f64,
    #[serde(default)]
    pub nominatim: Option<NominatimConfig>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            max_aoi_sq_km: None,
            max_buffer_m: default_max_buffer_m(),
            vertex_tolerance_px: default_vertex_tolerance_px(),
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
            initial_zoom: default_initial_zoom(),
            tile_size_px: default_tile_size_px(),
            viewport_width_px: default_viewport_width_px(),
            viewport_height_px: default_viewport_height_px(),
            nominatim: None,
        }
    }
}

fn default_nominatim_url() -> String {
    "https://nominatim.openstreetmap.org/search".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("aoikit/", env!("CARGO_PKG_VERSION")).to_string()
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct NominatimConfig {
    #[serde(default = "default_nominatim_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            url: default_nominatim_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl FileConfig {
    /// First config file found in the usual locations that parses.
    pub fn load() -> Option<Self> {
        for path in get_config_paths() {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => {
                        log::debug!("using config file {}", path.display());
                        return Some(config);
                    }
                    Err(e) => {
                        log::warn!("Failed to parse config file {}: {}", path.display(), e);
                    }
                }
            }
        }
        None
    }

    /// Read one specific config file
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("aoikit.toml"));
    paths.push(PathBuf::from(".aoikit.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("aoikit").join("config.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".aoikit.toml"));
    }

    paths
}

/// Settings an [`AoiEditor`](crate::editor::AoiEditor) runs with, after
/// defaults are filled in and out-of-range values corrected
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    pub max_aoi_sq_km: Option<f64>,
    pub max_buffer_m: f64,
    pub vertex_tolerance_px: f64,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub initial_zoom: f64,
    pub tile_size_px: f64,
    pub viewport_width_px: f64,
    pub viewport_height_px: f64,
    pub nominatim: NominatimConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::from(FileConfig::default())
    }
}

impl From<FileConfig> for EditorConfig {
    fn from(file: FileConfig) -> Self {
        let positive_or = |value: f64, fallback: f64, name: &str| {
            if value > 0.0 && value.is_finite() {
                value
            } else {
                log::warn!("ignoring {name} = {value}, using {fallback}");
                fallback
            }
        };

        let max_buffer_m = if file.max_buffer_m >= 0.0 && file.max_buffer_m.is_finite() {
            file.max_buffer_m
        } else {
            log::warn!("ignoring max_buffer_m = {}", file.max_buffer_m);
            DEFAULT_MAX_BUFFER_M
        };

        Self {
            max_aoi_sq_km: file.max_aoi_sq_km.filter(|max| *max > 0.0),
            max_buffer_m,
            vertex_tolerance_px: file.vertex_tolerance_px.max(0.0),
            min_zoom: file.min_zoom.min(file.max_zoom),
            max_zoom: file.max_zoom.max(file.min_zoom),
            initial_zoom: file.initial_zoom,
            tile_size_px: positive_or(file.tile_size_px, default_tile_size_px(), "tile_size_px"),
            viewport_width_px: positive_or(
                file.viewport_width_px,
                default_viewport_width_px(),
                "viewport_width_px",
            ),
            viewport_height_px: positive_or(
                file.viewport_height_px,
                default_viewport_height_px(),
                "viewport_height_px",
            ),
            nominatim: file.nominatim.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config, FileConfig::default());
        assert_eq!(config.max_buffer_m, 10_000.0);
        assert_eq!(config.vertex_tolerance_px, 10.0);
        assert!(config.max_aoi_sq_km.is_none());
    }

    #[test]
    fn test_nominatim_table_defaults() {
        let config: FileConfig = toml::from_str(
            r#"
            max_aoi_sq_km = 5000.0
            [nominatim]
            timeout_secs = 5
            "#,
        )
        .unwrap();
        let nominatim = config.nominatim.unwrap();
        assert_eq!(nominatim.timeout_secs, 5);
        assert_eq!(nominatim.url, default_nominatim_url());
        assert_eq!(config.max_aoi_sq_km, Some(5000.0));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_buffer_m = 2500.0\nmin_zoom = 4").unwrap();
        let config = FileConfig::from_path(file.path()).unwrap();
        assert_eq!(config.max_buffer_m, 2500.0);
        assert_eq!(config.min_zoom, 4);
        assert_eq!(config.max_zoom, 22);
    }

    #[test]
    fn test_from_path_reports_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_buffer_m = \"lots\"").unwrap();
        assert!(FileConfig::from_path(file.path()).is_err());
    }

    #[test]
    fn test_editor_config_corrects_bad_values() {
        let file = FileConfig {
            max_aoi_sq_km: Some(0.0),
            max_buffer_m: -5.0,
            min_zoom: 30,
            tile_size_px: 0.0,
            ..FileConfig::default()
        };
        let config = EditorConfig::from(file);
        assert_eq!(config.max_aoi_sq_km, None);
        assert_eq!(config.max_buffer_m, DEFAULT_MAX_BUFFER_M);
        assert_eq!(config.min_zoom, 22);
        assert_eq!(config.max_zoom, 30);
        assert_eq!(config.tile_size_px, 256.0);
    }
}
