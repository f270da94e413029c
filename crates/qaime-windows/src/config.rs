//! Windowing configuration loaded from RON.
//!
//! Looks for `~/.config/qaime/windowing.ron`. Every field has a default, so a
//! partial file only overrides what it names:
//!
//! ```ron
//! (
//!     base_z_index: 1000,
//!     min_size: (width: 520.0, height: 420.0),
//!     tile_limit: 4,
//! )
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use qaime_types::Size;

/// Tunables for the registry, the modal chrome, and placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowingConfig {
    /// First z value handed out is `base_z_index + 1`.
    pub base_z_index: u64,
    /// Height reserved at the bottom of the viewport when tiling.
    pub taskbar_band: f64,
    /// Taskbar height subtracted from the maximized window height.
    pub taskbar_height: f64,
    /// Navigation bar height assumed when the viewport doesn't report one.
    pub fallback_nav_height: f64,
    /// Size used when restoring from maximize without a saved slot.
    pub default_size: Size,
    /// Upper bound for a freshly opened modal.
    pub open_size_cap: Size,
    /// Viewport margin kept around a freshly opened modal.
    pub open_margin: Size,
    /// Smallest size a resize may produce.
    pub min_size: Size,
    /// How many windows `tile` arranges at most.
    pub tile_limit: usize,
    /// Offset applied per already-visible instance when opening.
    pub cascade_step: f64,
    /// Compact z values once the counter passes this.
    pub z_renormalize_threshold: u64,
    /// Paint range for modal chrome (between nav bar and taskbar).
    pub paint_z_range: (u64, u64),
}

impl Default for WindowingConfig {
    fn default() -> Self {
        Self {
            base_z_index: 1000,
            taskbar_band: 100.0,
            taskbar_height: 50.0,
            fallback_nav_height: 60.0,
            default_size: Size::new(900.0, 600.0),
            open_size_cap: Size::new(900.0, 700.0),
            open_margin: Size::new(40.0, 80.0),
            min_size: Size::new(500.0, 400.0),
            tile_limit: 4,
            cascade_step: 30.0,
            z_renormalize_threshold: 1_000_000,
            paint_z_range: (1001, 9999),
        }
    }
}

impl WindowingConfig {
    /// Clamp a registry z value into the modal paint range.
    pub fn paint_z(&self, z_index: u64) -> u64 {
        let (lo, hi) = self.paint_z_range;
        z_index.clamp(lo, hi.max(lo))
    }
}

/// Error type for config loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Get the config file path (~/.config/qaime/windowing.ron).
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("qaime").join("windowing.ron"))
}

/// Load and parse a config file.
pub fn load_config(path: &Path) -> Result<WindowingConfig, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    parse_config(&text)
}

/// Parse config from RON text.
pub fn parse_config(text: &str) -> Result<WindowingConfig, ConfigError> {
    Ok(ron::from_str(text)?)
}

/// Load config from the user's config dir, falling back to defaults on any error.
pub fn load_config_or_default() -> WindowingConfig {
    let Some(path) = config_file_path() else {
        info!("No config directory available, using default windowing config");
        return WindowingConfig::default();
    };

    if !path.exists() {
        info!("Windowing config not found at {:?}, using defaults", path);
        return WindowingConfig::default();
    }

    match load_config(&path) {
        Ok(config) => {
            info!("Loaded windowing config from {:?}", path);
            config
        }
        Err(e) => {
            warn!("Failed to load windowing config from {:?}: {}", path, e);
            WindowingConfig::default()
        }
    }
}
