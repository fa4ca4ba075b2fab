//! Tunables for the viewer, loadable from a JSON file next to the other application data.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::Result;

const APP_QUALIFIER: &str = "com";
const APP_ORGANISATION: &str = "PhotoGallery";
const APP_NAME: &str = "photo-gallery";
const CONFIG_FILE: &str = "viewer.json";

/// How far a zoomed image may be dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PanPolicy {
    /// No limit; the image can be dragged fully out of view.
    #[default]
    Unbounded,
    /// Keep the scaled image edges inside the viewport once the viewport size is known.
    KeepEdgeInView,
}

/// Every threshold and default the viewer core relies on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerConfig {
    /// Magnification applied by a centre tap.
    pub zoom_factor: f64,
    /// Upper bound for pinch zoom.
    pub max_pinch_scale: f64,
    /// Pointer travel (per axis) that turns a click candidate into a drag.
    pub drag_threshold_px: f64,
    /// Fraction of the image half-width that counts as the centre tap zone.
    pub center_tap_fraction: f64,
    /// Delay before peripheral gesture fields are cleared after a drag release.
    pub click_reset_delay_ms: u64,
    /// Swipes shorter than this are treated as flicks.
    pub flick_duration_ms: u64,
    /// Residual offset past the snap point a flick needs to carry one more page.
    pub flick_distance_px: f64,
    /// Backdrop clicks left of this fraction of the width go to the previous photo.
    pub nav_prev_zone: f64,
    /// Backdrop clicks right of this fraction of the width go to the next photo.
    pub nav_next_zone: f64,
    /// Photos warmed on each side of the current one.
    pub preload_count: usize,
    /// Maximum number of decoded images kept in memory.
    pub cache_max_entries: usize,
    /// Entries not touched for this long are dropped by cleanup.
    pub cache_expiry_secs: u64,
    /// How often the session asks for a cache cleanup.
    pub cache_cleanup_interval_secs: u64,
    /// Grid thumbnails requested per batch.
    pub batch_size: usize,
    /// Pause between a settled grid batch and the next one.
    pub batch_delay_ms: u64,
    /// Prefix prepended to every API path, e.g. `http://nas.local:5000`.
    pub api_base: String,
    pub pan_policy: PanPolicy,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            zoom_factor: 1.2,
            max_pinch_scale: 5.0,
            drag_threshold_px: 10.0,
            center_tap_fraction: 1.0 / 3.0,
            click_reset_delay_ms: 50,
            flick_duration_ms: 200,
            flick_distance_px: 50.0,
            nav_prev_zone: 0.3,
            nav_next_zone: 0.7,
            preload_count: 3,
            cache_max_entries: 100,
            cache_expiry_secs: 60 * 60,
            cache_cleanup_interval_secs: 5 * 60,
            batch_size: 10,
            batch_delay_ms: 50,
            api_base: String::new(),
            pan_policy: PanPolicy::Unbounded,
        }
    }
}

impl ViewerConfig {
    pub fn cache_expiry(&self) -> Duration {
        Duration::from_secs(self.cache_expiry_secs)
    }

    pub fn click_reset_delay(&self) -> Duration {
        Duration::from_millis(self.click_reset_delay_ms)
    }

    /// Reject values that would break the viewer invariants.
    pub fn validate(&self) -> Result<()> {
        if !(self.zoom_factor >= 1.0) {
            return Err(anyhow!("zoomFactor must be >= 1, got {}", self.zoom_factor));
        }
        if !(self.max_pinch_scale >= 1.0) {
            return Err(anyhow!("maxPinchScale must be >= 1, got {}", self.max_pinch_scale));
        }
        if self.cache_max_entries == 0 {
            return Err(anyhow!("cacheMaxEntries must be positive"));
        }
        if self.batch_size == 0 {
            return Err(anyhow!("batchSize must be positive"));
        }
        if !(0.0..=1.0).contains(&self.nav_prev_zone)
            || !(0.0..=1.0).contains(&self.nav_next_zone)
            || self.nav_prev_zone > self.nav_next_zone
        {
            return Err(anyhow!(
                "navigation zones must satisfy 0 <= prev <= next <= 1, got {} / {}",
                self.nav_prev_zone,
                self.nav_next_zone
            ));
        }
        Ok(())
    }
}

/// Location of the config file inside the platform config directory.
pub fn default_path() -> Result<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORGANISATION, APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
        .ok_or_else(|| anyhow!("unable to resolve application config directory"))
}

/// Read the config at `path`. A missing file yields the defaults.
pub fn load(path: &Path) -> Result<ViewerConfig> {
    let config = match fs::read(path) {
        Ok(bytes) => serde_json::from_slice::<ViewerConfig>(&bytes)
            .with_context(|| format!("parsing viewer config at {}", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => ViewerConfig::default(),
        Err(err) => {
            return Err(err).with_context(|| format!("reading viewer config at {}", path.display()));
        }
    };
    config.validate()?;
    Ok(config)
}

/// Atomically write `config` to `path`.
pub fn save(path: &Path, config: &ViewerConfig) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow!("config path {} does not have a parent directory", path.display()))?;
    fs::create_dir_all(parent)?;

    let data = serde_json::to_vec_pretty(config)?;
    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(&data)?;
    temp.flush()?;
    match temp.persist(path) {
        Ok(_) => Ok(()),
        Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
            if let Err(remove_err) = fs::remove_file(path) {
                if remove_err.kind() != io::ErrorKind::NotFound {
                    return Err(remove_err.into());
                }
            }
            err.file.persist(path).map(|_| ()).map_err(|persist_err| persist_err.error.into())
        }
        Err(err) => Err(err.error.into()),
    }
}
