//! Tool configuration and its on-disk store.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cleanup::CleanupPreset;
use crate::error::{Error, Result};
use crate::transform::{CompressOptions, ErrorMode, TextOptions};

/// Settings shared by every operation.
///
/// Serialized as JSON. Missing fields take their defaults, so older files
/// keep loading as fields are added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Default render scale for compress
    pub scale: f32,

    /// Default JPEG quality for compress
    pub quality: f32,

    /// Whether to encode pages in parallel
    pub parallel: bool,

    /// Skip unreadable pages during text extraction instead of failing
    pub lenient_text: bool,

    /// Cleanup applied to extracted text (none when unset)
    pub cleanup: Option<CleanupPreset>,

    /// Directory outputs are written to when no path is given
    pub output_dir: Option<PathBuf>,
}

impl ToolConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compress options from this config, clamped.
    pub fn compress_options(&self) -> CompressOptions {
        CompressOptions::new()
            .with_scale(self.scale)
            .with_quality(self.quality)
            .with_parallel(self.parallel)
    }

    /// Text options from this config.
    pub fn text_options(&self) -> TextOptions {
        let mode = if self.lenient_text {
            ErrorMode::Lenient
        } else {
            ErrorMode::Strict
        };
        let options = TextOptions::new().with_error_mode(mode);
        match self.cleanup {
            Some(preset) => options.with_cleanup_preset(preset),
            None => options,
        }
    }

    /// Set a field from its name and a string value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "scale" => self.scale = parse_value(key, value)?,
            "quality" => self.quality = parse_value(key, value)?,
            "parallel" => self.parallel = parse_value(key, value)?,
            "lenient_text" => self.lenient_text = parse_value(key, value)?,
            "cleanup" => {
                self.cleanup = match value {
                    "" | "none" => None,
                    preset => Some(preset.parse()?),
                }
            }
            "output_dir" => {
                self.output_dir = match value {
                    "" => None,
                    dir => Some(PathBuf::from(dir)),
                }
            }
            other => {
                return Err(Error::Config(format!(
                    "unknown key '{}' (expected one of: {})",
                    other,
                    Self::KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }

    /// Keys accepted by [`set`](Self::set).
    pub const KEYS: &'static [&'static str] = &[
        "scale",
        "quality",
        "parallel",
        "lenient_text",
        "cleanup",
        "output_dir",
    ];
}

impl Default for ToolConfig {
    fn default() -> Self {
        let compress = CompressOptions::default();
        Self {
            scale: compress.scale,
            quality: compress.quality,
            parallel: compress.parallel,
            lenient_text: false,
            cleanup: None,
            output_dir: None,
        }
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("invalid value '{}' for {}", value, key)))
}

/// A [`ToolConfig`] bound to a JSON file.
///
/// Loading and saving are explicit: [`open`](Self::open) reads the file,
/// [`update`](Self::update) changes the config and writes it back at once.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    config: ToolConfig,
}

impl ConfigStore {
    /// Load the config at `path`, or defaults when the file does not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let config = if path.exists() {
            let text = fs::read_to_string(&path)?;
            serde_json::from_str(&text)
                .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?
        } else {
            log::debug!("No config at {}, using defaults", path.display());
            ToolConfig::default()
        };
        Ok(Self { path, config })
    }

    /// The current config.
    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Change the config and save it.
    ///
    /// Nothing is kept in memory if the change or the save fails.
    pub fn update<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut ToolConfig) -> Result<()>,
    {
        let mut next = self.config.clone();
        f(&mut next)?;
        write_config(&self.path, &next)?;
        self.config = next;
        Ok(())
    }

    /// Write the current config to disk.
    pub fn save(&self) -> Result<()> {
        write_config(&self.path, &self.config)
    }

    /// Consume the store, keeping the config.
    pub fn into_config(self) -> ToolConfig {
        self.config
    }
}

fn write_config(path: &Path, config: &ToolConfig) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)?;
    log::info!("Saved config to {}", path.display());
    Ok(())
}
