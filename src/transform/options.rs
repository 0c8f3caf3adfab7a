//! Transform options and configuration.

use crate::cleanup::{CleanupOptions, CleanupPreset};

/// Smallest accepted render scale.
pub const MIN_SCALE: f32 = 0.3;
/// Largest accepted render scale.
pub const MAX_SCALE: f32 = 2.0;
/// Lowest accepted JPEG quality.
pub const MIN_QUALITY: f32 = 0.1;
/// Highest accepted JPEG quality.
pub const MAX_QUALITY: f32 = 0.9;

/// Options for rasterize-recompress.
///
/// Out-of-range values are clamped, never rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressOptions {
    /// Render scale, 1.0 = one pixel per point
    pub scale: f32,

    /// JPEG quality in `0.1..=0.9`
    pub quality: f32,

    /// Whether to encode pages in parallel
    pub parallel: bool,
}

impl CompressOptions {
    /// Create new compress options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the render scale, clamped to `0.3..=2.0`.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = clamp(scale, MIN_SCALE, MAX_SCALE, 1.0);
        self
    }

    /// Set the JPEG quality, clamped to `0.1..=0.9`.
    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = clamp(quality, MIN_QUALITY, MAX_QUALITY, 0.7);
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// The options with both numbers forced into range.
    ///
    /// Fields are public, so values set directly are clamped here again.
    pub fn clamped(self) -> Self {
        self.with_scale(self.scale).with_quality(self.quality)
    }

    /// JPEG quality as the encoder's 1-100 scale.
    pub fn jpeg_quality(&self) -> u8 {
        (self.clamped().quality * 100.0).round() as u8
    }
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            quality: 0.7,
            parallel: true,
        }
    }
}

fn clamp(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

/// Options for text extraction.
#[derive(Debug, Clone, Default)]
pub struct TextOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Cleanup applied to the joined text, if any
    pub cleanup: Option<CleanupOptions>,
}

impl TextOptions {
    /// Create new text options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip pages whose text cannot be read).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set cleanup options.
    pub fn with_cleanup(mut self, cleanup: CleanupOptions) -> Self {
        self.cleanup = Some(cleanup);
        self
    }

    /// Set cleanup from a preset.
    pub fn with_cleanup_preset(mut self, preset: CleanupPreset) -> Self {
        self.cleanup = Some(CleanupOptions::from_preset(preset));
        self
    }

    /// Disable cleanup.
    pub fn raw(mut self) -> Self {
        self.cleanup = None;
        self
    }
}

/// Error handling mode during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    #[default]
    Strict,
    /// Skip invalid content and continue
    Lenient,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_defaults() {
        let options = CompressOptions::default();
        assert_eq!(options.scale, 1.0);
        assert_eq!(options.quality, 0.7);
        assert!(options.parallel);
        assert_eq!(options.jpeg_quality(), 70);
    }

    #[test]
    fn test_compress_clamping() {
        let options = CompressOptions::new().with_scale(5.0).with_quality(0.0).sequential();
        assert_eq!(options.scale, 2.0);
        assert_eq!(options.quality, 0.1);
        assert!(!options.parallel);

        let options = CompressOptions::new().with_scale(0.01).with_quality(1.5);
        assert_eq!(options.scale, 0.3);
        assert_eq!(options.quality, 0.9);
        assert_eq!(options.jpeg_quality(), 90);
    }

    #[test]
    fn test_compress_nan_falls_back() {
        let options = CompressOptions::new().with_scale(f32::NAN).with_quality(f32::NAN);
        assert_eq!(options.scale, 1.0);
        assert_eq!(options.quality, 0.7);
    }

    #[test]
    fn test_clamped_fixes_direct_fields() {
        let options = CompressOptions {
            scale: 10.0,
            quality: -1.0,
            parallel: true,
        }
        .clamped();
        assert_eq!(options.scale, 2.0);
        assert_eq!(options.quality, 0.1);
    }

    #[test]
    fn test_text_options_builder() {
        let options = TextOptions::new()
            .lenient()
            .with_cleanup_preset(CleanupPreset::Minimal);
        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert_eq!(options.cleanup, Some(CleanupOptions::minimal()));

        let options = options.raw();
        assert!(options.cleanup.is_none());
    }

    #[test]
    fn test_text_options_default() {
        let options = TextOptions::default();
        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert!(options.cleanup.is_none());
    }
}
