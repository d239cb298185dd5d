//! # texshot Build
//!
//! The render-and-capture stage that runs after a fragment has passed
//! [`texshot_core::validate`].
//!
//! ```text
//! raw LaTeX ──► validate ──► MathRenderer ──► wrap_page ──► Screenshotter ──► tex.jpg
//!                  │              │                              │
//!                  └──────────────┴──────── failure ─────────────┘
//!                                             │
//!                                             ▼
//!                                       ErrorReporter ──► err.txt (+ stale tex.jpg removed)
//! ```
//!
//! Every path and size the stage touches comes from a [`RenderConfig`];
//! there is no ambient working-directory state and no shared browser.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod artifacts;
pub mod capture;
pub mod page;
pub mod pipeline;
pub mod report;

pub use artifacts::FileArtifact;
pub use capture::{ChromiumBackend, NoOpBackend, ScreenshotBackend, Screenshotter};
pub use page::{KatexRenderer, MathRenderer, PageLayout, RenderError};
pub use pipeline::{Pipeline, PipelineError};
pub use report::ErrorReporter;

/// Browser window size, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1440,
            height: 1440,
        }
    }
}

/// Region of the screenshot kept in the final image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clip {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for Clip {
    /// The centred 720x720 square of the default viewport.
    fn default() -> Self {
        Self {
            x: 360,
            y: 360,
            width: 720,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Where the JPEG is written.
    pub output_image: PathBuf,
    /// Where the last failure is written. Overwritten on every failure.
    pub error_log: PathBuf,
    /// Temporary HTML page handed to the browser; removed after capture.
    pub scratch_html: PathBuf,
    pub viewport: Viewport,
    pub clip: Clip,
    /// JPEG quality, 1-100.
    pub jpeg_quality: u8,
    pub font_size_px: u32,
    /// Browser executable. Auto-detected on `PATH` when unset.
    pub browser: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output_image: PathBuf::from("tex.jpg"),
            error_log: PathBuf::from("err.txt"),
            scratch_html: PathBuf::from("temp.html"),
            viewport: Viewport::default(),
            clip: Clip::default(),
            jpeg_quality: 100,
            font_size_px: 24,
            browser: None,
        }
    }
}

impl RenderConfig {
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Loads a configuration file. Fields missing from the file keep their
    /// defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn layout(&self) -> PageLayout {
        PageLayout {
            viewport: self.viewport,
            font_size_px: self.font_size_px,
        }
    }

    pub fn reporter(&self) -> ErrorReporter {
        ErrorReporter::new(self.error_log.clone(), self.output_image.clone())
    }
}
