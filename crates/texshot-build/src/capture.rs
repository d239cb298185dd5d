//! Screenshot capture through a headless browser.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Screenshotter  │  ← facade: capture, crop, encode JPEG
//! └────────┬────────┘
//!          │ Arc<dyn ScreenshotBackend>
//!          ▼
//! ┌───────────────────┐
//! │ ScreenshotBackend │  ← writes a full-viewport PNG
//! └────────┬──────────┘
//!     ┌────┴──────────┐
//! ChromiumBackend  NoOpBackend
//! ```
//!
//! [`ChromiumBackend`] runs the browser through a [`CommandExecutor`] so
//! tests can check the command line without a browser installed.

use anyhow::{Context, Result, anyhow};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use log::{debug, info, warn};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use url::Url;

use crate::{Clip, Viewport};

/// Executables tried, in order, when no browser is configured.
pub const BROWSER_CANDIDATES: [&str; 4] = [
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
];

/// Runs an external program. Mocked in tests.
pub trait CommandExecutor: Send + Sync + std::fmt::Debug {
    fn execute(&self, program: &Path, args: &[String]) -> Result<std::process::Output>;
}

#[derive(Debug)]
pub struct RealCommandExecutor;

impl CommandExecutor for RealCommandExecutor {
    fn execute(&self, program: &Path, args: &[String]) -> Result<std::process::Output> {
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| anyhow!("Failed to launch {}: {}", program.display(), e))
    }
}

/// Produces a PNG screenshot of a local HTML page.
pub trait ScreenshotBackend: std::fmt::Debug + Send + Sync {
    /// Loads `page` in a `viewport`-sized window and writes the screenshot
    /// to `png_out`.
    fn capture_png(&self, page: &Path, viewport: Viewport, png_out: &Path) -> Result<()>;

    /// Returns a human-readable name for this backend.
    fn name(&self) -> &'static str;
}

/// A Chromium-family browser in `--headless --screenshot` mode.
#[derive(Debug)]
pub struct ChromiumBackend {
    path: PathBuf,
    executor: Box<dyn CommandExecutor>,
}

impl ChromiumBackend {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            executor: Box::new(RealCommandExecutor),
        }
    }

    /// Creates a backend with a custom executor (for testing).
    pub fn with_executor(path: PathBuf, executor: Box<dyn CommandExecutor>) -> Self {
        Self { path, executor }
    }

    fn arguments(page_url: &Url, viewport: Viewport, png_out: &Path) -> Vec<String> {
        vec![
            "--headless".to_string(),
            "--disable-gpu".to_string(),
            "--hide-scrollbars".to_string(),
            "--default-background-color=ffffffff".to_string(),
            format!("--window-size={},{}", viewport.width, viewport.height),
            format!("--screenshot={}", png_out.display()),
            page_url.to_string(),
        ]
    }
}

impl ScreenshotBackend for ChromiumBackend {
    fn capture_png(&self, page: &Path, viewport: Viewport, png_out: &Path) -> Result<()> {
        let absolute = fs::canonicalize(page)
            .with_context(|| format!("HTML page {} is not readable", page.display()))?;
        let page_url = Url::from_file_path(&absolute)
            .map_err(|()| anyhow!("Cannot build a file URL for {}", absolute.display()))?;

        let args = Self::arguments(&page_url, viewport, png_out);
        debug!("Running {} {:?}", self.path.display(), args);
        let output = self.executor.execute(&self.path, &args)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "{} exited with {}: {}",
                self.name(),
                output.status,
                stderr.trim()
            ));
        }
        if !png_out.exists() {
            return Err(anyhow!("{} produced no screenshot", self.name()));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "chromium"
    }
}

/// Used when no browser is detected. Every capture fails.
#[derive(Debug)]
pub struct NoOpBackend;

impl ScreenshotBackend for NoOpBackend {
    fn capture_png(&self, _page: &Path, _viewport: Viewport, _png_out: &Path) -> Result<()> {
        Err(anyhow!("No headless browser found"))
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

/// Captures a page and turns the screenshot into the cropped JPEG.
///
/// Cheap to clone; the backend is shared.
#[derive(Clone, Debug)]
pub struct Screenshotter {
    backend: Arc<dyn ScreenshotBackend>,
}

impl Default for Screenshotter {
    fn default() -> Self {
        Self::new()
    }
}

impl Screenshotter {
    /// Detects a browser on `PATH` from [`BROWSER_CANDIDATES`].
    pub fn new() -> Self {
        for candidate in BROWSER_CANDIDATES {
            if let Ok(path) = which::which(candidate) {
                info!("Detected {} at {:?}", candidate, path);
                return Self::with_browser(path);
            }
        }

        warn!("No headless browser detected");
        Self {
            backend: Arc::new(NoOpBackend),
        }
    }

    pub fn with_browser(path: PathBuf) -> Self {
        Self {
            backend: Arc::new(ChromiumBackend::new(path)),
        }
    }

    pub fn with_backend(backend: Arc<dyn ScreenshotBackend>) -> Self {
        Self { backend }
    }

    pub fn is_available(&self) -> bool {
        self.backend.name() != "none"
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Screenshots `page`, keeps the `clip` region and writes it to `out`
    /// as a JPEG. The intermediate PNG is removed whether or not encoding
    /// succeeds.
    pub fn capture_jpeg(
        &self,
        page: &Path,
        viewport: Viewport,
        clip: Clip,
        quality: u8,
        out: &Path,
    ) -> Result<()> {
        let png = out.with_extension("capture.png");
        let result = self
            .backend
            .capture_png(page, viewport, &png)
            .and_then(|()| crop_to_jpeg(&png, clip, quality, out));

        if png.exists() {
            if let Err(e) = fs::remove_file(&png) {
                warn!("Failed to remove intermediate screenshot {:?}: {}", png, e);
            }
        }
        result
    }
}

/// Crops `png` to `clip` and encodes the result at `quality` (clamped to
/// 1-100). A clip that overhangs the screenshot is cut at its edge.
pub fn crop_to_jpeg(png: &Path, clip: Clip, quality: u8, out: &Path) -> Result<()> {
    let screenshot = image::open(png)
        .with_context(|| format!("Failed to decode screenshot {}", png.display()))?;
    let cropped = screenshot
        .crop_imm(clip.x, clip.y, clip.width, clip.height)
        .to_rgb8();
    if cropped.width() == 0 || cropped.height() == 0 {
        return Err(anyhow!(
            "Clip {:?} lies outside the {}x{} screenshot",
            clip,
            screenshot.width(),
            screenshot.height()
        ));
    }

    let file = File::create(out)
        .with_context(|| format!("Failed to create {}", out.display()))?;
    let mut writer = BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100));
    DynamicImage::ImageRgb8(cropped).write_with_encoder(encoder)?;
    writer.flush()?;
    Ok(())
}

/// Executor that returns a canned process result and, on success, writes
/// a blank PNG to the `--screenshot=` path like a real browser would.
#[cfg(test)]
#[derive(Debug)]
pub struct MockCommandExecutor {
    pub stderr: String,
    pub status_code: i32,
    pub recorded_args: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl CommandExecutor for MockCommandExecutor {
    fn execute(&self, _program: &Path, args: &[String]) -> Result<std::process::Output> {
        #[cfg(unix)]
        let status = {
            use std::os::unix::process::ExitStatusExt;
            std::process::ExitStatus::from_raw(self.status_code << 8)
        };
        #[cfg(windows)]
        let status = {
            use std::os::windows::process::ExitStatusExt;
            std::process::ExitStatus::from_raw(self.status_code as u32)
        };

        self.recorded_args.lock().unwrap().extend_from_slice(args);
        if self.status_code == 0 {
            if let Some(target) = args.iter().find_map(|a| a.strip_prefix("--screenshot=")) {
                image::RgbImage::from_pixel(64, 64, image::Rgb([255, 255, 255])).save(target)?;
            }
        }

        Ok(std::process::Output {
            status,
            stdout: Vec::new(),
            stderr: self.stderr.as_bytes().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn mock(status_code: i32, stderr: &str) -> MockCommandExecutor {
        MockCommandExecutor {
            stderr: stderr.to_string(),
            status_code,
            recorded_args: Mutex::new(Vec::new()),
        }
    }

    #[derive(Debug)]
    struct SharedMock(Arc<MockCommandExecutor>);

    impl CommandExecutor for SharedMock {
        fn execute(&self, program: &Path, args: &[String]) -> Result<std::process::Output> {
            self.0.execute(program, args)
        }
    }

    #[test]
    fn test_chromium_command_line() {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("page.html");
        fs::write(&page, "<html></html>").unwrap();
        let png = dir.path().join("shot.png");

        let executor = Arc::new(mock(0, ""));
        let backend = ChromiumBackend::with_executor(
            PathBuf::from("chromium"),
            Box::new(SharedMock(executor.clone())),
        );
        backend
            .capture_png(&page, Viewport { width: 1440, height: 900 }, &png)
            .unwrap();

        let args = executor.recorded_args.lock().unwrap().clone();
        assert!(args.contains(&"--headless".to_string()));
        assert!(args.contains(&"--window-size=1440,900".to_string()));
        assert!(args.contains(&format!("--screenshot={}", png.display())));
        assert!(args.last().unwrap().starts_with("file://"));
        assert!(png.exists());
    }

    #[test]
    fn test_chromium_failure_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("page.html");
        fs::write(&page, "<html></html>").unwrap();

        let backend = ChromiumBackend::with_executor(
            PathBuf::from("chromium"),
            Box::new(mock(1, "cannot open display")),
        );
        let err = backend
            .capture_png(&page, Viewport::default(), &dir.path().join("shot.png"))
            .unwrap_err();
        assert!(err.to_string().contains("cannot open display"));
    }

    #[test]
    fn test_chromium_missing_page() {
        let dir = tempfile::tempdir().unwrap();
        let backend =
            ChromiumBackend::with_executor(PathBuf::from("chromium"), Box::new(mock(0, "")));
        let result = backend.capture_png(
            &dir.path().join("absent.html"),
            Viewport::default(),
            &dir.path().join("shot.png"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_noop_backend() {
        let shooter = Screenshotter::with_backend(Arc::new(NoOpBackend));
        assert!(!shooter.is_available());
        assert_eq!(shooter.backend_name(), "none");

        let dir = tempfile::tempdir().unwrap();
        let err = shooter
            .capture_jpeg(
                &dir.path().join("page.html"),
                Viewport::default(),
                Clip::default(),
                100,
                &dir.path().join("tex.jpg"),
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "No headless browser found");
    }

    #[test]
    fn test_crop_to_jpeg_keeps_clip_region() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("full.png");
        let jpg = dir.path().join("tex.jpg");
        image::RgbImage::from_pixel(1440, 1440, image::Rgb([255, 255, 255]))
            .save(&png)
            .unwrap();

        crop_to_jpeg(&png, Clip::default(), 100, &jpg).unwrap();

        let out = image::open(&jpg).unwrap();
        assert_eq!((out.width(), out.height()), (720, 720));
    }

    #[test]
    fn test_crop_outside_screenshot_fails() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("small.png");
        image::RgbImage::from_pixel(100, 100, image::Rgb([0, 0, 0]))
            .save(&png)
            .unwrap();

        let result = crop_to_jpeg(&png, Clip::default(), 90, &dir.path().join("tex.jpg"));
        assert!(result.is_err());
    }

    #[test]
    fn test_capture_jpeg_removes_intermediate_png() {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("page.html");
        fs::write(&page, "<html></html>").unwrap();
        let out = dir.path().join("tex.jpg");

        let backend =
            ChromiumBackend::with_executor(PathBuf::from("chromium"), Box::new(mock(0, "")));
        let shooter = Screenshotter::with_backend(Arc::new(backend));
        let clip = Clip {
            x: 16,
            y: 16,
            width: 32,
            height: 32,
        };
        shooter
            .capture_jpeg(&page, Viewport::default(), clip, 100, &out)
            .unwrap();

        assert!(out.exists());
        assert!(!dir.path().join("tex.capture.png").exists());
        assert_eq!(image::open(&out).unwrap().width(), 32);
    }
}
