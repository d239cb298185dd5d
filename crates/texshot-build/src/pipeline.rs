use log::{debug, info};
use std::fs;
use thiserror::Error;

use texshot_core::{Diagnostic, validate};

use crate::page::{KatexRenderer, MathRenderer, RenderError, wrap_page};
use crate::{ErrorReporter, FileArtifact, RenderConfig, Screenshotter};

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The validator rejected the input; nothing was rendered.
    #[error("{0}")]
    Invalid(#[from] Diagnostic),
    #[error("TeX error: Rendering failed")]
    RenderFailed(#[source] RenderError),
    #[error("{0:#}")]
    Capture(anyhow::Error),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Validate, render, capture. Failures at any stage go to the
/// [`ErrorReporter`] before being returned.
#[derive(Debug)]
pub struct Pipeline {
    config: RenderConfig,
    renderer: Box<dyn MathRenderer>,
    screenshotter: Screenshotter,
    reporter: ErrorReporter,
}

impl Pipeline {
    /// Builds a pipeline using the configured browser, or one detected on
    /// `PATH`.
    pub fn new(config: RenderConfig) -> Self {
        let screenshotter = match &config.browser {
            Some(path) => Screenshotter::with_browser(path.clone()),
            None => Screenshotter::new(),
        };
        Self::with_screenshotter(config, screenshotter)
    }

    pub fn with_screenshotter(config: RenderConfig, screenshotter: Screenshotter) -> Self {
        let reporter = config.reporter();
        Self {
            config,
            renderer: Box::new(KatexRenderer),
            screenshotter,
            reporter,
        }
    }

    pub fn with_renderer(mut self, renderer: Box<dyn MathRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Turns `tex` into the configured output image.
    ///
    /// # Errors
    ///
    /// Any failure is reported (log line, error file, stale image removed)
    /// and then returned.
    pub fn run(&self, tex: &str) -> Result<FileArtifact, PipelineError> {
        match self.try_run(tex) {
            Ok(image) => {
                info!("Rendered {:?}", image.path());
                Ok(image)
            }
            Err(err) => {
                self.reporter.report(&err.to_string(), tex);
                Err(err)
            }
        }
    }

    fn try_run(&self, tex: &str) -> Result<FileArtifact, PipelineError> {
        validate(tex)?;

        let html = self.renderer.render(tex).map_err(|e| {
            debug!("{} renderer failed: {}", self.renderer.name(), e);
            PipelineError::RenderFailed(e)
        })?;
        let page = wrap_page(&html, &self.config.layout());

        let output = FileArtifact::new(self.config.output_image.clone());
        output.remove_if_exists()?;

        let scratch = &self.config.scratch_html;
        fs::write(scratch, page)?;
        let captured = self.screenshotter.capture_jpeg(
            scratch,
            self.config.viewport,
            self.config.clip,
            self.config.jpeg_quality,
            output.path(),
        );
        let cleanup = fs::remove_file(scratch);

        captured.map_err(PipelineError::Capture)?;
        cleanup?;
        Ok(output)
    }
}
