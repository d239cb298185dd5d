//! Math rendering and the HTML page handed to the browser.

use katex::{Opts, OutputType};
use thiserror::Error;

use crate::Viewport;

/// Substrings that renderers embed in their output when a formula could
/// not be typeset, even though the call itself succeeded.
pub const ERROR_MARKERS: [&str; 5] = [
    "class=\"error\"",
    "data-error",
    "class=\"katex-error\"",
    "class=\"error-message\"",
    "[PARSE ERROR:",
];

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("math engine rejected the input: {0}")]
    Engine(String),
    #[error("rendered output contains error marker `{0}`")]
    ErrorMarker(&'static str),
}

/// Turns validated LaTeX into an HTML fragment.
pub trait MathRenderer: std::fmt::Debug + Send + Sync {
    fn render(&self, tex: &str) -> Result<String, RenderError>;

    /// Returns a human-readable name for this renderer.
    fn name(&self) -> &'static str;
}

/// Renders each block through KaTeX as display-style MathML, which the
/// browser typesets natively without a stylesheet.
///
/// Parse failures are rendered in place as `katex-error` spans rather than
/// thrown, so they surface through [`ERROR_MARKERS`].
#[derive(Debug, Default)]
pub struct KatexRenderer;

impl KatexRenderer {
    fn opts() -> Result<Opts, RenderError> {
        Opts::builder()
            .display_mode(true)
            .output_type(OutputType::Mathml)
            .throw_on_error(false)
            .build()
            .map_err(|e| RenderError::Engine(e.to_string()))
    }
}

impl MathRenderer for KatexRenderer {
    fn render(&self, tex: &str) -> Result<String, RenderError> {
        let opts = Self::opts()?;
        let mut html = String::new();
        for block in math_blocks(tex) {
            let rendered = katex::render_with_opts(block, &opts)
                .map_err(|e| RenderError::Engine(e.to_string()))?;
            if let Some(marker) = first_error_marker(&rendered) {
                return Err(RenderError::ErrorMarker(marker));
            }
            html.push_str("<div class=\"math-block\">");
            html.push_str(&rendered);
            html.push_str("</div>");
        }
        Ok(html)
    }

    fn name(&self) -> &'static str {
        "katex"
    }
}

/// Splits source into paragraphs at blank lines that sit outside every
/// environment. Each paragraph is typeset as its own display block.
pub fn math_blocks(tex: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    let mut offset = 0;

    for line in tex.split_inclusive('\n') {
        let end = offset + line.len();
        if line.trim().is_empty() {
            if depth == 0 {
                if let Some(from) = start.take() {
                    blocks.push(tex[from..offset].trim());
                }
            }
        } else {
            start.get_or_insert(offset);
            depth += line.matches("\\begin{").count();
            depth = depth.saturating_sub(line.matches("\\end{").count());
        }
        offset = end;
    }
    if let Some(from) = start {
        blocks.push(tex[from..].trim());
    }
    blocks
}

pub fn first_error_marker(html: &str) -> Option<&'static str> {
    ERROR_MARKERS.into_iter().find(|marker| html.contains(marker))
}

pub fn has_error_marker(html: &str) -> bool {
    first_error_marker(html).is_some()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    pub viewport: Viewport,
    pub font_size_px: u32,
}

/// Wraps rendered math in a white page with the formula centred in a
/// viewport-sized container.
pub fn wrap_page(html: &str, layout: &PageLayout) -> String {
    let Viewport { width, height } = layout.viewport;
    let font_size = layout.font_size_px;
    format!(
        r#"<html>
<head>
    <meta charset="utf-8">
    <style>
        body {{
            font-family: Arial, sans-serif;
            background-color: white;
            display: flex;
            justify-content: center;
            align-items: center;
            height: 100vh;
            margin: 0;
        }}
        .container {{
            width: {width}px;
            height: {height}px;
            background-color: white;
            display: flex;
            justify-content: center;
            align-items: center;
        }}
        .math-content {{
            display: inline-block;
            background-color: white;
            text-align: center;
            font-size: {font_size}px;
        }}
    </style>
</head>
<body>
    <div class="container">
        <div class="math-content">{html}</div>
    </div>
</body>
</html>"#
    )
}
