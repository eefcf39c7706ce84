//! Chart rendering.
//!
//! Charts are drawn with plotters. The backend follows the output file
//! extension: `.png` uses the bitmap backend, everything else is SVG.
//! Text is laid out with an embedded DejaVu Sans face so that no system
//! fonts are needed.

pub mod charts;
pub mod palette;

pub use charts::{draw_relative_phase, draw_traces};
pub use palette::Palette;

use crate::analysis::agents;
use crate::models::LogRow;
use crate::phase::RelativePhase;
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};
use std::io;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

/// Errors raised while drawing a chart.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("nothing to draw")]
    Empty,

    #[error("cannot create output directory: {0}")]
    Io(#[from] io::Error),

    #[error("drawing backend error: {0}")]
    Backend(String),

    #[error("embedded chart font could not be loaded")]
    Font,
}

/// Font family used for every caption, label and legend.
pub const FONT_FAMILY: &str = "sans-serif";

static EMBEDDED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Register the embedded face under [`FONT_FAMILY`]. Runs once per process.
pub fn ensure_font() -> Result<(), RenderError> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();
    let registered = *REGISTERED.get_or_init(|| {
        register_font(FONT_FAMILY, FontStyle::Normal, EMBEDDED_FONT).is_ok()
    });
    if registered {
        Ok(())
    } else {
        Err(RenderError::Font)
    }
}

/// Image backend selected from an output path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Svg,
    Png,
}

impl ImageFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("png") => ImageFormat::Png,
            _ => ImageFormat::Svg,
        }
    }
}

/// Chart size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSize {
    pub width: u32,
    pub height: u32,
}

impl From<&crate::config::PlotConfig> for ChartSize {
    fn from(config: &crate::config::PlotConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
        }
    }
}

impl ChartSize {
    fn dims(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), RenderError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating output directory {}", parent.display());
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Render the per-agent a0/a1/a2 trace chart to `path`.
pub fn render_traces(path: &Path, rows: &[LogRow], size: ChartSize) -> Result<(), RenderError> {
    if rows.is_empty() {
        return Err(RenderError::Empty);
    }
    ensure_parent_dir(path)?;
    let palette = Palette::for_agents(agents(rows));

    match ImageFormat::from_path(path) {
        ImageFormat::Png => {
            let root = BitMapBackend::new(path, size.dims()).into_drawing_area();
            draw_traces(&root, rows, &palette)?;
            root.present().map_err(|e| RenderError::Backend(e.to_string()))?;
        }
        ImageFormat::Svg => {
            let root = SVGBackend::new(path, size.dims()).into_drawing_area();
            draw_traces(&root, rows, &palette)?;
            root.present().map_err(|e| RenderError::Backend(e.to_string()))?;
        }
    }

    Ok(())
}

/// Render the relative phase chart to `path`.
pub fn render_relative_phase(
    path: &Path,
    phase: &RelativePhase,
    size: ChartSize,
) -> Result<(), RenderError> {
    ensure_parent_dir(path)?;
    let palette = Palette::for_agents(phase.series.keys().copied());

    match ImageFormat::from_path(path) {
        ImageFormat::Png => {
            let root = BitMapBackend::new(path, size.dims()).into_drawing_area();
            draw_relative_phase(&root, phase, &palette)?;
            root.present().map_err(|e| RenderError::Backend(e.to_string()))?;
        }
        ImageFormat::Svg => {
            let root = SVGBackend::new(path, size.dims()).into_drawing_area();
            draw_relative_phase(&root, phase, &palette)?;
            root.present().map_err(|e| RenderError::Backend(e.to_string()))?;
        }
    }

    Ok(())
}
