use resvg::usvg;
use serde::Serialize;
use thiserror::Error;
use tiny_skia::{Pixmap, Transform};

use crate::attributed::InlineImage;
use crate::svg::{GeometryError, SvgGeometry};

/// Points per x-height unit of the typesetting engine's output,
/// matched to the x-height of the default body font.
pub const DEFAULT_EX_TO_POINTS: f32 = 8.0;

#[derive(Debug, Error)]
pub enum TypesetError {
    #[error("math source is empty")]
    EmptySource,
    #[error("typesetting engine failed: {0}")]
    Engine(String),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error("Failed to parse SVG: {0}")]
    InvalidSvg(String),
    #[error("Invalid raster scale value: {0}")]
    InvalidScale(f32),
    #[error("Failed to create pixmap")]
    Pixmap,
    #[error("Failed to encode PNG: {0}")]
    Encode(String),
}

/// External math-typesetting engine: math source in, SVG document out.
///
/// Calls are blocking and synchronous; the host decides what thread
/// they run on. A failed call is reported once and dropped, never
/// retried.
pub trait MathTypesetter {
    fn typeset(&self, source: &str) -> Result<String, TypesetError>;
}

/// Observation hook for math renders that were dropped from the output.
pub trait FailureSink {
    fn math_render_failed(&self, source: &str, error: &TypesetError);
}

/// Conversion factors from the engine's font-relative units to output
/// points and device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MathMetrics {
    /// Points per ex unit.
    pub ex_to_points: f32,
    /// Display pixel density multiplier applied when rasterizing.
    pub pixel_scale: f32,
}

impl Default for MathMetrics {
    fn default() -> Self {
        Self {
            ex_to_points: DEFAULT_EX_TO_POINTS,
            pixel_scale: 1.0,
        }
    }
}

#[derive(Serialize)]
struct TypesetRequest<'a> {
    math: &'a str,
    format: &'a str,
    svg: bool,
}

/// Blocking client for a MathJax-style typesetting server that accepts
/// `{"math": ..., "format": "TeX", "svg": true}` and responds with an
/// SVG document.
pub struct HttpTypesetter {
    endpoint: String,
}

impl HttpTypesetter {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl MathTypesetter for HttpTypesetter {
    fn typeset(&self, source: &str) -> Result<String, TypesetError> {
        let payload = serde_json::to_string(&TypesetRequest {
            math: source,
            format: "TeX",
            svg: true,
        })
        .map_err(|e| TypesetError::Engine(e.to_string()))?;

        let mut response = ureq::post(self.endpoint.as_str())
            .header("content-type", "application/json")
            .send(payload.as_str())
            .map_err(|e| TypesetError::Engine(e.to_string()))?;

        response
            .body_mut()
            .read_to_string()
            .map_err(|e| TypesetError::Engine(e.to_string()))
    }
}

/// Typeset one math source string and rasterize it to an inline image.
///
/// The target display size in points is the engine-reported geometry
/// scaled by `metrics.ex_to_points`; the bitmap is rendered at that
/// size times `metrics.pixel_scale`.
pub fn render_math_image(
    typesetter: &dyn MathTypesetter,
    metrics: MathMetrics,
    source: &str,
) -> Result<InlineImage, TypesetError> {
    let source = source.trim();
    if source.is_empty() {
        return Err(TypesetError::EmptySource);
    }

    let document = typesetter.typeset(source)?;
    let geometry = SvgGeometry::parse(&document)?;

    let width = geometry.width * metrics.ex_to_points;
    let height = geometry.height * metrics.ex_to_points;
    let data = rasterize_svg(&document, width, height, metrics.pixel_scale)?;

    Ok(InlineImage::new(data, width, height)
        .baseline_offset(geometry.vertical_align * metrics.ex_to_points))
}

/// Rasterize an SVG document to PNG at a target size in points, scaled
/// by a display pixel density multiplier.
pub fn rasterize_svg(
    svg: &str,
    width: f32,
    height: f32,
    pixel_scale: f32,
) -> Result<Vec<u8>, TypesetError> {
    if !pixel_scale.is_finite() || pixel_scale <= 0.0 {
        return Err(TypesetError::InvalidScale(pixel_scale));
    }

    let mut opts = usvg::Options::default();
    opts.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opts).map_err(|e| TypesetError::InvalidSvg(e.to_string()))?;

    let pixel_width = (width * pixel_scale).ceil() as u32;
    let pixel_height = (height * pixel_scale).ceil() as u32;

    let mut pixmap = Pixmap::new(pixel_width, pixel_height).ok_or(TypesetError::Pixmap)?;
    let transform = Transform::from_scale(
        pixel_width as f32 / tree.size().width(),
        pixel_height as f32 / tree.size().height(),
    );

    resvg::render(&tree, transform, &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| TypesetError::Encode(e.to_string()))
}
