//! Render parsed markdown inline content to attributed rich text.
//!
//! A single tree walk turns inline nodes (text, emphasis, links, code
//! spans, raw HTML, breaks) into a flat sequence of styled runs. The
//! image-capable path additionally substitutes pre-resolved images for
//! image nodes and splices LaTeX math expressions, typeset by an
//! external engine and rasterized to PNG, into text leaves at their
//! source offsets.

pub mod attributed;
pub mod fonts;
pub mod inline;
pub mod math;
pub mod renderer;
pub mod style;
pub mod svg;
pub mod typeset;

pub use attributed::{AttributedText, InlineImage, Span, SpanContent};
pub use fonts::FontResolver;
pub use inline::{InlineNode, inline_nodes};
pub use math::{MathSpan, locate_math_spans, strip_math_delimiters};
pub use renderer::{ImageMap, MediaOptions, Renderer, SoftBreakMode};
pub use style::{
    FontFamily, FontStyle, FontWeight, StyleAttributes, StyleSheet, Theme, ThemeError,
};
pub use svg::{GeometryError, SvgGeometry, ViewBox};
pub use typeset::{
    DEFAULT_EX_TO_POINTS, FailureSink, HttpTypesetter, MathMetrics, MathTypesetter, TypesetError,
    rasterize_svg, render_math_image,
};
