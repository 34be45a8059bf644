use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static ROOT_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<svg[^>]*>").expect("svg root tag pattern must compile"));
static ATTRIBUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\S+="[^"]*""#).expect("svg attribute pattern must compile"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("svg document has no root element")]
    MissingRootElement,
    #[error("svg root element is missing geometry attributes")]
    MissingGeometry,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Sizing metadata parsed from a typeset math SVG document: the
/// baseline offset and display dimensions in x-height units, plus the
/// document view box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvgGeometry {
    /// Baseline offset in ex units; negative values sit below the baseline.
    pub vertical_align: f32,
    /// Display width in ex units.
    pub width: f32,
    /// Display height in ex units.
    pub height: f32,
    pub view_box: ViewBox,
}

impl SvgGeometry {
    /// Extract geometry from the root element of an SVG document.
    ///
    /// Parse failures for an individual attribute leave that field
    /// absent; only the final completeness check is fatal.
    pub fn parse(document: &str) -> Result<Self, GeometryError> {
        let root = ROOT_TAG
            .find(document)
            .ok_or(GeometryError::MissingRootElement)?;

        let mut vertical_align = None;
        let mut width = None;
        let mut height = None;
        let mut view_box = None;

        for attribute in ATTRIBUTE.find_iter(root.as_str()) {
            let parts: Vec<&str> = attribute.as_str().split('=').collect();
            if parts.len() != 2 {
                continue;
            }

            let value = parts[1].trim_matches('"');
            match parts[0] {
                "style" => vertical_align = parse_vertical_align(value),
                "width" => width = parse_ex(value),
                "height" => height = parse_ex(value),
                "viewBox" => view_box = parse_view_box(value),
                _ => {}
            }
        }

        match (vertical_align, width, height, view_box) {
            (Some(vertical_align), Some(width), Some(height), Some(view_box)) => Ok(SvgGeometry {
                vertical_align,
                width,
                height,
                view_box,
            }),
            _ => Err(GeometryError::MissingGeometry),
        }
    }
}

/// Parse a `vertical-align: <N>ex;` style fragment.
fn parse_vertical_align(value: &str) -> Option<f32> {
    let cleaned = value.trim().trim_end_matches(';');
    let mut parts = cleaned.splitn(2, ':');
    let property = parts.next()?.trim();
    let length = parts.next()?;
    if property != "vertical-align" {
        return None;
    }
    parse_ex(length)
}

/// Parse the numeric prefix of an `<N>ex` length.
fn parse_ex(value: &str) -> Option<f32> {
    value
        .trim()
        .trim_end_matches(';')
        .strip_suffix("ex")?
        .trim()
        .parse()
        .ok()
}

fn parse_view_box(value: &str) -> Option<ViewBox> {
    let numbers: Vec<f32> = value
        .split_whitespace()
        .filter_map(|part| part.parse().ok())
        .collect();
    if numbers.len() != 4 || value.split_whitespace().count() != 4 {
        return None;
    }
    Some(ViewBox {
        x: numbers[0],
        y: numbers[1],
        width: numbers[2],
        height: numbers[3],
    })
}

#[cfg(test)]
mod tests {
    use super::{GeometryError, SvgGeometry};

    const MATHJAX_STYLE_SVG: &str = r#"<svg style="vertical-align: -1.602ex;" width="2.127ex" height="1.8ex" viewBox="0 -1342 940 2050" xmlns="http://www.w3.org/2000/svg"><path d="M0 0h940v2050H0z"/></svg>"#;

    #[test]
    fn extracts_all_four_fields() {
        let geometry = SvgGeometry::parse(MATHJAX_STYLE_SVG).expect("geometry must parse");
        assert_eq!(geometry.vertical_align, -1.602);
        assert_eq!(geometry.width, 2.127);
        assert_eq!(geometry.height, 1.8);
        assert_eq!(geometry.view_box.x, 0.0);
        assert_eq!(geometry.view_box.y, -1342.0);
        assert_eq!(geometry.view_box.width, 940.0);
        assert_eq!(geometry.view_box.height, 2050.0);
    }

    #[test]
    fn missing_view_box_is_missing_geometry() {
        let document = r#"<svg style="vertical-align: -1.602ex;" width="2.127ex" height="1.8ex"></svg>"#;
        assert_eq!(
            SvgGeometry::parse(document),
            Err(GeometryError::MissingGeometry)
        );
    }

    #[test]
    fn missing_root_element_is_reported() {
        assert_eq!(
            SvgGeometry::parse("<div>not svg</div>"),
            Err(GeometryError::MissingRootElement)
        );
    }

    #[test]
    fn non_ex_lengths_leave_the_field_absent() {
        let document = r#"<svg style="vertical-align: -1.602ex;" width="200px" height="1.8ex" viewBox="0 0 1 1"></svg>"#;
        assert_eq!(
            SvgGeometry::parse(document),
            Err(GeometryError::MissingGeometry)
        );
    }

    #[test]
    fn attributes_outside_the_root_tag_are_ignored() {
        let document = r#"<svg style="vertical-align: 0.5ex;" width="1ex" height="1ex" viewBox="0 0 8 8"><rect width="440ex" height="2ex"/></svg>"#;
        let geometry = SvgGeometry::parse(document).expect("geometry must parse");
        assert_eq!(geometry.width, 1.0);
        assert_eq!(geometry.height, 1.0);
    }
}
