use std::borrow::Cow;
use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::attributed::{AttributedText, InlineImage};
use crate::fonts::FontResolver;
use crate::inline::InlineNode;
use crate::math::{locate_math_spans, strip_math_delimiters};
use crate::style::{StyleAttributes, StyleSheet};
use crate::typeset::{FailureSink, MathMetrics, MathTypesetter, render_math_image};

static LEADING_WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s+").expect("leading whitespace pattern must compile"));
static HTML_TAG_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*<\s*([A-Za-z][A-Za-z0-9]*)").expect("html tag pattern must compile"));

/// How a markdown soft break renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SoftBreakMode {
    /// Collapse to a single space.
    #[default]
    Space,
    /// Force a line break.
    LineBreak,
}

/// Pre-resolved images keyed by their markdown source string.
pub type ImageMap = HashMap<String, InlineImage>;

/// Collaborators for the image-capable render path: the image map for
/// image nodes and the typesetting pipeline for math spans.
pub struct MediaOptions<'a> {
    pub images: &'a ImageMap,
    pub typesetter: &'a dyn MathTypesetter,
    pub metrics: MathMetrics,
    /// Where dropped math renders are reported; stderr when unset.
    pub failures: Option<&'a dyn FailureSink>,
}

/// Tree walker from inline nodes to attributed text.
///
/// Style state is threaded as an explicit parameter: each style-bearing
/// node derives a merged bag for its subtree and the parent's bag is
/// untouched by construction.
pub struct Renderer<'a> {
    styles: &'a StyleSheet,
    base_url: Option<&'a Url>,
    soft_break: SoftBreakMode,
    fonts: Option<&'a FontResolver>,
}

impl<'a> Renderer<'a> {
    pub fn new(styles: &'a StyleSheet) -> Self {
        Self {
            styles,
            base_url: None,
            soft_break: SoftBreakMode::default(),
            fonts: None,
        }
    }

    /// Base URL that relative link destinations resolve against.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &'a Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    #[must_use]
    pub fn with_soft_break(mut self, mode: SoftBreakMode) -> Self {
        self.soft_break = mode;
        self
    }

    /// Resolve generic font families in the finished output through
    /// `fonts` as a terminal pass.
    #[must_use]
    pub fn with_fonts(mut self, fonts: &'a FontResolver) -> Self {
        self.fonts = Some(fonts);
        self
    }

    /// Render to styled text only. Image nodes produce no output.
    pub fn render(&self, nodes: &[InlineNode], base: &StyleAttributes) -> AttributedText {
        self.run(nodes, base, &mut PlainLeaves)
    }

    /// Render with inline images: image nodes substitute from the image
    /// map and math spans in text leaves splice in typeset images.
    pub fn render_rich(
        &self,
        nodes: &[InlineNode],
        base: &StyleAttributes,
        media: &MediaOptions,
    ) -> AttributedText {
        self.run(nodes, base, &mut MediaLeaves { media })
    }

    fn run<P: LeafPolicy>(
        &self,
        nodes: &[InlineNode],
        base: &StyleAttributes,
        policy: &mut P,
    ) -> AttributedText {
        let mut out = AttributedText::new();
        let mut walk = Walk {
            renderer: self,
            skip_whitespace: false,
        };
        walk.nodes(nodes, base, &mut out, policy);

        if let Some(fonts) = self.fonts {
            fonts.resolve(&mut out);
        }
        out
    }

    fn resolve_link(&self, destination: &str) -> Option<Url> {
        match self.base_url {
            Some(base) => base.join(destination).ok(),
            None => Url::parse(destination).ok(),
        }
    }
}

/// How the walker renders the two leaf kinds that differ between the
/// styled-text and image-capable outputs.
trait LeafPolicy {
    /// A text leaf, after any leading-whitespace stripping.
    fn text_leaf(&mut self, text: &str, attrs: &StyleAttributes, out: &mut AttributedText);

    fn image(&mut self, source: &str, attrs: &StyleAttributes, out: &mut AttributedText);

    /// Whether a soft break rendered as a line break arms the
    /// following-whitespace skip.
    fn soft_line_break_arms_skip(&self) -> bool;
}

struct PlainLeaves;

impl LeafPolicy for PlainLeaves {
    fn text_leaf(&mut self, text: &str, attrs: &StyleAttributes, out: &mut AttributedText) {
        out.push_text(text, attrs);
    }

    fn image(&mut self, _source: &str, _attrs: &StyleAttributes, _out: &mut AttributedText) {
        // Styled-text output has no image embedding.
    }

    fn soft_line_break_arms_skip(&self) -> bool {
        false
    }
}

struct MediaLeaves<'m> {
    media: &'m MediaOptions<'m>,
}

impl MediaLeaves<'_> {
    fn report(&self, source: &str, error: &crate::typeset::TypesetError) {
        match self.media.failures {
            Some(sink) => sink.math_render_failed(source, error),
            None => eprintln!("Failed to render math '{}': {}", source, error),
        }
    }
}

impl LeafPolicy for MediaLeaves<'_> {
    fn text_leaf(&mut self, text: &str, attrs: &StyleAttributes, out: &mut AttributedText) {
        let mut spans = locate_math_spans(text);
        // Spans arrive grouped by delimiter kind; position-sort so the
        // gap cursor stays monotone, and drop matches overlapping an
        // already consumed span.
        spans.sort_by_key(|span| span.range.start);

        let mut cursor = 0;
        for span in spans {
            if span.range.start < cursor {
                continue;
            }
            out.push_text(&text[cursor..span.range.start], attrs);

            let source = strip_math_delimiters(&span.text);
            match render_math_image(self.media.typesetter, self.media.metrics, &source) {
                Ok(image) => out.push_image(image, attrs),
                Err(error) => self.report(&source, &error),
            }
            cursor = span.range.end;
        }
        out.push_text(&text[cursor..], attrs);
    }

    fn image(&mut self, source: &str, attrs: &StyleAttributes, out: &mut AttributedText) {
        if let Some(image) = self.media.images.get(source) {
            out.push_image(image.clone(), attrs);
        }
    }

    fn soft_line_break_arms_skip(&self) -> bool {
        true
    }
}

struct Walk<'r, 'a> {
    renderer: &'r Renderer<'a>,
    skip_whitespace: bool,
}

impl Walk<'_, '_> {
    fn nodes<P: LeafPolicy>(
        &mut self,
        nodes: &[InlineNode],
        attrs: &StyleAttributes,
        out: &mut AttributedText,
        policy: &mut P,
    ) {
        for node in nodes {
            self.node(node, attrs, out, policy);
        }
    }

    fn node<P: LeafPolicy>(
        &mut self,
        node: &InlineNode,
        attrs: &StyleAttributes,
        out: &mut AttributedText,
        policy: &mut P,
    ) {
        let styles = self.renderer.styles;

        match node {
            InlineNode::Text(text) => {
                let text = if self.skip_whitespace {
                    self.skip_whitespace = false;
                    LEADING_WHITESPACE.replace(text, "")
                } else {
                    Cow::Borrowed(text.as_str())
                };
                policy.text_leaf(&text, attrs, out);
            }
            InlineNode::SoftBreak => match self.renderer.soft_break {
                SoftBreakMode::Space => {
                    if self.skip_whitespace {
                        self.skip_whitespace = false;
                    } else {
                        out.push_text(" ", attrs);
                    }
                }
                SoftBreakMode::LineBreak => {
                    out.push_text("\n", attrs);
                    if policy.soft_line_break_arms_skip() {
                        self.skip_whitespace = true;
                    }
                }
            },
            InlineNode::LineBreak => out.push_text("\n", attrs),
            InlineNode::Code(code) => out.push_text(code, &attrs.merged(&styles.code)),
            InlineNode::Html(html) => {
                if html_tag_name(html).is_some_and(|name| name == "br") {
                    out.push_text("\n", attrs);
                    self.skip_whitespace = true;
                } else {
                    // Literal passthrough: no whitespace stripping, no
                    // math scanning.
                    out.push_text(html, attrs);
                }
            }
            InlineNode::Emphasis(children) => {
                self.nodes(children, &attrs.merged(&styles.emphasis), out, policy)
            }
            InlineNode::Strong(children) => {
                self.nodes(children, &attrs.merged(&styles.strong), out, policy)
            }
            InlineNode::Strikethrough(children) => {
                self.nodes(children, &attrs.merged(&styles.strikethrough), out, policy)
            }
            InlineNode::Link {
                destination,
                children,
            } => {
                let mut linked = attrs.merged(&styles.link);
                linked.link = self.renderer.resolve_link(destination);
                self.nodes(children, &linked, out, policy);
            }
            InlineNode::Image { source, .. } => policy.image(source, attrs, out),
        }
    }
}

fn html_tag_name(html: &str) -> Option<String> {
    HTML_TAG_NAME
        .captures(html)
        .map(|captures| captures[1].to_ascii_lowercase())
}
