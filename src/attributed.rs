use crate::style::StyleAttributes;

/// A rendered inline image: encoded PNG pixels plus the display size in
/// points and the baseline offset (negative values drop below the
/// baseline, matching the typesetting engine's vertical alignment).
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub data: Vec<u8>,
    pub width: f32,
    pub height: f32,
    pub baseline_offset: f32,
}

impl InlineImage {
    pub fn new(data: Vec<u8>, width: f32, height: f32) -> Self {
        Self {
            data,
            width,
            height,
            baseline_offset: 0.0,
        }
    }

    #[must_use]
    pub fn baseline_offset(mut self, offset: f32) -> Self {
        self.baseline_offset = offset;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpanContent {
    Text(String),
    Image(InlineImage),
}

/// One styled run of output.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub content: SpanContent,
    pub attributes: StyleAttributes,
}

/// An ordered sequence of styled runs, conceptually a single string
/// with per-range style annotations plus embedded images.
///
/// Built incrementally during a tree walk; adjacent text runs with
/// identical attributes coalesce into one span.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributedText {
    spans: Vec<Span>,
}

impl AttributedText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn push_text(&mut self, text: &str, attributes: &StyleAttributes) {
        if text.is_empty() {
            return;
        }

        if let Some(last) = self.spans.last_mut()
            && last.attributes == *attributes
            && let SpanContent::Text(existing) = &mut last.content
        {
            existing.push_str(text);
            return;
        }

        self.spans.push(Span {
            content: SpanContent::Text(text.to_string()),
            attributes: attributes.clone(),
        });
    }

    pub fn push_image(&mut self, image: InlineImage, attributes: &StyleAttributes) {
        self.spans.push(Span {
            content: SpanContent::Image(image),
            attributes: attributes.clone(),
        });
    }

    /// The text content with images skipped.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for span in &self.spans {
            if let SpanContent::Text(text) = &span.content {
                out.push_str(text);
            }
        }
        out
    }

    /// Rewrite the attributes of every span in place.
    pub(crate) fn map_attributes(&mut self, mut f: impl FnMut(&mut StyleAttributes)) {
        for span in &mut self.spans {
            f(&mut span.attributes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AttributedText, InlineImage, SpanContent};
    use crate::style::{FontWeight, StyleAttributes};

    #[test]
    fn adjacent_text_with_equal_attributes_coalesces() {
        let attrs = StyleAttributes::new().size(16.0);
        let mut text = AttributedText::new();
        text.push_text("a", &attrs);
        text.push_text(" b", &attrs);

        assert_eq!(text.spans().len(), 1);
        assert_eq!(text.plain_text(), "a b");
    }

    #[test]
    fn differing_attributes_start_a_new_span() {
        let base = StyleAttributes::new().size(16.0);
        let bold = base.merged(&StyleAttributes::new().weight(FontWeight::Bold));

        let mut text = AttributedText::new();
        text.push_text("a", &base);
        text.push_text("b", &bold);

        assert_eq!(text.spans().len(), 2);
    }

    #[test]
    fn empty_text_pushes_nothing() {
        let mut text = AttributedText::new();
        text.push_text("", &StyleAttributes::new());
        assert!(text.is_empty());
    }

    #[test]
    fn images_interrupt_coalescing() {
        let attrs = StyleAttributes::new();
        let mut text = AttributedText::new();
        text.push_text("a", &attrs);
        text.push_image(InlineImage::new(vec![1, 2, 3], 4.0, 4.0), &attrs);
        text.push_text("b", &attrs);

        assert_eq!(text.spans().len(), 3);
        assert!(matches!(text.spans()[1].content, SpanContent::Image(_)));
        assert_eq!(text.plain_text(), "ab");
    }
}
