use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

// Non-greedy and line-spanning: a math expression may wrap across
// soft-wrapped source lines.
static INLINE_MATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\\\(.*?\\\)").expect("inline math pattern must compile"));
static DISPLAY_MATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\$\$.*?\$\$").expect("display math pattern must compile"));

/// A delimited math sub-expression found in plain text: its half-open
/// byte range in the source and the matched substring, delimiters
/// included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathSpan {
    pub range: Range<usize>,
    pub text: String,
}

/// Scan `text` for `\(...\)` and `$$...$$` sub-expressions.
///
/// Spans are returned in discovery order: all inline-pattern matches in
/// document order, then all display-pattern matches in document order.
/// The two lists are not merged by position, and overlapping matches
/// are not resolved here; consumers that splice replacements must
/// position-sort first (see the renderer).
pub fn locate_math_spans(text: &str) -> Vec<MathSpan> {
    let mut spans = Vec::new();
    for pattern in [&INLINE_MATH, &DISPLAY_MATH] {
        for found in pattern.find_iter(text) {
            spans.push(MathSpan {
                range: found.range(),
                text: found.as_str().to_string(),
            });
        }
    }
    spans
}

/// Strip the math delimiters from a matched substring, leaving the raw
/// math source.
pub fn strip_math_delimiters(text: &str) -> String {
    text.replace(r"\(", "").replace(r"\)", "").replace("$$", "")
}

#[cfg(test)]
mod tests {
    use super::{locate_math_spans, strip_math_delimiters};

    #[test]
    fn finds_inline_math_with_offsets() {
        let spans = locate_math_spans(r"see \(x+1\) end");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].range, 4..11);
        assert_eq!(spans[0].text, r"\(x+1\)");
    }

    #[test]
    fn finds_display_math() {
        let spans = locate_math_spans("before $$\\int_0^1 f$$ after");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "$$\\int_0^1 f$$");
    }

    #[test]
    fn matching_is_non_greedy() {
        let spans = locate_math_spans(r"\(a\) mid \(b\)");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, r"\(a\)");
        assert_eq!(spans[1].text, r"\(b\)");
    }

    #[test]
    fn expressions_span_lines() {
        let spans = locate_math_spans("$$a\n+ b$$");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "$$a\n+ b$$");
    }

    #[test]
    fn inline_matches_precede_display_matches_regardless_of_position() {
        let spans = locate_math_spans(r"$$d$$ then \(i\)");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, r"\(i\)");
        assert_eq!(spans[1].text, "$$d$$");
        assert!(spans[0].range.start > spans[1].range.start);
    }

    #[test]
    fn delimiters_are_stripped() {
        assert_eq!(strip_math_delimiters(r"\(x+1\)"), "x+1");
        assert_eq!(strip_math_delimiters("$$x+1$$"), "x+1");
    }
}
