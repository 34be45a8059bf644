use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

const GITHUB_LIGHT_TEXT: &str = "#24292f";
const GITHUB_LIGHT_LINK: &str = "#0969da";
const GITHUB_LIGHT_CODE_TEXT: &str = "#24292f";

const FONT_SIZE_BASE: f32 = 16.0;
const FONT_SIZE_CODE: f32 = 13.0;

/// Font family, either a generic class resolved later against the
/// installed fonts or an already concrete family name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontFamily {
    SansSerif,
    Serif,
    Monospace,
    Named(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// Composable bag of text-presentation properties.
///
/// `None` fields inherit from whatever the bag is merged onto; merging
/// a bag onto a base yields a new bag where the overlay's set fields
/// take precedence. Merge is associative along a nesting path.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleAttributes {
    pub family: Option<FontFamily>,
    pub weight: Option<FontWeight>,
    pub style: Option<FontStyle>,
    pub size: Option<f32>,
    pub foreground: Option<String>,
    pub strikethrough: Option<bool>,
    pub link: Option<Url>,
}

impl StyleAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn family(mut self, family: FontFamily) -> Self {
        self.family = Some(family);
        self
    }

    #[must_use]
    pub fn weight(mut self, weight: FontWeight) -> Self {
        self.weight = Some(weight);
        self
    }

    #[must_use]
    pub fn style(mut self, style: FontStyle) -> Self {
        self.style = Some(style);
        self
    }

    #[must_use]
    pub fn size(mut self, size: f32) -> Self {
        self.size = Some(size);
        self
    }

    #[must_use]
    pub fn foreground(mut self, color: impl Into<String>) -> Self {
        self.foreground = Some(color.into());
        self
    }

    #[must_use]
    pub fn strikethrough(mut self) -> Self {
        self.strikethrough = Some(true);
        self
    }

    /// Layer `overlay` on top of `self`: overlay's set fields win,
    /// unset fields fall through to `self`.
    #[must_use]
    pub fn merged(&self, overlay: &StyleAttributes) -> StyleAttributes {
        StyleAttributes {
            family: overlay.family.clone().or_else(|| self.family.clone()),
            weight: overlay.weight.or(self.weight),
            style: overlay.style.or(self.style),
            size: overlay.size.or(self.size),
            foreground: overlay
                .foreground
                .clone()
                .or_else(|| self.foreground.clone()),
            strikethrough: overlay.strikethrough.or(self.strikethrough),
            link: overlay.link.clone().or_else(|| self.link.clone()),
        }
    }
}

/// Per-node-kind style overlays, fixed for the duration of a render
/// call and read-only to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSheet {
    pub emphasis: StyleAttributes,
    pub strong: StyleAttributes,
    pub strikethrough: StyleAttributes,
    pub link: StyleAttributes,
    pub code: StyleAttributes,
}

impl Default for StyleSheet {
    fn default() -> Self {
        Theme::default().stylesheet()
    }
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("Failed to parse theme TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

fn default_text() -> String {
    GITHUB_LIGHT_TEXT.to_string()
}
fn default_link() -> String {
    GITHUB_LIGHT_LINK.to_string()
}
fn default_code_text() -> String {
    GITHUB_LIGHT_CODE_TEXT.to_string()
}
fn default_font_size_base() -> f32 {
    FONT_SIZE_BASE
}
fn default_font_size_code() -> f32 {
    FONT_SIZE_CODE
}

/// Color and sizing configuration from which the base attributes and
/// the per-kind style sheet are derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_text")]
    pub text_color: String,
    #[serde(default = "default_link")]
    pub link_color: String,
    #[serde(default = "default_code_text")]
    pub code_text_color: String,

    #[serde(default = "default_font_size_base")]
    pub font_size_base: f32,
    #[serde(default = "default_font_size_code")]
    pub font_size_code: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            text_color: default_text(),
            link_color: default_link(),
            code_text_color: default_code_text(),
            font_size_base: FONT_SIZE_BASE,
            font_size_code: FONT_SIZE_CODE,
        }
    }
}

impl Theme {
    pub fn from_toml(content: &str) -> Result<Self, ThemeError> {
        Ok(toml::from_str(content)?)
    }

    /// Base attributes for body text under this theme.
    pub fn base_attributes(&self) -> StyleAttributes {
        StyleAttributes::new()
            .family(FontFamily::SansSerif)
            .weight(FontWeight::Normal)
            .style(FontStyle::Normal)
            .size(self.font_size_base)
            .foreground(self.text_color.clone())
    }

    /// Per-kind overlays applied as nesting increases.
    pub fn stylesheet(&self) -> StyleSheet {
        StyleSheet {
            emphasis: StyleAttributes::new().style(FontStyle::Italic),
            strong: StyleAttributes::new().weight(FontWeight::Bold),
            strikethrough: StyleAttributes::new().strikethrough(),
            link: StyleAttributes::new().foreground(self.link_color.clone()),
            code: StyleAttributes::new()
                .family(FontFamily::Monospace)
                .size(self.font_size_code)
                .foreground(self.code_text_color.clone()),
        }
    }
}
