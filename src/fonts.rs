use resvg::usvg::fontdb;

use crate::attributed::AttributedText;
use crate::style::FontFamily;

/// Concrete font families for the generic classes, discovered from an
/// installed-font database.
///
/// Used as the terminal pass of a render: generic `SansSerif`, `Serif`
/// and `Monospace` references in the output are rewritten to concrete
/// `Named` families so consumers need no fallback logic of their own.
#[derive(Debug, Clone, Default)]
pub struct FontResolver {
    sans: Option<String>,
    serif: Option<String>,
    mono: Option<String>,
}

impl FontResolver {
    pub fn from_system() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        Self::from_database(&db)
    }

    pub fn from_database(db: &fontdb::Database) -> Self {
        let mut sans_family: Option<String> = None;
        let mut serif_family: Option<String> = None;
        let mut mono_family: Option<String> = None;
        let mut first_family: Option<String> = None;

        for face in db.faces() {
            for (family, _) in &face.families {
                if first_family.is_none() {
                    first_family = Some(family.clone());
                }

                let lower = family.to_ascii_lowercase();
                if sans_family.is_none() && lower.contains("sans") {
                    sans_family = Some(family.clone());
                }
                if serif_family.is_none() && lower.contains("serif") {
                    serif_family = Some(family.clone());
                }
                if mono_family.is_none() && (lower.contains("mono") || lower.contains("code")) {
                    mono_family = Some(family.clone());
                }
            }
        }

        Self {
            sans: sans_family.clone().or_else(|| first_family.clone()),
            serif: serif_family.or_else(|| first_family.clone()),
            mono: mono_family.or(sans_family).or(first_family),
        }
    }

    /// The concrete family for a generic class, if one was discovered.
    pub fn concrete_family<'a>(&'a self, family: &'a FontFamily) -> Option<&'a str> {
        match family {
            FontFamily::SansSerif => self.sans.as_deref(),
            FontFamily::Serif => self.serif.as_deref(),
            FontFamily::Monospace => self.mono.as_deref(),
            FontFamily::Named(name) => Some(name),
        }
    }

    /// Rewrite every generic family reference in `text` to a concrete
    /// one. References with no discovered family are left unchanged.
    pub fn resolve(&self, text: &mut AttributedText) {
        text.map_attributes(|attributes| {
            let Some(family) = &attributes.family else {
                return;
            };
            if matches!(family, FontFamily::Named(_)) {
                return;
            }
            if let Some(name) = self.concrete_family(family) {
                attributes.family = Some(FontFamily::Named(name.to_string()));
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::FontResolver;
    use crate::attributed::AttributedText;
    use crate::style::{FontFamily, StyleAttributes};

    fn resolver(sans: Option<&str>, serif: Option<&str>, mono: Option<&str>) -> FontResolver {
        FontResolver {
            sans: sans.map(str::to_string),
            serif: serif.map(str::to_string),
            mono: mono.map(str::to_string),
        }
    }

    #[test]
    fn generic_families_become_named() {
        let mut text = AttributedText::new();
        text.push_text(
            "body",
            &StyleAttributes::new().family(FontFamily::SansSerif),
        );
        text.push_text(
            "code",
            &StyleAttributes::new().family(FontFamily::Monospace),
        );

        resolver(Some("Inter"), None, Some("JetBrains Mono")).resolve(&mut text);

        assert_eq!(
            text.spans()[0].attributes.family,
            Some(FontFamily::Named("Inter".to_string()))
        );
        assert_eq!(
            text.spans()[1].attributes.family,
            Some(FontFamily::Named("JetBrains Mono".to_string()))
        );
    }

    #[test]
    fn named_families_and_unresolved_generics_are_untouched() {
        let mut text = AttributedText::new();
        text.push_text(
            "a",
            &StyleAttributes::new().family(FontFamily::Named("Georgia".to_string())),
        );
        text.push_text("b", &StyleAttributes::new().family(FontFamily::Serif));

        resolver(None, None, None).resolve(&mut text);

        assert_eq!(
            text.spans()[0].attributes.family,
            Some(FontFamily::Named("Georgia".to_string()))
        );
        assert_eq!(text.spans()[1].attributes.family, Some(FontFamily::Serif));
    }

    #[test]
    fn empty_database_discovers_nothing() {
        let db = resvg::usvg::fontdb::Database::new();
        let resolver = FontResolver::from_database(&db);
        assert!(resolver.concrete_family(&FontFamily::SansSerif).is_none());
    }
}
