//! The immutable token registry and its resolver.
//!
//! A [`Registry`] only exists once every construction check has passed:
//! tokens are well-formed, both themes define the same roles, and every
//! component field has a single owner. After that it is read-only and can
//! be shared freely between threads.

use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::component::{ComponentSet, StyleRecord, StyleValue};
use crate::document::{DesignDocument, EMBEDDED_DOCUMENT};
use crate::error::{Result, SwatchError};
use crate::primitive::PrimitiveSet;
use crate::theme::{Theme, ThemeSet};
use crate::token::Token;

#[derive(Debug, Clone)]
pub struct Registry {
    name: String,
    primitives: PrimitiveSet,
    themes: ThemeSet,
    components: ComponentSet,
}

impl Registry {
    /// Build the registry from the built-in design document.
    pub fn embedded() -> Result<Self> {
        Self::from_toml(EMBEDDED_DOCUMENT)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading design document");
        let source = std::fs::read_to_string(path)?;
        Self::from_toml(&source)
    }

    pub fn from_toml(source: &str) -> Result<Self> {
        let document: DesignDocument = toml::from_str(source)
            .inspect_err(|e| warn!("design document does not parse: {e}"))?;
        Self::from_document(&document)
    }

    /// Validate `document` and freeze it. Stages run in order (tokens,
    /// theme parity, field ownership); each stage reports all of its
    /// problems at once.
    pub fn from_document(document: &DesignDocument) -> Result<Self> {
        let mut issues = Vec::new();
        let primitives = PrimitiveSet::build(&document.primitives, &mut issues);
        let themes = ThemeSet::build(
            &document.themes.light,
            &document.themes.dark,
            &primitives,
            &mut issues,
        );
        let components = ComponentSet::build(&document.components, &themes, &mut issues);

        if !issues.is_empty() {
            warn!(count = issues.len(), "rejecting design document: malformed tokens");
            return Err(SwatchError::InvalidToken(issues));
        }
        debug!("tokens valid");

        themes
            .check_parity()
            .inspect_err(|e| warn!("rejecting design document: {e}"))?;
        debug!("theme parity holds");

        components
            .check_ownership()
            .inspect_err(|e| warn!("rejecting design document: {e}"))?;
        debug!("field ownership holds");

        info!(
            name = %document.meta.name,
            components = components.names().count(),
            roles = themes.group(Theme::Light).len(),
            "token registry ready"
        );

        Ok(Self {
            name: document.meta.name.clone(),
            primitives,
            themes,
            components,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primitives(&self) -> &PrimitiveSet {
        &self.primitives
    }

    pub fn themes(&self) -> &ThemeSet {
        &self.themes
    }

    pub fn components(&self) -> &ComponentSet {
        &self.components
    }

    // ── Lookups ─────────────────────────────────────────────────────

    /// Raw primitive value, outside any component context.
    pub fn get_primitive(&self, category: &str, key: &str) -> Result<&Token> {
        self.primitives.get(category, key)
    }

    pub fn resolve_semantic(&self, theme: Theme, role: &str) -> Result<&Token> {
        self.themes.resolve(theme, role)
    }

    /// Base merged with `variant`, role references left in place.
    pub fn resolve_component(&self, component: &str, variant: Option<&str>) -> Result<StyleRecord> {
        self.components.resolve(component, variant)
    }

    /// Fully resolved style for `(theme, component, variant)`: the merged
    /// record with every role reference replaced by the theme's token.
    pub fn resolve(
        &self,
        theme: Theme,
        component: &str,
        variant: Option<&str>,
    ) -> Result<ResolvedStyle> {
        let merged = self.components.resolve(component, variant)?;
        Ok(ResolvedStyle {
            theme,
            component: component.to_string(),
            variant: variant.map(str::to_string),
            fields: self.substitute_record(theme, merged)?,
        })
    }

    fn substitute_record(
        &self,
        theme: Theme,
        record: StyleRecord,
    ) -> Result<IndexMap<String, ResolvedValue>> {
        record
            .into_iter()
            .map(|(field, value)| Ok((field, self.substitute(theme, value)?)))
            .collect()
    }

    fn substitute(&self, theme: Theme, value: StyleValue) -> Result<ResolvedValue> {
        Ok(match value {
            StyleValue::Token(token) => ResolvedValue::Token(token),
            StyleValue::Role(role) => {
                ResolvedValue::Token(self.themes.resolve(theme, role.role())?.clone())
            }
            StyleValue::Group(group) => ResolvedValue::Group(self.substitute_record(theme, group)?),
        })
    }

    // ── Introspection ───────────────────────────────────────────────

    pub fn list_components(&self) -> Vec<&str> {
        self.components.names().collect()
    }

    pub fn list_variants(&self, component: &str) -> Result<Vec<&str>> {
        Ok(self.components.get(component)?.variant_names().collect())
    }

    pub fn list_roles(&self, theme: Theme) -> Vec<&str> {
        self.themes.group(theme).roles().collect()
    }

    pub fn list_categories(&self) -> Vec<&str> {
        self.primitives.categories().collect()
    }

    /// Every primitive, every role and every `(theme, component, variant)`
    /// resolution, for code generators.
    pub fn export(&self) -> Result<Export<'_>> {
        let mut themes = IndexMap::new();
        let mut styles = Vec::new();
        for theme in Theme::ALL {
            themes.insert(theme.as_str(), self.themes.group(theme).iter().collect());
            for component in self.components.names() {
                styles.push(self.resolve(theme, component, None)?);
                for variant in self.components.get(component)?.variant_names() {
                    styles.push(self.resolve(theme, component, Some(variant))?);
                }
            }
        }
        Ok(Export {
            name: &self.name,
            primitives: &self.primitives,
            themes,
            styles,
        })
    }
}

/// A resolved field: a literal token, or one level of nested fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResolvedValue {
    Token(Token),
    Group(IndexMap<String, ResolvedValue>),
}

impl ResolvedValue {
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Self::Token(t) => Some(t),
            Self::Group(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_token().and_then(Token::as_str)
    }

    /// Field of a nested group.
    pub fn get(&self, field: &str) -> Option<&ResolvedValue> {
        match self {
            Self::Group(fields) => fields.get(field),
            Self::Token(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedStyle {
    pub theme: Theme,
    pub component: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    pub fields: IndexMap<String, ResolvedValue>,
}

impl ResolvedStyle {
    pub fn get(&self, field: &str) -> Option<&ResolvedValue> {
        self.fields.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(ResolvedValue::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn into_fields(self) -> IndexMap<String, ResolvedValue> {
        self.fields
    }
}

#[derive(Debug, Serialize)]
pub struct Export<'a> {
    pub name: &'a str,
    pub primitives: &'a PrimitiveSet,
    pub themes: IndexMap<&'static str, IndexMap<&'a str, &'a Token>>,
    pub styles: Vec<ResolvedStyle>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        Registry::embedded().unwrap()
    }

    #[test]
    fn test_button_primary_light() {
        let style = registry().resolve(Theme::Light, "button", Some("primary")).unwrap();
        assert_eq!(style.get_str("bg"), Some("#166D5B"));
        assert_eq!(style.get_str("text"), Some("#FFFFFF"));
        assert_eq!(style.get_str("minHeight"), Some("52px"));
        assert_eq!(style.get("fontWeight").and_then(ResolvedValue::as_token), Some(&Token::Weight(700)));
    }

    #[test]
    fn test_button_secondary_light() {
        let style = registry().resolve(Theme::Light, "button", Some("secondary")).unwrap();
        assert_eq!(style.get_str("bg"), Some("#FFCB17"));
        assert_eq!(style.get_str("text"), Some("#000000"));
    }

    #[test]
    fn test_card_feature_keeps_base_fields() {
        let style = registry().resolve(Theme::Light, "card", Some("feature")).unwrap();
        assert_eq!(style.get_str("bg"), Some("#FAFAFA"));
        assert_eq!(style.get_str("radius"), Some("24px"));
        assert_eq!(style.get_str("iconSize"), Some("40px"));
    }

    #[test]
    fn test_accordion_without_variant() {
        let registry = registry();
        let record = registry.resolve_component("accordion", None).unwrap();
        let keys: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["header", "body", "border", "radius", "gap"]);
        assert_eq!(&record, registry.components().get("accordion").unwrap().base());

        let style = registry.resolve(Theme::Light, "accordion", None).unwrap();
        let header = style.get("header").unwrap();
        assert_eq!(header.get("iconSize").and_then(ResolvedValue::as_str), Some("20px"));
        assert_eq!(style.get_str("gap"), Some("8px"));
    }

    #[test]
    fn test_dark_button_text_defined() {
        let style = registry().resolve(Theme::Dark, "button", Some("primary")).unwrap();
        assert!(style.get_str("text").is_some());
    }

    #[test]
    fn test_get_primitive() {
        let registry = registry();
        assert_eq!(
            registry.get_primitive("spacing", "section").unwrap().as_str(),
            Some("96px")
        );
        assert!(matches!(
            registry.get_primitive("spacing", "99"),
            Err(SwatchError::NotFound { .. })
        ));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let registry = registry();
        for theme in Theme::ALL {
            let a = registry.resolve(theme, "card", Some("faq")).unwrap();
            let b = registry.resolve(theme, "card", Some("faq")).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_mutating_result_does_not_leak() {
        let registry = registry();
        let mut fields = registry
            .resolve(Theme::Light, "button", Some("primary"))
            .unwrap()
            .into_fields();
        fields.insert("bg".into(), ResolvedValue::Token(Token::Text("red".into())));
        fields.clear();

        let again = registry.resolve(Theme::Light, "button", Some("primary")).unwrap();
        assert_eq!(again.get_str("bg"), Some("#166D5B"));
    }

    #[test]
    fn test_semantic_roles_per_theme() {
        let registry = registry();
        assert_eq!(
            registry.resolve_semantic(Theme::Light, "status.error").unwrap().as_str(),
            Some("#DC2626")
        );
        assert_eq!(
            registry.resolve_semantic(Theme::Dark, "status.error").unwrap().as_str(),
            Some("#F87171")
        );
        // Light aliases primitives; dark carries its own values.
        assert_eq!(
            registry.resolve_semantic(Theme::Light, "greenHover").unwrap().as_str(),
            Some("#114e44")
        );
        assert_eq!(
            registry.resolve_semantic(Theme::Dark, "greenHover").unwrap().as_str(),
            Some("#1F8A70")
        );
        assert_eq!(registry.list_roles(Theme::Light), registry.list_roles(Theme::Dark));
    }

    #[test]
    fn test_introspection() {
        let registry = registry();
        assert_eq!(
            registry.list_components(),
            vec!["button", "link", "card", "accordion", "form"]
        );
        assert_eq!(registry.list_variants("button").unwrap(), vec!["primary", "secondary"]);
        assert_eq!(registry.list_variants("form").unwrap(), vec!["field", "label", "error"]);
        assert!(registry.list_variants("accordion").unwrap().is_empty());
        assert!(matches!(
            registry.list_variants("modal"),
            Err(SwatchError::UnknownComponent(_))
        ));
        assert_eq!(
            registry.list_categories(),
            vec![
                "colors",
                "spacing",
                "breakpoints",
                "radii",
                "shadows",
                "typography",
                "layout",
                "accessibility",
            ]
        );
    }

    const ROLE_DOC: &str = r##"
        [meta]
        name = "roles"

        [primitives.colors]
        red = "#DC2626"

        [themes.light]
        status = { error = "{colors.red}" }
        text = { body = "#374151" }

        [themes.dark]
        status = { error = "#F87171" }
        text = { body = "#E5E7EB" }

        [components.alert.base]
        radius = "8px"
        label = { color = "{text.body}", fontWeight = 600 }

        [components.alert.variants.danger]
        bg = "{status.error}"
    "##;

    #[test]
    fn test_role_fields_follow_theme() {
        let registry = Registry::from_toml(ROLE_DOC).unwrap();

        let light = registry.resolve(Theme::Light, "alert", Some("danger")).unwrap();
        assert_eq!(light.get_str("bg"), Some("#DC2626"));
        assert_eq!(
            light.get("label").and_then(|l| l.get("color")).and_then(ResolvedValue::as_str),
            Some("#374151")
        );

        let dark = registry.resolve(Theme::Dark, "alert", Some("danger")).unwrap();
        assert_eq!(dark.get_str("bg"), Some("#F87171"));
        assert_eq!(
            dark.get("label").and_then(|l| l.get("color")).and_then(ResolvedValue::as_str),
            Some("#E5E7EB")
        );

        // The unresolved record still carries the reference.
        let raw = registry.resolve_component("alert", Some("danger")).unwrap();
        assert_eq!(serde_json::to_value(&raw["bg"]).unwrap(), "{status.error}");
    }

    #[test]
    fn test_construction_rejects_bad_tokens_first() {
        let doc = ROLE_DOC
            .replace("red = \"#DC2626\"", "red = \"#DC26\"")
            .replace("body = \"#E5E7EB\"", "muted = \"#E5E7EB\"");
        let err = Registry::from_toml(&doc).unwrap_err();
        // The alias to the broken primitive is reported alongside it.
        let SwatchError::InvalidToken(issues) = err else {
            panic!("expected InvalidToken, got {err:?}");
        };
        let paths: Vec<&str> = issues.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["primitives.colors.red", "themes.light.status.error"]);
    }

    #[test]
    fn test_arrays_and_datetimes_are_reported_with_other_issues() {
        let doc = r##"
            [meta]
            name = "odd"

            [primitives.colors]
            green = "#12"

            [primitives.typography]
            fontFamily = ["Inter", "sans-serif"]

            [primitives.accessibility]
            reviewed = 2024-03-01

            [themes.light]
            [themes.dark]

            [components.tag.base]
            sizes = ["sm", "lg"]
        "##;
        let err = Registry::from_toml(doc).unwrap_err();
        let SwatchError::InvalidToken(issues) = err else {
            panic!("expected InvalidToken, got {err:?}");
        };
        let paths: Vec<&str> = issues.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "primitives.colors.green",
                "primitives.typography.fontFamily",
                "primitives.accessibility.reviewed",
                "components.tag.base.sizes",
            ]
        );
        assert_eq!(issues[1].value, "array");
        assert_eq!(issues[2].value, "2024-03-01");
    }

    #[test]
    fn test_construction_rejects_parity_gap() {
        let doc = ROLE_DOC.replace("body = \"#E5E7EB\"", "muted = \"#E5E7EB\"");
        let err = Registry::from_toml(&doc).unwrap_err();
        assert!(matches!(err, SwatchError::ThemeParity(ref gaps) if gaps.len() == 2), "{err:?}");
    }

    #[test]
    fn test_construction_rejects_syntax_errors() {
        assert!(matches!(
            Registry::from_toml("[meta\nname = 1"),
            Err(SwatchError::Parse(_))
        ));
        assert!(matches!(
            Registry::from_toml("[meta]\nname = \"no themes\""),
            Err(SwatchError::Parse(_))
        ));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.toml");
        std::fs::write(&path, ROLE_DOC).unwrap();
        assert_eq!(Registry::from_path(&path).unwrap().name(), "roles");
        assert!(matches!(
            Registry::from_path(&dir.path().join("missing.toml")),
            Err(SwatchError::Io(_))
        ));
    }

    #[test]
    fn test_export_covers_every_combination() {
        let registry = registry();
        let export = registry.export().unwrap();
        let per_theme: usize = registry
            .list_components()
            .iter()
            .map(|c| 1 + registry.list_variants(c).unwrap().len())
            .sum();
        assert_eq!(export.styles.len(), per_theme * 2);

        let json = serde_json::to_value(&export).unwrap();
        assert_eq!(json["primitives"]["spacing"]["section"], "96px");
        assert_eq!(json["themes"]["dark"]["surfaceElevated"], "#0B1120");
        assert_eq!(json["styles"][0]["component"], "button");
        assert_eq!(json["styles"][0]["theme"], "light");
    }

    #[test]
    fn test_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();

        let registry = registry();
        let expected = registry.resolve(Theme::Dark, "card", Some("faq")).unwrap();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    let style = registry.resolve(Theme::Dark, "card", Some("faq")).unwrap();
                    assert_eq!(style, expected);
                });
            }
        });
    }
}
