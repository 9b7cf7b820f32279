//! Component style rules: a `base` record plus named variants.
//!
//! Merging is a single flat override: variant fields replace base fields of
//! the same name, nested records are replaced whole. A variant may only
//! redefine the base fields its component lists in `overrides`.

use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::document::{RawComponent, RawValue};
use crate::error::{OwnershipConflict, Result, SwatchError, TokenIssue};
use crate::theme::{parse_alias, ThemeSet};
use crate::token::{Token, WEIGHT_RANGE};

/// A field whose value is looked up in the active theme's semantic group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoleRef(String);

impl RoleRef {
    pub fn new(role: impl Into<String>) -> Self {
        Self(role.into())
    }

    pub fn role(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.0)
    }
}

impl Serialize for RoleRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StyleValue {
    Token(Token),
    Role(RoleRef),
    /// One level of nesting, e.g. an accordion's `header`.
    Group(StyleRecord),
}

pub type StyleRecord = IndexMap<String, StyleValue>;

#[derive(Debug, Clone)]
pub struct ComponentRule {
    base: StyleRecord,
    overrides: Vec<String>,
    variants: IndexMap<String, StyleRecord>,
}

impl ComponentRule {
    pub fn base(&self) -> &StyleRecord {
        &self.base
    }

    pub fn variant(&self, name: &str) -> Option<&StyleRecord> {
        self.variants.get(name)
    }

    pub fn variant_names(&self) -> impl Iterator<Item = &str> {
        self.variants.keys().map(String::as_str)
    }

    pub fn overrides(&self) -> &[String] {
        &self.overrides
    }
}

#[derive(Debug, Clone, Default)]
pub struct ComponentSet {
    rules: IndexMap<String, ComponentRule>,
}

impl ComponentSet {
    pub(crate) fn build(
        raw: &IndexMap<String, RawComponent>,
        themes: &ThemeSet,
        issues: &mut Vec<TokenIssue>,
    ) -> Self {
        let mut rules = IndexMap::new();
        for (name, component) in raw {
            let base_path = format!("components.{name}.base");
            let base = build_record(&base_path, &component.base, themes, issues);
            let variants = component
                .variants
                .iter()
                .map(|(variant, fields)| {
                    let path = format!("components.{name}.variants.{variant}");
                    (variant.clone(), build_record(&path, fields, themes, issues))
                })
                .collect();
            rules.insert(
                name.clone(),
                ComponentRule {
                    base,
                    overrides: component.overrides.clone(),
                    variants,
                },
            );
        }
        Self { rules }
    }

    /// Each field has one owner: base or variant, unless listed in
    /// `overrides`.
    pub(crate) fn check_ownership(&self) -> Result<()> {
        let mut conflicts = Vec::new();
        for (component, rule) in &self.rules {
            for field in &rule.overrides {
                if !rule.base.contains_key(field) {
                    conflicts.push(OwnershipConflict::StrayOverride {
                        component: component.clone(),
                        field: field.clone(),
                    });
                }
            }
            for (variant, fields) in &rule.variants {
                conflicts.extend(
                    fields
                        .keys()
                        .filter(|f| rule.base.contains_key(*f) && !rule.overrides.contains(*f))
                        .map(|f| OwnershipConflict::Redefined {
                            component: component.clone(),
                            variant: variant.clone(),
                            field: f.clone(),
                        }),
                );
            }
        }
        if conflicts.is_empty() {
            Ok(())
        } else {
            Err(SwatchError::FieldOwnership(conflicts))
        }
    }

    pub fn get(&self, component: &str) -> Result<&ComponentRule> {
        self.rules
            .get(component)
            .ok_or_else(|| SwatchError::UnknownComponent(component.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Merge `variant` over `base` into a fresh record.
    pub fn resolve(&self, component: &str, variant: Option<&str>) -> Result<StyleRecord> {
        let rule = self.get(component)?;
        let mut merged = rule.base.clone();
        if let Some(variant) = variant {
            let fields = rule
                .variant(variant)
                .ok_or_else(|| SwatchError::UnknownVariant {
                    component: component.to_string(),
                    variant: variant.to_string(),
                })?;
            for (field, value) in fields {
                merged.insert(field.clone(), value.clone());
            }
        }
        Ok(merged)
    }
}

fn build_record(
    path: &str,
    fields: &IndexMap<String, RawValue>,
    themes: &ThemeSet,
    issues: &mut Vec<TokenIssue>,
) -> StyleRecord {
    let mut record = StyleRecord::new();
    for (field, value) in fields {
        let field_path = format!("{path}.{field}");
        let parsed = match value {
            RawValue::Table(inner) => {
                let mut group = StyleRecord::new();
                for (sub, sub_value) in inner {
                    let sub_path = format!("{field_path}.{sub}");
                    if let Some(v) = build_leaf(&sub_path, sub, sub_value, themes, issues) {
                        group.insert(sub.clone(), v);
                    }
                }
                Some(StyleValue::Group(group))
            }
            leaf => build_leaf(&field_path, field, leaf, themes, issues),
        };
        if let Some(parsed) = parsed {
            record.insert(field.clone(), parsed);
        }
    }
    record
}

fn build_leaf(
    path: &str,
    field: &str,
    value: &RawValue,
    themes: &ThemeSet,
    issues: &mut Vec<TokenIssue>,
) -> Option<StyleValue> {
    let parsed = match value {
        RawValue::Flag(b) => Ok(StyleValue::Token(Token::Flag(*b))),
        RawValue::Integer(n) if is_weight_field(field) => match u16::try_from(*n) {
            Ok(w) if WEIGHT_RANGE.contains(n) => Ok(StyleValue::Token(Token::Weight(w))),
            _ => Err("font weight"),
        },
        RawValue::Integer(n) => u32::try_from(*n)
            .map(|n| StyleValue::Token(Token::Count(n)))
            .map_err(|_| "non-negative count"),
        RawValue::Float(r) if *r > 0.0 => Ok(StyleValue::Token(Token::Ratio(*r))),
        RawValue::Float(_) => Err("positive ratio"),
        RawValue::Text(s) => match parse_alias(s) {
            Some(role) if themes.knows(role) => Ok(StyleValue::Role(RoleRef::new(role))),
            Some(_) => Err("known semantic role"),
            None if s.trim().is_empty() => Err("non-empty value"),
            None => Ok(StyleValue::Token(
                Token::infer_str(s).unwrap_or_else(|| Token::Text(s.clone())),
            )),
        },
        RawValue::Table(_) => Err("a single level of nesting"),
        RawValue::Datetime(_) | RawValue::Array(_) => Err("string, number or flag"),
    };
    match parsed {
        Ok(v) => Some(v),
        Err(expected) => {
            issues.push(TokenIssue::new(path, value.describe(), expected));
            None
        }
    }
}

fn is_weight_field(field: &str) -> bool {
    field == "weight" || field.ends_with("Weight")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DesignDocument;
    use crate::primitive::PrimitiveSet;

    fn build(doc: &str) -> (ComponentSet, Vec<TokenIssue>) {
        let doc: DesignDocument = toml::from_str(doc).unwrap();
        let mut issues = Vec::new();
        let primitives = PrimitiveSet::build(&doc.primitives, &mut issues);
        let themes = ThemeSet::build(&doc.themes.light, &doc.themes.dark, &primitives, &mut issues);
        let components = ComponentSet::build(&doc.components, &themes, &mut issues);
        (components, issues)
    }

    fn embedded() -> ComponentSet {
        let (set, issues) = build(crate::document::EMBEDDED_DOCUMENT);
        assert!(issues.is_empty(), "{issues:?}");
        set.check_ownership().unwrap();
        set
    }

    fn text(record: &StyleRecord, field: &str) -> Option<String> {
        match record.get(field)? {
            StyleValue::Token(t) => Some(t.to_string()),
            StyleValue::Role(r) => Some(r.to_string()),
            StyleValue::Group(_) => None,
        }
    }

    #[test]
    fn test_merge_override_law() {
        let set = embedded();
        for component in set.names() {
            let rule = set.get(component).unwrap();
            for variant in rule.variant_names() {
                let merged = set.resolve(component, Some(variant)).unwrap();
                let fields = rule.variant(variant).unwrap();
                for (field, value) in fields {
                    assert_eq!(&merged[field], value, "{component}.{variant}.{field}");
                }
                for (field, value) in rule.base() {
                    if !fields.contains_key(field) {
                        assert_eq!(&merged[field], value, "{component}.{variant}.{field}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_card_faq_overrides_base() {
        let set = embedded();
        let faq = set.resolve("card", Some("faq")).unwrap();
        assert_eq!(text(&faq, "bg").as_deref(), Some("#FFFFFF"));
        assert_eq!(text(&faq, "radius").as_deref(), Some("16px"));
        assert_eq!(text(&faq, "padding").as_deref(), Some("24px 32px"));
        // Untouched base field survives.
        assert_eq!(
            text(&faq, "shadow").as_deref(),
            Some("0 4px 20px rgba(0,0,0,0.08)")
        );
    }

    #[test]
    fn test_accordion_base_only() {
        let set = embedded();
        let accordion = set.resolve("accordion", None).unwrap();
        let keys: Vec<&str> = accordion.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["header", "body", "border", "radius", "gap"]);
        let Some(StyleValue::Group(header)) = accordion.get("header") else {
            panic!("header should be a nested record");
        };
        assert_eq!(header["fontWeight"], StyleValue::Token(Token::Weight(600)));
        assert_eq!(text(header, "padding").as_deref(), Some("16px 0"));
    }

    #[test]
    fn test_unknown_component_and_variant() {
        let set = embedded();
        assert!(matches!(
            set.resolve("tooltip", None),
            Err(SwatchError::UnknownComponent(ref c)) if c == "tooltip"
        ));
        assert!(matches!(
            set.resolve("button", Some("tertiary")),
            Err(SwatchError::UnknownVariant { ref component, ref variant })
                if component == "button" && variant == "tertiary"
        ));
    }

    #[test]
    fn test_resolved_record_is_a_copy() {
        let set = embedded();
        let mut first = set.resolve("button", Some("primary")).unwrap();
        first.insert("bg".into(), StyleValue::Token(Token::Text("tampered".into())));
        first.shift_remove("minHeight");

        let second = set.resolve("button", Some("primary")).unwrap();
        assert_eq!(text(&second, "bg").as_deref(), Some("#166D5B"));
        assert_eq!(text(&second, "minHeight").as_deref(), Some("52px"));
    }

    #[test]
    fn test_ownership_conflicts_collected() {
        let doc = r##"
            [meta]
            name = "test"

            [primitives.colors]

            [themes.light]
            [themes.dark]

            [components.chip]
            overrides = ["bg", "shadow"]

            [components.chip.base]
            bg = "#FFFFFF"
            minHeight = "32px"
            radius = "8px"

            [components.chip.variants.big]
            bg = "#000000"
            minHeight = "48px"
            radius = "12px"
        "##;
        let (set, issues) = build(doc);
        assert!(issues.is_empty(), "{issues:?}");
        let Err(SwatchError::FieldOwnership(conflicts)) = set.check_ownership() else {
            panic!("expected ownership error");
        };
        assert_eq!(
            conflicts,
            vec![
                OwnershipConflict::StrayOverride {
                    component: "chip".into(),
                    field: "shadow".into()
                },
                OwnershipConflict::Redefined {
                    component: "chip".into(),
                    variant: "big".into(),
                    field: "minHeight".into()
                },
                OwnershipConflict::Redefined {
                    component: "chip".into(),
                    variant: "big".into(),
                    field: "radius".into()
                },
            ]
        );
    }

    #[test]
    fn test_role_references() {
        let doc = r##"
            [meta]
            name = "test"

            [primitives.colors]

            [themes.light]
            status = { error = "#DC2626" }

            [themes.dark]
            status = { error = "#F87171" }

            [components.alert.base]
            bg = "{status.error}"
            inner = { border = "{status.error}" }

            [components.alert.variants.loud]
            text = "{status.missing}"
            fontWeight = 2000
        "##;
        let (set, issues) = build(doc);
        assert_eq!(
            set.resolve("alert", None).unwrap()["bg"],
            StyleValue::Role(RoleRef::new("status.error"))
        );
        let paths: Vec<&str> = issues.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "components.alert.variants.loud.text",
                "components.alert.variants.loud.fontWeight",
            ]
        );
    }
}
