//! Primitive token set: context-free values grouped by category.

use indexmap::IndexMap;
use serde::Serialize;

use crate::document::{flatten, RawValue};
use crate::error::{Result, SwatchError, TokenIssue};
use crate::token::{Color, Length, Shadow, Token, TokenKind, TypeStyle, WEIGHT_RANGE};

/// How the entries of a category are typed.
#[derive(Debug, Clone, Copy)]
enum Schema {
    /// Every entry is a string of one kind.
    Fixed(TokenKind),
    /// `fontFamily` plus type-scale tables.
    Typography,
    /// Nested tables flattened to dotted keys; kind inferred per value.
    Mixed,
}

fn schema_for(category: &str) -> Schema {
    match category {
        "colors" => Schema::Fixed(TokenKind::Color),
        "spacing" | "breakpoints" | "radii" => Schema::Fixed(TokenKind::Length),
        "shadows" => Schema::Fixed(TokenKind::Shadow),
        "typography" => Schema::Typography,
        _ => Schema::Mixed,
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct PrimitiveSet {
    categories: IndexMap<String, IndexMap<String, Token>>,
}

impl PrimitiveSet {
    /// Type every entry, pushing one issue per malformed value.
    pub(crate) fn build(
        raw: &IndexMap<String, IndexMap<String, RawValue>>,
        issues: &mut Vec<TokenIssue>,
    ) -> Self {
        let mut categories = IndexMap::new();
        for (category, entries) in raw {
            let scale = match schema_for(category) {
                Schema::Fixed(kind) => build_fixed(category, kind, entries, issues),
                Schema::Typography => build_typography(category, entries, issues),
                Schema::Mixed => build_mixed(category, entries, issues),
            };
            categories.insert(category.clone(), scale);
        }

        let set = Self { categories };
        set.check_order(issues);
        set
    }

    pub fn get(&self, category: &str, key: &str) -> Result<&Token> {
        self.categories
            .get(category)
            .and_then(|scale| scale.get(key))
            .ok_or_else(|| SwatchError::NotFound {
                category: category.to_string(),
                key: key.to_string(),
            })
    }

    /// Resolve `category.key` (the key may itself contain dots).
    pub fn lookup_alias(&self, alias: &str) -> Option<&Token> {
        let (category, key) = alias.split_once('.')?;
        self.get(category, key).ok()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn scale(&self, category: &str) -> Option<&IndexMap<String, Token>> {
        self.categories.get(category)
    }

    /// Numeric spacing steps must grow strictly; breakpoints must grow in
    /// declaration order.
    fn check_order(&self, issues: &mut Vec<TokenIssue>) {
        if let Some(spacing) = self.scale("spacing") {
            let mut steps: Vec<(u32, &str, &Length)> = spacing
                .iter()
                .filter_map(|(k, t)| Some((k.parse().ok()?, k.as_str(), t.as_length()?)))
                .collect();
            steps.sort_by_key(|(n, _, _)| *n);
            check_increasing("spacing", steps.into_iter().map(|(_, k, l)| (k, l)), issues);
        }
        if let Some(breakpoints) = self.scale("breakpoints") {
            let widths = breakpoints
                .iter()
                .filter_map(|(k, t)| Some((k.as_str(), t.as_length()?)));
            check_increasing("breakpoints", widths, issues);
        }
    }
}

fn check_increasing<'a>(
    category: &str,
    steps: impl Iterator<Item = (&'a str, &'a Length)>,
    issues: &mut Vec<TokenIssue>,
) {
    let mut prev: Option<(&str, f64)> = None;
    for (key, length) in steps {
        let Some(px) = length.to_px() else {
            issues.push(TokenIssue::new(
                format!("primitives.{category}.{key}"),
                format!("{:?}", length.as_str()),
                "absolute length",
            ));
            continue;
        };
        if let Some((prev_key, prev_px)) = prev {
            if px <= prev_px {
                issues.push(TokenIssue::new(
                    format!("primitives.{category}.{key}"),
                    format!("{:?}", length.as_str()),
                    format!("more than `{prev_key}` ({prev_px}px)"),
                ));
            }
        }
        prev = Some((key, px));
    }
}

fn build_fixed(
    category: &str,
    kind: TokenKind,
    entries: &IndexMap<String, RawValue>,
    issues: &mut Vec<TokenIssue>,
) -> IndexMap<String, Token> {
    let mut scale = IndexMap::new();
    for (key, value) in entries {
        let token = match value {
            RawValue::Text(s) => match kind {
                TokenKind::Color => Color::parse(s).map(Token::Color),
                TokenKind::Length => Length::parse(s).map(Token::Length),
                TokenKind::Shadow => Shadow::parse(s).map(Token::Shadow),
                _ => None,
            },
            _ => None,
        };
        match token {
            Some(token) => {
                scale.insert(key.clone(), token);
            }
            None => issues.push(TokenIssue::new(
                format!("primitives.{category}.{key}"),
                value.describe(),
                kind.to_string(),
            )),
        }
    }
    scale
}

fn build_typography(
    category: &str,
    entries: &IndexMap<String, RawValue>,
    issues: &mut Vec<TokenIssue>,
) -> IndexMap<String, Token> {
    let mut scale = IndexMap::new();
    type_scale_into(category, None, entries, &mut scale, issues);
    scale
}

/// A table holding any type style field is a type style; any other table
/// is a group (`headings`, `text`) whose entries get dotted keys.
fn type_scale_into(
    category: &str,
    prefix: Option<&str>,
    entries: &IndexMap<String, RawValue>,
    scale: &mut IndexMap<String, Token>,
    issues: &mut Vec<TokenIssue>,
) {
    for (key, value) in entries {
        let key = match prefix {
            Some(p) => format!("{p}.{key}"),
            None => key.clone(),
        };
        let path = format!("primitives.{category}.{key}");
        match value {
            RawValue::Text(s) if prefix.is_none() && !s.trim().is_empty() => {
                scale.insert(key, Token::Font(s.clone()));
            }
            RawValue::Table(fields) if is_group(fields) => {
                type_scale_into(category, Some(key.as_str()), fields, scale, issues);
            }
            RawValue::Table(fields) => {
                if let Some(style) = type_style(&path, fields, issues) {
                    scale.insert(key, Token::Type(style));
                }
            }
            other => issues.push(TokenIssue::new(
                path,
                other.describe(),
                "font family or type style",
            )),
        }
    }
}

fn is_group(fields: &IndexMap<String, RawValue>) -> bool {
    !["size", "weight", "lineHeight", "color"]
        .iter()
        .any(|f| fields.contains_key(*f))
}

/// `{ size, weight, lineHeight, color? }`; every bad field is reported.
fn type_style(
    path: &str,
    fields: &IndexMap<String, RawValue>,
    issues: &mut Vec<TokenIssue>,
) -> Option<TypeStyle> {
    let before = issues.len();
    let size = required(path, fields, "size", "length", issues);
    let weight = required(path, fields, "weight", "font weight", issues);
    let line_height = required(path, fields, "lineHeight", "ratio", issues);

    let size = match size {
        Some(RawValue::Text(s)) => Length::parse(s),
        _ => None,
    };
    let weight = match weight {
        Some(RawValue::Integer(w)) if WEIGHT_RANGE.contains(w) => u16::try_from(*w).ok(),
        _ => None,
    };
    let line_height = match line_height {
        Some(RawValue::Float(r)) if *r > 0.0 => Some(*r),
        Some(RawValue::Integer(r)) if *r > 0 => Some(*r as f64),
        _ => None,
    };
    let color = match fields.get("color") {
        None => Ok(None),
        Some(RawValue::Text(s)) => Color::parse(s).map(Some).ok_or(()),
        Some(_) => Err(()),
    };

    let checks = [
        ("size", size.is_some(), "length"),
        ("weight", weight.is_some(), "font weight"),
        ("lineHeight", line_height.is_some(), "ratio"),
        ("color", color.is_ok(), "color"),
    ];
    for (name, ok, expected) in checks {
        if let (false, Some(value)) = (ok, fields.get(name)) {
            issues.push(TokenIssue::new(format!("{path}.{name}"), value.describe(), expected));
        }
    }

    if issues.len() > before {
        return None;
    }
    Some(TypeStyle {
        size: size?,
        weight: weight?,
        line_height: line_height?,
        color: color.ok()?,
    })
}

fn required<'a>(
    path: &str,
    fields: &'a IndexMap<String, RawValue>,
    name: &str,
    expected: &str,
    issues: &mut Vec<TokenIssue>,
) -> Option<&'a RawValue> {
    let value = fields.get(name);
    if value.is_none() {
        issues.push(TokenIssue::new(format!("{path}.{name}"), "missing", expected));
    }
    value
}

fn build_mixed(
    category: &str,
    entries: &IndexMap<String, RawValue>,
    issues: &mut Vec<TokenIssue>,
) -> IndexMap<String, Token> {
    let mut scale = IndexMap::new();
    for (key, value) in flatten(entries) {
        let token = match value {
            RawValue::Flag(b) => Some(Token::Flag(*b)),
            RawValue::Integer(n) => u32::try_from(*n).ok().map(Token::Count),
            RawValue::Float(r) if *r > 0.0 => Some(Token::Ratio(*r)),
            RawValue::Text(s) => Token::infer_str(s),
            _ => None,
        };
        match token {
            Some(token) => {
                scale.insert(key, token);
            }
            None => issues.push(TokenIssue::new(
                format!("primitives.{category}.{key}"),
                value.describe(),
                "color, length, shadow, count, ratio or flag",
            )),
        }
    }
    scale
}
