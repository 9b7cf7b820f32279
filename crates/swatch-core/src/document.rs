//! Raw TOML shape of a design document.
//!
//! These structs mirror the file one-to-one and carry no validation; the
//! registry builder turns them into typed tokens.

use indexmap::IndexMap;
use serde::Deserialize;

/// Built-in design document.
pub const EMBEDDED_DOCUMENT: &str = include_str!("../data/design-system.toml");

#[derive(Debug, Deserialize)]
pub struct DesignDocument {
    pub meta: DocumentMeta,
    pub primitives: IndexMap<String, IndexMap<String, RawValue>>,
    pub themes: ThemeTables,
    #[serde(default)]
    pub components: IndexMap<String, RawComponent>,
}

#[derive(Debug, Deserialize)]
pub struct DocumentMeta {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ThemeTables {
    pub light: IndexMap<String, RawValue>,
    pub dark: IndexMap<String, RawValue>,
}

#[derive(Debug, Deserialize)]
pub struct RawComponent {
    #[serde(default)]
    pub base: IndexMap<String, RawValue>,
    /// Base fields that variants are allowed to redefine.
    #[serde(default)]
    pub overrides: Vec<String>,
    #[serde(default)]
    pub variants: IndexMap<String, IndexMap<String, RawValue>>,
}

/// Any TOML value we accept in a token position.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Flag(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Datetime(toml::value::Datetime),
    Array(Vec<RawValue>),
    Table(IndexMap<String, RawValue>),
}

impl RawValue {
    /// Short rendering for error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Flag(b) => b.to_string(),
            Self::Integer(n) => n.to_string(),
            Self::Float(x) => x.to_string(),
            Self::Text(s) => format!("{s:?}"),
            Self::Datetime(d) => d.to_string(),
            Self::Array(_) => "array".to_string(),
            Self::Table(_) => "table".to_string(),
        }
    }
}

/// Flatten nested tables into dotted keys, keeping document order.
pub fn flatten(table: &IndexMap<String, RawValue>) -> Vec<(String, &RawValue)> {
    let mut out = Vec::new();
    flatten_into(None, table, &mut out);
    out
}

fn flatten_into<'a>(
    prefix: Option<&str>,
    table: &'a IndexMap<String, RawValue>,
    out: &mut Vec<(String, &'a RawValue)>,
) {
    for (key, value) in table {
        let path = match prefix {
            Some(p) => format!("{p}.{key}"),
            None => key.clone(),
        };
        match value {
            RawValue::Table(inner) => flatten_into(Some(path.as_str()), inner, out),
            leaf => out.push((path, leaf)),
        }
    }
}
