use std::fmt;

use thiserror::Error;

use crate::theme::Theme;

#[derive(Debug, Error)]
pub enum SwatchError {
    #[error("{} malformed token(s): {}", .0.len(), join(.0))]
    InvalidToken(Vec<TokenIssue>),

    #[error("theme parity violated: {}", join(.0))]
    ThemeParity(Vec<ParityGap>),

    #[error("field ownership violated: {}", join(.0))]
    FieldOwnership(Vec<OwnershipConflict>),

    #[error("unknown role `{role}` in {theme} theme")]
    UnknownRole { theme: Theme, role: String },

    #[error("unknown theme `{0}` (expected light or dark)")]
    UnknownTheme(String),

    #[error("unknown component `{0}`")]
    UnknownComponent(String),

    #[error("component `{component}` has no variant `{variant}`")]
    UnknownVariant { component: String, variant: String },

    #[error("no primitive `{key}` in category `{category}`")]
    NotFound { category: String, key: String },

    #[error("document parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = SwatchError> = std::result::Result<T, E>;

/// A single malformed entry found while building a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenIssue {
    /// Dotted location inside the document, e.g. `primitives.spacing.3`.
    pub path: String,
    pub value: String,
    pub expected: String,
}

impl TokenIssue {
    pub fn new(path: impl Into<String>, value: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }
}

impl fmt::Display for TokenIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` = {}: expected {}", self.path, self.value, self.expected)
    }
}

/// A role defined by one theme but missing from `theme`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParityGap {
    pub theme: Theme,
    pub role: String,
}

impl fmt::Display for ParityGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} theme lacks `{}`", self.theme, self.role)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnershipConflict {
    /// A variant redefines a base field that the component does not list
    /// as overridable.
    Redefined {
        component: String,
        variant: String,
        field: String,
    },
    /// `overrides` names a field the base record doesn't define.
    StrayOverride { component: String, field: String },
}

impl fmt::Display for OwnershipConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Redefined {
                component,
                variant,
                field,
            } => write!(f, "{component}.{variant} redefines base field `{field}`"),
            Self::StrayOverride { component, field } => {
                write!(f, "{component} declares override `{field}` missing from base")
            }
        }
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
