//! Themes and their semantic role groups.
//!
//! Each theme maps role names (`text.heading`, `status.error`, ...) onto
//! tokens. Light and dark are independent value sets over one key schema:
//! a role defined in one theme must be defined in the other.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::document::{flatten, RawValue};
use crate::error::{ParityGap, Result, SwatchError, TokenIssue};
use crate::primitive::PrimitiveSet;
use crate::token::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub const ALL: [Theme; 2] = [Theme::Light, Theme::Dark];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    fn other(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = SwatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "light" | "default" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(SwatchError::UnknownTheme(s.to_string())),
        }
    }
}

/// Role name -> token for one theme.
#[derive(Debug, Clone, Default)]
pub struct SemanticGroup {
    roles: IndexMap<String, Token>,
}

impl SemanticGroup {
    /// Build a group from a nested role table. Values are either
    /// `{category.key}` aliases into `primitives` or literal tokens.
    fn build(
        theme: Theme,
        raw: &IndexMap<String, RawValue>,
        primitives: &PrimitiveSet,
        issues: &mut Vec<TokenIssue>,
    ) -> Self {
        let mut roles = IndexMap::new();
        for (role, value) in flatten(raw) {
            let path = format!("themes.{theme}.{role}");
            let token = match value {
                RawValue::Text(s) => match parse_alias(s) {
                    Some(alias) => primitives.lookup_alias(alias).cloned().ok_or_else(|| {
                        TokenIssue::new(&path, format!("{s:?}"), "alias to an existing primitive")
                    }),
                    None => Token::infer_str(s).ok_or_else(|| {
                        TokenIssue::new(&path, format!("{s:?}"), "color, length or shadow")
                    }),
                },
                other => Err(TokenIssue::new(&path, other.describe(), "string token or alias")),
            };
            match token {
                Ok(token) => {
                    roles.insert(role, token);
                }
                Err(issue) => issues.push(issue),
            }
        }
        Self { roles }
    }

    pub fn get(&self, role: &str) -> Option<&Token> {
        self.roles.get(role)
    }

    pub fn contains(&self, role: &str) -> bool {
        self.roles.contains_key(role)
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Token)> {
        self.roles.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

/// `{name}` -> `name`.
pub(crate) fn parse_alias(s: &str) -> Option<&str> {
    let inner = s.strip_prefix('{')?.strip_suffix('}')?;
    let valid = !inner.is_empty()
        && inner
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    valid.then_some(inner)
}

/// The light/dark pair of semantic groups.
#[derive(Debug, Clone, Default)]
pub struct ThemeSet {
    light: SemanticGroup,
    dark: SemanticGroup,
}

impl ThemeSet {
    pub(crate) fn build(
        light: &IndexMap<String, RawValue>,
        dark: &IndexMap<String, RawValue>,
        primitives: &PrimitiveSet,
        issues: &mut Vec<TokenIssue>,
    ) -> Self {
        Self {
            light: SemanticGroup::build(Theme::Light, light, primitives, issues),
            dark: SemanticGroup::build(Theme::Dark, dark, primitives, issues),
        }
    }

    /// Every role in one theme must exist in the other.
    pub(crate) fn check_parity(&self) -> Result<()> {
        let mut gaps = Vec::new();
        for theme in Theme::ALL {
            let other = self.group(theme.other());
            gaps.extend(
                self.group(theme)
                    .roles()
                    .filter(|role| !other.contains(role))
                    .map(|role| ParityGap {
                        theme: theme.other(),
                        role: role.to_string(),
                    }),
            );
        }
        if gaps.is_empty() {
            Ok(())
        } else {
            Err(SwatchError::ThemeParity(gaps))
        }
    }

    pub fn group(&self, theme: Theme) -> &SemanticGroup {
        match theme {
            Theme::Light => &self.light,
            Theme::Dark => &self.dark,
        }
    }

    /// Look `role` up in `theme` only; there is no cross-theme fallback.
    pub fn resolve(&self, theme: Theme, role: &str) -> Result<&Token> {
        self.group(theme)
            .get(role)
            .ok_or_else(|| SwatchError::UnknownRole {
                theme,
                role: role.to_string(),
            })
    }

    /// Whether any theme defines `role`.
    pub(crate) fn knows(&self, role: &str) -> bool {
        self.light.contains(role) || self.dark.contains(role)
    }
}
