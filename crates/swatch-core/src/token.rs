//! Typed design token values.
//!
//! Every leaf of the design document becomes a [`Token`]. Strings are
//! validated on the way in: a [`Color`] is always a well-formed hex or
//! `rgb[a]()` string, a [`Length`] always `<number><unit>`, a [`Shadow`]
//! always one or more offset layers with a leading or trailing color.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

// ── Patterns ────────────────────────────────────────────────────────

static RE_HEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[0-9A-Fa-f]{3}|[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$").unwrap()
});

/// `rgb(r,g,b)` / `rgba(r,g,b,a)`; arity and channel ranges checked in code.
static RE_RGB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(rgba?)\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*(?:,\s*(\d*\.?\d+)\s*)?\)$",
    )
    .unwrap()
});

static RE_LENGTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-?\d+(?:\.\d+)?)(px|rem|em|%|vh|vw)$").unwrap());

/// Pixel size of `1rem` / `1em` when comparing scale steps.
const ROOT_FONT_PX: f64 = 16.0;

// ── Color ───────────────────────────────────────────────────────────

/// A validated color string, kept exactly as authored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if RE_HEX.is_match(s) || is_rgb(s) {
            Some(Self(s.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_rgb(s: &str) -> bool {
    let Some(caps) = RE_RGB.captures(s) else {
        return false;
    };
    let wants_alpha = &caps[1] == "rgba";
    if wants_alpha != caps.get(5).is_some() {
        return false;
    }
    let channels_ok = (2..=4).all(|i| caps[i].parse::<u16>().is_ok_and(|c| c <= 255));
    let alpha_ok = caps
        .get(5)
        .map_or(true, |a| a.as_str().parse::<f64>().is_ok_and(|a| (0.0..=1.0).contains(&a)));
    channels_ok && alpha_ok
}

// ── Length ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthUnit {
    Px,
    Rem,
    Em,
    Percent,
    Vh,
    Vw,
}

impl LengthUnit {
    fn from_suffix(s: &str) -> Option<Self> {
        Some(match s {
            "px" => Self::Px,
            "rem" => Self::Rem,
            "em" => Self::Em,
            "%" => Self::Percent,
            "vh" => Self::Vh,
            "vw" => Self::Vw,
            _ => return None,
        })
    }
}

/// A `<number><unit>` length such as `16px` or `1.5rem`.
#[derive(Debug, Clone, PartialEq)]
pub struct Length {
    raw: String,
    value: f64,
    unit: LengthUnit,
}

impl Length {
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let caps = RE_LENGTH.captures(s)?;
        Some(Self {
            raw: s.to_string(),
            value: caps[1].parse().ok()?,
            unit: LengthUnit::from_suffix(&caps[2])?,
        })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> LengthUnit {
        self.unit
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Absolute pixel size, or `None` for viewport/percentage units.
    pub fn to_px(&self) -> Option<f64> {
        match self.unit {
            LengthUnit::Px => Some(self.value),
            LengthUnit::Rem | LengthUnit::Em => Some(self.value * ROOT_FONT_PX),
            LengthUnit::Percent | LengthUnit::Vh | LengthUnit::Vw => None,
        }
    }
}

impl Serialize for Length {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

// ── Shadow ──────────────────────────────────────────────────────────

/// A box-shadow descriptor: comma-separated layers of
/// `[inset] <x> <y> [<blur> [<spread>]]` with a color before or after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Shadow(String);

impl Shadow {
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let layers = split_top_level(s);
        if layers.is_empty() || !layers.iter().all(|l| is_shadow_layer(l)) {
            return None;
        }
        Some(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Split on commas that aren't inside parentheses.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(s[start..].trim());
    parts
}

/// The color may lead or trail the offsets.
fn is_shadow_layer(layer: &str) -> bool {
    [trailing_color(layer), leading_color(layer)]
        .into_iter()
        .flatten()
        .any(|(color, offsets)| Color::parse(color).is_some() && is_shadow_offsets(offsets))
}

/// `(color, rest)` for a trailing `rgb[a](...)` call or last word.
fn trailing_color(layer: &str) -> Option<(&str, &str)> {
    match layer.rfind("rgb") {
        Some(idx) if layer.ends_with(')') => Some((&layer[idx..], &layer[..idx])),
        _ => layer.rsplit_once(char::is_whitespace).map(|(head, tail)| (tail, head)),
    }
}

/// `(color, rest)` for a leading `rgb[a](...)` call or first word.
fn leading_color(layer: &str) -> Option<(&str, &str)> {
    if layer.starts_with("rgb") {
        let end = layer.find(')')?;
        Some((&layer[..=end], &layer[end + 1..]))
    } else {
        layer.split_once(char::is_whitespace)
    }
}

/// `[inset] <x> <y> [<blur> [<spread>]]`, `inset` allowed at either end.
fn is_shadow_offsets(offsets: &str) -> bool {
    let mut words: Vec<&str> = offsets.split_whitespace().collect();
    if words.first() == Some(&"inset") {
        words.remove(0);
    } else if words.last() == Some(&"inset") {
        words.pop();
    }
    (2..=4).contains(&words.len())
        && words.iter().all(|w| *w == "0" || Length::parse(w).is_some())
}

// ── Typography ──────────────────────────────────────────────────────

/// One entry of the typographic scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeStyle {
    pub size: Length,
    pub weight: u16,
    pub line_height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

// ── Token ───────────────────────────────────────────────────────────

/// A named, typed leaf value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Token {
    Color(Color),
    Length(Length),
    Weight(u16),
    Ratio(f64),
    Count(u32),
    Flag(bool),
    Shadow(Shadow),
    Font(String),
    /// Free-form literal (keywords, CSS shorthands). Only produced for
    /// component rule fields.
    Text(String),
    Type(TypeStyle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Color,
    Length,
    Weight,
    Ratio,
    Count,
    Flag,
    Shadow,
    Font,
    Text,
    Type,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Color => "color",
            Self::Length => "length",
            Self::Weight => "font weight",
            Self::Ratio => "ratio",
            Self::Count => "count",
            Self::Flag => "flag",
            Self::Shadow => "shadow",
            Self::Font => "font family",
            Self::Text => "text",
            Self::Type => "type style",
        };
        f.write_str(name)
    }
}

/// Valid CSS font weights.
pub const WEIGHT_RANGE: std::ops::RangeInclusive<i64> = 1..=1000;

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Self::Color(_) => TokenKind::Color,
            Self::Length(_) => TokenKind::Length,
            Self::Weight(_) => TokenKind::Weight,
            Self::Ratio(_) => TokenKind::Ratio,
            Self::Count(_) => TokenKind::Count,
            Self::Flag(_) => TokenKind::Flag,
            Self::Shadow(_) => TokenKind::Shadow,
            Self::Font(_) => TokenKind::Font,
            Self::Text(_) => TokenKind::Text,
            Self::Type(_) => TokenKind::Type,
        }
    }

    /// The authored string for string-shaped tokens.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Color(c) => Some(c.as_str()),
            Self::Length(l) => Some(l.as_str()),
            Self::Shadow(s) => Some(s.as_str()),
            Self::Font(s) | Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_length(&self) -> Option<&Length> {
        match self {
            Self::Length(l) => Some(l),
            _ => None,
        }
    }

    /// Classify a free string: color, then length, then shadow.
    pub fn infer_str(s: &str) -> Option<Self> {
        if let Some(c) = Color::parse(s) {
            Some(Self::Color(c))
        } else if let Some(l) = Length::parse(s) {
            Some(Self::Length(l))
        } else {
            Shadow::parse(s).map(Self::Shadow)
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weight(w) => write!(f, "{w}"),
            Self::Ratio(r) => write!(f, "{r}"),
            Self::Count(n) => write!(f, "{n}"),
            Self::Flag(b) => write!(f, "{b}"),
            Self::Type(t) => {
                write!(f, "{} / {} / {}", t.size.as_str(), t.weight, t.line_height)?;
                if let Some(color) = &t.color {
                    write!(f, " / {}", color.as_str())?;
                }
                Ok(())
            }
            other => f.write_str(other.as_str().unwrap_or_default()),
        }
    }
}
