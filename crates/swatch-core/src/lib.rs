//! Design token registry.
//!
//! One declarative document holds primitives, light/dark semantic roles and
//! component style rules. [`Registry`] validates it once and then answers
//! `(theme, component, variant)` lookups without further mutation.

pub mod component;
pub mod config;
pub mod document;
pub mod error;
pub mod global;
pub mod primitive;
pub mod registry;
pub mod theme;
pub mod token;

pub use component::{RoleRef, StyleRecord, StyleValue};
pub use error::{Result, SwatchError};
pub use registry::{Registry, ResolvedStyle, ResolvedValue};
pub use theme::Theme;
pub use token::Token;
