//! Process-wide registry.
//!
//! The first successful [`init`] publishes a registry for the lifetime of
//! the process; later calls hand back that same instance without building
//! again. A failed build publishes nothing, so [`get`] keeps returning
//! `None` until a build succeeds.

use std::sync::OnceLock;

use tracing::debug;

use crate::error::Result;
use crate::registry::Registry;

static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Return the published registry, building it with `build` if none exists.
pub fn init<F>(build: F) -> Result<&'static Registry>
where
    F: FnOnce() -> Result<Registry>,
{
    if let Some(registry) = REGISTRY.get() {
        return Ok(registry);
    }
    let registry = build()?;
    // Another thread may have won the race; theirs is kept.
    let published = REGISTRY.get_or_init(|| registry);
    debug!(name = published.name(), "registry published");
    Ok(published)
}

/// Publish (or fetch) the built-in registry.
pub fn embedded() -> Result<&'static Registry> {
    init(Registry::embedded)
}

pub fn get() -> Option<&'static Registry> {
    REGISTRY.get()
}
