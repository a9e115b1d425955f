//! Standard plugins for Pluggable hosts.
//!
//! This crate declares the plugins most hosts are composed from. The
//! declarations carry names, ordering requirements and thin hooks; they do
//! not implement storage or querying themselves.
//!
//! | name | requires | hooks |
//! |---|---|---|
//! | `backend` | | initialize: records the backend name |
//! | `cache` | before `backend` | initialize: records whether caching is on |
//! | `default` | before `backend` | initialize: records the default value |
//! | `presence` | before `backend` | |
//! | `dirty` | before `backend`, `fallthrough_accessors` | |
//! | `fallbacks` | before `backend` | initialize: records fallback locales |
//! | `query` | before `backend` | |
//! | `reader` | after `backend` | included: defines readers |
//! | `writer` | after `backend` | included: defines writers |
//! | `locale_accessors` | | included: defines per-locale accessors |
//! | `fallthrough_accessors` | | |
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use pluggable_core_plugins::{Accessors, BackendName, CorePlugins};
//! use pluggable_system::prelude::*;
//!
//! let registry = Arc::new(PluginRegistry::new());
//! CorePlugins::register(&registry);
//!
//! let mut host = Host::with_registry(registry).named("Translations");
//! host.configure(|plugins| {
//!     plugins
//!         .plugin_default("backend", "key_value")
//!         .plugin("reader")
//!         .plugin("writer")
//!         .plugin("cache");
//! })
//! .unwrap();
//!
//! let instance = host.instantiate(["title"], Options::new());
//! assert_eq!(
//!     instance.extensions().get::<BackendName>(),
//!     Some(&BackendName("key_value".into()))
//! );
//!
//! let mut post = Target::new("Post");
//! instance.include_into(&mut post);
//! let accessors = post.extensions().get::<Accessors>().unwrap();
//! assert_eq!(accessors.readers, ["title"]);
//! assert_eq!(accessors.writers, ["title"]);
//! ```

mod accessors;
mod fallbacks;
mod storage;

pub use accessors::Accessors;
pub use fallbacks::FallbackLocales;
pub use storage::{BackendName, CacheEnabled, DefaultValue};

use pluggable_system::error::DeclarationError;
use pluggable_system::plugin::Plugin;
use pluggable_system::registry::PluginRegistry;

/// Builds one plugin declaration.
type Declaration = fn() -> Result<Plugin, DeclarationError>;

/// The standard plugin set.
///
/// # Example
///
/// ```
/// use pluggable_core_plugins::CorePlugins;
/// use pluggable_system::registry::PluginRegistry;
///
/// let registry = PluginRegistry::new();
/// CorePlugins::register(&registry);
///
/// assert!(registry.contains("fallbacks"));
/// assert!(!registry.is_loaded("fallbacks"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CorePlugins;

impl CorePlugins {
    /// Names of every plugin in the set, sorted.
    pub const NAMES: [&'static str; 11] = [
        "backend",
        "cache",
        "default",
        "dirty",
        "fallbacks",
        "fallthrough_accessors",
        "locale_accessors",
        "presence",
        "query",
        "reader",
        "writer",
    ];

    const DECLARATIONS: [(&'static str, Declaration); 11] = [
        ("backend", storage::backend),
        ("cache", storage::cache),
        ("default", storage::default),
        ("dirty", storage::dirty),
        ("fallbacks", fallbacks::fallbacks),
        ("fallthrough_accessors", accessors::fallthrough_accessors),
        ("locale_accessors", accessors::locale_accessors),
        ("presence", storage::presence),
        ("query", storage::query),
        ("reader", accessors::reader),
        ("writer", accessors::writer),
    ];

    /// Registers every plugin in the set with `registry`.
    ///
    /// Plugins are registered lazily and built on first load.
    pub fn register(registry: &PluginRegistry) {
        for (name, declaration) in Self::DECLARATIONS {
            registry.register_lazy(name, declaration);
        }
        tracing::debug!(count = Self::DECLARATIONS.len(), "registered core plugins");
    }

    /// Registers every plugin in the set with the global registry.
    pub fn register_global() {
        Self::register(PluginRegistry::global());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declarations_match_names() {
        let names: Vec<&str> = CorePlugins::DECLARATIONS.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, CorePlugins::NAMES);
    }

    #[test]
    fn every_declaration_builds_under_its_name() {
        for (name, declaration) in CorePlugins::DECLARATIONS {
            let plugin = declaration().unwrap();
            assert_eq!(plugin.name(), name);
        }
    }

    #[test]
    fn register_is_lazy() {
        let registry = PluginRegistry::new();
        CorePlugins::register(&registry);

        assert_eq!(registry.names(), CorePlugins::NAMES);
        assert!(CorePlugins::NAMES.iter().all(|name| !registry.is_loaded(name)));
    }
}
