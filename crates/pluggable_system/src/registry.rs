//! Name-to-plugin registry.
//!
//! Plugins are requested and declared as dependencies by name; the
//! [`PluginRegistry`] maps those names to [`Plugin`] handles. Entries are
//! either registered ready-built with [`register`](PluginRegistry::register)
//! or as a loader closure with [`register_lazy`](PluginRegistry::register_lazy)
//! that runs on the first [`load`](PluginRegistry::load) of the name.
//!
//! # Lifecycle
//!
//! The process-wide registry returned by [`PluginRegistry::global`] is created
//! on first use and lives until the process exits; nothing is ever unloaded.
//! Hosts use it unless they are given their own registry, which tests do to
//! stay isolated from each other.
//!
//! # Load-Once
//!
//! Each entry owns a lock held while its loader runs, so concurrent first
//! loads of one name run the loader once and all callers receive the same
//! handle. Loaders for different names do not block each other.
//!
//! The lock is not re-entrant. A loader may load *other* names, but must not
//! load its own name or call [`name_of`](PluginRegistry::name_of), which
//! locks every entry; either deadlocks the calling thread.
//!
//! # Example
//!
//! ```
//! use pluggable_system::plugin::{DependencyOrder, PluginBuilder};
//! use pluggable_system::registry::PluginRegistry;
//!
//! let registry = PluginRegistry::new();
//! registry.register_lazy("cache", || {
//!     PluginBuilder::new("cache")
//!         .depends_on("backend", DependencyOrder::Before)
//!         .build()
//! });
//!
//! let first = registry.load("cache").unwrap();
//! let second = registry.load("cache").unwrap();
//! assert_eq!(first, second);
//! assert_eq!(registry.name_of(&first).as_deref(), Some("cache"));
//! ```

use std::sync::{Arc, OnceLock};

use hashbrown::HashMap;
use parking_lot::{Mutex, RwLock};

use crate::error::{DeclarationError, ResolveError};
use crate::plugin::Plugin;

/// Builds a plugin on first load.
type Loader = Box<dyn Fn() -> Result<Plugin, DeclarationError> + Send + Sync>;

/// Registry entry for one name.
struct Entry {
    /// Loader for lazily registered plugins; `None` once loaded eagerly.
    loader: Option<Loader>,
    /// The loaded plugin; guarded so that the loader runs once.
    plugin: Mutex<Option<Plugin>>,
}

/// Maps symbolic plugin names to plugin definitions.
#[derive(Default)]
pub struct PluginRegistry {
    entries: RwLock<HashMap<String, Arc<Entry>>>,
}

impl core::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .finish()
    }
}

impl PluginRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide registry, creating it on first use.
    #[must_use]
    pub fn global() -> &'static Arc<PluginRegistry> {
        static GLOBAL: OnceLock<Arc<PluginRegistry>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(PluginRegistry::new()))
    }

    /// Registers a built plugin under its own name.
    ///
    /// Registering a name again replaces the entry for future loads; handles
    /// loaded earlier stay valid.
    pub fn register(&self, plugin: Plugin) -> &Self {
        let name = plugin.name().to_string();
        tracing::debug!(plugin = %name, "registering plugin");
        self.entries.write().insert(
            name,
            Arc::new(Entry {
                loader: None,
                plugin: Mutex::new(Some(plugin)),
            }),
        );
        self
    }

    /// Registers a loader that builds the plugin named `name` on first load.
    ///
    /// The loader runs with this entry locked. It may call
    /// [`load`](Self::load) for other names, but calling `load(name)` or
    /// [`name_of`](Self::name_of) from inside the loader deadlocks.
    pub fn register_lazy<F>(&self, name: impl Into<String>, loader: F) -> &Self
    where
        F: Fn() -> Result<Plugin, DeclarationError> + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!(plugin = %name, "registering lazy plugin");
        self.entries.write().insert(
            name,
            Arc::new(Entry {
                loader: Some(Box::new(loader)),
                plugin: Mutex::new(None),
            }),
        );
        self
    }

    /// Loads the plugin registered under `name`.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::PluginNotFound`] if nothing is registered under `name`
    /// - [`ResolveError::Declaration`] if a lazy loader fails; the next load
    ///   retries the loader
    pub fn load(&self, name: &str) -> Result<Plugin, ResolveError> {
        let entry = self
            .entries
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| ResolveError::PluginNotFound(name.to_string()))?;

        let mut slot = entry.plugin.lock();
        if let Some(plugin) = slot.as_ref() {
            return Ok(plugin.clone());
        }

        let Some(loader) = entry.loader.as_ref() else {
            return Err(ResolveError::PluginNotFound(name.to_string()));
        };
        let plugin = loader().map_err(|source| ResolveError::Declaration {
            plugin: name.to_string(),
            source,
        })?;
        tracing::debug!(plugin = %name, "loaded plugin");
        *slot = Some(plugin.clone());
        Ok(plugin)
    }

    /// Returns the name `plugin` was loaded under.
    ///
    /// Defined for every plugin this registry has handed out; `None` for
    /// plugins it never loaded.
    #[must_use]
    pub fn name_of(&self, plugin: &Plugin) -> Option<String> {
        self.entries.read().iter().find_map(|(name, entry)| {
            entry
                .plugin
                .lock()
                .as_ref()
                .is_some_and(|loaded| loaded == plugin)
                .then(|| name.clone())
        })
    }

    /// Returns true if something is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    /// Returns true if the plugin under `name` has been loaded.
    #[must_use]
    pub fn is_loaded(&self, name: &str) -> bool {
        self.entries
            .read()
            .get(name)
            .is_some_and(|entry| entry.plugin.lock().is_some())
    }

    /// Returns every registered name, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the number of registered names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
