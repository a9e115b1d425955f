//! Hosts that plugins are applied to.
//!
//! The [`Pluggable`] trait is the contract the resolver needs from a host:
//! read access to its already-applied plugins, a way to apply a new order and
//! an optional display name for diagnostics. [`Host`] is the provided
//! implementation.
//!
//! # Lifecycle
//!
//! 1. **Configure** - [`Host::configure`] resolves a plugin request and
//!    layers the new plugins ahead of the ones already applied
//! 2. **Instantiate** - [`Host::instantiate`] builds an [`Instance`], running
//!    every applied plugin's initialize hook in applied order
//! 3. **Include** - [`Instance::include_into`] incorporates the instance into
//!    a [`Target`], running the included hooks in applied order
//!
//! Plugins are never removed from a host. A host created with
//! [`Host::derive`] starts with its parent's plugins and defaults, and later
//! configuration of either host does not affect the other.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use pluggable_system::host::{Host, Target};
//! use pluggable_system::options::Options;
//! use pluggable_system::plugin::PluginBuilder;
//! use pluggable_system::registry::PluginRegistry;
//!
//! #[derive(Debug, PartialEq)]
//! struct Readers(Vec<String>);
//!
//! let registry = Arc::new(PluginRegistry::new());
//! registry.register(
//!     PluginBuilder::new("reader")
//!         .on_included(|target, next| {
//!             let readers = target.attributes().to_vec();
//!             target.extensions_mut().insert(Readers(readers));
//!             next.proceed(target);
//!         })
//!         .build()
//!         .unwrap(),
//! );
//!
//! let mut host = Host::with_registry(registry).named("Translations");
//! host.configure(|plugins| {
//!     plugins.plugin("reader");
//! })
//! .unwrap();
//!
//! let instance = host.instantiate(["title"], Options::new());
//! let mut post = Target::new("Post");
//! instance.include_into(&mut post);
//!
//! assert_eq!(post.extensions().get(), Some(&Readers(vec!["title".into()])));
//! ```

use std::sync::Arc;

use crate::configure::configure;
use crate::error::ResolveError;
use crate::extensions::Extensions;
use crate::options::Options;
use crate::plugin::{HookLink, Next, Plugin};
use crate::registry::PluginRegistry;
use crate::request::Request;

// ─────────────────────────────────────────────────────────────────────────────
// Pluggable
// ─────────────────────────────────────────────────────────────────────────────

/// What the resolver requires of a host.
pub trait Pluggable {
    /// The registry plugin names are loaded from.
    fn registry(&self) -> &PluginRegistry;

    /// Plugins already applied, in composed order.
    fn applied_plugins(&self) -> &[Plugin];

    /// Incorporates `order` into the host.
    ///
    /// Implementations place the plugins not yet applied, in `order`, ahead
    /// of every plugin already applied, and skip the ones already applied.
    /// A plugin applied by a later call therefore runs before the plugins of
    /// earlier calls.
    fn apply_order(&mut self, order: &[Plugin]);

    /// Name used in diagnostics.
    fn display_name(&self) -> Option<&str> {
        None
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Host
// ─────────────────────────────────────────────────────────────────────────────

/// A host composed from plugins.
#[derive(Debug, Clone)]
pub struct Host {
    /// Display name for diagnostics.
    name: Option<String>,
    /// Registry used to load requested plugins.
    registry: Arc<PluginRegistry>,
    /// Applied plugins in composed order, latest call first.
    applied: Vec<Plugin>,
    /// Defaults table accumulated by [`configure`](Self::configure).
    defaults: Options,
    /// Runtime options given to every instance.
    options: Options,
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}

impl Host {
    /// Creates an unnamed host that loads from the global registry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(Arc::clone(PluginRegistry::global()))
    }

    /// Creates an unnamed host that loads from `registry`.
    #[must_use]
    pub fn with_registry(registry: Arc<PluginRegistry>) -> Self {
        Self {
            name: None,
            registry,
            applied: Vec::new(),
            defaults: Options::new(),
            options: Options::new(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the runtime options given to every instance.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Creates a child host inheriting this host's plugins, defaults, runtime
    /// options and registry.
    #[must_use]
    pub fn derive(&self, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            registry: Arc::clone(&self.registry),
            applied: self.applied.clone(),
            defaults: self.defaults.clone(),
            options: self.options.clone(),
        }
    }

    /// Resolves the plugins requested by `block` and applies them.
    ///
    /// The request is seeded with this host's defaults, and the resulting
    /// defaults table is stored back on the host.
    ///
    /// # Errors
    ///
    /// Any [`ResolveError`]; on error the host is unchanged.
    pub fn configure<F>(&mut self, block: F) -> Result<&Options, ResolveError>
    where
        F: FnOnce(&mut Request),
    {
        let seed = self.defaults.clone();
        self.defaults = configure(self, seed, block)?;
        Ok(&self.defaults)
    }

    /// Builds an instance for the given attribute names.
    ///
    /// The instance options are this host's defaults, overlaid with its
    /// runtime options, overlaid with `options`. Initialize hooks run in
    /// applied order.
    pub fn instantiate<I, S>(&self, names: I, options: Options) -> Instance
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options = self.defaults.merged(&self.options).merged(&options);
        let mut instance = Instance {
            host: self.name.clone(),
            names: names.into_iter().map(Into::into).collect(),
            options: options.clone(),
            plugins: self.applied.clone(),
            extensions: Extensions::new(),
        };

        let links: Vec<HookLink<'_, Instance>> = self
            .applied
            .iter()
            .filter_map(|plugin| {
                plugin
                    .initialize_hook()
                    .map(|(callback, wants_options)| HookLink {
                        plugin: plugin.name(),
                        namespace: plugin.option_namespace(),
                        wants_options,
                        callback,
                    })
            })
            .collect();
        tracing::debug!(
            host = self.name.as_deref(),
            hooks = links.len(),
            "running initialize hooks"
        );
        Next::new(&links, &options).proceed(&mut instance);
        instance
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the defaults table stored by [`configure`](Self::configure).
    #[must_use]
    pub fn defaults(&self) -> &Options {
        &self.defaults
    }

    /// Returns the runtime options given to every instance.
    ///
    /// [`configure`](Self::configure) never changes these.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Returns mutable runtime options.
    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// Returns the registry this host loads from.
    #[must_use]
    pub fn registry_handle(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    /// Returns true if a plugin named `name` has been applied.
    #[must_use]
    pub fn has_plugin(&self, name: &str) -> bool {
        self.applied.iter().any(|plugin| plugin.name() == name)
    }

    /// Returns the applied plugin names in composed order.
    #[must_use]
    pub fn plugin_names(&self) -> Vec<&str> {
        self.applied.iter().map(Plugin::name).collect()
    }
}

impl Pluggable for Host {
    fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    fn applied_plugins(&self) -> &[Plugin] {
        &self.applied
    }

    fn apply_order(&mut self, order: &[Plugin]) {
        let fresh: Vec<Plugin> = order
            .iter()
            .filter(|plugin| !self.applied.contains(plugin))
            .cloned()
            .collect();
        self.applied.splice(0..0, fresh);
        tracing::debug!(
            host = self.name.as_deref(),
            plugins = ?self.plugin_names(),
            "applied plugin order"
        );
    }

    fn display_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Instance
// ─────────────────────────────────────────────────────────────────────────────

/// A constructed host instance.
///
/// Carries the attribute names and options it was built with, a snapshot of
/// the host's applied plugins, and state stored by hooks.
#[derive(Debug)]
pub struct Instance {
    host: Option<String>,
    names: Vec<String>,
    options: Options,
    plugins: Vec<Plugin>,
    extensions: Extensions,
}

impl Instance {
    /// Returns the display name of the host that built this instance.
    #[must_use]
    pub fn host_name(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Returns the attribute names given at construction.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns the full instance options.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Returns the host's applied plugins at construction time.
    #[must_use]
    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    /// Returns state stored by hooks.
    #[must_use]
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Returns mutable state stored by hooks.
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// Incorporates this instance into `target`.
    ///
    /// The instance's attribute names are added to the target, then the
    /// included hooks run in applied order.
    pub fn include_into(&self, target: &mut Target) {
        target.attributes.extend(self.names.iter().cloned());

        let links: Vec<HookLink<'_, Target>> = self
            .plugins
            .iter()
            .filter_map(|plugin| {
                plugin.included_hook().map(|(callback, wants_options)| HookLink {
                    plugin: plugin.name(),
                    namespace: plugin.option_namespace(),
                    wants_options,
                    callback,
                })
            })
            .collect();
        tracing::debug!(
            subject = %target.name,
            hooks = links.len(),
            "running included hooks"
        );
        Next::new(&links, &self.options).proceed(target);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Target
// ─────────────────────────────────────────────────────────────────────────────

/// Something instances are incorporated into.
#[derive(Debug)]
pub struct Target {
    name: String,
    attributes: Vec<String>,
    extensions: Extensions,
}

impl Target {
    /// Creates a target named `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            extensions: Extensions::new(),
        }
    }

    /// Returns the target's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns every attribute name included so far.
    #[must_use]
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Returns state stored by hooks.
    #[must_use]
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Returns mutable state stored by hooks.
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }
}
