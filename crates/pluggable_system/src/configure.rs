//! Resolution entry points.
//!
//! [`configure`] and [`resolve`] run the whole pipeline against a
//! [`Pluggable`] host: evaluate the request, expand it into a dependency graph
//! (loading plugins through the host's registry and checking conflicts with
//! the plugins already applied), linearize the graph and apply the result.
//!
//! Nothing is applied unless every step succeeds, so a failed call leaves the
//! host as it was.

use crate::error::{DependencyConflict, ResolveError};
use crate::graph::{DependencyGraph, GraphBuilder};
use crate::host::Pluggable;
use crate::linearize::{CycleError, linearize};
use crate::options::Options;
use crate::plugin::Plugin;
use crate::registry::PluginRegistry;
use crate::request::Request;

/// Outcome of a successful [`resolve`].
#[derive(Debug, Clone)]
pub struct Resolution {
    order: Vec<Plugin>,
    newly_applied: Vec<Plugin>,
    defaults: Options,
    graph: DependencyGraph,
}

impl Resolution {
    /// Returns the linearized order of every plugin in the graph, including
    /// plugins that were already applied.
    #[must_use]
    pub fn order(&self) -> &[Plugin] {
        &self.order
    }

    /// Returns the plugins this call added to the host, in the order they
    /// were layered ahead of the plugins already applied.
    #[must_use]
    pub fn newly_applied(&self) -> &[Plugin] {
        &self.newly_applied
    }

    /// Returns the defaults table produced by the request.
    #[must_use]
    pub fn defaults(&self) -> &Options {
        &self.defaults
    }

    /// Returns the dependency graph the order was computed from.
    #[must_use]
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Consumes the resolution, returning the defaults table.
    #[must_use]
    pub fn into_defaults(self) -> Options {
        self.defaults
    }
}

/// Resolves the plugins requested by `block` and applies them to `host`.
///
/// The request's defaults table starts as `defaults` and is returned.
///
/// # Errors
///
/// - [`ResolveError::PluginNotFound`] for unknown names
/// - [`ResolveError::Conflict`] for cycles and `after` requirements on
///   already-applied plugins
/// - [`ResolveError::Declaration`] when a lazily registered plugin fails to
///   build
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use pluggable_system::configure::configure;
/// use pluggable_system::host::Host;
/// use pluggable_system::options::Options;
/// use pluggable_system::plugin::PluginBuilder;
/// use pluggable_system::registry::PluginRegistry;
/// use serde_json::json;
///
/// let registry = Arc::new(PluginRegistry::new());
/// registry.register(PluginBuilder::new("cache").build().unwrap());
/// let mut host = Host::with_registry(registry);
///
/// let defaults = configure(&mut host, Options::new(), |plugins| {
///     plugins.plugin_default("cache", "fast");
/// })
/// .unwrap();
///
/// assert_eq!(defaults, Options::from([("cache", json!("fast"))]));
/// assert!(host.has_plugin("cache"));
/// ```
pub fn configure<H, F>(host: &mut H, defaults: Options, block: F) -> Result<Options, ResolveError>
where
    H: Pluggable + ?Sized,
    F: FnOnce(&mut Request),
{
    resolve(host, defaults, block).map(Resolution::into_defaults)
}

/// Like [`configure`], returning the full [`Resolution`].
///
/// # Errors
///
/// See [`configure`].
pub fn resolve<H, F>(host: &mut H, defaults: Options, block: F) -> Result<Resolution, ResolveError>
where
    H: Pluggable + ?Sized,
    F: FnOnce(&mut Request),
{
    let _span = tracing::debug_span!("configure", host = host.display_name()).entered();

    let (requested, defaults) = Request::evaluate(defaults, block).into_parts();

    let graph = GraphBuilder::new(host.registry(), host.applied_plugins())
        .with_host_name(host.display_name())
        .build(&requested)?;

    let order = linearize(&graph).map_err(|cycle| cycle_conflict(&*host, cycle))?;

    let newly_applied: Vec<Plugin> = order
        .iter()
        .filter(|plugin| !host.applied_plugins().contains(plugin))
        .cloned()
        .collect();
    if !graph.is_empty() {
        host.apply_order(&order);
    }
    tracing::debug!(
        order = ?order.iter().map(Plugin::name).collect::<Vec<_>>(),
        new = newly_applied.len(),
        "resolved plugins"
    );

    Ok(Resolution {
        order,
        newly_applied,
        defaults,
        graph,
    })
}

fn cycle_conflict<H: Pluggable + ?Sized>(host: &H, cycle: CycleError) -> DependencyConflict {
    let mut plugins = registry_names(host.registry(), cycle.members());
    plugins.sort();
    DependencyConflict::Cyclic {
        plugins,
        host: host.display_name().map(str::to_string),
    }
}

fn registry_names(registry: &PluginRegistry, plugins: &[Plugin]) -> Vec<String> {
    plugins
        .iter()
        .map(|plugin| {
            registry
                .name_of(plugin)
                .unwrap_or_else(|| plugin.name().to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::host::Host;
    use crate::plugin::{DependencyOrder, PluginBuilder};

    fn host() -> Host {
        let registry = Arc::new(PluginRegistry::new());
        registry.register(PluginBuilder::new("backend").build().unwrap());
        registry.register(
            PluginBuilder::new("reader")
                .depends_on("backend", DependencyOrder::After)
                .build()
                .unwrap(),
        );
        Host::with_registry(registry).named("Post")
    }

    #[test]
    fn resolution_reports_new_plugins_only() {
        let mut host = host();
        let first = resolve(&mut host, Options::new(), |plugins| {
            plugins.plugin("backend");
        })
        .unwrap();
        assert_eq!(first.newly_applied().len(), 1);

        let second = resolve(&mut host, Options::new(), |plugins| {
            plugins.plugin("reader").plugin("backend");
        })
        .unwrap_err();
        assert!(second.is_dependency_conflict());
        assert_eq!(host.plugin_names(), ["backend"]);
    }

    #[test]
    fn empty_request_changes_nothing() {
        let mut host = host();
        let resolution = resolve(&mut host, Options::new(), |_| {}).unwrap();

        assert!(resolution.order().is_empty());
        assert!(resolution.graph().is_empty());
        assert!(host.plugin_names().is_empty());
    }

    #[test]
    fn unknown_plugin_leaves_host_unchanged() {
        let mut host = host();
        let err = configure(&mut host, Options::new(), |plugins| {
            plugins.plugin("backend").plugin("nonexistent");
        })
        .unwrap_err();

        assert!(matches!(err, ResolveError::PluginNotFound(ref name) if name == "nonexistent"));
        assert!(host.plugin_names().is_empty());
    }
}
