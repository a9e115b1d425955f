//! Dependency graph construction.
//!
//! [`GraphBuilder`] starts from the requested plugin names, loads each plugin
//! through the registry and walks its dependency declarations transitively.
//! Every edge `A → B` in the resulting [`DependencyGraph`] means *A must be
//! applied before B*:
//!
//! | declared by `P` on `D` | effect |
//! |---|---|
//! | [`DependencyOrder::None`] | `D` becomes a node, no edge |
//! | [`DependencyOrder::Before`] | edge `P → D` |
//! | [`DependencyOrder::After`] | conflict check, then edge `D → P` |
//!
//! # Conflicts
//!
//! Plugins already applied to the host have a fixed position, and newly
//! applied plugins are layered ahead of them. A new plugin may therefore
//! declare `before` against an applied one, but when it must come after one,
//! no placement can honour that and the build fails with
//! [`DependencyConflict::MustFollow`].
//!
//! # Visiting
//!
//! Each plugin is expanded once per build. The visited set only prevents
//! repeated work; cycles are left in the graph for the linearizer to report.

use hashbrown::{HashMap, HashSet};

use crate::error::{DependencyConflict, ResolveError};
use crate::plugin::{DependencyOrder, Plugin};
use crate::registry::PluginRegistry;

// ─────────────────────────────────────────────────────────────────────────────
// DependencyGraph
// ─────────────────────────────────────────────────────────────────────────────

/// Plugins and their "must precede" edges.
///
/// Nodes keep the order in which they were first added; the linearizer uses
/// that order to break ties deterministically.
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    /// Nodes in insertion order.
    nodes: Vec<Plugin>,
    /// Node → position in `nodes`.
    index: HashMap<Plugin, usize>,
    /// Out-edges per node position, in insertion order, without duplicates.
    edges: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `plugin` as a node, returning its position.
    pub fn add_node(&mut self, plugin: &Plugin) -> usize {
        if let Some(&position) = self.index.get(plugin) {
            return position;
        }
        let position = self.nodes.len();
        self.nodes.push(plugin.clone());
        self.index.insert(plugin.clone(), position);
        self.edges.push(Vec::new());
        position
    }

    /// Adds the edge `from → to`, adding either end as a node if needed.
    ///
    /// Self edges and repeated edges are ignored.
    pub fn add_edge(&mut self, from: &Plugin, to: &Plugin) {
        if from == to {
            tracing::trace!(plugin = %from, "ignoring self edge");
            return;
        }
        let from = self.add_node(from);
        let to = self.add_node(to);
        if !self.edges[from].contains(&to) {
            self.edges[from].push(to);
        }
    }

    /// Returns true if `plugin` is a node.
    #[must_use]
    pub fn contains(&self, plugin: &Plugin) -> bool {
        self.index.contains_key(plugin)
    }

    /// Returns true if the edge `from → to` exists.
    #[must_use]
    pub fn has_edge(&self, from: &Plugin, to: &Plugin) -> bool {
        match (self.index.get(from), self.index.get(to)) {
            (Some(&from), Some(&to)) => self.edges[from].contains(&to),
            _ => false,
        }
    }

    /// Returns the nodes in insertion order.
    #[must_use]
    pub fn nodes(&self) -> &[Plugin] {
        &self.nodes
    }

    /// Returns the plugins `plugin` must precede.
    pub fn successors<'a>(&'a self, plugin: &Plugin) -> impl Iterator<Item = &'a Plugin> + use<'a> {
        self.index
            .get(plugin)
            .map(|&position| self.edges[position].as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&successor| &self.nodes[successor])
    }

    /// Returns every edge as `(from, to)` pairs.
    #[must_use]
    pub fn edges(&self) -> Vec<(&Plugin, &Plugin)> {
        self.edges
            .iter()
            .enumerate()
            .flat_map(|(from, targets)| {
                targets
                    .iter()
                    .map(move |&to| (&self.nodes[from], &self.nodes[to]))
            })
            .collect()
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Out-edges of the node at `position`.
    pub(crate) fn out_edges(&self, position: usize) -> &[usize] {
        &self.edges[position]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GraphBuilder
// ─────────────────────────────────────────────────────────────────────────────

/// Expands requested plugin names into a [`DependencyGraph`].
///
/// # Example
///
/// ```
/// use pluggable_system::graph::GraphBuilder;
/// use pluggable_system::plugin::{DependencyOrder, PluginBuilder};
/// use pluggable_system::registry::PluginRegistry;
///
/// let registry = PluginRegistry::new();
/// registry.register(PluginBuilder::new("backend").build().unwrap());
/// registry.register(
///     PluginBuilder::new("cache")
///         .depends_on("backend", DependencyOrder::Before)
///         .build()
///         .unwrap(),
/// );
///
/// let graph = GraphBuilder::new(&registry, &[]).build(["cache"]).unwrap();
/// let cache = registry.load("cache").unwrap();
/// let backend = registry.load("backend").unwrap();
///
/// assert_eq!(graph.len(), 2);
/// assert!(graph.has_edge(&cache, &backend));
/// ```
pub struct GraphBuilder<'a> {
    registry: &'a PluginRegistry,
    applied: &'a [Plugin],
    host: Option<&'a str>,
    graph: DependencyGraph,
    visited: HashSet<Plugin>,
}

impl<'a> GraphBuilder<'a> {
    /// Creates a builder that loads through `registry` and checks conflicts
    /// against the already-applied plugins `applied`.
    #[must_use]
    pub fn new(registry: &'a PluginRegistry, applied: &'a [Plugin]) -> Self {
        Self {
            registry,
            applied,
            host: None,
            graph: DependencyGraph::new(),
            visited: HashSet::new(),
        }
    }

    /// Sets the host display name used in conflict errors.
    #[must_use]
    pub fn with_host_name(mut self, host: Option<&'a str>) -> Self {
        self.host = host;
        self
    }

    /// Loads every name in `requested` and expands dependencies.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::PluginNotFound`] for an unknown requested or declared name
    /// - [`ResolveError::Conflict`] when an `after` requirement points at an
    ///   already-applied plugin
    pub fn build<I, S>(mut self, requested: I) -> Result<DependencyGraph, ResolveError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in requested {
            let plugin = self.registry.load(name.as_ref())?;
            self.visit(&plugin)?;
        }
        tracing::debug!(
            nodes = self.graph.len(),
            edges = self.graph.edges().len(),
            "built dependency graph"
        );
        Ok(self.graph)
    }

    fn visit(&mut self, plugin: &Plugin) -> Result<(), ResolveError> {
        if !self.visited.insert(plugin.clone()) {
            return Ok(());
        }
        self.graph.add_node(plugin);

        for dependency in plugin.dependencies() {
            let target = self.registry.load(dependency.name())?;
            if dependency.order() == DependencyOrder::After {
                self.check_after(plugin, &target)?;
            }
            self.visit(&target)?;

            match dependency.order() {
                DependencyOrder::None => {}
                DependencyOrder::Before => {
                    tracing::trace!(from = %plugin, to = %target, "adding before edge");
                    self.graph.add_edge(plugin, &target);
                }
                DependencyOrder::After => {
                    tracing::trace!(from = %target, to = %plugin, "adding after edge");
                    self.graph.add_edge(&target, plugin);
                }
            }
        }
        Ok(())
    }

    /// `plugin` must come after `dependency`; fails if `dependency` is
    /// already applied and `plugin` is not.
    fn check_after(&self, plugin: &Plugin, dependency: &Plugin) -> Result<(), DependencyConflict> {
        if self.applied.contains(dependency) && !self.applied.contains(plugin) {
            return Err(DependencyConflict::MustFollow {
                plugin: self.display_name(plugin),
                dependency: self.display_name(dependency),
                host: self.host.map(str::to_string),
            });
        }
        Ok(())
    }

    fn display_name(&self, plugin: &Plugin) -> String {
        self.registry
            .name_of(plugin)
            .unwrap_or_else(|| plugin.name().to_string())
    }
}
