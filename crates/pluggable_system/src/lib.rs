//! Plugin dependency resolution and host composition for Pluggable.
//!
//! `pluggable_system` provides the engine that composes a host from named
//! plugins:
//!
//! - [`plugin`] - Plugin declarations, ordering tokens and hooks
//! - [`registry`] - Name-to-plugin registry with load-once semantics
//! - [`request`] - The request DSL evaluated by [`configure()`]
//! - [`graph`] - Dependency graph construction and conflict detection
//! - [`linearize`] - Deterministic topological ordering
//! - [`mod@configure`] - The resolution pipeline
//! - [`host`] - Hosts, instances and targets
//! - [`options`] - Option and defaults tables
//!
//! # Resolution
//!
//! A call to [`configure()`] evaluates a request block, loads every requested
//! plugin and its dependencies, orders them so that every `before`/`after`
//! declaration holds, and layers the plugins not yet applied ahead of the ones
//! the host already has.
//! Identical inputs always produce the identical order.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use pluggable_system::prelude::*;
//!
//! let registry = Arc::new(PluginRegistry::new());
//! registry.register(PluginBuilder::new("backend").build().unwrap());
//! registry.register(
//!     PluginBuilder::new("reader")
//!         .depends_on("backend", DependencyOrder::After)
//!         .build()
//!         .unwrap(),
//! );
//! registry.register(
//!     PluginBuilder::new("cache")
//!         .depends_on("reader", DependencyOrder::Before)
//!         .build()
//!         .unwrap(),
//! );
//!
//! let mut host = Host::with_registry(registry).named("Post");
//! host.configure(|plugins| {
//!     plugins.plugin("reader").plugin("cache");
//! })
//! .unwrap();
//!
//! assert_eq!(host.plugin_names(), ["cache", "backend", "reader"]);
//! ```

/// Resolution pipeline.
pub mod configure;

/// Error types.
pub mod error;

/// Typed state attached by hooks.
pub mod extensions;

/// Dependency graph construction.
pub mod graph;

/// Hosts, instances and targets.
pub mod host;

/// Topological ordering.
pub mod linearize;

/// Option tables.
pub mod options;

/// Plugin declarations and hooks.
pub mod plugin;

/// Plugin registry.
pub mod registry;

/// Request DSL.
pub mod request;

pub use configure::{configure, resolve};

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::configure::{Resolution, configure, resolve};
    pub use crate::error::{DeclarationError, DependencyConflict, ResolveError};
    pub use crate::extensions::Extensions;
    pub use crate::host::{Host, Instance, Pluggable, Target};
    pub use crate::options::Options;
    pub use crate::plugin::{
        Dependency, DependencyOrder, Hook, HookKind, Next, Plugin, PluginBuilder,
    };
    pub use crate::registry::PluginRegistry;
    pub use crate::request::Request;
}
