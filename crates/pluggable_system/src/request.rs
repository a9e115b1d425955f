//! The request DSL: which plugins a host should receive.
//!
//! A request is written as a closure over a [`Request`], the only value in
//! scope while the closure runs. It cannot reach the host being configured:
//! it can only name plugins and give them defaults.
//!
//! ```
//! use pluggable_system::options::Options;
//! use pluggable_system::request::Request;
//! use serde_json::json;
//!
//! let request = Request::evaluate(Options::new(), |plugins| {
//!     plugins
//!         .plugin("reader")
//!         .plugin("writer")
//!         .plugin_default("cache", "fast")
//!         .plugin("reader");
//! });
//!
//! assert_eq!(request.requested().len(), 3);
//! assert_eq!(request.defaults().get("cache"), Some(&json!("fast")));
//! ```
//!
//! # Ordering
//!
//! The requested names form a set. The order of calls inside the closure has
//! no effect on the final application order, which comes only from the
//! plugins' dependency declarations.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::options::Options;

/// Option key captured into the defaults table.
pub const DEFAULT_KEY: &str = "default";

/// Plugins requested for a host, with the defaults table they produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    requested: BTreeSet<String>,
    defaults: Options,
}

impl Request {
    /// Creates an empty request whose defaults table starts as `defaults`.
    #[must_use]
    pub fn new(defaults: Options) -> Self {
        Self {
            requested: BTreeSet::new(),
            defaults,
        }
    }

    /// Runs `block` against a fresh request seeded with `defaults`.
    pub fn evaluate<F>(defaults: Options, block: F) -> Self
    where
        F: FnOnce(&mut Request),
    {
        let mut request = Self::new(defaults);
        block(&mut request);
        tracing::debug!(
            requested = ?request.requested,
            defaults = request.defaults.len(),
            "evaluated plugin request"
        );
        request
    }

    /// Requests the plugin `name`. Requesting a name twice is a no-op.
    pub fn plugin(&mut self, name: impl Into<String>) -> &mut Self {
        self.requested.insert(name.into());
        self
    }

    /// Requests the plugin `name` with options.
    ///
    /// A `default` option is stored in the defaults table under `name`,
    /// replacing any earlier default. Other options are not interpreted here.
    pub fn plugin_with(&mut self, name: impl Into<String>, mut options: Options) -> &mut Self {
        let name = name.into();
        if let Some(default) = options.remove(DEFAULT_KEY) {
            self.defaults.insert(name.clone(), default);
        }
        if !options.is_empty() {
            tracing::debug!(
                plugin = %name,
                ignored = ?options.keys().collect::<Vec<_>>(),
                "request options other than default are not used by the resolver"
            );
        }
        self.plugin(name)
    }

    /// Requests the plugin `name` with a default value.
    pub fn plugin_default(&mut self, name: impl Into<String>, default: impl Into<Value>) -> &mut Self {
        self.plugin_with(name, Options::new().with(DEFAULT_KEY, default))
    }

    /// Returns the requested names in lexical order.
    #[must_use]
    pub fn requested(&self) -> &BTreeSet<String> {
        &self.requested
    }

    /// Returns true if `name` was requested.
    #[must_use]
    pub fn is_requested(&self, name: &str) -> bool {
        self.requested.contains(name)
    }

    /// Returns the defaults table.
    #[must_use]
    pub fn defaults(&self) -> &Options {
        &self.defaults
    }

    /// Splits the request into its requested names and defaults table.
    #[must_use]
    pub fn into_parts(self) -> (BTreeSet<String>, Options) {
        (self.requested, self.defaults)
    }
}
