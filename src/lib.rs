//! Compose hosts from named plugins with declared ordering requirements.
//!
//! ```
//! use std::sync::Arc;
//! use pluggable::prelude::*;
//! use serde_json::json;
//!
//! let registry = Arc::new(PluginRegistry::new());
//! CorePlugins::register(&registry);
//!
//! let mut host = Host::with_registry(registry).named("Post");
//! let defaults = host
//!     .configure(|plugins| {
//!         plugins.plugin("reader").plugin_default("cache", "fast");
//!     })
//!     .unwrap()
//!     .clone();
//!
//! assert_eq!(host.plugin_names(), ["cache", "backend", "reader"]);
//! assert_eq!(defaults, Options::from([("cache", json!("fast"))]));
//! ```

pub use pluggable_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use pluggable_internal::prelude::*;
}
