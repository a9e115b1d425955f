//! # Pluggable Internal Library
//!
//! Re-exports the core pluggable crates for convenience.

/// Plugin dependency resolution and host composition.
pub use pluggable_system;

/// Standard plugin declarations.
pub use pluggable_core_plugins;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use pluggable_core_plugins::CorePlugins;
    pub use pluggable_system::prelude::*;
}
