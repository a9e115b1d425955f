//! Error types for plugin declaration and dependency resolution.

use crate::plugin::HookKind;

/// Error raised while declaring a plugin.
///
/// Declaration errors are caught when a plugin definition is built, never
/// during resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeclarationError {
    /// An ordering token other than `none`, `before` or `after`.
    #[error("invalid dependency order '{0}': expected one of none, before, after")]
    InvalidOrder(String),

    /// A plugin declared a dependency on itself.
    #[error("plugin '{0}' cannot depend on itself")]
    SelfDependency(String),

    /// A second hook of the same kind was registered on one plugin.
    #[error("plugin '{plugin}' already registers an {kind} hook")]
    DuplicateHook {
        /// The plugin being declared.
        plugin: String,
        /// The hook kind registered twice.
        kind: HookKind,
    },

    /// A plugin or dependency name was empty.
    #[error("plugin names must not be empty")]
    EmptyName,
}

/// An ordering requirement that cannot be satisfied.
///
/// Cycles are a kind of dependency conflict: both variants mean the plugin set
/// itself is misconfigured.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DependencyConflict {
    /// `plugin` must be applied after `dependency`, but `dependency` was
    /// already applied to the host in an earlier pass.
    #[error("'{plugin}' plugin must come after '{dependency}' plugin{}", in_host(.host))]
    MustFollow {
        /// The plugin declaring the `after` requirement.
        plugin: String,
        /// The already-applied dependency.
        dependency: String,
        /// Display name of the host, if it has one.
        host: Option<String>,
    },

    /// The ordering requirements form a cycle.
    #[error(
        "Dependencies cannot be resolved between: {}{}",
        .plugins.join(", "),
        in_host(.host)
    )]
    Cyclic {
        /// Names of every plugin on the cycle, sorted lexically.
        plugins: Vec<String>,
        /// Display name of the host, if it has one.
        host: Option<String>,
    },
}

impl DependencyConflict {
    /// Returns the host display name attached to this conflict.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        match self {
            Self::MustFollow { host, .. } | Self::Cyclic { host, .. } => host.as_deref(),
        }
    }

    /// Returns every plugin name implicated in the conflict.
    #[must_use]
    pub fn plugins(&self) -> Vec<&str> {
        match self {
            Self::MustFollow {
                plugin, dependency, ..
            } => vec![plugin.as_str(), dependency.as_str()],
            Self::Cyclic { plugins, .. } => plugins.iter().map(String::as_str).collect(),
        }
    }
}

/// ` in {host}` when the conflict carries a host name.
fn in_host(host: &Option<String>) -> String {
    host.as_deref()
        .map(|host| format!(" in {host}"))
        .unwrap_or_default()
}

/// Error raised by a resolution call.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// No plugin is registered under the requested or declared name.
    #[error("no plugin registered under the name '{0}'")]
    PluginNotFound(String),

    /// The ordering requirements cannot be satisfied.
    #[error(transparent)]
    Conflict(#[from] DependencyConflict),

    /// A lazily registered plugin failed to build on first load.
    #[error("plugin '{plugin}' failed to load: {source}")]
    Declaration {
        /// The name the plugin was registered under.
        plugin: String,
        /// The underlying declaration error.
        source: DeclarationError,
    },
}

impl ResolveError {
    /// Returns true for any ordering conflict, cycles included.
    #[must_use]
    pub fn is_dependency_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Returns true only for cyclic ordering requirements.
    #[must_use]
    pub fn is_cycle(&self) -> bool {
        matches!(self, Self::Conflict(DependencyConflict::Cyclic { .. }))
    }

    /// Returns the conflict details, if this is a conflict.
    #[must_use]
    pub fn conflict(&self) -> Option<&DependencyConflict> {
        match self {
            Self::Conflict(conflict) => Some(conflict),
            _ => None,
        }
    }
}
