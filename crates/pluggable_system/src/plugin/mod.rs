//! Plugin definitions.
//!
//! A plugin is a named unit of behavior that a host incorporates. Plugins do
//! not reference each other directly: they declare dependencies **by name**,
//! each with a [`DependencyOrder`] saying where the dependency must sit in the
//! host's application order. The resolver turns those declarations into one
//! ordering (see [`crate::graph`] and [`crate::linearize`]).
//!
//! # Identity
//!
//! [`Plugin`] is a shared handle to an immutable [`PluginDefinition`].
//! Handles compare by identity: two separately built definitions are
//! different plugins even if they carry the same name. The registry
//! guarantees that loading a name always yields the same handle.
//!
//! # Example
//!
//! ```
//! use pluggable_system::plugin::{DependencyOrder, PluginBuilder};
//!
//! let dirty = PluginBuilder::new("dirty")
//!     .depends_on("backend", DependencyOrder::Before)
//!     .depends_on("fallthrough_accessors", DependencyOrder::None)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(dirty.name(), "dirty");
//! assert_eq!(dirty.dependencies().len(), 2);
//! assert_eq!(dirty.option_namespace(), ["dirty"]);
//! ```

mod hooks;

pub use hooks::{Hook, HookFn, HookKind, Next};
pub(crate) use hooks::HookLink;

use core::fmt;
use core::hash::{Hash, Hasher};
use core::str::FromStr;
use std::sync::Arc;

use crate::error::DeclarationError;
use crate::host::{Instance, Target};
use crate::options::Options;

// ─────────────────────────────────────────────────────────────────────────────
// DependencyOrder
// ─────────────────────────────────────────────────────────────────────────────

/// Where a dependency must be applied relative to the declaring plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DependencyOrder {
    /// The dependency must be present; relative order is unconstrained.
    #[default]
    None,
    /// The declaring plugin is applied before the dependency.
    Before,
    /// The declaring plugin is applied after the dependency.
    After,
}

impl FromStr for DependencyOrder {
    type Err = DeclarationError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "none" => Ok(Self::None),
            "before" => Ok(Self::Before),
            "after" => Ok(Self::After),
            other => Err(DeclarationError::InvalidOrder(other.to_string())),
        }
    }
}

impl fmt::Display for DependencyOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Before => f.write_str("before"),
            Self::After => f.write_str("after"),
        }
    }
}

/// A dependency declaration: another plugin's name plus an ordering token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    name: String,
    order: DependencyOrder,
}

impl Dependency {
    /// Name of the plugin depended on.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordering requirement relative to the declaring plugin.
    #[must_use]
    pub fn order(&self) -> DependencyOrder {
        self.order
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PluginDefinition
// ─────────────────────────────────────────────────────────────────────────────

/// The immutable contents of a plugin.
///
/// Built with [`PluginBuilder`]; accessed through a [`Plugin`] handle.
pub struct PluginDefinition {
    /// Stable symbolic name.
    name: String,
    /// Dependency declarations, in declaration order.
    dependencies: Vec<Dependency>,
    /// Option keys this plugin reads in its hooks.
    option_namespace: Vec<String>,
    /// At most one hook per kind.
    hooks: Vec<Hook>,
}

impl fmt::Debug for PluginDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDefinition")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("option_namespace", &self.option_namespace)
            .field("hooks", &self.hooks)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Plugin
// ─────────────────────────────────────────────────────────────────────────────

/// A shared handle to a plugin definition, compared by identity.
#[derive(Clone)]
pub struct Plugin(Arc<PluginDefinition>);

impl Plugin {
    /// Returns the plugin's symbolic name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns the dependency declarations in declaration order.
    #[must_use]
    pub fn dependencies(&self) -> &[Dependency] {
        &self.0.dependencies
    }

    /// Returns the ordering token declared for `name`, if it is a dependency.
    #[must_use]
    pub fn dependency_order(&self, name: &str) -> Option<DependencyOrder> {
        self.0
            .dependencies
            .iter()
            .find(|dependency| dependency.name == name)
            .map(Dependency::order)
    }

    /// Returns the option keys passed to hooks that want options.
    #[must_use]
    pub fn option_namespace(&self) -> &[String] {
        &self.0.option_namespace
    }

    /// Returns all registered hooks.
    #[must_use]
    pub fn hooks(&self) -> &[Hook] {
        &self.0.hooks
    }

    /// Returns the hook of the given kind, if registered.
    #[must_use]
    pub fn hook(&self, kind: HookKind) -> Option<&Hook> {
        self.0.hooks.iter().find(|hook| hook.kind() == kind)
    }

    /// Returns the initialize hook body and its options flag.
    #[must_use]
    pub fn initialize_hook(&self) -> Option<(&HookFn<Instance>, bool)> {
        self.0.hooks.iter().find_map(|hook| match hook {
            Hook::OnInitialize {
                callback,
                wants_options,
            } => Some((callback.as_ref(), *wants_options)),
            Hook::OnIncluded { .. } => None,
        })
    }

    /// Returns the included hook body and its options flag.
    #[must_use]
    pub fn included_hook(&self) -> Option<(&HookFn<Target>, bool)> {
        self.0.hooks.iter().find_map(|hook| match hook {
            Hook::OnIncluded {
                callback,
                wants_options,
            } => Some((callback.as_ref(), *wants_options)),
            Hook::OnInitialize { .. } => None,
        })
    }

    /// Returns true if every declared dependency is among `applied`.
    #[must_use]
    pub fn dependencies_satisfied(&self, applied: &[Plugin]) -> bool {
        self.0.dependencies.iter().all(|dependency| {
            applied
                .iter()
                .any(|plugin| plugin.name() == dependency.name)
        })
    }

    /// Returns true if both handles point at the same definition.
    #[must_use]
    pub fn ptr_eq(&self, other: &Plugin) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Plugin {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Plugin {}

impl Hash for Plugin {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Plugin").field(&self.0.name).finish()
    }
}

impl fmt::Display for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PluginBuilder
// ─────────────────────────────────────────────────────────────────────────────

/// Declares a plugin.
///
/// Declaration mistakes (an unknown ordering token, a self dependency, a
/// second hook of one kind) are recorded and reported by
/// [`build`](Self::build); the first mistake wins.
///
/// # Example
///
/// ```
/// use pluggable_system::error::DeclarationError;
/// use pluggable_system::plugin::PluginBuilder;
///
/// let err = PluginBuilder::new("fallbacks")
///     .depends_on_token("backend", "sideways")
///     .build()
///     .unwrap_err();
///
/// assert_eq!(err, DeclarationError::InvalidOrder("sideways".into()));
/// ```
pub struct PluginBuilder {
    name: String,
    dependencies: Vec<Dependency>,
    option_namespace: Option<Vec<String>>,
    hooks: Vec<Hook>,
    error: Option<DeclarationError>,
}

impl PluginBuilder {
    /// Starts declaring a plugin named `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let error = name.is_empty().then_some(DeclarationError::EmptyName);
        Self {
            name,
            dependencies: Vec::new(),
            option_namespace: None,
            hooks: Vec::new(),
            error,
        }
    }

    /// Declares a dependency on `name` with the given ordering.
    ///
    /// Declaring the same dependency again replaces its ordering.
    #[must_use]
    pub fn depends_on(mut self, name: impl Into<String>, order: DependencyOrder) -> Self {
        let name = name.into();
        if name.is_empty() {
            self.fail(DeclarationError::EmptyName);
            return self;
        }
        if name == self.name {
            self.fail(DeclarationError::SelfDependency(name));
            return self;
        }
        match self.dependencies.iter_mut().find(|dep| dep.name == name) {
            Some(existing) => existing.order = order,
            None => self.dependencies.push(Dependency { name, order }),
        }
        self
    }

    /// Declares a dependency using a textual ordering token
    /// (`"none"`, `"before"` or `"after"`).
    #[must_use]
    pub fn depends_on_token(mut self, name: impl Into<String>, token: &str) -> Self {
        match token.parse::<DependencyOrder>() {
            Ok(order) => self.depends_on(name, order),
            Err(err) => {
                self.fail(err);
                self
            }
        }
    }

    /// Sets the option keys handed to hooks that want options.
    ///
    /// Defaults to the plugin's own name.
    #[must_use]
    pub fn option_namespace<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.option_namespace = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Registers an initialize hook that does not receive options.
    #[must_use]
    pub fn on_initialize<F>(self, f: F) -> Self
    where
        F: Fn(&mut Instance, Next<'_, Instance>) + Send + Sync + 'static,
    {
        self.hook(Hook::OnInitialize {
            callback: Arc::new(
                move |instance: &mut Instance, _: Option<&Options>, next: Next<'_, Instance>| {
                    f(instance, next);
                },
            ),
            wants_options: false,
        })
    }

    /// Registers an initialize hook that receives the plugin's option slice.
    #[must_use]
    pub fn on_initialize_with_options<F>(self, f: F) -> Self
    where
        F: Fn(&mut Instance, &Options, Next<'_, Instance>) + Send + Sync + 'static,
    {
        self.hook(Hook::OnInitialize {
            callback: Arc::new(
                move |instance: &mut Instance, options: Option<&Options>, next: Next<'_, Instance>| {
                    let empty = Options::new();
                    f(instance, options.unwrap_or(&empty), next);
                },
            ),
            wants_options: true,
        })
    }

    /// Registers an included hook that does not receive options.
    #[must_use]
    pub fn on_included<F>(self, f: F) -> Self
    where
        F: Fn(&mut Target, Next<'_, Target>) + Send + Sync + 'static,
    {
        self.hook(Hook::OnIncluded {
            callback: Arc::new(
                move |target: &mut Target, _: Option<&Options>, next: Next<'_, Target>| {
                    f(target, next);
                },
            ),
            wants_options: false,
        })
    }

    /// Registers an included hook that receives the plugin's option slice.
    #[must_use]
    pub fn on_included_with_options<F>(self, f: F) -> Self
    where
        F: Fn(&mut Target, &Options, Next<'_, Target>) + Send + Sync + 'static,
    {
        self.hook(Hook::OnIncluded {
            callback: Arc::new(
                move |target: &mut Target, options: Option<&Options>, next: Next<'_, Target>| {
                    let empty = Options::new();
                    f(target, options.unwrap_or(&empty), next);
                },
            ),
            wants_options: true,
        })
    }

    /// Registers a pre-built [`Hook`].
    #[must_use]
    pub fn hook(mut self, hook: Hook) -> Self {
        let kind = hook.kind();
        if self.hooks.iter().any(|existing| existing.kind() == kind) {
            self.fail(DeclarationError::DuplicateHook {
                plugin: self.name.clone(),
                kind,
            });
            return self;
        }
        self.hooks.push(hook);
        self
    }

    /// Finishes the declaration.
    ///
    /// # Errors
    ///
    /// Returns the first declaration mistake recorded by the builder.
    pub fn build(self) -> Result<Plugin, DeclarationError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let option_namespace = self
            .option_namespace
            .unwrap_or_else(|| vec![self.name.clone()]);
        Ok(Plugin(Arc::new(PluginDefinition {
            name: self.name,
            dependencies: self.dependencies,
            option_namespace,
            hooks: self.hooks,
        })))
    }

    fn fail(&mut self, err: DeclarationError) {
        self.error.get_or_insert(err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_tokens_parse() {
        assert_eq!("none".parse::<DependencyOrder>(), Ok(DependencyOrder::None));
        assert_eq!("before".parse::<DependencyOrder>(), Ok(DependencyOrder::Before));
        assert_eq!("after".parse::<DependencyOrder>(), Ok(DependencyOrder::After));
        assert_eq!(
            "AFTER".parse::<DependencyOrder>(),
            Err(DeclarationError::InvalidOrder("AFTER".into()))
        );
    }

    #[test]
    fn plugins_compare_by_identity() {
        let a = PluginBuilder::new("cache").build().unwrap();
        let b = PluginBuilder::new("cache").build().unwrap();

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn redeclared_dependency_replaces_order() {
        let plugin = PluginBuilder::new("presence")
            .depends_on("backend", DependencyOrder::None)
            .depends_on("backend", DependencyOrder::Before)
            .build()
            .unwrap();

        assert_eq!(plugin.dependencies().len(), 1);
        assert_eq!(
            plugin.dependency_order("backend"),
            Some(DependencyOrder::Before)
        );
    }

    #[test]
    fn self_dependency_is_rejected() {
        let err = PluginBuilder::new("cache")
            .depends_on("cache", DependencyOrder::After)
            .build()
            .unwrap_err();
        assert_eq!(err, DeclarationError::SelfDependency("cache".into()));
    }

    #[test]
    fn empty_names_are_rejected() {
        assert_eq!(
            PluginBuilder::new("").build().unwrap_err(),
            DeclarationError::EmptyName
        );
        assert_eq!(
            PluginBuilder::new("cache")
                .depends_on("", DependencyOrder::None)
                .build()
                .unwrap_err(),
            DeclarationError::EmptyName
        );
    }

    #[test]
    fn second_hook_of_same_kind_is_rejected() {
        let err = PluginBuilder::new("reader")
            .on_initialize(|instance, next| next.proceed(instance))
            .on_included(|target, next| next.proceed(target))
            .on_initialize(|instance, next| next.proceed(instance))
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            DeclarationError::DuplicateHook {
                plugin: "reader".into(),
                kind: HookKind::Initialize,
            }
        );
    }

    #[test]
    fn hook_options_flag_is_fixed_at_registration() {
        let plugin = PluginBuilder::new("writer")
            .on_initialize(|instance, next| next.proceed(instance))
            .on_included_with_options(|target, _options, next| next.proceed(target))
            .build()
            .unwrap();

        assert!(!plugin.hook(HookKind::Initialize).unwrap().wants_options());
        assert!(plugin.hook(HookKind::Included).unwrap().wants_options());
        assert_eq!(plugin.hooks().len(), 2);
    }

    #[test]
    fn option_namespace_defaults_to_name() {
        let plugin = PluginBuilder::new("fallbacks").build().unwrap();
        assert_eq!(plugin.option_namespace(), ["fallbacks"]);

        let plugin = PluginBuilder::new("accessors")
            .option_namespace(["locale_accessors", "fallthrough_accessors"])
            .build()
            .unwrap();
        assert_eq!(
            plugin.option_namespace(),
            ["locale_accessors", "fallthrough_accessors"]
        );
    }

    #[test]
    fn dependencies_satisfied_checks_names() {
        let backend = PluginBuilder::new("backend").build().unwrap();
        let cache = PluginBuilder::new("cache")
            .depends_on("backend", DependencyOrder::Before)
            .build()
            .unwrap();

        assert!(!cache.dependencies_satisfied(&[]));
        assert!(cache.dependencies_satisfied(&[backend]));
    }
}
