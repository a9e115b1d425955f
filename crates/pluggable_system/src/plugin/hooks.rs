//! Lifecycle hooks a plugin can register on its host.
//!
//! A plugin registers at most one hook per [`HookKind`]:
//!
//! - **initialize** runs when the host builds an [`Instance`]
//! - **included** runs when an instance is incorporated into a [`Target`]
//!
//! # Chaining
//!
//! Hooks of all plugins applied to a host form one chain, in the host's
//! applied order. Each hook receives a [`Next`] continuation and delegates to
//! the rest of the chain by calling [`Next::proceed`]. A hook may run code
//! before and after delegating, or stop the chain by not delegating at all.
//!
//! # Option Slices
//!
//! A hook declared with the `_with_options` registration methods receives the
//! subset of the instance options whose keys are in its plugin's option
//! namespace. Hooks registered without it receive no slice. Whether a hook
//! wants the slice is fixed at registration time.
//!
//! ```
//! use pluggable_system::plugin::PluginBuilder;
//!
//! let plugin = PluginBuilder::new("cache")
//!     .on_initialize_with_options(|instance, options, next| {
//!         next.proceed(instance);
//!         if options.get("cache").is_some_and(|enabled| enabled == true) {
//!             instance.extensions_mut().insert(String::from("cache enabled"));
//!         }
//!     })
//!     .build()
//!     .unwrap();
//!
//! assert!(plugin.initialize_hook().is_some());
//! ```

use core::fmt;
use std::sync::Arc;

use crate::host::{Instance, Target};
use crate::options::Options;

// ─────────────────────────────────────────────────────────────────────────────
// HookKind
// ─────────────────────────────────────────────────────────────────────────────

/// The lifecycle point a hook is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    /// Host instance construction.
    Initialize,
    /// Incorporation of an instance into a target.
    Included,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookKind::Initialize => f.write_str("initialize"),
            HookKind::Included => f.write_str("included"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Hook
// ─────────────────────────────────────────────────────────────────────────────

/// A hook callback operating on subject `S`.
///
/// The second argument is the plugin's option slice, present only when the
/// hook was registered as wanting options.
pub type HookFn<S> = dyn Fn(&mut S, Option<&Options>, Next<'_, S>) + Send + Sync;

/// A registered hook, tagged by kind.
#[derive(Clone)]
pub enum Hook {
    /// Runs when a host instance is constructed.
    OnInitialize {
        /// The hook body.
        callback: Arc<HookFn<Instance>>,
        /// Whether the hook receives the plugin's option slice.
        wants_options: bool,
    },
    /// Runs when an instance is included into a target.
    OnIncluded {
        /// The hook body.
        callback: Arc<HookFn<Target>>,
        /// Whether the hook receives the plugin's option slice.
        wants_options: bool,
    },
}

impl Hook {
    /// Returns the kind tag of this hook.
    #[must_use]
    pub fn kind(&self) -> HookKind {
        match self {
            Hook::OnInitialize { .. } => HookKind::Initialize,
            Hook::OnIncluded { .. } => HookKind::Included,
        }
    }

    /// Returns whether the hook receives the plugin's option slice.
    #[must_use]
    pub fn wants_options(&self) -> bool {
        match self {
            Hook::OnInitialize { wants_options, .. } | Hook::OnIncluded { wants_options, .. } => {
                *wants_options
            }
        }
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("kind", &self.kind())
            .field("wants_options", &self.wants_options())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Chain
// ─────────────────────────────────────────────────────────────────────────────

/// One plugin's hook in a chain.
pub(crate) struct HookLink<'a, S: 'static> {
    /// Name of the plugin owning the hook.
    pub(crate) plugin: &'a str,
    /// Option keys the plugin reads.
    pub(crate) namespace: &'a [String],
    /// Whether to pass the option slice.
    pub(crate) wants_options: bool,
    /// The hook body.
    pub(crate) callback: &'a HookFn<S>,
}

/// The remainder of a hook chain.
///
/// Passed to every hook; call [`proceed`](Self::proceed) to run the hooks of
/// the plugins applied after this one.
pub struct Next<'a, S: 'static> {
    links: &'a [HookLink<'a, S>],
    options: &'a Options,
}

impl<'a, S: 'static> Next<'a, S> {
    pub(crate) fn new(links: &'a [HookLink<'a, S>], options: &'a Options) -> Self {
        Self { links, options }
    }

    /// Runs the rest of the chain on `subject`.
    pub fn proceed(self, subject: &mut S) {
        let Some((link, rest)) = self.links.split_first() else {
            return;
        };
        let slice = link
            .wants_options
            .then(|| self.options.slice(link.namespace));
        tracing::trace!(
            plugin = link.plugin,
            with_options = link.wants_options,
            "running hook"
        );
        (link.callback)(subject, slice.as_ref(), Next::new(rest, self.options));
    }

    /// Returns the number of hooks left in the chain.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.links.len()
    }

    /// Returns true if no hooks are left.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.links.is_empty()
    }
}
