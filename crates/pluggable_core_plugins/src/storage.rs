//! Backend and value plugins.

use pluggable_system::error::DeclarationError;
use pluggable_system::plugin::{DependencyOrder, Plugin, PluginBuilder};
use serde_json::Value;

/// Backend configured for an instance, from the `backend` option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendName(pub String);

/// Whether an instance caches values, from the `cache` option.
///
/// Caching is on unless the option is `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheEnabled(pub bool);

/// Value returned when nothing is stored, from the `default` option.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultValue(pub Value);

pub(crate) fn backend() -> Result<Plugin, DeclarationError> {
    PluginBuilder::new("backend")
        .on_initialize_with_options(|instance, options, next| {
            if let Some(name) = options.get("backend").and_then(Value::as_str) {
                instance.extensions_mut().insert(BackendName(name.to_string()));
            }
            next.proceed(instance);
        })
        .build()
}

pub(crate) fn cache() -> Result<Plugin, DeclarationError> {
    PluginBuilder::new("cache")
        .depends_on("backend", DependencyOrder::Before)
        .on_initialize_with_options(|instance, options, next| {
            let enabled = options.get("cache").and_then(Value::as_bool) != Some(false);
            instance.extensions_mut().insert(CacheEnabled(enabled));
            next.proceed(instance);
        })
        .build()
}

pub(crate) fn default() -> Result<Plugin, DeclarationError> {
    PluginBuilder::new("default")
        .depends_on("backend", DependencyOrder::Before)
        .on_initialize_with_options(|instance, options, next| {
            if let Some(value) = options.get("default") {
                instance.extensions_mut().insert(DefaultValue(value.clone()));
            }
            next.proceed(instance);
        })
        .build()
}

pub(crate) fn presence() -> Result<Plugin, DeclarationError> {
    PluginBuilder::new("presence")
        .depends_on("backend", DependencyOrder::Before)
        .build()
}

pub(crate) fn dirty() -> Result<Plugin, DeclarationError> {
    PluginBuilder::new("dirty")
        .depends_on("backend", DependencyOrder::Before)
        .depends_on("fallthrough_accessors", DependencyOrder::None)
        .build()
}

pub(crate) fn query() -> Result<Plugin, DeclarationError> {
    PluginBuilder::new("query")
        .depends_on("backend", DependencyOrder::Before)
        .build()
}
