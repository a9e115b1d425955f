//! Accessor plugins.
//!
//! These run when an instance is included into a target and record the
//! accessor names the target gains in its [`Accessors`] extension.

use pluggable_system::error::DeclarationError;
use pluggable_system::host::Target;
use pluggable_system::plugin::{DependencyOrder, Plugin, PluginBuilder};
use serde_json::Value;

/// Accessor names defined on a target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accessors {
    /// Attribute readers, e.g. `title`.
    pub readers: Vec<String>,
    /// Attribute writers, e.g. `title`.
    pub writers: Vec<String>,
    /// Per-locale accessors, e.g. `title_en`.
    pub locale_accessors: Vec<String>,
}

fn push_unique(list: &mut Vec<String>, name: String) {
    if !list.contains(&name) {
        list.push(name);
    }
}

/// A plugin option is on unless it is `false`.
fn enabled(value: Option<&Value>) -> bool {
    value.and_then(Value::as_bool) != Some(false)
}

fn accessors_of(target: &mut Target) -> (Vec<String>, &mut Accessors) {
    let attributes = target.attributes().to_vec();
    let accessors = target.extensions_mut().get_or_insert_with(Accessors::default);
    (attributes, accessors)
}

pub(crate) fn reader() -> Result<Plugin, DeclarationError> {
    PluginBuilder::new("reader")
        .depends_on("backend", DependencyOrder::After)
        .on_included_with_options(|target, options, next| {
            if enabled(options.get("reader")) {
                let (attributes, accessors) = accessors_of(target);
                for attribute in attributes {
                    push_unique(&mut accessors.readers, attribute);
                }
            }
            next.proceed(target);
        })
        .build()
}

pub(crate) fn writer() -> Result<Plugin, DeclarationError> {
    PluginBuilder::new("writer")
        .depends_on("backend", DependencyOrder::After)
        .on_included_with_options(|target, options, next| {
            if enabled(options.get("writer")) {
                let (attributes, accessors) = accessors_of(target);
                for attribute in attributes {
                    push_unique(&mut accessors.writers, attribute);
                }
            }
            next.proceed(target);
        })
        .build()
}

pub(crate) fn locale_accessors() -> Result<Plugin, DeclarationError> {
    PluginBuilder::new("locale_accessors")
        .on_included_with_options(|target, options, next| {
            let locales: Vec<String> = options
                .get("locale_accessors")
                .and_then(Value::as_array)
                .map(|locales| {
                    locales
                        .iter()
                        .filter_map(Value::as_str)
                        .map(|locale| locale.replace('-', "_").to_lowercase())
                        .collect()
                })
                .unwrap_or_default();

            if !locales.is_empty() {
                let (attributes, accessors) = accessors_of(target);
                for attribute in &attributes {
                    for locale in &locales {
                        push_unique(
                            &mut accessors.locale_accessors,
                            format!("{attribute}_{locale}"),
                        );
                    }
                }
            }
            next.proceed(target);
        })
        .build()
}

pub(crate) fn fallthrough_accessors() -> Result<Plugin, DeclarationError> {
    PluginBuilder::new("fallthrough_accessors").build()
}
