//! Locale fallbacks.
//!
//! The `fallbacks` option maps a locale to the locales tried, in order, when
//! it has no value:
//!
//! ```json
//! { "fallbacks": { "de-CH": ["de", "en"], "pt": "en" } }
//! ```
//!
//! A single locale may be given as a string. `true` enables fallbacks without
//! any explicit mapping.

use std::collections::BTreeMap;

use pluggable_system::error::DeclarationError;
use pluggable_system::plugin::{DependencyOrder, Plugin, PluginBuilder};
use serde_json::Value;

/// Fallback locales per locale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FallbackLocales(pub BTreeMap<String, Vec<String>>);

impl FallbackLocales {
    /// Returns the fallbacks for `locale`, or an empty slice.
    #[must_use]
    pub fn get(&self, locale: &str) -> &[String] {
        self.0.get(locale).map(Vec::as_slice).unwrap_or_default()
    }

    fn from_option(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(true) => Some(Self::default()),
            Value::Object(map) => Some(Self(
                map.iter()
                    .map(|(locale, fallbacks)| (locale.clone(), locales(fallbacks)))
                    .collect(),
            )),
            _ => None,
        }
    }
}

fn locales(value: &Value) -> Vec<String> {
    match value {
        Value::String(locale) => vec![locale.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

pub(crate) fn fallbacks() -> Result<Plugin, DeclarationError> {
    PluginBuilder::new("fallbacks")
        .depends_on("backend", DependencyOrder::Before)
        .on_initialize_with_options(|instance, options, next| {
            match options.get("fallbacks").and_then(FallbackLocales::from_option) {
                Some(fallbacks) => {
                    instance.extensions_mut().insert(fallbacks);
                }
                None => tracing::trace!("fallbacks disabled for instance"),
            }
            next.proceed(instance);
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_option_maps_locales() {
        let fallbacks =
            FallbackLocales::from_option(&json!({"de-CH": ["de", "en"], "pt": "en", "fr": 3}))
                .unwrap();

        assert_eq!(fallbacks.get("de-CH"), ["de", "en"]);
        assert_eq!(fallbacks.get("pt"), ["en"]);
        assert!(fallbacks.get("fr").is_empty());
        assert!(fallbacks.get("ja").is_empty());
    }

    #[test]
    fn true_enables_without_mapping() {
        assert_eq!(
            FallbackLocales::from_option(&json!(true)),
            Some(FallbackLocales::default())
        );
        assert_eq!(FallbackLocales::from_option(&json!(false)), None);
    }
}
