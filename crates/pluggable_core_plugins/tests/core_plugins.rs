//! Core plugin set resolved end to end.

use std::sync::{Arc, Once};

use pluggable_core_plugins::{
    Accessors, BackendName, CacheEnabled, CorePlugins, DefaultValue, FallbackLocales,
};
use pluggable_system::prelude::*;
use serde_json::json;

fn host(name: &str) -> Host {
    let registry = Arc::new(PluginRegistry::new());
    CorePlugins::register(&registry);
    Host::with_registry(registry).named(name)
}

#[test]
fn full_set_resolves_with_backend_in_the_middle() {
    let mut host = host("Post");
    host.configure(|plugins| {
        for name in CorePlugins::NAMES {
            plugins.plugin(name);
        }
    })
    .unwrap();

    assert_eq!(
        host.plugin_names(),
        [
            "cache",
            "default",
            "dirty",
            "fallthrough_accessors",
            "fallbacks",
            "locale_accessors",
            "presence",
            "query",
            "backend",
            "reader",
            "writer",
        ]
    );
}

#[test]
fn instance_carries_state_from_every_initialize_hook() {
    let mut host = host("Post");
    host.configure(|plugins| {
        plugins
            .plugin_default("backend", "key_value")
            .plugin_default("default", "untitled")
            .plugin("cache")
            .plugin("fallbacks");
    })
    .unwrap();

    let instance = host.instantiate(
        ["title"],
        Options::from([("fallbacks", json!({"de-CH": ["de", "en"]})), ("cache", json!(false))]),
    );
    let extensions = instance.extensions();

    assert_eq!(extensions.get(), Some(&BackendName("key_value".into())));
    assert_eq!(extensions.get(), Some(&DefaultValue(json!("untitled"))));
    assert_eq!(extensions.get(), Some(&CacheEnabled(false)));
    assert_eq!(
        extensions.get::<FallbackLocales>().unwrap().get("de-CH"),
        ["de", "en"]
    );
}

#[test]
fn reader_after_applied_backend_is_allowed_only_together() {
    let mut host = host("Post");
    host.configure(|plugins| {
        plugins.plugin_default("backend", "column");
    })
    .unwrap();

    let err = host
        .configure(|plugins| {
            plugins.plugin("reader");
        })
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "'reader' plugin must come after 'backend' plugin in Post"
    );

    let mut fresh = self::host("Comment");
    fresh
        .configure(|plugins| {
            plugins.plugin("reader").plugin_default("backend", "column");
        })
        .unwrap();
    assert_eq!(fresh.plugin_names(), ["backend", "reader"]);
}

#[test]
fn derived_host_adds_accessors_without_touching_parent() {
    let mut parent = host("Post");
    parent
        .configure(|plugins| {
            plugins.plugin("reader").plugin("backend");
        })
        .unwrap();

    let mut child = parent.derive("Article");
    child
        .configure(|plugins| {
            plugins.plugin("locale_accessors");
        })
        .unwrap();

    let mut article = Target::new("Article");
    child
        .instantiate(["title"], Options::from([("locale_accessors", json!(["en"]))]))
        .include_into(&mut article);

    let accessors = article.extensions().get::<Accessors>().unwrap();
    assert_eq!(accessors.readers, ["title"]);
    assert_eq!(accessors.locale_accessors, ["title_en"]);
    assert!(accessors.writers.is_empty());
    assert!(!parent.has_plugin("locale_accessors"));
}

#[test]
fn global_registry_serves_default_hosts() {
    static REGISTER: Once = Once::new();
    REGISTER.call_once(CorePlugins::register_global);

    let mut host = Host::new().named("Global");
    host.configure(|plugins| {
        plugins.plugin("presence");
    })
    .unwrap();

    assert_eq!(host.plugin_names(), ["presence", "backend"]);
    assert!(PluginRegistry::global().is_loaded("presence"));
}
