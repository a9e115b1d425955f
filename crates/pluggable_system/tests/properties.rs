//! Property tests over randomly generated plugin sets.
//!
//! Plugins `p00..pNN` are declared with random links between every pair
//! `i < j`. Every ordering link points from the lower to the higher index, so
//! the generated sets are acyclic. `closing_link_makes_cycle` adds one link
//! pointing back to force a cycle.


use std::sync::Arc;

use pluggable_system::prelude::*;
use proptest::prelude::*;
use test_utils::assert_precedes;

/// How plugin `i` relates to plugin `j` for `i < j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    Unrelated,
    /// `j` depends on `i` with `after`.
    Follows,
    /// `i` depends on `j` with `before`.
    Precedes,
    /// `j` depends on `i` with no ordering.
    Requires,
}

fn link() -> impl Strategy<Value = Link> {
    prop_oneof![
        2 => Just(Link::Unrelated),
        1 => Just(Link::Follows),
        1 => Just(Link::Precedes),
        1 => Just(Link::Requires),
    ]
}

fn name(i: usize) -> String {
    format!("p{i:02}")
}

/// A plugin set: `(count, links by pair, requested mask)`.
fn plugin_set() -> impl Strategy<Value = (usize, Vec<(usize, usize, Link)>, Vec<bool>)> {
    (2usize..9).prop_flat_map(|n| {
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .collect();
        let count = pairs.len();
        (
            Just(n),
            prop::collection::vec(link(), count).prop_map(move |links| {
                pairs
                    .iter()
                    .zip(links)
                    .map(|(&(i, j), link)| (i, j, link))
                    .collect::<Vec<_>>()
            }),
            prop::collection::vec(any::<bool>(), n),
        )
    })
}

fn registry(n: usize, links: &[(usize, usize, Link)]) -> Arc<PluginRegistry> {
    let mut deps: Vec<Vec<(String, DependencyOrder)>> = vec![Vec::new(); n];
    for &(i, j, link) in links {
        match link {
            Link::Unrelated => {}
            Link::Follows => deps[j].push((name(i), DependencyOrder::After)),
            Link::Precedes => deps[i].push((name(j), DependencyOrder::Before)),
            Link::Requires => deps[j].push((name(i), DependencyOrder::None)),
        }
    }

    let registry = Arc::new(PluginRegistry::new());
    for (i, declared) in deps.into_iter().enumerate() {
        let mut builder = PluginBuilder::new(name(i));
        for (dependency, order) in declared {
            builder = builder.depends_on(dependency, order);
        }
        registry.register(builder.build().unwrap());
    }
    registry
}

fn requested(mask: &[bool]) -> Vec<String> {
    mask.iter()
        .enumerate()
        .filter(|(_, requested)| **requested)
        .map(|(i, _)| name(i))
        .collect()
}

fn configure_host(registry: Arc<PluginRegistry>, names: &[String]) -> Result<Host, ResolveError> {
    let mut host = Host::with_registry(registry);
    host.configure(|plugins| {
        for name in names {
            plugins.plugin(name.as_str());
        }
    })?;
    Ok(host)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn acyclic_sets_resolve_soundly((n, links, mask) in plugin_set()) {
        let names = requested(&mask);
        let host = configure_host(registry(n, &links), &names).unwrap();
        let order = host.plugin_names();

        for name in &names {
            prop_assert!(host.has_plugin(name));
        }
        for &(i, j, link) in &links {
            let (low, high) = (name(i), name(j));
            match link {
                Link::Follows | Link::Precedes => {
                    if host.has_plugin(&low) && host.has_plugin(&high) {
                        assert_precedes(&order, &low, &high);
                    }
                }
                Link::Requires | Link::Unrelated => {}
            }
            let closure_holds = match link {
                Link::Follows | Link::Requires => !host.has_plugin(&high) || host.has_plugin(&low),
                Link::Precedes => !host.has_plugin(&low) || host.has_plugin(&high),
                Link::Unrelated => true,
            };
            prop_assert!(closure_holds, "{link:?} between {low} and {high} not loaded in {order:?}");
        }
    }

    #[test]
    fn request_order_does_not_matter((n, links, mask) in plugin_set()) {
        let names = requested(&mask);
        let reversed: Vec<String> = names.iter().rev().cloned().collect();

        let first = configure_host(registry(n, &links), &names).unwrap();
        let second = configure_host(registry(n, &links), &reversed).unwrap();

        prop_assert_eq!(first.plugin_names(), second.plugin_names());
    }

    #[test]
    fn split_requests_layer_new_plugins_ahead((n, links, mask) in plugin_set(), split in 0usize..9) {
        let names = requested(&mask);
        let split = split.min(names.len());
        let mut host = Host::with_registry(registry(n, &links));

        let result = host.configure(|plugins| {
            for name in &names[..split] {
                plugins.plugin(name.as_str());
            }
        });
        prop_assert!(result.is_ok());
        let earlier: Vec<String> = host.plugin_names().iter().map(|n| n.to_string()).collect();

        let full = host
            .configure(|plugins| {
                for name in &names {
                    plugins.plugin(name.as_str());
                }
            })
            .map(|_| ());
        match full {
            Ok(()) => {
                let order = host.plugin_names();
                prop_assert_eq!(&order[order.len() - earlier.len()..], earlier.as_slice());
                for name in &names {
                    prop_assert!(host.has_plugin(name));
                }
                for &(i, j, link) in &links {
                    let (low, high) = (name(i), name(j));
                    let ordered = matches!(link, Link::Follows | Link::Precedes);
                    if ordered && host.has_plugin(&low) && host.has_plugin(&high) {
                        assert_precedes(&order, &low, &high);
                    }
                }
            }
            Err(err) => {
                prop_assert!(err.is_dependency_conflict() && !err.is_cycle());
                let current: Vec<String> = host.plugin_names().iter().map(|n| n.to_string()).collect();
                prop_assert_eq!(current, earlier);
            }
        }
    }

    #[test]
    fn closing_link_makes_cycle(n in 2usize..9) {
        let mut links: Vec<(usize, usize, Link)> =
            (1..n).map(|j| (j - 1, j, Link::Follows)).collect();
        let open = registry(n, &links);
        links.push((n - 1, 0, Link::Follows));
        let closed = registry(n, &links);

        prop_assert!(configure_host(open, &[name(0)]).is_ok());

        let err = configure_host(closed, &[name(0)]).unwrap_err();
        let expected: Vec<String> = (0..n).map(name).collect();
        prop_assert!(err.is_cycle());
        prop_assert_eq!(
            err.conflict().unwrap().plugins(),
            expected.iter().map(String::as_str).collect::<Vec<_>>()
        );
    }
}
