//! Topological ordering of a dependency graph.
//!
//! [`linearize`] runs Kahn's algorithm over a [`DependencyGraph`]. Among the
//! plugins whose predecessors have all been placed, the one added to the graph
//! earliest goes next, so the same graph always yields the same order.
//!
//! When plugins remain unplaced the graph has a cycle. Not every unplaced
//! plugin is on a cycle (some merely come after one), so the remainder is
//! split into strongly connected components and only plugins in components
//! with more than one member are reported.

use core::cmp::Reverse;
use core::fmt;
use std::collections::BinaryHeap;

use crate::graph::DependencyGraph;
use crate::plugin::Plugin;

/// The ordering requirements of a graph form at least one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError {
    members: Vec<Plugin>,
}

impl CycleError {
    /// Returns every plugin that lies on a cycle, in graph insertion order.
    #[must_use]
    pub fn members(&self) -> &[Plugin] {
        &self.members
    }

    /// Consumes the error, returning the cycle members.
    #[must_use]
    pub fn into_members(self) -> Vec<Plugin> {
        self.members
    }
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.members.iter().map(Plugin::name).collect();
        write!(f, "cyclic ordering between: {}", names.join(", "))
    }
}

impl core::error::Error for CycleError {}

/// Orders every node of `graph` so that each edge `A → B` places `A` first.
///
/// # Errors
///
/// Returns a [`CycleError`] naming the plugins on cycles if no such order
/// exists.
///
/// # Example
///
/// ```
/// use pluggable_system::graph::DependencyGraph;
/// use pluggable_system::linearize::linearize;
/// use pluggable_system::plugin::PluginBuilder;
///
/// let backend = PluginBuilder::new("backend").build().unwrap();
/// let cache = PluginBuilder::new("cache").build().unwrap();
///
/// let mut graph = DependencyGraph::new();
/// graph.add_edge(&backend, &cache);
///
/// assert_eq!(linearize(&graph).unwrap(), [backend, cache]);
/// ```
pub fn linearize(graph: &DependencyGraph) -> Result<Vec<Plugin>, CycleError> {
    let n = graph.len();
    let mut in_degree = vec![0usize; n];
    for position in 0..n {
        for &successor in graph.out_edges(position) {
            in_degree[successor] += 1;
        }
    }

    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, degree)| **degree == 0)
        .map(|(position, _)| Reverse(position))
        .collect();

    let mut sorted: Vec<usize> = Vec::with_capacity(n);
    while let Some(Reverse(position)) = ready.pop() {
        sorted.push(position);
        for &successor in graph.out_edges(position) {
            in_degree[successor] -= 1;
            if in_degree[successor] == 0 {
                ready.push(Reverse(successor));
            }
        }
    }

    if sorted.len() != n {
        let unplaced: Vec<bool> = in_degree.iter().map(|degree| *degree > 0).collect();
        let mut members: Vec<usize> = Tarjan::new(graph, &unplaced)
            .run()
            .into_iter()
            .filter(|component| component.len() > 1)
            .flatten()
            .collect();
        members.sort_unstable();
        let members: Vec<Plugin> = members
            .into_iter()
            .map(|position| graph.nodes()[position].clone())
            .collect();
        tracing::debug!(members = ?members, "dependency cycle detected");
        return Err(CycleError { members });
    }

    let order: Vec<Plugin> = sorted
        .into_iter()
        .map(|position| graph.nodes()[position].clone())
        .collect();
    tracing::debug!(order = ?order, "linearized plugins");
    Ok(order)
}

/// Tarjan's strongly connected components over the nodes marked in `scope`.
struct Tarjan<'g> {
    graph: &'g DependencyGraph,
    scope: &'g [bool],
    index: Vec<Option<usize>>,
    lowlink: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    next_index: usize,
    components: Vec<Vec<usize>>,
}

impl<'g> Tarjan<'g> {
    fn new(graph: &'g DependencyGraph, scope: &'g [bool]) -> Self {
        let n = graph.len();
        Self {
            graph,
            scope,
            index: vec![None; n],
            lowlink: vec![0; n],
            on_stack: vec![false; n],
            stack: Vec::new(),
            next_index: 0,
            components: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Vec<usize>> {
        for node in 0..self.graph.len() {
            if self.scope[node] && self.index[node].is_none() {
                self.connect(node);
            }
        }
        self.components
    }

    fn connect(&mut self, node: usize) {
        self.index[node] = Some(self.next_index);
        self.lowlink[node] = self.next_index;
        self.next_index += 1;
        self.stack.push(node);
        self.on_stack[node] = true;

        let graph = self.graph;
        for &successor in graph.out_edges(node) {
            if !self.scope[successor] {
                continue;
            }
            match self.index[successor] {
                None => {
                    self.connect(successor);
                    self.lowlink[node] = self.lowlink[node].min(self.lowlink[successor]);
                }
                Some(successor_index) if self.on_stack[successor] => {
                    self.lowlink[node] = self.lowlink[node].min(successor_index);
                }
                Some(_) => {}
            }
        }

        if Some(self.lowlink[node]) == self.index[node] {
            let mut component = Vec::new();
            while let Some(member) = self.stack.pop() {
                self.on_stack[member] = false;
                component.push(member);
                if member == node {
                    break;
                }
            }
            self.components.push(component);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::PluginBuilder;

    fn plugins(names: &[&str]) -> Vec<Plugin> {
        names
            .iter()
            .map(|name| PluginBuilder::new(*name).build().unwrap())
            .collect()
    }

    fn names(order: &[Plugin]) -> Vec<&str> {
        order.iter().map(Plugin::name).collect()
    }

    #[test]
    fn empty_graph_yields_empty_order() {
        assert!(linearize(&DependencyGraph::new()).unwrap().is_empty());
    }

    #[test]
    fn independent_nodes_keep_insertion_order() {
        let p = plugins(&["c", "a", "b"]);
        let mut graph = DependencyGraph::new();
        for plugin in &p {
            graph.add_node(plugin);
        }
        assert_eq!(names(&linearize(&graph).unwrap()), ["c", "a", "b"]);
    }

    #[test]
    fn edges_are_respected() {
        let p = plugins(&["writer", "reader", "backend"]);
        let mut graph = DependencyGraph::new();
        graph.add_edge(&p[2], &p[0]);
        graph.add_edge(&p[1], &p[0]);

        assert_eq!(
            names(&linearize(&graph).unwrap()),
            ["backend", "reader", "writer"]
        );
    }

    #[test]
    fn two_node_cycle_reports_both() {
        let p = plugins(&["x", "y"]);
        let mut graph = DependencyGraph::new();
        graph.add_edge(&p[0], &p[1]);
        graph.add_edge(&p[1], &p[0]);

        let err = linearize(&graph).unwrap_err();
        assert_eq!(names(err.members()), ["x", "y"]);
    }

    #[test]
    fn nodes_downstream_of_cycle_are_not_members() {
        let p = plugins(&["a", "b", "c", "tail"]);
        let mut graph = DependencyGraph::new();
        graph.add_edge(&p[0], &p[1]);
        graph.add_edge(&p[1], &p[2]);
        graph.add_edge(&p[2], &p[0]);
        graph.add_edge(&p[2], &p[3]);

        let err = linearize(&graph).unwrap_err();
        assert_eq!(names(err.members()), ["a", "b", "c"]);
        assert_eq!(err.to_string(), "cyclic ordering between: a, b, c");
    }

    #[test]
    fn separate_cycles_are_all_reported() {
        let p = plugins(&["a", "b", "ok", "c", "d"]);
        let mut graph = DependencyGraph::new();
        graph.add_edge(&p[0], &p[1]);
        graph.add_edge(&p[1], &p[0]);
        graph.add_node(&p[2]);
        graph.add_edge(&p[3], &p[4]);
        graph.add_edge(&p[4], &p[3]);

        let err = linearize(&graph).unwrap_err();
        assert_eq!(names(err.members()), ["a", "b", "c", "d"]);
    }
}
