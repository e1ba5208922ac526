// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only diagnostic views over a solved [`Graph`]. Never consulted by `crunch` itself —
//! these exist purely so a caller (or a test) can inspect what was decided.

use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

use crate::graph::Graph;

/// One bound node, as exposed in a [`Graph::dependency_graph`] export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyNode {
    /// The package name.
    pub name: String,
    /// The id of the bound pkginfo, if this node was bound.
    pub pkginfo_id: Option<String>,
}

impl Graph {
    /// Exports every *bound* node and the edges implied by its parent-attributed constraints,
    /// as a directed graph pointing from dependent to dependency. Unbound (disabled) nodes are
    /// omitted.
    pub fn dependency_graph(&self) -> DiGraph<DependencyNode, ()> {
        let mut dg = DiGraph::new();
        let mut indices: HashMap<&str, NodeIndex> = HashMap::new();

        for node in self.nodes() {
            if node.pkginfo().is_none() {
                continue;
            }
            let idx = dg.add_node(DependencyNode {
                name: node.name().to_string(),
                pkginfo_id: node.pkginfo().map(|p| p.id()),
            });
            indices.insert(node.name(), idx);
        }

        for node in self.nodes() {
            let Some(&from) = indices.get(node.name()) else {
                continue;
            };
            for constraint in node.rdeps().iter() {
                if let Some(parent) = constraint.parent() {
                    if let Some(&to) = indices.get(parent) {
                        // Edge points from the dependent (parent) to its dependency (this node).
                        dg.update_edge(to, from, ());
                    }
                }
            }
        }

        dg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::Control;
    use crate::pdl::Dep;
    use crate::repo::{Entry, InMemoryRepository};
    use crate::version::Version;
    use std::sync::Arc;

    fn control(name: &str, deps: Vec<Dep>) -> Control {
        Control {
            name: name.into(),
            version: Version::parse("1.0"),
            iteration: 0,
            description: String::new(),
            url: String::new(),
            src: vec![],
            arch: vec![],
            bdeps: vec![],
            deps,
            flags: vec![],
        }
    }

    fn entry_with_template(name: &str, deps: Vec<Dep>) -> Entry {
        let mut e = Entry::new(control(name, deps));
        e.template = Some(std::path::PathBuf::from(format!("/templates/{}", name)));
        e
    }

    #[test]
    fn export_contains_only_bound_nodes_and_their_edges() {
        let mut repo = InMemoryRepository::new();
        repo.add_entry(entry_with_template("app", vec![Dep::named("libfoo")]));
        repo.add_entry(entry_with_template("libfoo", vec![]));
        repo.add_entry(entry_with_template("unused", vec![]));
        let mut graph = Graph::new("/root", Arc::new(repo)).unwrap();
        graph.enable_package(Dep::named("app"));
        graph.crunch().unwrap();

        let dg = graph.dependency_graph();
        assert_eq!(dg.node_count(), 2);
        assert_eq!(dg.edge_count(), 1);
    }
}
