// SPDX-License-Identifier: MIT OR Apache-2.0

//! The package graph: one [`Node`] per known package name, plus the `crunch` fixed-point
//! solver that assigns each enabled node a concrete binding.
//!
//! Nodes never hold owning links to one another — each constraint records a parent *name*,
//! looked up through the graph by index. This keeps `clone` a flat, cheap copy (no `Rc`/
//! `RefCell` graph of nodes to untangle) and avoids any ownership cycle between dependents and
//! their dependencies.

mod crunch;
pub mod diagnostics;

pub mod constraint;
pub mod node;

pub use constraint::{Constraint, Constraints};
pub use node::{InstallType, Node};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::constraint_config;
use crate::errors::{Error, Result};
use crate::pdl::Dep;
use crate::repo::PackageRepository;

/// The package graph itself: every known name is a node, created once at construction and
/// never removed; only the value each node is bound to changes as `crunch` iterates.
#[derive(Clone)]
pub struct Graph {
    root: PathBuf,
    repo: Arc<dyn PackageRepository>,
    ordered: Vec<Node>,
    index: HashMap<String, usize>,
}

impl Graph {
    /// Builds a graph with one (unconstrained, disabled) node per name the repository knows
    /// about.
    pub fn new(root: impl Into<PathBuf>, repo: Arc<dyn PackageRepository>) -> Result<Self> {
        let root = root.into();
        let mut ordered = Vec::new();
        let mut index = HashMap::new();

        for name in repo.all_names() {
            if index.contains_key(&name) {
                return Err(Error::ConstraintConfig {
                    path: PathBuf::new(),
                    reason: format!("duplicate package name '{}' in repository façade", name),
                });
            }
            index.insert(name.clone(), ordered.len());
            ordered.push(Node::new(name));
        }

        let mut graph = Graph {
            root,
            repo,
            ordered,
            index,
        };
        graph.inject_global_constraints()?;
        Ok(graph)
    }

    /// Loads this root's global constraint configuration and adds each entry as an anonymous
    /// constraint on its matching node, skipping (with a warning) any constraint referencing
    /// a flag no candidate control for that package declares.
    fn inject_global_constraints(&mut self) -> Result<()> {
        let globals = constraint_config::load(&self.root)?;
        for dep in globals.values() {
            if self.references_unknown_flag(dep) {
                log::warn!(
                    "ignoring global constraint on '{}': references a flag no known control declares",
                    dep.name
                );
                continue;
            }
            self.enable_package(dep.clone());
        }
        Ok(())
    }

    fn references_unknown_flag(&self, dep: &Dep) -> bool {
        let requested = match &dep.flags {
            Some(flags) => flags,
            None => return false,
        };
        let declared: std::collections::HashSet<String> = self
            .repo
            .map(&dep.name)
            .iter()
            .flat_map(|entry| entry.control.flags.iter().map(|decl| decl.default.name.clone()))
            .collect();
        requested.iter().any(|flag| !declared.contains(&flag.name))
    }

    /// The filesystem root this graph resolves installed packages against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Looks up a node by name.
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.index.get(name).map(|&idx| &self.ordered[idx])
    }

    /// Looks up a node by name, mutably.
    pub fn node_mut(&mut self, name: &str) -> Option<&mut Node> {
        match self.index.get(name).copied() {
            Some(idx) => Some(&mut self.ordered[idx]),
            None => None,
        }
    }

    /// True if a prebuilt artifact exists for `pkginfo` in the backing repository.
    pub fn has_binary(&self, pkginfo: &crate::pkginfo::PkgInfo) -> bool {
        self.repo.has_binary(pkginfo)
    }

    /// Every node, in construction order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.ordered.iter()
    }

    /// Adds `dep` as a top-level (parent-less) constraint on the node named `dep.name`.
    /// Returns `false` if no such node exists in this graph.
    pub fn enable_package(&mut self, dep: Dep) -> bool {
        match self.index.get(&dep.name).copied() {
            Some(idx) => {
                self.ordered[idx].rdeps.add(Constraint::unparented(dep));
                true
            }
            None => false,
        }
    }

    /// Returns a copy of this graph re-rooted at `new_root`, for solving a forge's own
    /// build-dependency sub-graph against a fresh filesystem root.
    pub fn rerooted(&self, new_root: impl Into<PathBuf>) -> Self {
        let mut g = self.clone();
        g.root = new_root.into();
        g
    }

    pub(crate) fn index_of(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| Error::MissingDependency { name: name.to_string() })
    }

    /// A fingerprint of the entire graph's current flag demand: each node's name paired with
    /// its constraint-list hash. Changes if and only if some node's flag demand has changed —
    /// this is what makes it a valid crunch convergence test.
    pub fn hash(&self) -> Result<String> {
        let mut parts = Vec::with_capacity(self.ordered.len());
        for node in &self.ordered {
            parts.push(format!("{}={}", node.name, node.rdeps.hash(self)?));
        }
        Ok(parts.join("\n"))
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("root", &self.root)
            .field("nodes", &self.ordered.len())
            .finish()
    }
}
