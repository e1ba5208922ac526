// SPDX-License-Identifier: MIT OR Apache-2.0

//! A node's incoming constraints: the `Dep`s that parents (or the top-level request) have
//! placed on it, and the derived queries the solver folds over them.

use crate::errors::{Error, Result};
use crate::flag::FlatFlagList;
use crate::graph::Graph;
use crate::pdl::Dep;
use crate::version::VersionPredicate;

/// One constraint on a node: a `Dep`, optionally attributed to the parent package that placed
/// it (`None` for a top-level/global request).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub(crate) parent: Option<String>,
    pub(crate) value: Dep,
}

impl Constraint {
    /// A top-level constraint with no parent.
    pub fn unparented(value: Dep) -> Self {
        Constraint { parent: None, value }
    }

    /// A constraint attributed to `parent`.
    pub fn with_parent(parent: impl Into<String>, value: Dep) -> Self {
        Constraint {
            parent: Some(parent.into()),
            value,
        }
    }

    /// The parent package name, if any.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// The underlying dependency spec.
    pub fn value(&self) -> &Dep {
        &self.value
    }
}

/// The ordered, possibly-duplicated list of constraints placed on one node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Constraints(Vec<Constraint>);

impl Constraints {
    /// An empty constraint list.
    pub fn new() -> Self {
        Constraints(Vec::new())
    }

    /// Appends a constraint.
    pub fn add(&mut self, constraint: Constraint) {
        self.0.push(constraint);
    }

    /// True if some constraint here is attributed to `parent`.
    pub fn has_parent(&self, parent: &str) -> bool {
        self.0.iter().any(|c| c.parent.as_deref() == Some(parent))
    }

    /// Removes the (at most one) constraint attributed to `parent`, by swap-remove. Returns
    /// true if one was found and removed.
    pub fn remove_parent(&mut self, parent: &str) -> bool {
        if let Some(idx) = self.0.iter().position(|c| c.parent.as_deref() == Some(parent)) {
            self.0.swap_remove(idx);
            true
        } else {
            false
        }
    }

    /// Iterates constraints in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.0.iter()
    }

    /// True if there are no constraints at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// For each constraint whose `Condition` (if any) evaluates true against its parent's
    /// flat flags, resolves the parent's flags (empty if no parent, or the parent isn't
    /// enabled) and invokes `f(constraint, parent_flags)`.
    ///
    /// Fails with [`Error::ConditionWithoutParent`] if a constraint carries a `Condition` but
    /// has no parent, and with [`Error::MissingDependency`] if a constraint's parent name is
    /// not a node in `graph`.
    pub fn try_for_each<F>(&self, graph: &Graph, mut f: F) -> Result<()>
    where
        F: FnMut(&Constraint, &FlatFlagList) -> Result<()>,
    {
        for constraint in &self.0 {
            let parent_flags = match &constraint.parent {
                Some(parent) => match graph.node(parent) {
                    Some(node) => match node.pkginfo() {
                        Some(pkginfo) => pkginfo.flag_states.clone(),
                        None => FlatFlagList::new(),
                    },
                    None => {
                        return Err(Error::MissingDependency {
                            name: parent.clone(),
                        })
                    }
                },
                None => FlatFlagList::new(),
            };

            if let Some(condition) = &constraint.value.condition {
                if constraint.parent.is_none() {
                    return Err(Error::ConditionWithoutParent {
                        name: constraint.value.name.clone(),
                    });
                }
                if !condition.evaluate(&parent_flags) {
                    continue;
                }
            }

            f(constraint, &parent_flags)?;
        }
        Ok(())
    }

    /// Folds every active constraint's requested flags (flattened against its parent's flags)
    /// into one merged [`FlatFlagList`]. Fails with [`Error::ConflictingFlags`] if two active
    /// constraints disagree.
    pub fn flags(&self, graph: &Graph) -> Result<FlatFlagList> {
        let mut total = FlatFlagList::new();
        self.try_for_each(graph, |constraint, parent_flags| {
            if let Some(flags) = &constraint.value.flags {
                let flat = flags.with_defaults(parent_flags)?;
                total.merge(&flat)?;
            }
            Ok(())
        })?;
        Ok(total)
    }

    /// Every version predicate carried by an active constraint.
    pub fn versions(&self, graph: &Graph) -> Result<Vec<VersionPredicate>> {
        let mut out = Vec::new();
        self.try_for_each(graph, |constraint, _| {
            if let Some(v) = &constraint.value.version1 {
                out.push(v.clone());
            }
            if let Some(v) = &constraint.value.version2 {
                out.push(v.clone());
            }
            Ok(())
        })?;
        Ok(out)
    }

    /// True iff at least one constraint is unconditional, or some parented constraint's
    /// condition evaluates true against that parent's flags. A node with no constraints at
    /// all is not enabled — it was never requested by anything.
    pub fn any_enabled(&self, graph: &Graph) -> Result<bool> {
        for constraint in &self.0 {
            let Some(condition) = &constraint.value.condition else {
                return Ok(true);
            };
            let parent_flags = match &constraint.parent {
                Some(parent) => graph
                    .node(parent)
                    .and_then(|n| n.pkginfo())
                    .map(|p| p.flag_states.clone())
                    .unwrap_or_default(),
                None => FlatFlagList::new(),
            };
            if condition.evaluate(&parent_flags) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// The canonical rendering of `flags(graph)` — a fingerprint of current flag demand, used
    /// by [`crate::graph::Graph::crunch`] to detect whether a node's binding needs refreshing.
    pub fn hash(&self, graph: &Graph) -> Result<String> {
        Ok(self.flags(graph)?.to_string())
    }
}
