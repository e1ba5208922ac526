// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `crunch` fixed-point solver: repeatedly walks the graph propagating parent constraints
//! and re-binding nodes whose flag demand changed, until nothing changes or a repeated graph
//! hash proves it never will.

use std::collections::HashSet;
use std::sync::Arc;

use crate::control::Control;
use crate::errors::{Error, Result};
use crate::graph::constraint::Constraint;
use crate::graph::node::InstallType;
use crate::graph::Graph;
use crate::pkginfo::PkgInfo;
use crate::repo::{Entry, InstalledEntry};
use crate::version::{Operator, Version, VersionPredicate};

/// True unless `predicates`, taken together, rule out every version in the abstract — two
/// disagreeing `==` predicates, or an upper bound below a lower bound. This is independent of
/// what any repository actually has on offer; a repository simply lacking a matching
/// candidate is [`Error::NoAcceptableVersion`], not this.
fn versions_satisfiable(predicates: &[VersionPredicate]) -> bool {
    let mut lower: Option<&Version> = None;
    let mut upper: Option<&Version> = None;
    let mut equal: Option<&Version> = None;

    for predicate in predicates {
        match predicate.operator {
            Operator::Equal => match equal {
                Some(existing) if existing != &predicate.version => return false,
                _ => equal = Some(&predicate.version),
            },
            Operator::GreaterOrEqual => {
                if lower.map_or(true, |l| &predicate.version > l) {
                    lower = Some(&predicate.version);
                }
            }
            Operator::LessOrEqual => {
                if upper.map_or(true, |u| &predicate.version < u) {
                    upper = Some(&predicate.version);
                }
            }
        }
    }

    if let Some(equal) = equal {
        if lower.is_some_and(|l| equal < l) || upper.is_some_and(|u| equal > u) {
            return false;
        }
    }
    if let (Some(lower), Some(upper)) = (lower, upper) {
        if lower > upper {
            return false;
        }
    }
    true
}

impl Graph {
    /// Runs crunch to a fixed point: every enabled node ends up bound to a control/pkginfo
    /// consistent with every other node's current flag demand.
    ///
    /// Fails with [`Error::ResolverDidNotConverge`] if the graph's overall hash repeats without
    /// settling — a sign that two or more nodes are oscillating between bindings.
    pub fn crunch(&mut self) -> Result<()> {
        let mut seen = HashSet::new();
        self.crunch_iteration(&mut seen)
    }

    fn crunch_iteration(&mut self, seen: &mut HashSet<String>) -> Result<()> {
        let overall = self.hash()?;
        if !seen.insert(overall) {
            return Err(Error::ResolverDidNotConverge);
        }

        let names: Vec<String> = self.ordered.iter().map(|n| n.name.clone()).collect();

        let mut last_hash = Vec::with_capacity(names.len());
        for name in &names {
            last_hash.push(self.node_hash(name)?);
        }

        for name in &names {
            self.handle(name, &mut HashSet::new())?;
        }

        for (name, before) in names.iter().zip(last_hash.iter()) {
            if self.node_hash(name)? != *before {
                self.apply_changes(name)?;
                for other in &names {
                    if other != name {
                        let idx = self.index_of(other)?;
                        self.ordered[idx].rdeps.remove_parent(name);
                    }
                }
                self.handle(name, &mut HashSet::new())?;
            }
        }

        for (name, before) in names.iter().zip(last_hash.iter()) {
            if self.node_hash(name)? != *before {
                return self.crunch_iteration(seen);
            }
        }

        Ok(())
    }

    fn node_hash(&self, name: &str) -> Result<String> {
        let idx = self.index_of(name)?;
        let rdeps = self.ordered[idx].rdeps.clone();
        rdeps.hash(self)
    }

    /// Visits `name`: if its constraints are currently enabled and it hasn't been bound yet,
    /// binds it; then propagates one constraint onto each of its controlled dependencies and
    /// recurses into them. `in_path` guards against dependency cycles within a single visit.
    fn handle(&mut self, name: &str, in_path: &mut HashSet<String>) -> Result<()> {
        let idx = self.index_of(name)?;
        let rdeps = self.ordered[idx].rdeps.clone();
        if !rdeps.any_enabled(self)? {
            return Ok(());
        }
        if in_path.contains(name) {
            return Ok(());
        }

        if self.ordered[idx].control.is_none() {
            self.apply_changes(name)?;
        }

        in_path.insert(name.to_string());

        let deps: Vec<crate::pdl::Dep> = self.ordered[idx]
            .control
            .as_ref()
            .map(|control| control.deps.clone())
            .unwrap_or_default();

        for dep in deps {
            if self.index.get(&dep.name).is_none() {
                in_path.remove(name);
                return Err(Error::MissingDependency { name: dep.name });
            }
            self.add_parent_constraint(&dep.name, name, dep)?;
            self.handle(&dep.name.clone(), in_path)?;
        }

        in_path.remove(name);
        Ok(())
    }

    /// Records that `parent` places `dep` on `name`, unless `name == parent` — a package never
    /// constrains itself, regardless of what its own dependency list happens to say.
    fn add_parent_constraint(&mut self, name: &str, parent: &str, dep: crate::pdl::Dep) -> Result<()> {
        if name == parent {
            return Ok(());
        }
        let idx = self.index_of(name)?;
        if !self.ordered[idx].rdeps.has_parent(parent) {
            self.ordered[idx].rdeps.add(Constraint::with_parent(parent, dep));
        }
        Ok(())
    }

    /// Recomputes `name`'s binding from its current constraints: folds the flag demand and
    /// version predicates across active constraints, then walks the install-type ladder from
    /// the node's current floor, accepting the first convenient match or the best bin/src
    /// candidate at each successive tier.
    fn apply_changes(&mut self, name: &str) -> Result<()> {
        let idx = self.index_of(name)?;
        let rdeps = self.ordered[idx].rdeps.clone();
        let versions = rdeps.versions(self)?;
        if !versions_satisfiable(&versions) {
            return Err(Error::ConflictingVersions { name: name.to_string() });
        }
        let flags = rdeps.flags(self)?;
        let floor = self.ordered[idx].install_type;

        let accepts = |control: &Control| versions.iter().all(|v| v.accepts(&control.version));
        let better = |a: &Control, b: &Control| (&a.version, a.iteration) > (&b.version, b.iteration);

        let entries: Vec<Entry> = self.repo.map(name);
        let installed: Vec<InstalledEntry> = self.repo.map_installed(&self.root, name);

        for tier in floor.ladder_from() {
            match tier {
                InstallType::Convenient => {
                    for inst in &installed {
                        if accepts(&inst.control) && flags.is_subset_of(&inst.pkginfo.flag_states) {
                            self.bind(idx, inst.control.clone(), inst.pkginfo.clone(), true, true, tier);
                            return Ok(());
                        }
                    }
                }
                InstallType::LatestBin => {
                    let mut best: Option<(&Control, &PkgInfo)> = None;
                    for entry in &entries {
                        if !accepts(&entry.control) {
                            continue;
                        }
                        for pkginfo in &entry.available {
                            if !flags.is_subset_of(&pkginfo.flag_states) {
                                continue;
                            }
                            if best.map_or(true, |(bc, _)| better(&entry.control, bc)) {
                                best = Some((&entry.control, pkginfo));
                            }
                        }
                    }
                    if let Some((control, pkginfo)) = best {
                        let control = control.clone();
                        let pkginfo = pkginfo.clone();
                        self.bind(idx, control, pkginfo, false, true, tier);
                        return Ok(());
                    }
                }
                InstallType::LatestSrc => {
                    let mut best: Option<&Control> = None;
                    for entry in &entries {
                        if entry.template.is_some()
                            && accepts(&entry.control)
                            && best.map_or(true, |bc| better(&entry.control, bc))
                        {
                            best = Some(&entry.control);
                        }
                    }
                    if let Some(control) = best {
                        let control = control.clone();
                        let mut pkginfo = PkgInfo::from_control(&control);
                        pkginfo.set_flag_states(&flags)?;
                        self.bind(idx, control, pkginfo, false, false, tier);
                        return Ok(());
                    }
                }
            }
        }

        Err(Error::NoAcceptableVersion { name: name.to_string() })
    }

    fn bind(
        &mut self,
        idx: usize,
        control: Control,
        pkginfo: PkgInfo,
        is_installed: bool,
        is_bin: bool,
        tier: InstallType,
    ) {
        let node = &mut self.ordered[idx];
        node.control = Some(Arc::new(control));
        node.pkginfo = Some(Arc::new(pkginfo));
        node.is_installed = is_installed;
        node.is_bin = is_bin;
        node.changed = true;
        node.set_install_type(tier);
    }
}
