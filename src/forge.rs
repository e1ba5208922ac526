// SPDX-License-Identifier: MIT OR Apache-2.0

//! The forge/wield orchestrator: given a solved [`Graph`], partitions enabled nodes into
//! "install prebuilt" and "build from source" sets, and recursively solves each forge's own
//! build-dependency sub-graph.

use std::collections::HashMap;

use log::debug;

use crate::errors::{Error, Result};
use crate::graph::node::InstallType;
use crate::graph::Graph;
use crate::pdl::Dep;

/// The result of partitioning one solved graph's enabled nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// Enabled nodes with no prebuilt artifact: must be built from source.
    pub to_forge: Vec<String>,
    /// Enabled nodes with a prebuilt artifact not yet installed: fetch and install as-is.
    pub to_wield: Vec<String>,
}

/// Splits `graph`'s enabled (bound) nodes into `to_forge`/`to_wield`, per the rule:
/// `to_wield = enabled ∧ has_binary ∧ ¬is_installed`, `to_forge = enabled ∧ ¬has_binary`.
pub fn partition(graph: &Graph) -> Partition {
    let mut result = Partition::default();
    for node in graph.nodes() {
        let Some(pkginfo) = node.pkginfo() else {
            continue;
        };
        if node.is_installed() {
            continue;
        }
        if graph.has_binary(pkginfo) {
            result.to_wield.push(node.name().to_string());
        } else {
            result.to_forge.push(node.name().to_string());
        }
    }
    result
}

/// One forge's resolved build plan: what it wields directly, and the further source builds its
/// own build-dependencies require.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForgePlan {
    /// The package being forged.
    pub name: String,
    /// Packages this forge's build-dependency sub-graph wields as prebuilt.
    pub wield: Vec<String>,
    /// Further forges this one's build-dependencies require, recursively resolved.
    pub sub_forges: Vec<ForgePlan>,
}

#[derive(Debug, Clone)]
enum CycleState {
    InProgress,
    Done(ForgePlan),
}

/// Resolves the full forge plan for `target` within `graph`: builds a fresh build-dependency
/// sub-graph re-rooted at a temporary location, seeds it with the target's `Bdeps` (filtered by
/// `Condition` under the target's own flag states) plus `seed`, crunches it, and recurses into
/// whatever further forges that sub-graph itself demands.
///
/// Fails with [`Error::SelfBuildingDependency`] if a forge, directly or transitively, requires
/// building itself again to produce its own build-dependencies.
pub fn forge(graph: &Graph, target: &str, seed: &[Dep]) -> Result<ForgePlan> {
    let mut table = HashMap::new();
    forge_recursive(graph, target, seed, &mut table)
}

fn forge_recursive(
    graph: &Graph,
    target: &str,
    seed: &[Dep],
    table: &mut HashMap<String, CycleState>,
) -> Result<ForgePlan> {
    let node = graph
        .node(target)
        .ok_or_else(|| Error::MissingDependency { name: target.to_string() })?;
    let control = node
        .control()
        .ok_or_else(|| Error::NoAcceptableVersion { name: target.to_string() })?;
    let pkginfo = node
        .pkginfo()
        .ok_or_else(|| Error::NoAcceptableVersion { name: target.to_string() })?;

    let key = pkginfo.id();
    match table.get(&key) {
        Some(CycleState::InProgress) => {
            return Err(Error::SelfBuildingDependency { name: target.to_string() });
        }
        Some(CycleState::Done(plan)) => return Ok(plan.clone()),
        None => {}
    }
    table.insert(key.clone(), CycleState::InProgress);

    debug!("forging {}: building build-dependency sub-graph", target);

    let sub_root = graph.root().join("forge").join(target);
    let mut sub = graph.rerooted(sub_root);

    for dep in &control.bdeps {
        if let Some(condition) = &dep.condition {
            if !condition.evaluate(&pkginfo.flag_states) {
                continue;
            }
        }
        if dep.name == target {
            return Err(Error::SelfBuildingDependency { name: target.to_string() });
        }
        sub.enable_package(dep.clone());
    }

    for dep in seed {
        let name = dep.name.clone();
        sub.enable_package(dep.clone());
        if let Some(seed_node) = sub.node_mut(&name) {
            seed_node.set_install_type(InstallType::LatestBin);
        }
    }

    sub.crunch()?;

    let Partition { mut to_forge, mut to_wield } = partition(&sub);
    // The target itself is the thing being built, not one of its own build-dependencies; it
    // can appear "enabled" here only because the sub-graph is cloned from a parent where it was
    // already bound.
    to_forge.retain(|name| name != target);
    to_wield.retain(|name| name != target);

    let mut sub_forges = Vec::with_capacity(to_forge.len());
    for name in &to_forge {
        sub_forges.push(forge_recursive(&sub, name, seed, table)?);
    }

    let plan = ForgePlan {
        name: target.to_string(),
        wield: to_wield,
        sub_forges,
    };
    table.insert(key, CycleState::Done(plan.clone()));
    Ok(plan)
}
