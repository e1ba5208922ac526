// SPDX-License-Identifier: MIT OR Apache-2.0

//! A single package slot in the graph: its incoming constraints and, once resolved, its
//! chosen control/pkginfo binding.

use std::sync::Arc;

use crate::control::Control;
use crate::graph::constraint::Constraints;
use crate::pkginfo::PkgInfo;

/// How a node's binding was obtained, in increasing order of commitment. Monotonic: once
/// raised via [`Node::set_install_type`], a node's type never drops back down, which is what
/// keeps crunch's repeated re-binding from oscillating between tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InstallType {
    /// Satisfied by an already-installed instance.
    Convenient,
    /// Satisfied by a prebuilt artifact fetched from a repository.
    LatestBin,
    /// Must be built from source.
    LatestSrc,
}

impl InstallType {
    /// All tiers from `self` up to [`InstallType::LatestSrc`], in walk order.
    pub fn ladder_from(self) -> impl Iterator<Item = InstallType> {
        [InstallType::Convenient, InstallType::LatestBin, InstallType::LatestSrc]
            .into_iter()
            .filter(move |t| *t >= self)
    }
}

/// A single node in the package graph: a name, its incoming constraints, and (once resolved)
/// the control/pkginfo it's currently bound to.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) rdeps: Constraints,
    pub(crate) changed: bool,
    pub(crate) control: Option<Arc<Control>>,
    pub(crate) pkginfo: Option<Arc<PkgInfo>>,
    pub(crate) install_type: InstallType,
    pub(crate) is_installed: bool,
    pub(crate) is_bin: bool,
}

impl Node {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Node {
            name: name.into(),
            rdeps: Constraints::new(),
            changed: false,
            control: None,
            pkginfo: None,
            install_type: InstallType::Convenient,
            is_installed: false,
            is_bin: false,
        }
    }

    /// This node's package name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if this node's binding changed during the current crunch iteration and has not
    /// yet been settled by the prune-and-replay pass.
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// The resolved control, if this node has been bound yet.
    pub fn control(&self) -> Option<&Control> {
        self.control.as_deref()
    }

    /// The resolved pkginfo, if this node has been bound yet.
    pub fn pkginfo(&self) -> Option<&PkgInfo> {
        self.pkginfo.as_deref()
    }

    /// The install tier this node is currently bound at.
    pub fn install_type(&self) -> InstallType {
        self.install_type
    }

    /// True if the bound instance is already installed.
    pub fn is_installed(&self) -> bool {
        self.is_installed
    }

    /// True if the bound instance is (or will be) installed from a prebuilt artifact rather
    /// than built from source.
    pub fn is_bin(&self) -> bool {
        self.is_bin
    }

    /// Raises this node's install tier; never lowers it.
    pub fn set_install_type(&mut self, t: InstallType) {
        self.install_type = self.install_type.max(t);
    }

    /// This node's incoming constraints.
    pub fn rdeps(&self) -> &Constraints {
        &self.rdeps
    }
}
