// SPDX-License-Identifier: MIT OR Apache-2.0

//! A dependency-resolution engine for a source-and-binary Linux package manager.
//!
//! This crate parses a small package dependency language (PDL), tracks packages and their
//! declared flags in a [`graph::Graph`], and resolves a consistent set of bindings through a
//! fixed-point constraint-propagation solver (`crunch`). On top of a solved graph,
//! [`forge::partition`] and [`forge::forge`] split enabled packages into prebuilt ("wield") and
//! from-source ("forge") sets, recursively resolving each forge's own build-dependency
//! sub-graph.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use crucible_resolve::{Control, Dep, Entry, Graph, InMemoryRepository, Version};
//!
//! let mut repo = InMemoryRepository::new();
//! let mut zlib = Entry::new(Control {
//!     name: "zlib".into(),
//!     version: Version::parse("1.2.11"),
//!     iteration: 0,
//!     description: "compression library".into(),
//!     url: String::new(),
//!     src: vec![],
//!     arch: vec![],
//!     bdeps: vec![],
//!     deps: vec![],
//!     flags: vec![],
//! });
//! zlib.template = Some("/templates/zlib".into());
//! repo.add_entry(zlib);
//!
//! let mut graph = Graph::new("/", Arc::new(repo)).unwrap();
//! graph.enable_package(Dep::named("zlib"));
//! graph.crunch().unwrap();
//!
//! assert!(graph.node("zlib").unwrap().pkginfo().is_some());
//! ```
//!
//! See the crate's `demos/` directory for more runnable examples.

#![warn(missing_docs)]

pub mod constraint_config;
pub mod control;
mod cursor;
pub mod errors;
pub mod flag;
pub mod forge;
pub mod graph;
pub mod pdl;
pub mod pkginfo;
pub mod repo;
pub mod version;

pub use control::{Control, FlagDecl};
pub use errors::{Error, ParseError, Result};
pub use flag::{Flag, FlagExpr, FlagList, FlagState, FlatFlag, FlatFlagList, Op};
pub use forge::{forge, partition, ForgePlan, Partition};
pub use graph::{Constraint, Constraints, Graph, InstallType, Node};
pub use pdl::Dep;
pub use pkginfo::PkgInfo;
pub use repo::{merge_entries, Entry, InMemoryRepository, InstalledEntry, PackageRepository};
pub use version::{Operator, Version, VersionPredicate};
