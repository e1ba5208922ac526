// SPDX-License-Identifier: MIT OR Apache-2.0

//! The repository façade: a read-only capability set the solver consumes, implemented by
//! whatever backing store a caller has (on-disk templates, a remote index, tests' fixtures).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::warn;

use crate::control::Control;
use crate::pkginfo::PkgInfo;

/// One candidate binding for a package name: its declaration plus whatever's available to
/// install without building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The package's declaration.
    pub control: Control,
    /// Path to the build template backing this control, if any.
    pub template: Option<PathBuf>,
    /// Prebuilt instances available for fetch.
    pub available: Vec<PkgInfo>,
}

impl Entry {
    /// A bare entry with no template and nothing prebuilt.
    pub fn new(control: Control) -> Self {
        Entry {
            control,
            template: None,
            available: Vec::new(),
        }
    }
}

/// An already-installed instance, as found under some filesystem root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledEntry {
    /// The control this instance was built from.
    pub control: Control,
    /// The installed instance's resolved state.
    pub pkginfo: PkgInfo,
    /// Content hashes of the files it installed, keyed by installed path.
    pub hashes: std::collections::BTreeMap<PathBuf, String>,
}

/// The capability set the solver consumes from a backing repository. The core never mutates
/// through this trait; a solve only ever reads.
pub trait PackageRepository {
    /// Every known entry (template and/or prebuilt) for `name`.
    fn map(&self, name: &str) -> Vec<Entry>;

    /// Every already-installed instance of `name` under `root`.
    fn map_installed(&self, root: &Path, name: &str) -> Vec<InstalledEntry>;

    /// True if a prebuilt artifact exists for this exact `pkginfo`.
    fn has_binary(&self, pkginfo: &PkgInfo) -> bool;

    /// The union of every package name this repository knows about.
    fn all_names(&self) -> Vec<String>;
}

/// Combines `entries` sharing the same `(name, version, iteration)` into one, applying the
/// merge rule: `Control` is shared (first writer wins, since equal-keyed entries declare the
/// same control); `template` is singular and last-writer-wins with a warning on conflict;
/// `available` is the set union of prebuilt instances (by `PkgInfo` equality).
pub fn merge_entries(entries: impl IntoIterator<Item = Entry>) -> Vec<Entry> {
    let mut merged: HashMap<String, Entry> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for entry in entries {
        let key = entry.control.id();
        match merged.get_mut(&key) {
            None => {
                order.push(key.clone());
                merged.insert(key, entry);
            }
            Some(existing) => {
                if let Some(new_template) = entry.template {
                    if let Some(old_template) = &existing.template {
                        if *old_template != new_template {
                            warn!(
                                "duplicate template for {}: {} vs {}",
                                key,
                                old_template.display(),
                                new_template.display()
                            );
                        }
                    }
                    existing.template = Some(new_template);
                }
                for pkginfo in entry.available {
                    if !existing.available.contains(&pkginfo) {
                        existing.available.push(pkginfo);
                    }
                }
            }
        }
    }

    order.into_iter().filter_map(|key| merged.remove(&key)).collect()
}

/// A reference `PackageRepository` backed entirely by in-memory maps. Not meant as a
/// production façade — this crate does not fetch anything from disk or network — but a
/// complete implementation usable by tests, demos, and callers embedding this engine without
/// a full repo subsystem of their own.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    entries: HashMap<String, Vec<Entry>>,
    installed: HashMap<PathBuf, HashMap<String, Vec<InstalledEntry>>>,
}

impl InMemoryRepository {
    /// An empty repository.
    pub fn new() -> Self {
        InMemoryRepository::default()
    }

    /// Adds an entry, merging it with anything already held for the same
    /// `(name, version, iteration)`.
    pub fn add_entry(&mut self, entry: Entry) {
        let name = entry.control.name.clone();
        let bucket = self.entries.entry(name).or_default();
        bucket.push(entry);
        let merged = merge_entries(std::mem::take(bucket));
        *bucket = merged;
    }

    /// Records `entry` as installed under `root`.
    pub fn add_installed(&mut self, root: impl Into<PathBuf>, entry: InstalledEntry) {
        let name = entry.pkginfo.name.clone();
        self.installed
            .entry(root.into())
            .or_default()
            .entry(name)
            .or_default()
            .push(entry);
    }
}

impl PackageRepository for InMemoryRepository {
    fn map(&self, name: &str) -> Vec<Entry> {
        self.entries.get(name).cloned().unwrap_or_default()
    }

    fn map_installed(&self, root: &Path, name: &str) -> Vec<InstalledEntry> {
        self.installed
            .get(root)
            .and_then(|by_name| by_name.get(name))
            .cloned()
            .unwrap_or_default()
    }

    fn has_binary(&self, pkginfo: &PkgInfo) -> bool {
        self.entries
            .get(&pkginfo.name)
            .map(|entries| entries.iter().any(|e| e.available.contains(pkginfo)))
            .unwrap_or(false)
    }

    fn all_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }
}
