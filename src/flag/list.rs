// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered flag collections. Insertion order is preserved (via [`indexmap::IndexMap`]) because
//! rendering must be stable across runs — it feeds the crunch convergence hash.

use std::fmt;

use indexmap::IndexMap;

use crate::errors::{Error, Result};
use crate::flag::{Flag, FlatFlag};

/// An ordered collection of [`Flag`]s, unique by name, in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagList {
    entries: IndexMap<String, Flag>,
}

impl FlagList {
    /// An empty list.
    pub fn new() -> Self {
        FlagList {
            entries: IndexMap::new(),
        }
    }

    /// Inserts or replaces `flag`. Replacing an existing name keeps its original position.
    pub fn add(&mut self, flag: Flag) {
        self.entries.insert(flag.name.clone(), flag);
    }

    /// Looks up a flag by name.
    pub fn get(&self, name: &str) -> Option<&Flag> {
        self.entries.get(name)
    }

    /// True if a flag with this name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterates flags in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Flag> {
        self.entries.values()
    }

    /// Number of flags.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flattens every flag against `defaults` as the inheritance source for `?`/`~` members
    /// with no sub-expression. Fails with [`Error::MissingReference`] on the first flag whose
    /// reference cannot be resolved.
    pub fn with_defaults(&self, defaults: &FlatFlagList) -> Result<FlatFlagList> {
        let mut out = FlatFlagList::new();
        for flag in self.entries.values() {
            out.add(flag.flatten(defaults)?);
        }
        Ok(out)
    }
}

impl FromIterator<Flag> for FlagList {
    fn from_iter<T: IntoIterator<Item = Flag>>(iter: T) -> Self {
        let mut list = FlagList::new();
        for flag in iter {
            list.add(flag);
        }
        list
    }
}

impl fmt::Display for FlagList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.entries.values().map(|flag| flag.to_string()).collect();
        write!(f, "{}", rendered.join(" "))
    }
}

/// An ordered collection of [`FlatFlag`]s, unique by name, in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatFlagList {
    entries: IndexMap<String, FlatFlag>,
}

impl FlatFlagList {
    /// An empty list.
    pub fn new() -> Self {
        FlatFlagList {
            entries: IndexMap::new(),
        }
    }

    /// Inserts or replaces `flag`, keeping the original position if it already existed.
    pub fn add(&mut self, flag: FlatFlag) {
        self.entries.insert(flag.name.clone(), flag);
    }

    /// Looks up a flag by name.
    pub fn get(&self, name: &str) -> Option<&FlatFlag> {
        self.entries.get(name)
    }

    /// Iterates flags in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &FlatFlag> {
        self.entries.values()
    }

    /// Number of flags.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `name` is present and enabled. Absent names are treated as disabled.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.entries.get(name).map(|f| f.enabled).unwrap_or(false)
    }

    /// True if every flag in `self` also appears in `sup` with the same boolean value.
    pub fn is_subset_of(&self, sup: &FlatFlagList) -> bool {
        self.entries.values().all(|flag| match sup.get(&flag.name) {
            Some(other) => other.enabled == flag.enabled,
            None => false,
        })
    }

    /// Symmetric union with `other`. Names present in both must agree on their boolean value;
    /// a disagreement fails with [`Error::ConflictingFlags`]. Entries missing from `self` are
    /// appended in their order of appearance in `other`.
    pub fn merge(&mut self, other: &FlatFlagList) -> Result<()> {
        for flag in other.entries.values() {
            match self.entries.get(&flag.name) {
                Some(existing) if existing.enabled != flag.enabled => {
                    return Err(Error::ConflictingFlags {
                        name: flag.name.clone(),
                    });
                }
                Some(_) => {}
                None => self.add(flag.clone()),
            }
        }
        Ok(())
    }
}

impl FromIterator<FlatFlag> for FlatFlagList {
    fn from_iter<T: IntoIterator<Item = FlatFlag>>(iter: T) -> Self {
        let mut list = FlatFlagList::new();
        for flag in iter {
            list.add(flag);
        }
        list
    }
}

impl fmt::Display for FlatFlagList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.entries.values().map(|flag| flag.to_string()).collect();
        write!(f, "{}", rendered.join(" "))
    }
}
