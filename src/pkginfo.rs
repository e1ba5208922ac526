// SPDX-License-Identifier: MIT OR Apache-2.0

//! `PkgInfo`: a concrete instantiation of a [`Control`] with chosen flag values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::control::Control;
use crate::errors::{Error, Result};
use crate::flag::{FlatFlag, FlatFlagList};
use crate::pdl::Dep;
use crate::version::{Operator, Version, VersionPredicate};

/// A concrete instantiation of a [`Control`]: one version, one iteration, one resolved set of
/// flag states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PkgInfo {
    /// The package name.
    pub name: String,
    /// The resolved version.
    pub version: Version,
    /// The iteration.
    pub iteration: i64,
    /// When this instance was built, as seconds since the Unix epoch. `None` for an instance
    /// that has not yet been built (a planned, not-yet-forged source build).
    pub build_date: Option<i64>,
    /// The resolved flat flag states.
    pub flag_states: FlatFlagList,
}

impl PkgInfo {
    /// Builds a `PkgInfo` from a control's name/version/iteration and its default flags, not
    /// yet built.
    pub fn from_control(control: &Control) -> Self {
        PkgInfo {
            name: control.name.clone(),
            version: control.version.clone(),
            iteration: control.iteration,
            build_date: None,
            flag_states: control.defaults(),
        }
    }

    /// The CRC32 fingerprint of `name` followed by every flag's rendered form, in order.
    fn flag_hash(&self) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(self.name.as_bytes());
        for flag in self.flag_states.iter() {
            hasher.update(flag.to_string().as_bytes());
        }
        hasher.finalize()
    }

    /// The canonical id: `name-version_iteration_<crc32 of name and flag states, hex>`.
    pub fn id(&self) -> String {
        format!(
            "{}-{}_{}_{:x}",
            self.name,
            self.version,
            self.iteration,
            self.flag_hash()
        )
    }

    /// Renders as a `Dep` that exactly matches this instance: `name==version(flags)`.
    pub fn to_dep(&self) -> Dep {
        let mut flags = crate::flag::FlagList::new();
        for flat in self.flag_states.iter() {
            flags.add(crate::flag::Flag::new(
                &flat.name,
                if flat.enabled {
                    crate::flag::FlagState::Flat(true)
                } else {
                    crate::flag::FlagState::Flat(false)
                },
            ));
        }
        Dep {
            condition: None,
            name: self.name.clone(),
            version1: Some(VersionPredicate::new(Operator::Equal, self.version.clone())),
            version2: None,
            flags: Some(flags),
        }
    }

    /// True if this instance was produced from `control` (same name/version/iteration).
    pub fn instance_of(&self, control: &Control) -> bool {
        control.matches(&self.name, &self.version, self.iteration)
    }

    /// Overwrites a single flag's state. Fails with [`Error::MissingDependency`] if this
    /// instance has no flag by that name (its `Control` never declared it).
    pub fn set_flag_state(&mut self, flag: FlatFlag) -> Result<()> {
        if self.flag_states.get(&flag.name).is_none() {
            return Err(Error::MissingDependency { name: flag.name });
        }
        self.flag_states.add(flag);
        Ok(())
    }

    /// Overwrites every flag present in `states` that this instance also declares.
    pub fn set_flag_states(&mut self, states: &FlatFlagList) -> Result<()> {
        for flag in states.iter() {
            self.set_flag_state(flag.clone())?;
        }
        Ok(())
    }

    /// True if `flags` is a subset of this instance's flag states — everything demanded is
    /// satisfied.
    pub fn satisfies(&self, flags: &FlatFlagList) -> bool {
        flags.is_subset_of(&self.flag_states)
    }
}

impl fmt::Display for PkgInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}
