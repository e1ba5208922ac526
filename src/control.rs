// SPDX-License-Identifier: MIT OR Apache-2.0

//! `Control`: the declaration of one package version — name, dependencies, and the flags it
//! exposes with their default states and activation preconditions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, ParseError, Result};
use crate::flag::{FlagExpr, FlatFlag, FlatFlagList};
use crate::pdl::Dep;
use crate::version::Version;

/// A flag a `Control` declares: its default state, and an optional precondition that must
/// hold whenever the flag is enabled (`+flag` requires `+other` to also be set, say).
///
/// Corresponds to a single entry of the original source's flag-set list; renders as
/// `+name` or `+name(expr)` when a precondition is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagDecl {
    /// The flag's default state.
    pub default: FlatFlag,
    /// A guard that must evaluate true, against the flags under test, whenever this flag is
    /// enabled in that set.
    pub requires: Option<FlagExpr>,
}

impl FlagDecl {
    /// Declares a flag with no precondition.
    pub fn new(default: FlatFlag) -> Self {
        FlagDecl {
            default,
            requires: None,
        }
    }

    /// Declares a flag that may only be enabled when `requires` also holds.
    pub fn with_requirement(default: FlatFlag, requires: FlagExpr) -> Self {
        FlagDecl {
            default,
            requires: Some(requires),
        }
    }

    /// True unless this flag is enabled in `flags` while its precondition fails.
    pub fn verify(&self, flags: &FlatFlagList) -> bool {
        if flags.is_enabled(&self.default.name) {
            self.requires.as_ref().map_or(true, |expr| expr.evaluate(flags))
        } else {
            true
        }
    }

    fn parse(cursor: &mut crate::cursor::Cursor<'_>) -> Result<Self> {
        let default = FlatFlag::parse(cursor)?;
        let requires = if cursor.peek(1) == Some("(") {
            cursor.next(1);
            let expr = FlagExpr::parse(cursor)?;
            if cursor.next(1) != Some(")") {
                return Err(ParseError::new(cursor.position(), "missing closing ')' after flag requirement").into());
            }
            Some(expr)
        } else {
            None
        };
        Ok(FlagDecl { default, requires })
    }
}

impl fmt::Display for FlagDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.default)?;
        if let Some(expr) = &self.requires {
            write!(f, "({})", expr)?;
        }
        Ok(())
    }
}

impl FromStr for FlagDecl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let stripped: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let mut cursor = crate::cursor::Cursor::new(&stripped);
        let decl = FlagDecl::parse(&mut cursor)?;
        if cursor.has_next(1) {
            return Err(ParseError::new(cursor.position(), "trailing characters after flag declaration").into());
        }
        Ok(decl)
    }
}

/// `FlagDecl` serializes as its rendered string, matching `Dep` and `Flag`.
mod serde_impl {
    use super::FlagDecl;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;

    impl Serialize for FlagDecl {
        fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.to_string())
        }
    }

    impl<'de> Deserialize<'de> for FlagDecl {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            FlagDecl::from_str(&s).map_err(D::Error::custom)
        }
    }
}

/// The declaration of one package version: name, dependencies, and the flags it exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
    /// The package name.
    pub name: String,
    /// The package version.
    pub version: Version,
    /// The iteration (build revision) of this version.
    pub iteration: i64,
    /// A human-readable summary.
    pub description: String,
    /// Upstream homepage.
    pub url: String,
    /// Source archive URLs or paths.
    pub src: Vec<String>,
    /// Supported architectures.
    pub arch: Vec<String>,
    /// Build-time-only dependencies.
    pub bdeps: Vec<Dep>,
    /// Run-time dependencies.
    pub deps: Vec<Dep>,
    /// Declared flags, in declaration order.
    pub flags: Vec<FlagDecl>,
}

impl Control {
    /// The canonical `name-version_iteration` identifier.
    pub fn id(&self) -> String {
        format!("{}-{}_{}", self.name, self.version, self.iteration)
    }

    /// The default flat flag states for every declared flag, in declaration order.
    pub fn defaults(&self) -> FlatFlagList {
        let mut list = FlatFlagList::new();
        for decl in &self.flags {
            list.add(decl.default.clone());
        }
        list
    }

    /// True iff every declared flag's precondition holds against `states`.
    pub fn verify_flags(&self, states: &FlatFlagList) -> bool {
        self.flags.iter().all(|decl| decl.verify(states))
    }

    /// True if `name`/`version`/`iteration` match exactly.
    pub fn matches(&self, name: &str, version: &Version, iteration: i64) -> bool {
        self.name == name && &self.version == version && self.iteration == iteration
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag::FlatFlag;

    fn sample() -> Control {
        Control {
            name: "zlib".into(),
            version: Version::parse("1.2.11"),
            iteration: 0,
            description: "compression library".into(),
            url: "https://zlib.net".into(),
            src: vec!["https://zlib.net/zlib-1.2.11.tar.gz".into()],
            arch: vec!["x86_64".into()],
            bdeps: vec![Dep::named("gcc")],
            deps: vec![],
            flags: vec![FlagDecl::new(FlatFlag::new("static", false))],
        }
    }

    #[test]
    fn id_formats_name_version_iteration() {
        assert_eq!(sample().id(), "zlib-1.2.11_0");
    }

    #[test]
    fn defaults_pulls_flat_flag_defaults() {
        let c = sample();
        let defaults = c.defaults();
        assert!(!defaults.is_enabled("static"));
    }

    #[test]
    fn verify_flags_checks_precondition() {
        let decl: FlagDecl = "+dark(+theme)".parse().unwrap();
        let mut c = sample();
        c.flags.push(decl);

        let mut states = c.defaults();
        states.add(FlatFlag::new("dark", true));
        states.add(FlatFlag::new("theme", false));
        assert!(!c.verify_flags(&states));

        states.add(FlatFlag::new("theme", true));
        assert!(c.verify_flags(&states));
    }

    #[test]
    fn flag_decl_round_trips() {
        let decl: FlagDecl = "-lto".parse().unwrap();
        assert_eq!(decl.to_string(), "-lto");
    }
}
