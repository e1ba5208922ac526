// SPDX-License-Identifier: MIT OR Apache-2.0

//! Distro-style package versions and the predicates dependency specs place on them.
//!
//! Versions here are dotted numeric components with an optional trailing alphabetic suffix
//! on the last component (`1.2.3`, `2.31`, `1.0.0rc1`). This does not follow SemVer
//! precedence — there is no build-metadata/pre-release distinction — so comparison is its
//! own small component-wise routine rather than a pull on the `semver` crate.

use std::cmp::Ordering;
use std::fmt;

/// A parsed package version: a sequence of numeric components, the last of which may carry
/// a trailing alphabetic suffix (`2.31`, `1.0.0rc1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Version {
    raw: String,
    components: Vec<u64>,
    suffix: String,
}

impl Version {
    /// Parses a version string into its numeric components and trailing suffix.
    ///
    /// Never fails: any text after the last all-numeric dotted component is taken verbatim
    /// as the suffix, matching the permissive parsing this comparator's predecessor used.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let mut components = Vec::new();
        let mut suffix = String::new();
        let mut chars = raw.chars().peekable();
        loop {
            let mut digits = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_digit() {
                    digits.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            if digits.is_empty() {
                // No numeric component here: everything from this point on is the suffix,
                // attached to the current (possibly empty) component run.
                suffix.extend(chars.by_ref());
                break;
            }
            components.push(digits.parse().unwrap_or(0));
            match chars.peek() {
                Some('.') => {
                    chars.next();
                }
                Some(_) => {
                    suffix.extend(chars.by_ref());
                    break;
                }
                None => break,
            }
        }
        Version {
            raw,
            components,
            suffix,
        }
    }

    /// The original, unparsed version string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components
            .cmp(&other.components)
            .then_with(|| self.suffix.cmp(&other.suffix))
    }
}

/// The comparison operator a [`crate::pdl::Dep`] places on a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Operator {
    /// `>=`
    GreaterOrEqual,
    /// `<=`
    LessOrEqual,
    /// `==`
    Equal,
}

impl Operator {
    pub(crate) fn render(self) -> &'static str {
        match self {
            Operator::GreaterOrEqual => ">=",
            Operator::LessOrEqual => "<=",
            Operator::Equal => "==",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// A single `(operator, version)` predicate, as it appears in a [`crate::pdl::Dep`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct VersionPredicate {
    /// The comparison operator.
    pub operator: Operator,
    /// The version being compared against.
    pub version: Version,
}

impl VersionPredicate {
    /// Creates a new predicate.
    pub fn new(operator: Operator, version: Version) -> Self {
        VersionPredicate { operator, version }
    }

    /// Returns true if `candidate` satisfies this predicate.
    pub fn accepts(&self, candidate: &Version) -> bool {
        match self.operator {
            Operator::GreaterOrEqual => candidate >= &self.version,
            Operator::LessOrEqual => candidate <= &self.version,
            Operator::Equal => candidate == &self.version,
        }
    }
}

impl fmt::Display for VersionPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_dotted() {
        let v = Version::parse("2.31");
        assert_eq!(v.components, vec![2, 31]);
        assert_eq!(v.suffix, "");
    }

    #[test]
    fn parses_trailing_suffix() {
        let v = Version::parse("1.0.0rc1");
        assert_eq!(v.components, vec![1, 0, 0]);
        assert_eq!(v.suffix, "rc1");
    }

    #[test]
    fn orders_numerically_not_lexically() {
        assert!(Version::parse("2.9") < Version::parse("2.10"));
    }

    #[test]
    fn tie_breaks_on_suffix() {
        assert!(Version::parse("1.0a") < Version::parse("1.0b"));
        assert_eq!(Version::parse("1.0"), Version::parse("1.0"));
    }

    #[test]
    fn predicate_range() {
        let p = VersionPredicate::new(Operator::GreaterOrEqual, Version::parse("2.32"));
        assert!(p.accepts(&Version::parse("2.32")));
        assert!(p.accepts(&Version::parse("2.33")));
        assert!(!p.accepts(&Version::parse("2.31")));
    }

    #[test]
    fn display_round_trips_operator() {
        let p = VersionPredicate::new(Operator::LessOrEqual, Version::parse("9"));
        assert_eq!(p.to_string(), "<=9");
    }
}
