// SPDX-License-Identifier: MIT OR Apache-2.0

//! The package dependency language: `[+qt && -gtk] toolkit >=2.0 <=3.0 (?theme(+dark))`.

use std::fmt;
use std::str::FromStr;

use crate::cursor::Cursor;
use crate::errors::{Error, ParseError, Result};
use crate::flag::{Flag, FlagExpr, FlagList};
use crate::version::{Operator, Version, VersionPredicate};

/// One dependency entry: an optional activation guard, a package name, up to two version
/// predicates, and an optional requested flag set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dep {
    /// Activation guard: the dependency applies only when this evaluates true against the
    /// parent's flat flags. `None` means unconditional.
    pub condition: Option<FlagExpr>,
    /// The dependency's package name.
    pub name: String,
    /// The first version predicate, if any.
    pub version1: Option<VersionPredicate>,
    /// The second version predicate, if any. Never present when `version1` is `Equal`.
    pub version2: Option<VersionPredicate>,
    /// Requested flag settings on the dependency.
    pub flags: Option<FlagList>,
}

impl Dep {
    /// Builds an unconditional, unconstrained dependency on `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Dep {
            condition: None,
            name: name.into(),
            version1: None,
            version2: None,
            flags: None,
        }
    }

    /// True if `candidate` satisfies every version predicate this dependency carries.
    pub fn accepts_version(&self, candidate: &Version) -> bool {
        self.version1.as_ref().map_or(true, |p| p.accepts(candidate))
            && self.version2.as_ref().map_or(true, |p| p.accepts(candidate))
    }

    fn condition_is_next(cursor: &Cursor<'_>) -> bool {
        cursor.peek(1) == Some("[")
    }

    fn version_is_next(cursor: &Cursor<'_>) -> bool {
        matches!(cursor.peek(1), Some(">") | Some("<") | Some("="))
    }

    fn parse_version(cursor: &mut Cursor<'_>) -> Result<VersionPredicate> {
        let op = match cursor.next(2) {
            Some(">=") => Operator::GreaterOrEqual,
            Some("<=") => Operator::LessOrEqual,
            Some("==") => Operator::Equal,
            other => {
                return Err(ParseError::new(
                    cursor.position(),
                    format!("invalid version comparison '{}', expected '>=', '<=' or '=='", other.unwrap_or("")),
                )
                .into())
            }
        };
        let ver = cursor.read_until("<>=(");
        if ver.is_empty() {
            return Err(ParseError::new(cursor.position(), "comparison operator must be followed by a version").into());
        }
        Ok(VersionPredicate::new(op, Version::parse(ver)))
    }

    fn parse_flag_set(cursor: &mut Cursor<'_>) -> Result<FlagList> {
        if !cursor.is_next("(") {
            return Err(ParseError::new(cursor.position(), "expected '(' to start flag set").into());
        }
        let mut flags = FlagList::new();
        loop {
            let flag = Flag::parse(cursor)?;
            flags.add(flag);

            match cursor.peek(1) {
                Some("+") | Some("-") | Some("~") | Some("?") => continue,
                Some(")") => {
                    cursor.next(1);
                    break;
                }
                other => {
                    return Err(ParseError::new(
                        cursor.position(),
                        format!("invalid char '{}', expected ')'", other.unwrap_or("<eof>")),
                    )
                    .into())
                }
            }
        }
        Ok(flags)
    }

    /// Parses a `Dep` from `cursor`, leaving nothing unconsumed on success.
    pub fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        let condition = if Self::condition_is_next(cursor) {
            cursor.next(1);
            let expr = FlagExpr::parse(cursor)?;
            if !cursor.is_next("]") {
                return Err(ParseError::new(cursor.position(), "expected ']' at end of condition").into());
            }
            Some(expr)
        } else {
            None
        };

        let name = cursor.read_until("<>=()[]");
        if name.is_empty() {
            return Err(ParseError::new(cursor.position(), "must specify a dependency package name").into());
        }

        let mut version1 = None;
        let mut version2 = None;
        if Self::version_is_next(cursor) {
            let v = Self::parse_version(cursor)?;
            let is_eq = v.operator == Operator::Equal;
            version1 = Some(v);
            if !is_eq && Self::version_is_next(cursor) {
                version2 = Some(Self::parse_version(cursor)?);
            }
        }

        let flags = if cursor.has_next(1) {
            Some(Self::parse_flag_set(cursor)?)
        } else {
            None
        };

        if cursor.has_next(1) {
            return Err(ParseError::new(
                cursor.position(),
                format!("trailing characters after dependency: '{}'", cursor.rest()),
            )
            .into());
        }

        Ok(Dep {
            condition,
            name: name.to_string(),
            version1,
            version2,
            flags,
        })
    }
}

impl fmt::Display for Dep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(cond) = &self.condition {
            write!(f, "[{}]", cond)?;
        }
        write!(f, "{}", self.name)?;
        if let Some(v) = &self.version1 {
            write!(f, "{}", v)?;
        }
        if let Some(v) = &self.version2 {
            write!(f, "{}", v)?;
        }
        if let Some(flags) = &self.flags {
            write!(f, "({})", flags)?;
        }
        Ok(())
    }
}

impl FromStr for Dep {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let stripped: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let mut cursor = Cursor::new(&stripped);
        Dep::parse(&mut cursor)
    }
}

/// `Dep` serializes as its rendered PDL string and parses back through the same parser,
/// matching how `Control`'s on-disk `Bdeps`/`Deps` lists are authored by hand.
mod serde_impl {
    use super::Dep;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;

    impl Serialize for Dep {
        fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.to_string())
        }
    }

    impl<'de> Deserialize<'de> for Dep {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            Dep::from_str(&s).map_err(D::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag::FlatFlagList;

    #[test]
    fn parses_bare_name() {
        let d: Dep = "zlib".parse().unwrap();
        assert_eq!(d.name, "zlib");
        assert!(d.version1.is_none());
        assert!(d.flags.is_none());
    }

    #[test]
    fn parses_name_with_category() {
        let d: Dep = "dev-lang/python".parse().unwrap();
        assert_eq!(d.name, "dev-lang/python");
    }

    #[test]
    fn parses_range_and_flags() {
        let d: Dep = "[-static] gcc >=4.8 <=9 (+lto ~pgo)".parse().unwrap();
        assert_eq!(d.name, "gcc");
        assert_eq!(d.version1.as_ref().unwrap().operator, Operator::GreaterOrEqual);
        assert_eq!(d.version2.as_ref().unwrap().operator, Operator::LessOrEqual);
        assert!(d.flags.as_ref().unwrap().contains("lto"));
        assert!(d.accepts_version(&Version::parse("5.0")));
        assert!(!d.accepts_version(&Version::parse("10.0")));
    }

    #[test]
    fn equal_operator_has_no_second_range() {
        let d: Dep = "foo==1.2.3".parse().unwrap();
        assert_eq!(d.version1.as_ref().unwrap().operator, Operator::Equal);
        assert!(d.version2.is_none());
    }

    #[test]
    fn compound_condition_and_subexpr_flag() {
        let d: Dep = "[+qt && -gtk] toolkit (?theme(+dark))".parse().unwrap();
        assert!(d.condition.as_ref().unwrap().evaluate(&{
            let mut l = FlatFlagList::new();
            l.add(crate::flag::FlatFlag::new("qt", true));
            l.add(crate::flag::FlatFlag::new("gtk", false));
            l
        }));
    }

    #[test]
    fn rejects_missing_name() {
        let err = Dep::from_str(">=1.0").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn round_trips_through_display() {
        let d: Dep = "[-static]gcc>=4.8<=9(+lto~pgo)".parse().unwrap();
        let rendered = d.to_string();
        let reparsed: Dep = rendered.parse().unwrap();
        assert_eq!(d, reparsed);
    }
}
