// SPDX-License-Identifier: MIT OR Apache-2.0

//! Four-valued flags (`+enabled`, `-disabled`, `?inherit`, `~invert`), the flat flags they
//! resolve to, and the ordered lists and boolean expressions built on top of them.

mod expr;
mod list;

pub use expr::{FlagExpr, Op};
pub use list::{FlagList, FlatFlagList};

use std::fmt;
use std::str::FromStr;

use crate::cursor::Cursor;
use crate::errors::{Error, ParseError, Result};

/// The sign a flag was written with, independent of any attached sub-expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// `+`
    Enabled,
    /// `-`
    Disabled,
    /// `?`
    Inherit,
    /// `~`
    Invert,
}

impl State {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(State::Enabled),
            '-' => Some(State::Disabled),
            '?' => Some(State::Inherit),
            '~' => Some(State::Invert),
            _ => None,
        }
    }

    fn render(self) -> char {
        match self {
            State::Enabled => '+',
            State::Disabled => '-',
            State::Inherit => '?',
            State::Invert => '~',
        }
    }
}

/// The resolved (or not-yet-resolved) state a [`Flag`] carries. `Inherit`/`Invert` are
/// "delayed booleans": each may carry a sub-expression that, once evaluated against a parent's
/// flat flags, supplies the boolean; with no sub-expression they instead copy (or invert) the
/// same-named flag from the parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagState {
    /// A resolved boolean (`+`/`-`).
    Flat(bool),
    /// `?`, optionally guarded by a sub-expression.
    Inherit(Option<FlagExpr>),
    /// `~`, optionally guarded by a sub-expression.
    Invert(Option<FlagExpr>),
}

impl FlagState {
    fn sign(&self) -> State {
        match self {
            FlagState::Flat(true) => State::Enabled,
            FlagState::Flat(false) => State::Disabled,
            FlagState::Inherit(_) => State::Inherit,
            FlagState::Invert(_) => State::Invert,
        }
    }

    fn sub_expr(&self) -> Option<&FlagExpr> {
        match self {
            FlagState::Inherit(e) | FlagState::Invert(e) => e.as_ref(),
            FlagState::Flat(_) => None,
        }
    }
}

/// A flag demand: a name plus a possibly-unresolved [`FlagState`]. Appears in [`FlagList`]s on
/// `Control::flags` and a `Dep`'s requested flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    /// The flag's name.
    pub name: String,
    /// Its state.
    pub state: FlagState,
}

impl Flag {
    /// Builds a flag.
    pub fn new(name: impl Into<String>, state: FlagState) -> Self {
        Flag {
            name: name.into(),
            state,
        }
    }

    /// True if this flag is already flat (`+`/`-`), needing no parent context.
    pub fn is_flat(&self) -> bool {
        matches!(self.state, FlagState::Flat(_))
    }

    /// Returns the already-flat form, or `None` if this flag still needs flattening.
    pub fn as_flat(&self) -> Option<FlatFlag> {
        match self.state {
            FlagState::Flat(enabled) => Some(FlatFlag::new(&self.name, enabled)),
            _ => None,
        }
    }

    /// Resolves this flag to a [`FlatFlag`], consulting `parent_flags` for any `?`/`~` member
    /// that has no sub-expression of its own.
    ///
    /// Fails with [`Error::MissingReference`] if such a member's name is absent from
    /// `parent_flags`.
    pub fn flatten(&self, parent_flags: &FlatFlagList) -> Result<FlatFlag> {
        let enabled = match &self.state {
            FlagState::Flat(enabled) => *enabled,
            FlagState::Inherit(Some(expr)) => expr.evaluate(parent_flags),
            FlagState::Invert(Some(expr)) => !expr.evaluate(parent_flags),
            FlagState::Inherit(None) => self.inherited_from(parent_flags)?,
            FlagState::Invert(None) => !self.inherited_from(parent_flags)?,
        };
        Ok(FlatFlag::new(&self.name, enabled))
    }

    fn inherited_from(&self, parent_flags: &FlatFlagList) -> Result<bool> {
        parent_flags
            .get(&self.name)
            .map(|f| f.enabled)
            .ok_or_else(|| Error::MissingReference {
                name: self.name.clone(),
            })
    }

    /// Parses a single flag: a sign, a name, and (for `?`/`~` only) an optional parenthesized
    /// sub-expression.
    pub fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        let sign_str = cursor
            .next(1)
            .ok_or_else(|| ParseError::new(cursor.position(), "expected a flag sign"))?;
        let sign = State::from_char(sign_str.chars().next().unwrap())
            .ok_or_else(|| ParseError::new(cursor.position(), format!("invalid flag sign '{}'", sign_str)))?;

        let name = cursor.read_until("[]+-?~&|(),");
        if name.is_empty() {
            return Err(ParseError::new(cursor.position(), "empty flag name").into());
        }

        let sub_expr = if matches!(sign, State::Inherit | State::Invert) && cursor.peek(1) == Some("(") {
            cursor.next(1);
            let expr = FlagExpr::parse(cursor)?;
            if cursor.next(1) != Some(")") {
                return Err(ParseError::new(cursor.position(), "missing closing ')' after flag expression").into());
            }
            Some(expr)
        } else {
            None
        };

        let state = match sign {
            State::Enabled => FlagState::Flat(true),
            State::Disabled => FlagState::Flat(false),
            State::Inherit => FlagState::Inherit(sub_expr),
            State::Invert => FlagState::Invert(sub_expr),
        };
        Ok(Flag::new(name, state))
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.state.sign().render(), self.name)?;
        if let Some(expr) = self.state.sub_expr() {
            write!(f, "({})", expr)?;
        }
        Ok(())
    }
}

impl FromStr for Flag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let stripped: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let mut cursor = Cursor::new(&stripped);
        let flag = Flag::parse(&mut cursor)?;
        if cursor.has_next(1) {
            return Err(ParseError::new(cursor.position(), "trailing characters after flag").into());
        }
        Ok(flag)
    }
}

/// A flag reduced to a plain boolean.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlatFlag {
    /// The flag's name.
    pub name: String,
    /// Whether it's enabled.
    pub enabled: bool,
}

impl FlatFlag {
    /// Builds a flat flag.
    pub fn new(name: impl Into<String>, enabled: bool) -> Self {
        FlatFlag {
            name: name.into(),
            enabled,
        }
    }

    /// Parses a flag and requires that it already be flat, failing otherwise.
    pub fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        let flag = Flag::parse(cursor)?;
        flag.as_flat()
            .ok_or_else(|| ParseError::new(cursor.position(), format!("'{}' is not a flattened flag", flag)).into())
    }
}

impl fmt::Display for FlatFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", if self.enabled { '+' } else { '-' }, self.name)
    }
}

impl FromStr for FlatFlag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let stripped: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let mut cursor = Cursor::new(&stripped);
        let flag = FlatFlag::parse(&mut cursor)?;
        if cursor.has_next(1) {
            return Err(ParseError::new(cursor.position(), "trailing characters after flag").into());
        }
        Ok(flag)
    }
}

/// On-disk form: both `Flag` and `FlatFlag` serialize as their rendered string and parse back
/// through the same `FromStr` the PDL parser uses, rather than exposing their internal shape.
mod serde_impl {
    use super::{Flag, FlatFlag};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;

    impl Serialize for Flag {
        fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.to_string())
        }
    }

    impl<'de> Deserialize<'de> for Flag {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            Flag::from_str(&s).map_err(D::Error::custom)
        }
    }

    impl Serialize for FlatFlag {
        fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.to_string())
        }
    }

    impl<'de> Deserialize<'de> for FlatFlag {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            FlatFlag::from_str(&s).map_err(D::Error::custom)
        }
    }
}
