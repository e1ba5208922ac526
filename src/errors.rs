// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contains types that describe errors this crate's solver, parser and graph can return.

use std::error;
use std::fmt;
use std::path::PathBuf;

use Error::*;

/// Error type describing the sorts of errors this crate can return.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// A dependency spec, flag, or flag expression failed to parse.
    Parse(ParseError),
    /// An `?`/`~` flag had no sub-expression and no matching name in its inheritance source.
    MissingReference {
        /// The flag name that could not be resolved.
        name: String,
    },
    /// Merging two flat flag lists found a name with conflicting boolean values.
    ConflictingFlags {
        /// The conflicting flag name.
        name: String,
    },
    /// A node's version predicates left no candidate version acceptable.
    ConflictingVersions {
        /// The package name whose version predicates conflict.
        name: String,
    },
    /// No candidate control or prebuilt descriptor satisfied a node's constraints.
    NoAcceptableVersion {
        /// The package name with no acceptable candidate.
        name: String,
    },
    /// A `Deps` entry referenced a package name absent from the graph.
    MissingDependency {
        /// The unresolved dependency name.
        name: String,
    },
    /// A `Dep` carrying a `Condition` was added as an anonymous (parent-less) constraint.
    ConditionWithoutParent {
        /// The dependency name the malformed constraint was attached to.
        name: String,
    },
    /// Crunch repeated a graph hash without reaching a fixed point.
    ResolverDidNotConverge,
    /// A forge's build-dependency sub-graph revisited a package still in progress.
    SelfBuildingDependency {
        /// The package name building itself transitively.
        name: String,
    },
    /// A constraint-config file was malformed (see [`crate::constraint_config`]).
    ConstraintConfig {
        /// The path of the offending file.
        path: PathBuf,
        /// A human-readable description of the problem.
        reason: String,
    },
    /// An I/O error occurred while loading a constraint-config file.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parse(err) => write!(f, "{}", err),
            MissingReference { name } => {
                write!(f, "flag '{}' has no sub-expression and no parent value to inherit", name)
            }
            ConflictingFlags { name } => write!(f, "conflicting flag states for '{}'", name),
            ConflictingVersions { name } => {
                write!(f, "conflicting version predicates for '{}'", name)
            }
            NoAcceptableVersion { name } => {
                write!(f, "no acceptable version of '{}' found at any permitted tier", name)
            }
            MissingDependency { name } => write!(f, "dependency '{}' not found in graph", name),
            ConditionWithoutParent { name } => write!(
                f,
                "dependency '{}' has a condition but was added as a parent-less constraint",
                name
            ),
            ResolverDidNotConverge => write!(f, "resolver did not converge (repeated graph hash)"),
            SelfBuildingDependency { name } => {
                write!(f, "'{}' depends on itself being forged to build itself", name)
            }
            ConstraintConfig { path, reason } => {
                write!(f, "constraint config {}: {}", path.display(), reason)
            }
            Io(err) => write!(f, "i/o error: {}", err),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Parse(err) => Some(err),
            Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

/// A precise error produced while parsing a dependency spec, flag, or flag expression.
///
/// Carries the byte offset into the input at which parsing failed, and a message describing
/// what was expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub(crate) position: usize,
    pub(crate) message: String,
}

impl ParseError {
    pub(crate) fn new(position: usize, message: impl Into<String>) -> Self {
        ParseError {
            position,
            message: message.into(),
        }
    }

    /// The byte offset into the input at which parsing failed.
    pub fn position(&self) -> usize {
        self.position
    }

    /// A human-readable description of what went wrong.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error at byte {}: {}", self.position, self.message)
    }
}

impl error::Error for ParseError {}

/// Convenience alias for fallible results returned by this crate.
pub type Result<T> = std::result::Result<T, Error>;
