#![deny(missing_docs)]
#![doc = "Identifier types, group sets, and errors for the abt dispatch engine."]

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod errors;
mod groups;

pub use errors::{ConfigError, ErrorInfo};
pub use groups::GroupSet;

/// Identifier for an experiment group (e.g. `"A"`, `"B"`).
///
/// Values are produced only from the group names supplied at dispatcher
/// construction, or returned by a classifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    /// Creates a group identifier from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the group name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for GroupId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GroupId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for GroupId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Opaque user identifier, textual or numeric.
///
/// The engine never interprets a user beyond handing it to the classifier
/// and the gating predicate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    /// Textual identifier.
    Text(String),
    /// Numeric identifier.
    Number(i64),
}

impl UserId {
    /// Returns the textual form, if this is a text identifier.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            UserId::Text(text) => Some(text),
            UserId::Number(_) => None,
        }
    }

    /// Numeric view of the identifier; textual identifiers are parsed.
    ///
    /// Classifiers that bucket on a modulus use this so `"2"` and `2` land
    /// in the same group.
    pub fn to_number(&self) -> Option<i64> {
        match self {
            UserId::Text(text) => text.parse().ok(),
            UserId::Number(number) => Some(*number),
        }
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Text(text) => f.write_str(text),
            UserId::Number(number) => write!(f, "{number}"),
        }
    }
}

impl From<&str> for UserId {
    fn from(user: &str) -> Self {
        UserId::Text(user.to_string())
    }
}

impl From<String> for UserId {
    fn from(user: String) -> Self {
        UserId::Text(user)
    }
}

impl From<i64> for UserId {
    fn from(user: i64) -> Self {
        UserId::Number(user)
    }
}
