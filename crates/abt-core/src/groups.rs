//! The configured set of experiment groups.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::GroupId;

/// The set of groups a dispatcher was configured with.
///
/// Built once at construction from an ordered list of names; duplicate names
/// collapse silently. The set supports membership checks and symbolic lookup
/// only. It is not a channel for injecting behavior, and no handler-table
/// cross-validation happens here: a classifier may return a group with no
/// handler entry, which surfaces later as a resolution miss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupSet(BTreeSet<GroupId>);

impl GroupSet {
    /// Builds a group set from group names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(GroupId::new).collect())
    }

    /// The conventional two-arm split used when the caller configures
    /// nothing else.
    pub fn default_pair() -> Self {
        Self::from_names(["A", "B"])
    }

    /// Returns whether `group` is configured.
    pub fn contains(&self, group: &GroupId) -> bool {
        self.0.contains(group)
    }

    /// Symbolic lookup by name, so classifiers can reference groups without
    /// hardcoding identifier values.
    pub fn get(&self, name: &str) -> Option<&GroupId> {
        self.0.get(name)
    }

    /// Number of distinct configured groups.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no groups are configured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the configured groups in name order.
    pub fn iter(&self) -> impl Iterator<Item = &GroupId> {
        self.0.iter()
    }
}

impl Default for GroupSet {
    fn default() -> Self {
        Self::default_pair()
    }
}
