//! Handler model: per-group entries, the handler table, and the run context.

use std::collections::BTreeMap;
use std::fmt;

use abt_core::{GroupId, GroupSet, UserId};
use serde_json::Value;

/// Read-only dispatcher state passed to every handler invocation.
///
/// This is the explicit receiver of a dispatched call: handlers that need to
/// branch on the current user or group read it from here instead of
/// capturing the dispatcher.
pub struct RunContext<'a> {
    /// User the dispatcher currently holds.
    pub user: &'a UserId,
    /// Group the current user classified into.
    pub group_id: &'a GroupId,
    /// Configured group set.
    pub groups: &'a GroupSet,
}

/// A dispatchable behavior.
///
/// Receives the dispatcher context and the caller-supplied parameters;
/// returns a payload, or nothing.
pub type Handler = Box<dyn Fn(&RunContext<'_>, &[Value]) -> Option<Value> + Send + Sync>;

/// Shared stateless no-op behavior: ignores its inputs and returns nothing.
///
/// Register it explicitly for groups where nothing should happen, instead of
/// leaving the table incomplete and relying on the warn-and-substitute path
/// of dispatch.
pub fn noop(_ctx: &RunContext<'_>, _params: &[Value]) -> Option<Value> {
    None
}

/// Handler storage for one group.
///
/// A group either carries a single anonymous behavior or a set of named
/// behaviors with an optional default. Adding a named handler to a `Single`
/// group promotes it to `Named`, moving the displaced behavior into the
/// `default` slot; promotion is never reversed.
pub enum HandlerEntry {
    /// One anonymous behavior for the whole group.
    Single(Handler),
    /// Named behaviors, plus the optional default used for unnamed dispatch.
    Named {
        /// Behavior invoked when dispatch is requested without a name.
        default: Option<Handler>,
        /// Behaviors addressable by name.
        by_name: BTreeMap<String, Handler>,
    },
}

impl fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerEntry::Single(_) => f.debug_struct("Single").finish_non_exhaustive(),
            HandlerEntry::Named { default, by_name } => f
                .debug_struct("Named")
                .field("default", &default.is_some())
                .field("names", &by_name.keys().collect::<Vec<_>>())
                .finish(),
        }
    }
}

/// Mapping from group id to that group's handler entry.
///
/// Entries are only ever added or overwritten, never removed. Keys are not
/// cross-validated against the configured group set; a group without an
/// entry simply misses at resolution time.
#[derive(Debug, Default)]
pub struct HandlerTable {
    entries: BTreeMap<GroupId, HandlerEntry>,
}

impl HandlerTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a single anonymous behavior for `group`, replacing any
    /// existing entry.
    pub fn single<G, F>(mut self, group: G, handler: F) -> Self
    where
        G: Into<GroupId>,
        F: Fn(&RunContext<'_>, &[Value]) -> Option<Value> + Send + Sync + 'static,
    {
        self.entries
            .insert(group.into(), HandlerEntry::Single(Box::new(handler)));
        self
    }

    /// Registers a named behavior for `group`, promoting the entry to
    /// `Named` if necessary.
    pub fn named<G, N, F>(mut self, group: G, name: N, handler: F) -> Self
    where
        G: Into<GroupId>,
        N: Into<String>,
        F: Fn(&RunContext<'_>, &[Value]) -> Option<Value> + Send + Sync + 'static,
    {
        self.add_named(group.into(), name.into(), Box::new(handler));
        self
    }

    /// Number of groups with an entry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn get(&self, group: &GroupId) -> Option<&HandlerEntry> {
        self.entries.get(group)
    }

    /// Inserts `name -> handler` under `group`, promoting a `Single` or
    /// absent entry to `Named` first. The promotion is one-way.
    pub(crate) fn add_named(&mut self, group: GroupId, name: String, handler: Handler) {
        let entry = match self.entries.remove(&group) {
            Some(HandlerEntry::Named { default, mut by_name }) => {
                by_name.insert(name, handler);
                HandlerEntry::Named { default, by_name }
            }
            single_or_absent => {
                let default = match single_or_absent {
                    Some(HandlerEntry::Single(displaced)) => Some(displaced),
                    _ => None,
                };
                HandlerEntry::Named {
                    default,
                    by_name: BTreeMap::from([(name, handler)]),
                }
            }
        };
        self.entries.insert(group, entry);
    }
}
