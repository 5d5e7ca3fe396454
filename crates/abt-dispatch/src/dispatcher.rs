//! The dispatcher: classification, gating, and handler resolution.

use std::fmt;

use abt_core::{ConfigError, ErrorInfo, GroupId, GroupSet, UserId};
use serde_json::Value;
use tracing::warn;

use crate::handler::{noop, Handler, HandlerEntry, HandlerTable, RunContext};

/// User-to-group classification function.
///
/// The configured group set is passed alongside the user so classifiers can
/// reference groups symbolically instead of hardcoding identifier strings.
/// The result is NOT checked against the set; an unknown group surfaces
/// later as a resolution miss.
pub type ClassifyFn = Box<dyn Fn(&UserId, &GroupSet) -> GroupId + Send + Sync>;

/// Per-call gating predicate deciding whether dispatch proceeds at all.
pub type GateFn = Box<dyn Fn(&UserId) -> bool + Send + Sync>;

/// Builder for [`GroupDispatcher`]; see [`GroupDispatcher::builder`].
#[derive(Default)]
pub struct GroupDispatcherBuilder {
    user: Option<UserId>,
    classify: Option<ClassifyFn>,
    handlers: Option<HandlerTable>,
    gate: Option<GateFn>,
    groups: Option<GroupSet>,
}

impl GroupDispatcherBuilder {
    /// Sets the initial user. Required.
    pub fn user(mut self, user: impl Into<UserId>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Sets the classification function. Required.
    pub fn classify<F>(mut self, classify: F) -> Self
    where
        F: Fn(&UserId, &GroupSet) -> GroupId + Send + Sync + 'static,
    {
        self.classify = Some(Box::new(classify));
        self
    }

    /// Sets the handler table. Required.
    pub fn handlers(mut self, handlers: HandlerTable) -> Self {
        self.handlers = Some(handlers);
        self
    }

    /// Sets the gating predicate. Defaults to constant true.
    pub fn should_run_test<F>(mut self, gate: F) -> Self
    where
        F: Fn(&UserId) -> bool + Send + Sync + 'static,
    {
        self.gate = Some(Box::new(gate));
        self
    }

    /// Sets the configured group names. Defaults to `["A", "B"]`.
    ///
    /// Duplicate names collapse silently, and no cross-check against the
    /// handler table is performed.
    pub fn groups<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = Some(GroupSet::from_names(names));
        self
    }

    /// Validates the configuration and classifies the initial user.
    ///
    /// Validation order is fixed: `user`, then `classify`, then `handlers`.
    pub fn build(self) -> Result<GroupDispatcher, ConfigError> {
        let user = self.user.ok_or_else(|| {
            missing_field("user-required", "a current user must be supplied", "user")
        })?;
        let classify = self.classify.ok_or_else(|| {
            missing_field(
                "classify-required",
                "a classification function must be supplied to divide users into groups",
                "classify",
            )
        })?;
        let handlers = self.handlers.ok_or_else(|| {
            missing_field(
                "handlers-required",
                "a handler table must be supplied",
                "handlers",
            )
        })?;
        let gate = self.gate.unwrap_or_else(|| Box::new(|_| true));
        let groups = self.groups.unwrap_or_default();
        let group_id = classify(&user, &groups);
        Ok(GroupDispatcher {
            groups,
            user,
            group_id,
            classify,
            gate,
            handlers,
        })
    }
}

fn missing_field(code: &str, message: &str, field: &str) -> ConfigError {
    ErrorInfo::new(code, message)
        .with_context("field", field)
        .into()
}

/// Assigns a user to an experiment group and dispatches behavior by group.
///
/// The dispatcher holds the current user, the group that user classified
/// into, the classification function, the per-group handler table, and the
/// gating predicate. Classification runs once at construction and again on
/// every [`set_user`](GroupDispatcher::set_user); [`run`](GroupDispatcher::run)
/// gates, resolves a handler for the current group, and invokes it.
///
/// All operations are synchronous and the type does no internal locking; a
/// shared instance must be externally synchronized.
pub struct GroupDispatcher {
    groups: GroupSet,
    user: UserId,
    group_id: GroupId,
    classify: ClassifyFn,
    gate: GateFn,
    handlers: HandlerTable,
}

impl fmt::Debug for GroupDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupDispatcher")
            .field("user", &self.user)
            .field("group_id", &self.group_id)
            .field("groups", &self.groups)
            .field("handlers", &self.handlers)
            .finish_non_exhaustive()
    }
}

impl GroupDispatcher {
    /// Starts building a dispatcher.
    pub fn builder() -> GroupDispatcherBuilder {
        GroupDispatcherBuilder::default()
    }

    /// Replaces the current user and reclassifies.
    ///
    /// Each call fully supersedes prior user/group state; handler bindings
    /// are untouched.
    pub fn set_user(&mut self, user: impl Into<UserId>) {
        self.user = user.into();
        self.group_id = (self.classify)(&self.user, &self.groups);
    }

    /// Current user.
    pub fn user(&self) -> &UserId {
        &self.user
    }

    /// Group the current user classified into.
    pub fn group_id(&self) -> &GroupId {
        &self.group_id
    }

    /// Configured group set. Lookup only; not a channel for behavior.
    pub fn groups(&self) -> &GroupSet {
        &self.groups
    }

    /// Registers `handler` under `name` in the current user's group.
    pub fn add_handler<N, F>(&mut self, name: N, handler: F) -> Result<(), ConfigError>
    where
        N: Into<String>,
        F: Fn(&RunContext<'_>, &[Value]) -> Option<Value> + Send + Sync + 'static,
    {
        let group = self.group_id.clone();
        self.add_handler_in(group, name, handler)
    }

    /// Registers `handler` under `name` in an explicit group.
    ///
    /// The group must be configured. A `Single` or absent entry is promoted
    /// to `Named` (the displaced behavior becomes the default); an existing
    /// handler under the same name is overwritten.
    pub fn add_handler_in<G, N, F>(
        &mut self,
        group: G,
        name: N,
        handler: F,
    ) -> Result<(), ConfigError>
    where
        G: Into<GroupId>,
        N: Into<String>,
        F: Fn(&RunContext<'_>, &[Value]) -> Option<Value> + Send + Sync + 'static,
    {
        let group = group.into();
        if !self.groups.contains(&group) {
            return Err(ErrorInfo::new("unknown-group", "group is not configured")
                .with_context("group", group.as_str())
                .with_hint("check the `groups` list supplied at construction")
                .into());
        }
        self.handlers
            .add_named(group, name.into(), Box::new(handler));
        Ok(())
    }

    /// Gates, resolves a handler for the current group, and invokes it with
    /// `params`.
    ///
    /// Returns `Ok(None)` immediately when the gate declines, without
    /// resolving anything. A missing handler (named lookup miss, or no entry
    /// for the current group at all) is replaced by [`noop`] after a single
    /// warning. Hard resolution failures are errors: unnamed dispatch on a
    /// `Named` entry without a default, and named dispatch on a `Single`
    /// entry.
    pub fn run(&self, name: Option<&str>, params: &[Value]) -> Result<Option<Value>, ConfigError> {
        if !(self.gate)(&self.user) {
            return Ok(None);
        }
        let ctx = RunContext {
            user: &self.user,
            group_id: &self.group_id,
            groups: &self.groups,
        };
        match self.resolve(name)? {
            Some(handler) => Ok(handler(&ctx, params)),
            None => {
                warn!(
                    handler = name.unwrap_or("<default>"),
                    group = %self.group_id,
                    "no handler resolved; substituting noop"
                );
                Ok(noop(&ctx, params))
            }
        }
    }

    fn resolve(&self, name: Option<&str>) -> Result<Option<&Handler>, ConfigError> {
        let resolved = match (self.handlers.get(&self.group_id), name) {
            (None, _) => None,
            (Some(HandlerEntry::Single(behavior)), None) => Some(behavior),
            (Some(HandlerEntry::Single(_)), Some(requested)) => {
                return Err(ErrorInfo::new(
                    "named-on-single",
                    "group carries a single anonymous handler; named lookup is not possible",
                )
                .with_context("group", self.group_id.as_str())
                .with_context("handler", requested)
                .with_hint("register named handlers for this group via `add_handler`")
                .into());
            }
            (Some(HandlerEntry::Named { default, .. }), None) => match default {
                Some(behavior) => Some(behavior),
                None => {
                    return Err(ErrorInfo::new(
                        "default-missing",
                        "group has no default handler",
                    )
                    .with_context("group", self.group_id.as_str())
                    .with_hint("dispatch by name, or register a single handler for the group")
                    .into());
                }
            },
            (Some(HandlerEntry::Named { by_name, .. }), Some(requested)) => by_name.get(requested),
        };
        Ok(resolved)
    }
}
