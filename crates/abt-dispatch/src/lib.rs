#![deny(missing_docs)]
#![doc = "Group classification and handler dispatch for experiment rollouts."]

mod dispatcher;
mod handler;

pub use dispatcher::{ClassifyFn, GateFn, GroupDispatcher, GroupDispatcherBuilder};
pub use handler::{noop, Handler, HandlerEntry, HandlerTable, RunContext};

pub use abt_core::{ConfigError, ErrorInfo, GroupId, GroupSet, UserId};
