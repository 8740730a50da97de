//! Application layer module
//!
//! Use cases that orchestrate the domain: the snapshot store shared by the
//! poller and the admin command, the change poller, the command dispatcher,
//! and the application context that composes them.

pub mod dispatcher;
pub mod poller;
pub mod shared_state;
pub mod state;

pub use dispatcher::{Command, CommandDispatcher, CommandError, Invocation, ParseCommandError, Reply, ReplyContent};
pub use poller::{ChangePoller, PollerHandle, TickOutcome};
pub use shared_state::{PollerState, SnapshotStore};
pub use state::AppContext;
