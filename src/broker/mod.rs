pub mod engine;
pub mod event;
pub mod sweeper;

pub use engine::{Broker, ClientGuard, SharedBroker, lock_broker};
pub use event::{DeleteReason, HubEvent};
