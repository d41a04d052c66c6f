//! Hook taxonomy and the owner-scoped event bus.
mod bus;
mod event;

pub use bus::{Dispatch, EventBus, HookFlow, HookResult, SubscriptionId};
pub use event::{EventName, GameEvent, SkillRef};
