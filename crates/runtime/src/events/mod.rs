//! Topic-based event stream for runtime events.
//!
//! Core events are published on the simulation's owner-scoped bus; this
//! module fans them out to async consumers (network mirrors, UIs, tests)
//! grouped by topic.

mod delegate;
mod stream;

pub use delegate::StreamDelegate;
pub use stream::{Event, EventStream, Topic};
