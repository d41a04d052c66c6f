//! Owner-scoped publish/subscribe dispatcher.
//!
//! The bus is an explicit value created by the host and lent to every skill
//! and progression track operation; there is no process-wide instance.
//! Subscriptions are keyed by `"<prefix><owner>.<event>"` so listeners of one
//! owner never observe another owner's events.

use std::fmt;

use tracing::{trace, warn};

use crate::config::SkillsConfig;
use crate::error::HookError;
use crate::state::EntityId;

use super::{EventName, GameEvent};

/// What a handler asks the publisher to do next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HookFlow {
    #[default]
    Continue,
    /// Rejects the transition. Only honoured for events documented as
    /// vetoable (validate success and the execute gate).
    Veto,
}

pub type HookResult = Result<HookFlow, HookError>;

type Handler = Box<dyn Fn(&GameEvent) -> HookResult + Send + Sync>;

/// Handle returned by every subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// Outcome of one publication.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Dispatch {
    pub delivered: usize,
    pub failures: usize,
    pub vetoed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum KeyPattern {
    Exact(String),
    /// Every key starting with `"<scope>."`.
    Scope(String),
}

impl KeyPattern {
    fn matches(&self, key: &str) -> bool {
        match self {
            Self::Exact(expected) => expected == key,
            Self::Scope(scope) => key
                .strip_prefix(scope.as_str())
                .is_some_and(|rest| rest.starts_with('.')),
        }
    }
}

struct Subscription {
    id: SubscriptionId,
    pattern: KeyPattern,
    remove_key: Option<String>,
    handler: Handler,
}

/// Sequential, owner-scoped event dispatcher.
pub struct EventBus {
    prefix: String,
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

impl EventBus {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next_id: 0,
            subscriptions: Vec::new(),
        }
    }

    pub fn from_config(config: &SkillsConfig) -> Self {
        Self::new(config.scope_prefix.clone())
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Scope shared by every event of `owner` (`id7`).
    pub fn owner_scope(&self, owner: EntityId) -> String {
        format!("{}{}", self.prefix, owner.0)
    }

    /// Full key of one owner event (`id7.level_up`).
    pub fn event_key(&self, owner: EntityId, name: EventName) -> String {
        format!("{}{}.{}", self.prefix, owner.0, name)
    }

    /// Subscribes `handler` to an exact event key.
    pub fn subscribe<F>(&mut self, key: impl Into<String>, handler: F) -> SubscriptionId
    where
        F: Fn(&GameEvent) -> HookResult + Send + Sync + 'static,
    {
        self.register(KeyPattern::Exact(key.into()), None, Box::new(handler))
    }

    /// Subscribes `handler` under a removal key shared by related subscriptions.
    ///
    /// Every subscription registered with the same `remove_key` can be dropped
    /// at once with [`EventBus::unsubscribe_by_remove_key`].
    pub fn subscribe_with_key<F>(
        &mut self,
        key: impl Into<String>,
        handler: F,
        remove_key: impl Into<String>,
    ) -> SubscriptionId
    where
        F: Fn(&GameEvent) -> HookResult + Send + Sync + 'static,
    {
        self.register(
            KeyPattern::Exact(key.into()),
            Some(remove_key.into()),
            Box::new(handler),
        )
    }

    /// Subscribes `handler` to one event of one owner.
    pub fn on<F>(&mut self, owner: EntityId, name: EventName, handler: F) -> SubscriptionId
    where
        F: Fn(&GameEvent) -> HookResult + Send + Sync + 'static,
    {
        let key = self.event_key(owner, name);
        self.subscribe(key, handler)
    }

    /// Subscribes `handler` to every event published for `owner`.
    pub fn subscribe_scope<F>(&mut self, owner: EntityId, handler: F) -> SubscriptionId
    where
        F: Fn(&GameEvent) -> HookResult + Send + Sync + 'static,
    {
        let scope = self.owner_scope(owner);
        self.register(KeyPattern::Scope(scope), None, Box::new(handler))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|subscription| subscription.id != id);
        before != self.subscriptions.len()
    }

    /// Removes every subscription registered under `remove_key`.
    pub fn unsubscribe_by_remove_key(&mut self, remove_key: &str) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions
            .retain(|subscription| subscription.remove_key.as_deref() != Some(remove_key));
        before - self.subscriptions.len()
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Publishes `event` under its owner-scoped key.
    pub fn emit(&self, event: &GameEvent) -> Dispatch {
        let key = self.event_key(event.owner(), event.name());
        self.publish(&key, event)
    }

    /// Runs every handler matching `key` in subscription order.
    ///
    /// Handler errors are logged and counted; the remaining handlers still run.
    pub fn publish(&self, key: &str, event: &GameEvent) -> Dispatch {
        let mut dispatch = Dispatch::default();

        for subscription in self
            .subscriptions
            .iter()
            .filter(|subscription| subscription.pattern.matches(key))
        {
            dispatch.delivered += 1;
            match (subscription.handler)(event) {
                Ok(HookFlow::Continue) => {}
                Ok(HookFlow::Veto) => dispatch.vetoed = true,
                Err(error) => {
                    dispatch.failures += 1;
                    warn!(
                        target: "rpg::events",
                        key,
                        subscription = subscription.id.0,
                        error = %error,
                        "event handler failed"
                    );
                }
            }
        }

        trace!(
            target: "rpg::events",
            key,
            delivered = dispatch.delivered,
            vetoed = dispatch.vetoed,
            "event published"
        );
        dispatch
    }

    fn register(
        &mut self,
        pattern: KeyPattern,
        remove_key: Option<String>,
        handler: Handler,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            pattern,
            remove_key,
            handler,
        });
        id
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(SkillsConfig::DEFAULT_SCOPE_PREFIX)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("prefix", &self.prefix)
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}
