//! Subscription registry for config change notifications.
//!
//! Callbacks run synchronously on the mutating call. Each one is isolated:
//! a panicking listener is logged and the remaining listeners still run.

use crate::schema::ConfigSection;
use crate::value::{ConfigKey, ConfigValue, SectionValue};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::{Rc, Weak};
use tracing::error;

type LeafCallback = Rc<dyn Fn(&ConfigValue, &ConfigValue)>;
type SectionCallback = Rc<dyn Fn(&SectionValue, &SectionValue)>;

enum Listener {
    Leaf { key: ConfigKey, callback: LeafCallback },
    Section { section: ConfigSection, callback: SectionCallback },
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: BTreeMap<u64, Listener>,
}

/// Registered listeners, keyed by subscription id.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    inner: Rc<RefCell<Registry>>,
}

impl ListenerRegistry {
    fn register(&self, listener: Listener) -> Subscription {
        let mut registry = self.inner.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.insert(id, listener);
        Subscription {
            registry: Rc::downgrade(&self.inner),
            id,
        }
    }

    pub(crate) fn subscribe<F>(&self, key: ConfigKey, callback: F) -> Subscription
    where
        F: Fn(&ConfigValue, &ConfigValue) + 'static,
    {
        self.register(Listener::Leaf {
            key,
            callback: Rc::new(callback),
        })
    }

    pub(crate) fn subscribe_section<F>(&self, section: ConfigSection, callback: F) -> Subscription
    where
        F: Fn(&SectionValue, &SectionValue) + 'static,
    {
        self.register(Listener::Section {
            section,
            callback: Rc::new(callback),
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Leaf listeners bound to `key`, in registration order.
    pub(crate) fn leaf_listeners(&self, key: ConfigKey) -> Vec<LeafCallback> {
        self.inner
            .borrow()
            .listeners
            .values()
            .filter_map(|listener| match listener {
                Listener::Leaf { key: bound, callback } if *bound == key => {
                    Some(Rc::clone(callback))
                },
                _ => None,
            })
            .collect()
    }

    /// Every leaf listener with its key, in registration order.
    pub(crate) fn all_leaf_listeners(&self) -> Vec<(ConfigKey, LeafCallback)> {
        self.inner
            .borrow()
            .listeners
            .values()
            .filter_map(|listener| match listener {
                Listener::Leaf { key, callback } => Some((*key, Rc::clone(callback))),
                Listener::Section { .. } => None,
            })
            .collect()
    }

    /// Section listeners bound to `section`, in registration order.
    pub(crate) fn section_listeners(&self, section: ConfigSection) -> Vec<SectionCallback> {
        self.inner
            .borrow()
            .listeners
            .values()
            .filter_map(|listener| match listener {
                Listener::Section { section: bound, callback } if *bound == section => {
                    Some(Rc::clone(callback))
                },
                _ => None,
            })
            .collect()
    }

    /// Sections with at least one section listener.
    pub(crate) fn subscribed_sections(&self) -> Vec<ConfigSection> {
        let mut sections: Vec<ConfigSection> = self
            .inner
            .borrow()
            .listeners
            .values()
            .filter_map(|listener| match listener {
                Listener::Section { section, .. } => Some(*section),
                Listener::Leaf { .. } => None,
            })
            .collect();
        sections.sort_unstable();
        sections.dedup();
        sections
    }
}

/// Run a leaf callback, containing any panic.
pub(crate) fn invoke_leaf(callback: &LeafCallback, key: ConfigKey, new: &ConfigValue, old: &ConfigValue) {
    if catch_unwind(AssertUnwindSafe(|| callback(new, old))).is_err() {
        error!(target: "hwt::config", key = %key, "config listener panicked");
    }
}

/// Run a section callback, containing any panic.
pub(crate) fn invoke_section(callback: &SectionCallback, section: ConfigSection, value: &SectionValue) {
    if catch_unwind(AssertUnwindSafe(|| callback(value, value))).is_err() {
        error!(target: "hwt::config", section = %section, "section listener panicked");
    }
}

/// Handle returned by `subscribe`; removes the listener on
/// [`unsubscribe`](Subscription::unsubscribe).
///
/// Dropping the handle leaves the listener registered.
#[must_use = "dropping a Subscription keeps the listener registered; keep it to unsubscribe later"]
#[derive(Debug, Clone)]
pub struct Subscription {
    registry: Weak<RefCell<Registry>>,
    id: u64,
}

impl Subscription {
    /// Remove the listener. Calling it again, or after the store is gone,
    /// does nothing.
    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().listeners.remove(&self.id);
        }
    }

    /// Returns true while the listener is still registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.borrow().listeners.contains_key(&self.id))
    }
}
