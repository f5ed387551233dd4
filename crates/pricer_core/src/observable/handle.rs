//! Shared, relinkable references to market data.

use std::fmt;
use std::sync::{Arc, RwLock, Weak};

use super::observer::{Observable, Observe, Observer};

struct Link<T: ?Sized> {
    target: RwLock<Option<Arc<T>>>,
    relay: Arc<Observable>,
}

/// Shared pointer to a collaborator that may be absent or swapped later.
///
/// Clones of a handle share the same link: relinking through one clone is
/// seen by all of them. The handle forwards notifications from its current
/// target, and notifies on relink, so dependents registered on
/// [`Handle::observable`] do not need to track which target is current.
pub struct Handle<T: ?Sized> {
    link: Arc<Link<T>>,
}

impl<T: ?Sized> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            link: Arc::clone(&self.link),
        }
    }
}

impl<T: ?Sized + Observe> Default for Handle<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: ?Sized + Observe> Handle<T> {
    /// Creates a handle with no target.
    pub fn empty() -> Self {
        Self {
            link: Arc::new(Link {
                target: RwLock::new(None),
                relay: Arc::new(Observable::new()),
            }),
        }
    }

    /// Creates a handle pointing at `target`.
    pub fn new(target: Arc<T>) -> Self {
        let handle = Self::empty();
        target.observable().register_observer(handle.relay_weak());
        if let Ok(mut slot) = handle.link.target.write() {
            *slot = Some(target);
        }
        handle
    }

    fn relay_weak(&self) -> Weak<dyn Observer> {
        let weak: Weak<dyn Observer> = Arc::downgrade(&self.link.relay) as Weak<dyn Observer>;
        weak
    }

    /// Current target, if any.
    pub fn current(&self) -> Option<Arc<T>> {
        match self.link.target.read() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Whether the handle has no target.
    pub fn is_empty(&self) -> bool {
        self.current().is_none()
    }

    /// Points the handle at a new target (or at nothing) and notifies
    /// dependents.
    pub fn link_to(&self, target: Option<Arc<T>>) {
        let relay = self.relay_weak();
        {
            let mut slot = match self.link.target.write() {
                Ok(slot) => slot,
                Err(poisoned) => poisoned.into_inner(),
            };
            if let Some(old) = slot.as_ref() {
                old.observable().unregister_observer(&relay);
            }
            if let Some(new) = target.as_ref() {
                new.observable().register_observer(relay);
            }
            *slot = target;
        }
        self.link.relay.notify_observers();
    }

    /// Notifier firing when the target changes or is relinked.
    pub fn observable(&self) -> &Observable {
        &self.link.relay
    }

    /// The notifier as a registrable observer, for chaining into another
    /// [`Observable`].
    pub fn relay(&self) -> Weak<dyn Observer> {
        self.relay_weak()
    }
}

impl<T: ?Sized> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let linked = self
            .link
            .target
            .read()
            .map(|slot| slot.is_some())
            .unwrap_or(false);
        f.debug_struct("Handle").field("linked", &linked).finish()
    }
}
