//! Observable / observer primitives and the dirty flag.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Receiver of change notifications.
///
/// Implementations must only record the change; recomputation is deferred
/// to the next read of the dependent result.
pub trait Observer: Send + Sync {
    /// Called when an upstream collaborator changed.
    fn update(&self);
}

/// Access to the notifier of a market-data object.
///
/// Collaborators that can change after construction (quotes, volatility
/// structures) expose their [`Observable`] so that handles and pricers can
/// register with them.
pub trait Observe {
    /// Returns the notifier that fires when this object changes.
    fn observable(&self) -> &Observable;
}

/// List of dependents to notify on change.
///
/// Dependents are held through [`Weak`] references: the observable never
/// keeps a dependent alive, and dead entries are pruned on notification.
///
/// An `Observable` is itself an [`Observer`] which forwards every
/// notification to its own dependents. Pricers and handles use this to
/// relay changes along the dependency graph.
#[derive(Default)]
pub struct Observable {
    observers: Mutex<Vec<Weak<dyn Observer>>>,
}

impl Observable {
    /// Creates an observable with no dependents.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Weak<dyn Observer>>> {
        // A panic inside another lock holder cannot leave the list in an
        // inconsistent state, so a poisoned lock is still usable.
        self.observers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers a dependent. Registering the same dependent twice is a no-op.
    ///
    /// Dropped dependents are pruned on every registration.
    pub fn register_observer(&self, observer: Weak<dyn Observer>) {
        let mut observers = self.lock();
        observers.retain(|o| o.strong_count() > 0);
        if !observers.iter().any(|o| Weak::ptr_eq(o, &observer)) {
            observers.push(observer);
        }
    }

    /// Removes a previously registered dependent.
    pub fn unregister_observer(&self, observer: &Weak<dyn Observer>) {
        self.lock().retain(|o| !Weak::ptr_eq(o, observer));
    }

    /// Number of live dependents.
    pub fn observer_count(&self) -> usize {
        self.lock().iter().filter(|o| o.strong_count() > 0).count()
    }

    /// Notifies every live dependent and prunes dropped ones.
    ///
    /// The dependent list is released before the callbacks run, so an
    /// observer may register or unregister from within `update`.
    pub fn notify_observers(&self) {
        let live: Vec<Arc<dyn Observer>> = {
            let mut observers = self.lock();
            observers.retain(|o| o.strong_count() > 0);
            observers.iter().filter_map(Weak::upgrade).collect()
        };
        tracing::trace!(observers = live.len(), "notifying observers");
        for observer in live {
            observer.update();
        }
    }
}

impl Observer for Observable {
    fn update(&self) {
        self.notify_observers();
    }
}

impl fmt::Debug for Observable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("observers", &self.observer_count())
            .finish()
    }
}

/// Observer that raises a flag when notified.
///
/// Owners of lazily computed results (coupons) hold one of these, register
/// it upstream, and check it before serving a cached value. A new flag
/// starts dirty so the first read always computes.
#[derive(Debug)]
pub struct DirtyFlag {
    dirty: AtomicBool,
}

impl DirtyFlag {
    /// Creates a shared flag in the dirty state.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            dirty: AtomicBool::new(true),
        })
    }

    /// Whether a change was recorded since the last [`clear`](Self::clear).
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Raises the flag.
    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Lowers the flag, returning whether it was raised.
    pub fn clear(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }
}

impl Observer for DirtyFlag {
    fn update(&self) {
        self.mark_dirty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct Counter(AtomicUsize);

    impl Observer for Counter {
        fn update(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn as_observer<T: Observer + 'static>(arc: &Arc<T>) -> Weak<dyn Observer> {
        let weak: Weak<dyn Observer> = Arc::downgrade(arc) as Weak<dyn Observer>;
        weak
    }

    #[test]
    fn test_notify_reaches_registered_observers() {
        let observable = Observable::new();
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        observable.register_observer(as_observer(&counter));

        observable.notify_observers();
        observable.notify_observers();
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_duplicate_registration_is_ignored() {
        let observable = Observable::new();
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        observable.register_observer(as_observer(&counter));
        observable.register_observer(as_observer(&counter));

        assert_eq!(observable.observer_count(), 1);
        observable.notify_observers();
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unregister() {
        let observable = Observable::new();
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        let weak = as_observer(&counter);
        observable.register_observer(weak.clone());
        observable.unregister_observer(&weak);

        observable.notify_observers();
        assert_eq!(counter.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_dropped_observers_are_pruned() {
        let observable = Observable::new();
        {
            let counter = Arc::new(Counter(AtomicUsize::new(0)));
            observable.register_observer(as_observer(&counter));
            assert_eq!(observable.observer_count(), 1);
        }
        observable.notify_observers();
        assert_eq!(observable.observer_count(), 0);
    }

    #[test]
    fn test_registration_prunes_dropped_observers() {
        let observable = Observable::new();
        for _ in 0..100 {
            let counter = Arc::new(Counter(AtomicUsize::new(0)));
            observable.register_observer(as_observer(&counter));
        }
        let kept = Arc::new(Counter(AtomicUsize::new(0)));
        observable.register_observer(as_observer(&kept));

        assert_eq!(observable.lock().len(), 1);
        assert_eq!(observable.observer_count(), 1);
    }

    #[test]
    fn test_observable_relays_notifications() {
        let upstream = Observable::new();
        let relay = Arc::new(Observable::new());
        let flag = DirtyFlag::new();
        flag.clear();

        upstream.register_observer(as_observer(&relay));
        relay.register_observer(as_observer(&flag));

        upstream.notify_observers();
        assert!(flag.is_dirty());
    }

    #[test]
    fn test_dirty_flag_lifecycle() {
        let flag = DirtyFlag::new();
        assert!(flag.is_dirty());
        assert!(flag.clear());
        assert!(!flag.is_dirty());
        assert!(!flag.clear());

        flag.update();
        assert!(flag.is_dirty());
    }
}
