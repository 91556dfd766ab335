//! Typed signal/slot system
//!
//! Key principles:
//! - One `Signal` per event kind, carrying a typed argument
//! - Subscribers execute in subscription order
//! - Subscriptions are RAII tokens (`Slot`) that revoke exactly once
//! - Revocation is synchronous: a dropped slot never runs again, even if
//!   it was revoked in the middle of a dispatch already in flight
//!
//! The engine is single-threaded and cooperative; signals are `Rc`-based
//! and handlers may legally re-enter the scene graph (connect, disconnect,
//! edit nodes) while a dispatch is running.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// A typed event source with an ordered list of subscribers.
///
/// `A` is the argument tuple delivered to every callback. Callbacks are
/// stored behind `Rc` so a dispatch can run them without holding a borrow
/// of the subscriber list, which keeps re-entrant scene edits legal.
pub struct Signal<A> {
    inner: Rc<Inner<A>>,
}

struct Inner<A> {
    next_id: Cell<u64>,
    callbacks: RefCell<Vec<Callback<A>>>,
}

struct Callback<A> {
    id: u64,
    f: Rc<dyn Fn(&A)>,
}

/// Revocation half of a signal, type-erased so `Slot` can be stored
/// uniformly regardless of the signal's argument type.
trait Revoke {
    fn revoke(&self, id: u64);
}

impl<A> Revoke for Inner<A> {
    fn revoke(&self, id: u64) {
        self.callbacks.borrow_mut().retain(|callback| callback.id != id);
    }
}

impl<A: 'static> Signal<A> {
    /// Create a signal with no subscribers
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner {
                next_id: Cell::new(0),
                callbacks: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Register a callback; it runs on every `execute` until the returned
    /// `Slot` is dropped or disconnected.
    pub fn connect(&self, f: impl Fn(&A) + 'static) -> Slot {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.callbacks.borrow_mut().push(Callback {
            id,
            f: Rc::new(f),
        });

        let weak: Weak<Inner<A>> = Rc::downgrade(&self.inner);
        let weak: Weak<dyn Revoke> = weak;
        Slot { signal: weak, id }
    }

    /// Run all subscribers, in subscription order.
    ///
    /// Callbacks connected during the dispatch do not run in this dispatch;
    /// callbacks revoked during the dispatch are skipped. The subscriber
    /// list is never borrowed across a callback invocation, so handlers may
    /// re-enter freely.
    pub fn execute(&self, args: &A) {
        let ids: Vec<u64> = self
            .inner
            .callbacks
            .borrow()
            .iter()
            .map(|callback| callback.id)
            .collect();

        for id in ids {
            let f = self
                .inner
                .callbacks
                .borrow()
                .iter()
                .find(|callback| callback.id == id)
                .map(|callback| callback.f.clone());

            if let Some(f) = f {
                f(args);
            }
        }
    }

    /// Number of live subscribers
    pub fn num_callbacks(&self) -> usize {
        self.inner.callbacks.borrow().len()
    }
}

impl<A: 'static> Default for Signal<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Subscription token returned by [`Signal::connect`].
///
/// Revokes the subscription exactly once, on drop or via
/// [`Slot::disconnect`]. Holding only a weak reference to the signal, a
/// slot outliving its signal is a harmless no-op on drop.
pub struct Slot {
    signal: Weak<dyn Revoke>,
    id: u64,
}

impl Slot {
    /// Revoke the subscription now instead of at drop time
    pub fn disconnect(self) {
        // Drop does the work.
    }
}

impl Drop for Slot {
    fn drop(&mut self) {
        if let Some(signal) = self.signal.upgrade() {
            signal.revoke(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribers_run_in_subscription_order() {
        let signal: Signal<i32> = Signal::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let order_a = order.clone();
        let _slot_a = signal.connect(move |value| order_a.borrow_mut().push(('a', *value)));
        let order_b = order.clone();
        let _slot_b = signal.connect(move |value| order_b.borrow_mut().push(('b', *value)));

        signal.execute(&7);

        assert_eq!(*order.borrow(), vec![('a', 7), ('b', 7)]);
    }

    #[test]
    fn test_dropped_slot_stops_receiving() {
        let signal: Signal<()> = Signal::new();
        let count = Rc::new(Cell::new(0));

        let count_inner = count.clone();
        let slot = signal.connect(move |()| count_inner.set(count_inner.get() + 1));

        signal.execute(&());
        assert_eq!(count.get(), 1);

        drop(slot);
        signal.execute(&());
        assert_eq!(count.get(), 1);
        assert_eq!(signal.num_callbacks(), 0);
    }

    #[test]
    fn test_revocation_during_dispatch_is_synchronous() {
        let signal: Rc<Signal<()>> = Rc::new(Signal::new());
        let count = Rc::new(Cell::new(0));

        // The first subscriber revokes the second mid-dispatch; the second
        // must not run afterwards.
        let victim: Rc<RefCell<Option<Slot>>> = Rc::new(RefCell::new(None));

        let victim_inner = victim.clone();
        let _killer = signal.connect(move |()| {
            victim_inner.borrow_mut().take();
        });

        let count_inner = count.clone();
        let slot = signal.connect(move |()| count_inner.set(count_inner.get() + 1));
        *victim.borrow_mut() = Some(slot);

        signal.execute(&());
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_connect_during_dispatch_does_not_run_in_that_dispatch() {
        let signal: Rc<Signal<()>> = Rc::new(Signal::new());
        let count = Rc::new(Cell::new(0));
        let late_slot: Rc<RefCell<Option<Slot>>> = Rc::new(RefCell::new(None));

        let signal_inner = signal.clone();
        let count_inner = count.clone();
        let late_inner = late_slot.clone();
        let _slot = signal.connect(move |()| {
            let count_late = count_inner.clone();
            let slot = signal_inner.connect(move |()| count_late.set(count_late.get() + 1));
            *late_inner.borrow_mut() = Some(slot);
        });

        signal.execute(&());
        assert_eq!(count.get(), 0);

        signal.execute(&());
        assert_eq!(count.get(), 1);
    }
}
