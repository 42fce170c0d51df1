use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Token identifying one subscription on one signal.
///
/// Closures have no identity of their own, so `subscribe` hands back a token
/// and `unsubscribe` takes it. Unsubscribing a token that was already removed
/// (or never belonged to this signal) is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<T> = Rc<RefCell<dyn FnMut(&T, Option<&T>)>>;

struct Inner<T> {
    value: RefCell<Option<T>>,
    listeners: RefCell<Vec<(SubscriptionId, Callback<T>)>>,
    next_id: Cell<u64>,
}

/// A single observable value cell with equality-gated notification.
///
/// `set` only notifies when the new value differs (`PartialEq`) from the
/// current one; listeners run synchronously, in subscription order, with
/// `(&new, Option<&previous>)`. The listener list is snapshotted before
/// notification, so a listener may subscribe or unsubscribe during a
/// notification without upsetting iteration; such changes take effect from
/// the next `set`.
///
/// Cloning a `Signal` clones the handle, not the cell.
pub struct Signal<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + PartialEq> Signal<T> {
    /// An empty cell; `get` returns `None` until the first `set`.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner {
                value: RefCell::new(None),
                listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// A cell seeded with an initial value. No notification fires for it.
    pub fn with(initial: T) -> Self {
        let signal = Self::new();
        *signal.inner.value.borrow_mut() = Some(initial);
        signal
    }

    pub fn get(&self) -> Option<T> {
        self.inner.value.borrow().clone()
    }

    /// Store `next` and notify, unless it equals the current value.
    pub fn set(&self, next: T) {
        let prev = {
            let mut value = self.inner.value.borrow_mut();
            if value.as_ref() == Some(&next) {
                return;
            }
            value.replace(next.clone())
        };

        let snapshot: Vec<Callback<T>> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        for callback in snapshot {
            (callback.borrow_mut())(&next, prev.as_ref());
        }
    }

    /// Compute the next value from the current one, then behave as `set`.
    pub fn update(&self, f: impl FnOnce(Option<&T>) -> T) {
        let current = self.get();
        self.set(f(current.as_ref()));
    }

    pub fn subscribe(&self, listener: impl FnMut(&T, Option<&T>) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(RefCell::new(listener))));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner
            .listeners
            .borrow_mut()
            .retain(|(entry_id, _)| *entry_id != id);
    }

    /// Handle identity: do the two signals share the same cell?
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone + PartialEq> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}
