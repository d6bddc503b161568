//! Ordered observer registry used for the selection and path-ready channels.
//!
//! Dispatch is synchronous and follows registration order. The listener list
//! is snapshotted before any callback runs, so a callback may register or
//! remove listeners (including itself) while a dispatch is in progress:
//! additions and removals take effect from the next dispatch on.
//!
//! A listener added with [`Listeners::add_while`] unregisters itself by
//! returning `false`; subscribers holding a `Weak` handle use this to drop
//! out once their target is gone.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Handle returned by [`Listeners::add`], used to unregister.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Callback<E> = Rc<dyn Fn(&E) -> bool>;

/// An ordered list of callbacks for events of type `E`.
pub struct Listeners<E> {
    entries: RefCell<Vec<(ListenerId, Callback<E>)>>,
    next_id: Cell<u64>,
}

impl<E> Listeners<E> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    /// Register a callback. It will be invoked after every callback
    /// registered before it.
    pub fn add(&self, callback: impl Fn(&E) + 'static) -> ListenerId {
        self.add_while(move |event| {
            callback(event);
            true
        })
    }

    /// Register a callback that stays registered for as long as it returns
    /// `true`.
    pub fn add_while(&self, callback: impl Fn(&E) -> bool + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.entries.borrow_mut().push((id, Rc::new(callback)));
        id
    }

    /// Unregister a callback. Returns `false` if `id` was not registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(eid, _)| *eid != id);
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Invoke every registered callback with `event`, in registration order.
    ///
    /// Returns the number of callbacks invoked. Callbacks that asked to be
    /// dropped are removed once every callback has run.
    pub fn dispatch(&self, event: &E) -> usize {
        let snapshot: Vec<(ListenerId, Callback<E>)> = self
            .entries
            .borrow()
            .iter()
            .map(|(id, cb)| (*id, Rc::clone(cb)))
            .collect();
        let expired: Vec<ListenerId> = snapshot
            .iter()
            .filter(|(_, cb)| !cb(event))
            .map(|(id, _)| *id)
            .collect();
        if !expired.is_empty() {
            self.entries
                .borrow_mut()
                .retain(|(id, _)| !expired.contains(id));
        }
        snapshot.len()
    }
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.len())
            .finish()
    }
}
