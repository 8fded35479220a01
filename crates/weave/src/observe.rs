//! Batched change notification.
//!
//! An [`Observable`] counts recorded changes (`update_version`) and the last
//! version its observers were told about (`notification_version`). Recording a
//! change queues the observable on a [`ChangeTracker`] together with the
//! changed subject; a drain cycle then hands each dirty subject to its
//! observers once, however many times it was queued.
//!
//! Objects of the model are observed as [`WObject`]s, the default subject.
//! Any other cloneable handle can be a subject too.
//!
//! # Examples
//!
//! ```
//! use std::{cell::Cell, rc::Rc};
//!
//! use weave::observe::{ChangeTracker, Observable};
//!
//! let tracker = ChangeTracker::new();
//! let price = Rc::new(Cell::new(0.0));
//! let observable: Observable<Rc<Cell<f64>>> = Observable::new();
//! let seen = Rc::new(Cell::new(0.0));
//!
//! let last = Rc::clone(&seen);
//! observable.attach(Rc::new(move |price: &Rc<Cell<f64>>| last.set(price.get())));
//!
//! price.set(66.0);
//! observable.record_change(&tracker, Rc::clone(&price));
//! price.set(77.0);
//! observable.record_change(&tracker, Rc::clone(&price));
//! assert_eq!(tracker.drain_pending(), 1);
//!
//! assert_eq!(seen.get(), 77.0);
//! ```

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use log::{debug, trace};

use crate::object::WObject;

/// Receives the subjects that changed on the observables it is attached to.
pub trait Observer<S = WObject> {
    fn notify(&self, subject: &S);
}

impl<S, F> Observer<S> for F
where
    F: Fn(&S),
{
    fn notify(&self, subject: &S) {
        self(subject)
    }
}

struct ObservableState<S> {
    observers: RefCell<Vec<Rc<dyn Observer<S>>>>,
    update_version: Cell<u64>,
    notification_version: Cell<u64>,
}

/// Change tracking for a subject of type `S`. Cloning yields another handle
/// to the same state.
pub struct Observable<S = WObject>(Rc<ObservableState<S>>);

impl<S> Clone for Observable<S> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<S> Default for Observable<S> {
    fn default() -> Self {
        Self(Rc::new(ObservableState {
            observers: RefCell::new(Vec::new()),
            update_version: Cell::new(0),
            notification_version: Cell::new(0),
        }))
    }
}

impl<S> Observable<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer. Observers are notified in attachment order.
    pub fn attach(&self, observer: Rc<dyn Observer<S>>) {
        self.0.observers.borrow_mut().push(observer);
    }

    pub fn observer_count(&self) -> usize {
        self.0.observers.borrow().len()
    }

    pub fn update_version(&self) -> u64 {
        self.0.update_version.get()
    }

    pub fn notification_version(&self) -> u64 {
        self.0.notification_version.get()
    }

    /// Whether a change was recorded since observers were last notified.
    pub fn is_dirty(&self) -> bool {
        self.notification_version() < self.update_version()
    }

    /// Whether both handles refer to the same state.
    pub fn ptr_eq(&self, other: &Observable<S>) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Hand `subject` to every observer if a change is pending. Returns
    /// whether a notification was delivered.
    ///
    /// Observers and the current version are captured first, so observers
    /// attached or changes recorded during delivery wait for the next cycle.
    pub fn notify_observers(&self, subject: &S) -> bool {
        if !self.is_dirty() {
            return false;
        }

        let observers = self.0.observers.borrow().clone();
        let version = self.update_version();
        for observer in &observers {
            observer.notify(subject);
        }
        self.0.notification_version.set(version);
        true
    }
}

impl<S: 'static> Observable<S> {
    /// Mark `subject` changed and queue it on `tracker`.
    ///
    /// The subject is queued on every call; repeated entries collapse when
    /// the queue is drained.
    pub fn record_change(&self, tracker: &ChangeTracker, subject: S) {
        let version = self.0.update_version.get() + 1;
        self.0.update_version.set(version);
        tracker.enqueue(Box::new(Queued {
            observable: self.clone(),
            subject,
        }));
        trace!(version; "Recorded change");
    }
}

impl<S> fmt::Debug for Observable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("observers", &self.observer_count())
            .field("update_version", &self.update_version())
            .field("notification_version", &self.notification_version())
            .finish()
    }
}

/// A queue entry whose subject type has been erased.
trait Pending {
    fn deliver(&self) -> bool;
}

struct Queued<S> {
    observable: Observable<S>,
    subject: S,
}

impl<S> Pending for Queued<S> {
    fn deliver(&self) -> bool {
        self.observable.notify_observers(&self.subject)
    }
}

/// Queue of subjects that may have changed.
#[derive(Default)]
pub struct ChangeTracker {
    pending: RefCell<Vec<Box<dyn Pending>>>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn enqueue(&self, entry: Box<dyn Pending>) {
        self.pending.borrow_mut().push(entry);
    }

    /// Number of queued entries, duplicates included.
    pub fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Run one notification cycle.
    ///
    /// Takes the current queue and notifies each entry in enqueue order.
    /// Entries queued while observers run stay queued for the next cycle.
    /// Returns how many observables delivered a notification.
    pub fn drain_pending(&self) -> usize {
        let pending = self.pending.take();
        let queued = pending.len();
        let delivered = pending.iter().filter(|entry| entry.deliver()).count();
        debug!(queued, delivered, requeued = self.pending_len(); "Drained pending changes");
        delivered
    }
}

impl fmt::Debug for ChangeTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeTracker")
            .field("pending", &self.pending_len())
            .finish()
    }
}
