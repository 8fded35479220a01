use std::{cell::Cell, rc::Rc};

use weave::observe::{ChangeTracker, Observable, Observer};

/// A priced instrument that reports price changes.
#[derive(Clone)]
struct Instrument(Rc<InstrumentData>);

struct InstrumentData {
    price: Cell<f64>,
    observable: Observable<Instrument>,
}

impl Instrument {
    fn new() -> Self {
        Self(Rc::new(InstrumentData {
            price: Cell::new(0.0),
            observable: Observable::new(),
        }))
    }

    fn price(&self) -> f64 {
        self.0.price.get()
    }

    fn set_price(&self, tracker: &ChangeTracker, price: f64) {
        self.0.price.set(price);
        self.0.observable.record_change(tracker, self.clone());
    }

    fn attach(&self, observer: Rc<dyn Observer<Instrument>>) {
        self.0.observable.attach(observer);
    }
}

#[derive(Default)]
struct Controller {
    notifications: Cell<usize>,
    last_price: Cell<f64>,
}

impl Observer<Instrument> for Controller {
    fn notify(&self, instrument: &Instrument) {
        self.notifications.set(self.notifications.get() + 1);
        self.last_price.set(instrument.price());
    }
}

#[test]
fn test_repeated_changes_notify_once() {
    let tracker = ChangeTracker::new();
    let i0 = Instrument::new();
    let i1 = Instrument::new();
    let controller = Rc::new(Controller::default());
    i0.attach(controller.clone());
    i1.attach(controller.clone());

    i0.set_price(&tracker, 66.0);
    i0.set_price(&tracker, 77.0);
    assert_eq!(controller.notifications.get(), 0);

    tracker.drain_pending();
    assert_eq!(controller.notifications.get(), 1);
    assert_eq!(controller.last_price.get(), 77.0);

    tracker.drain_pending();
    assert_eq!(controller.notifications.get(), 1);
}

#[test]
fn test_three_changes_one_notification() {
    let tracker = ChangeTracker::new();
    let instrument = Instrument::new();
    let controller = Rc::new(Controller::default());
    instrument.attach(controller.clone());

    for price in [1.0, 2.0, 3.0] {
        instrument.set_price(&tracker, price);
    }

    assert_eq!(tracker.drain_pending(), 1);
    assert_eq!(controller.notifications.get(), 1);
    assert_eq!(controller.last_price.get(), 3.0);
    assert_eq!(tracker.drain_pending(), 0);
    assert_eq!(controller.notifications.get(), 1);
}

#[test]
fn test_each_changed_instrument_notifies() {
    let tracker = ChangeTracker::new();
    let i0 = Instrument::new();
    let i1 = Instrument::new();
    let controller = Rc::new(Controller::default());
    i0.attach(controller.clone());
    i1.attach(controller.clone());

    i0.set_price(&tracker, 10.0);
    i1.set_price(&tracker, 20.0);
    i0.set_price(&tracker, 11.0);

    assert_eq!(tracker.drain_pending(), 2);
    assert_eq!(controller.notifications.get(), 2);
    assert_eq!(controller.last_price.get(), 20.0);
    assert_eq!(tracker.pending_len(), 0);
}

#[test]
fn test_one_observer_per_attachment() {
    let tracker = ChangeTracker::new();
    let instrument = Instrument::new();
    let controller = Rc::new(Controller::default());
    instrument.attach(controller.clone());
    instrument.attach(controller.clone());

    instrument.set_price(&tracker, 5.0);
    tracker.drain_pending();

    assert_eq!(controller.notifications.get(), 2);
}
