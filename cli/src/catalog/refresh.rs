//! Shared "needs refresh" signal.
//!
//! A single boolean that mutations toggle. Mounted list views hold a
//! subscription and re-fetch when it has moved since they last looked; any
//! number of toggles in between collapse into one re-fetch.

use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone)]
pub struct RefreshSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl RefreshSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn toggle(&self) {
        self.tx.send_modify(|value| *value = !*value);
    }

    pub fn value(&self) -> bool {
        *self.tx.borrow()
    }

    /// Subscribe at mount; dropping the subscription unsubscribes.
    pub fn subscribe(&self) -> RefreshSubscription {
        RefreshSubscription {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for RefreshSignal {
    fn default() -> Self {
        Self::new()
    }
}

pub struct RefreshSubscription {
    rx: watch::Receiver<bool>,
}

impl RefreshSubscription {
    /// True once per batch of toggles since the previous call.
    pub fn take_pending(&mut self) -> bool {
        match self.rx.has_changed() {
            Ok(true) => {
                self.rx.borrow_and_update();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_value() {
        let signal = RefreshSignal::new();
        assert!(!signal.value());
        signal.toggle();
        assert!(signal.value());
        signal.toggle();
        assert!(!signal.value());
    }

    #[test]
    fn fresh_subscription_has_nothing_pending() {
        let signal = RefreshSignal::new();
        signal.toggle();
        let mut sub = signal.subscribe();
        assert!(!sub.take_pending());
    }

    #[test]
    fn many_toggles_coalesce_into_one_refetch() {
        let signal = RefreshSignal::new();
        let mut sub = signal.subscribe();

        signal.toggle();
        signal.toggle();
        signal.toggle();

        assert!(sub.take_pending());
        assert!(!sub.take_pending());
    }

    #[test]
    fn every_subscriber_sees_the_toggle() {
        let signal = RefreshSignal::new();
        let mut a = signal.subscribe();
        let mut b = signal.clone().subscribe();

        signal.toggle();

        assert!(a.take_pending());
        assert!(b.take_pending());
    }
}
