use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

/// Published after source enablement changes. Carries no payload; listeners
/// reload the settings themselves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterChanged;

/// Fire-and-forget broadcast of [`FilterChanged`]. Publishing never waits on a
/// subscriber and a dropped subscription is pruned on the next publish.
#[derive(Clone, Debug, Default)]
pub struct FilterBus {
    subscribers: Arc<Mutex<Vec<Sender<FilterChanged>>>>,
}

impl FilterBus {
    pub fn subscribe(&self) -> FilterSubscription {
        let (tx, rx) = mpsc::channel();
        self.lock().push(tx);
        FilterSubscription { rx }
    }

    pub fn publish(&self) {
        let mut subscribers = self.lock();
        subscribers.retain(|tx| tx.send(FilterChanged).is_ok());
        tracing::debug!("filter change delivered to {} subscribers", subscribers.len());
    }

    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Sender<FilterChanged>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Receiving end of a bus subscription. Dropping it unsubscribes.
#[derive(Debug)]
pub struct FilterSubscription {
    rx: Receiver<FilterChanged>,
}

impl FilterSubscription {
    /// Drains pending notifications, reporting whether any arrived.
    pub fn take_pending(&self) -> bool {
        let mut changed = false;
        while self.rx.try_recv().is_ok() {
            changed = true;
        }
        changed
    }
}
