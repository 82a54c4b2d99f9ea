use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(in crate::app) enum ViewSlot {
    Local,
    Global,
}

impl ViewSlot {
    pub(in crate::app) fn label(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Global => "global",
        }
    }
}

/// Shared flag a running view checks every frame. Once raised it stays
/// raised.
#[derive(Clone, Debug, Default)]
pub(in crate::app) struct StopFlag(Rc<Cell<bool>>);

impl StopFlag {
    pub(in crate::app) fn stop(&self) {
        self.0.set(true);
    }

    pub(in crate::app) fn is_stopped(&self) -> bool {
        self.0.get()
    }
}

pub(in crate::app) type Cleanup = Box<dyn FnOnce()>;

/// Teardown actions for whatever is currently mounted in each slot. A slot
/// is always disposed before a new view is constructed into it.
#[derive(Default)]
pub(in crate::app) struct CleanupRegistry {
    slots: HashMap<ViewSlot, Vec<Cleanup>>,
}

impl CleanupRegistry {
    pub(in crate::app) fn register(&mut self, slot: ViewSlot, cleanup: Cleanup) {
        self.slots.entry(slot).or_default().push(cleanup);
    }

    #[cfg(test)]
    pub(in crate::app) fn pending(&self, slot: ViewSlot) -> usize {
        self.slots.get(&slot).map_or(0, Vec::len)
    }

    pub(in crate::app) fn dispose(&mut self, slot: ViewSlot) {
        let Some(cleanups) = self.slots.remove(&slot) else {
            return;
        };
        debug!(slot = slot.label(), count = cleanups.len(), "disposing graph view");
        for cleanup in cleanups {
            cleanup();
        }
    }

    pub(in crate::app) fn dispose_all(&mut self) {
        self.dispose(ViewSlot::Local);
        self.dispose(ViewSlot::Global);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispose_runs_each_cleanup_once_per_slot() {
        let calls = Rc::new(Cell::new(0));
        let mut registry = CleanupRegistry::default();
        for _ in 0..2 {
            let calls = Rc::clone(&calls);
            registry.register(ViewSlot::Local, Box::new(move || calls.set(calls.get() + 1)));
        }
        let global_calls = Rc::clone(&calls);
        registry.register(
            ViewSlot::Global,
            Box::new(move || global_calls.set(global_calls.get() + 10)),
        );

        registry.dispose(ViewSlot::Local);
        assert_eq!(calls.get(), 2);
        assert_eq!(registry.pending(ViewSlot::Local), 0);
        assert_eq!(registry.pending(ViewSlot::Global), 1);

        registry.dispose(ViewSlot::Local);
        assert_eq!(calls.get(), 2);

        registry.dispose_all();
        assert_eq!(calls.get(), 12);
    }

    #[test]
    fn stop_flag_is_shared_between_clones() {
        let flag = StopFlag::default();
        let observer = flag.clone();
        assert!(!observer.is_stopped());
        flag.stop();
        assert!(observer.is_stopped());
    }
}
