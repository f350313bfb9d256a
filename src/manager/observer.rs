//! Path observers

use crate::domain::Value;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Change callback, invoked with `(old, new)`
pub type Callback = Arc<dyn Fn(&Value, &Value) + Send + Sync>;

/// Per-observer queue of pending `(old, new)` pairs
///
/// Pairs are queued under the manager lock, in rebuild order, and delivered
/// by whichever thread holds `draining`. A callback that triggers another
/// rebuild only queues; the outer drain delivers the new pair afterwards.
struct Delivery {
    callback: Callback,
    pending: Mutex<VecDeque<(Value, Value)>>,
    draining: Mutex<()>,
}

impl Delivery {
    fn drain(&self) {
        loop {
            let Some(guard) = self.draining.try_lock() else {
                return;
            };
            loop {
                let next = self.pending.lock().pop_front();
                let Some((old, new)) = next else { break };
                (self.callback)(&old, &new);
            }
            drop(guard);

            // A pair queued between the last pop and the unlock is ours to send
            if self.pending.lock().is_empty() {
                return;
            }
        }
    }
}

/// Observer registered on one path of the merged tree
pub(crate) struct ObserverRef {
    pub(crate) path: String,
    pub(crate) current: Value,
    delivery: Arc<Delivery>,
}

/// Handle collected during a rebuild, fired once the manager lock is released
pub(crate) struct Notification {
    delivery: Arc<Delivery>,
}

impl ObserverRef {
    pub(crate) fn new(path: &str, current: Value, callback: Callback) -> Self {
        Self {
            path: path.to_string(),
            current,
            delivery: Arc::new(Delivery {
                callback,
                pending: Mutex::new(VecDeque::new()),
                draining: Mutex::new(()),
            }),
        }
    }

    /// Compare against the freshly resolved value, queueing `(old, new)` when
    /// it moved
    pub(crate) fn observe(&mut self, resolved: Option<Value>) -> Option<Notification> {
        let new = resolved?;
        if new == self.current {
            return None;
        }
        let old = std::mem::replace(&mut self.current, new.clone());
        self.delivery.pending.lock().push_back((old, new));
        Some(Notification {
            delivery: Arc::clone(&self.delivery),
        })
    }
}

impl Notification {
    /// Deliver every pair queued for the observer, oldest first
    pub(crate) fn fire(self) {
        self.delivery.drain();
    }
}
