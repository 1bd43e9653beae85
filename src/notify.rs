//! Transient user notifications with auto-clear.
//!
//! Two independent single-slot mailboxes, one per [`NotificationKind`]. A new
//! message replaces whatever its slot shows and restarts that slot's timer;
//! the other slot is untouched. Each timer is a tokio task owned by the
//! [`Notifier`] and aborted when superseded or dismissed. Slots also carry a
//! generation counter so a timer that already woke up can never clear a
//! newer message.

use crate::presenter::SharedPresenter;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Severity of a notification. Each kind has its own slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    Error,
    Success,
}

#[derive(Default)]
struct Slot {
    text: Option<String>,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct Slots {
    error: Slot,
    success: Slot,
}

impl Slots {
    fn get(&mut self, kind: NotificationKind) -> &mut Slot {
        match kind {
            NotificationKind::Error => &mut self.error,
            NotificationKind::Success => &mut self.success,
        }
    }
}

/// Owns both notification slots and their auto-clear timers.
pub struct Notifier {
    presenter: SharedPresenter,
    lifetime: Duration,
    slots: Arc<Mutex<Slots>>,
}

impl Notifier {
    pub fn new(presenter: SharedPresenter, lifetime: Duration) -> Self {
        Self {
            presenter,
            lifetime,
            slots: Arc::new(Mutex::new(Slots::default())),
        }
    }

    /// Show `text` in the `kind` slot and (re)start its auto-clear timer.
    ///
    /// Outside a tokio runtime the message is shown but never auto-clears.
    ///
    /// The presenter is called with the slot lock held, so it sees slot
    /// changes in the same order as [`current`](Self::current). Presenters
    /// must not call back into the notifier.
    pub fn notify(&self, kind: NotificationKind, text: impl Into<String>) {
        let text = text.into();
        let previous_timer = {
            let mut slots = lock(&self.slots);
            let slot = slots.get(kind);
            slot.generation += 1;
            slot.text = Some(text.clone());
            let previous = slot.timer.take();
            slot.timer = self.schedule_clear(kind, slot.generation);

            debug!("{:?} notification: {}", kind, text);
            self.presenter.on_notification_shown(kind, &text);
            previous
        };
        if let Some(timer) = previous_timer {
            timer.abort();
        }
    }

    pub fn error(&self, text: impl Into<String>) {
        self.notify(NotificationKind::Error, text);
    }

    pub fn success(&self, text: impl Into<String>) {
        self.notify(NotificationKind::Success, text);
    }

    /// Clear both slots now and cancel their timers.
    pub fn dismiss(&self) {
        self.dismiss_kind(NotificationKind::Error);
        self.dismiss_kind(NotificationKind::Success);
    }

    /// Clear one slot now and cancel its timer.
    pub fn dismiss_kind(&self, kind: NotificationKind) {
        let timer = {
            let mut slots = lock(&self.slots);
            let slot = slots.get(kind);
            slot.generation += 1;
            if slot.text.take().is_some() {
                self.presenter.on_notification_cleared(kind);
            }
            slot.timer.take()
        };
        if let Some(timer) = timer {
            timer.abort();
        }
    }

    /// Text currently visible in the `kind` slot.
    pub fn current(&self, kind: NotificationKind) -> Option<String> {
        lock(&self.slots).get(kind).text.clone()
    }

    fn schedule_clear(&self, kind: NotificationKind, generation: u64) -> Option<JoinHandle<()>> {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("No tokio runtime; {:?} notification will not auto-clear", kind);
                return None;
            }
        };

        let slots = Arc::clone(&self.slots);
        let presenter = Arc::clone(&self.presenter);
        let lifetime = self.lifetime;
        Some(handle.spawn(async move {
            tokio::time::sleep(lifetime).await;
            let mut slots = lock(&slots);
            let slot = slots.get(kind);
            if slot.generation == generation {
                slot.timer = None;
                if slot.text.take().is_some() {
                    debug!("{:?} notification expired", kind);
                    presenter.on_notification_cleared(kind);
                }
            }
        }))
    }
}

impl Drop for Notifier {
    fn drop(&mut self) {
        let mut slots = lock(&self.slots);
        for timer in [slots.error.timer.take(), slots.success.timer.take()]
            .into_iter()
            .flatten()
        {
            timer.abort();
        }
    }
}

// A panic while holding the lock leaves plain data behind; keep using it.
fn lock(slots: &Mutex<Slots>) -> MutexGuard<'_, Slots> {
    slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
