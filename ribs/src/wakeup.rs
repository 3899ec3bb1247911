//! Wakeup channel for the routing dispatch loop.
//!
//! [`RibTree::run`](crate::RibTree::run) sleeps while no routing work is
//! queued. Enqueuing a command on a [`RouterHandle`](crate::RouterHandle)
//! sends a signal through this channel so the loop drains and dispatches it.

use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Sender half of the wakeup channel.
#[derive(Clone, Debug)]
pub struct WakeupSender {
    tx: mpsc::Sender<()>,
}

impl WakeupSender {
    /// Non-blocking. A full buffer already guarantees a pending dispatch and
    /// a dropped receiver means the tree is gone, so errors are ignored.
    pub fn send(&self) {
        let _ = self.tx.try_send(());
    }
}

/// Receiver half of the wakeup channel.
#[derive(Debug)]
pub struct WakeupReceiver {
    rx: mpsc::Receiver<()>,
}

impl WakeupReceiver {
    pub async fn recv(&mut self) -> Option<()> {
        self.rx.recv().await
    }

    /// Collapse buffered signals into the one just received.
    pub fn drain(&mut self) {
        while self.rx.try_recv().is_ok() {}
    }
}

pub fn channel() -> (WakeupSender, WakeupReceiver) {
    let (tx, rx) = mpsc::channel(16);
    (WakeupSender { tx }, WakeupReceiver { rx })
}

/// Slot for a sender that becomes known later.
///
/// Router handles are created inside builders, before the node is attached.
/// The node installs the tree's sender into the handle on attach.
#[derive(Debug, Default, Clone)]
pub struct WakeupHandle {
    inner: Arc<Mutex<Option<WakeupSender>>>,
}

impl WakeupHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&self, sender: WakeupSender) {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = Some(sender);
        }
    }

    pub fn uninstall(&self) {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = None;
        }
    }

    /// Send a signal if a sender is installed.
    pub fn send(&self) {
        if let Ok(guard) = self.inner.lock()
            && let Some(sender) = guard.as_ref()
        {
            sender.send();
        }
    }
}
