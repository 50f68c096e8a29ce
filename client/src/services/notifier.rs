//! Update notifier
//!
//! Change signal shared by everything that shows bills. The counter value
//! carries no meaning; a change means "refetch now".

use tokio::sync::watch;

pub type UpdateReceiver = watch::Receiver<u64>;

#[derive(Debug)]
pub struct UpdateNotifier {
    tx: watch::Sender<u64>,
}

impl Default for UpdateNotifier {
    fn default() -> Self {
        let (tx, _) = watch::channel(0);
        Self { tx }
    }
}

impl UpdateNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bump the counter and wake every subscriber
    pub fn trigger_update(&self) {
        self.tx.send_modify(|count| *count = count.wrapping_add(1));
        tracing::debug!("Bills update triggered ({})", *self.tx.borrow());
    }

    pub fn current(&self) -> u64 {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> UpdateReceiver {
        self.tx.subscribe()
    }
}
