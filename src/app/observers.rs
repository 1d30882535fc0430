//! Observer list for state transitions
//!
//! Each subscriber owns an unbounded receiver. A transition is pushed to
//! every live subscriber in the order `notify` is called; receivers that
//! have been dropped are pruned on the next notification.

use tokio::sync::mpsc;

/// Fan-out of state values to subscribers
#[derive(Debug)]
pub struct StateObservers<S> {
    senders: Vec<mpsc::UnboundedSender<S>>,
}

impl<S> Default for StateObservers<S> {
    fn default() -> Self {
        Self {
            senders: Vec::new(),
        }
    }
}

impl<S: Clone> StateObservers<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber; it receives transitions from now on
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<S> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.push(tx);
        rx
    }

    /// Deliver a transition to every live subscriber
    pub fn notify(&mut self, state: &S) {
        self.senders.retain(|tx| tx.send(state.clone()).is_ok());
    }

    /// Number of subscribers seen alive at the last notification
    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}

/// Turn a subscription into a `Stream` of states
pub fn into_stream<S>(rx: mpsc::UnboundedReceiver<S>) -> impl futures::Stream<Item = S> {
    futures::stream::unfold(rx, |mut rx| async move {
        let state = rx.recv().await?;
        Some((state, rx))
    })
}
