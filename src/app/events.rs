//! Selection events sent from a catalog screen to its owner
//!
//! Screens report what the user picked; the owner decides where to go. The
//! channel keeps the two decoupled.

use tokio::sync::mpsc;
use tracing::debug;

use crate::app::models::ProductHit;

/// Something the user selected
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    /// A category, identified by its full path
    Category(String),
    /// A product from the search results
    Product(ProductHit),
}

/// Sending half handed to a screen
#[derive(Debug, Clone)]
pub struct SelectionSender {
    tx: mpsc::UnboundedSender<SelectionEvent>,
}

/// Create a sender and the owner's receiving half
pub fn selection_channel() -> (SelectionSender, mpsc::UnboundedReceiver<SelectionEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (SelectionSender { tx }, rx)
}

impl SelectionSender {
    pub fn select_category(&self, path: impl Into<String>) -> bool {
        self.send(SelectionEvent::Category(path.into()))
    }

    pub fn select_product(&self, product: ProductHit) -> bool {
        self.send(SelectionEvent::Product(product))
    }

    /// Returns false once the owner has gone away
    fn send(&self, event: SelectionEvent) -> bool {
        match self.tx.send(event) {
            Ok(()) => true,
            Err(mpsc::error::SendError(event)) => {
                debug!("Selection dropped, no receiver: {:?}", event);
                false
            }
        }
    }
}
