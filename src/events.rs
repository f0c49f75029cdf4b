use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;

/// Domain events, emitted after the owning transaction commits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    ProductRegistered { sku: String },
    ProductUpdated { sku: String },
    ProductDeleted { sku: String },
    SupplierRegistered { tin: String },
    SupplierDeleted { tin: String },
    CustomerRegistered(i64),
    CustomerDeleted(i64),
    OrderPlaced(i64),
    OrderLineAdded { order_no: i64, sku: String },
    OrderPaid(i64),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing the request path when the
    /// receiver is gone. Events are best-effort: the transaction that
    /// produced them has already committed.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(err) = self.send(event).await {
            warn!(error = %err, "event channel closed; event discarded");
        }
    }
}
