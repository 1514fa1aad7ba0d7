use tokio::sync::mpsc;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Domain events emitted by the stores after successful mutations. Consumers
/// receive them over an mpsc channel; failure to deliver never fails the
/// originating request.
#[derive(Debug, Clone)]
pub enum Event {
    BookCreated(String),
    BookUpdated(String),
    BookDeleted(String),
    ItemAddedToCart { owner_id: String, book_id: String },
    ItemRemovedFromCart { owner_id: String, book_id: String },
    CartCleared { owner_id: String },
    CouponCreated(Uuid),
    CouponRedeemed { code: String, order_id: Uuid },
    OrderCreated(Uuid),
    OrderStatusChanged { order_id: Uuid, status: String },
    OrderCancelled(Uuid),
    UserCreated(Uuid),
    UserDeleted(Uuid),
    ItemAddedToWishlist { owner_id: String, book_id: String },
    ItemRemovedFromWishlist { owner_id: String, book_id: String },
    ContactInquiryReceived(Uuid),
    ReviewSubmitted { book_id: String, review_id: Uuid },
}

/// Cloneable handle the services use to publish events.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: Event) -> Result<(), mpsc::error::SendError<Event>> {
        self.sender.send(event).await
    }

    /// Publish an event, logging instead of propagating delivery failures.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.sender.send(event).await {
            error!("Failed to send event: {}", e);
        }
    }
}

/// Drain the event channel until every sender is dropped. Runs as a background
/// task; currently logs each event, the seam where outbound integrations
/// (webhooks, search indexing) would hang off.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    info!("Event processor started");
    while let Some(event) = receiver.recv().await {
        debug!("Processing event: {:?}", event);
        match event {
            Event::OrderCreated(order_id) => {
                info!(%order_id, "Order created");
            }
            Event::OrderStatusChanged { order_id, status } => {
                info!(%order_id, %status, "Order status changed");
            }
            Event::CouponRedeemed { code, order_id } => {
                info!(%code, %order_id, "Coupon redeemed");
            }
            other => {
                debug!("Event handled: {:?}", other);
            }
        }
    }
    info!("Event processor stopped");
}
