use crate::{
    entities::{order, order_item, Order, OrderItem, OrderItemModel, OrderModel, OrderStatus},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Read and lifecycle operations for submitted orders. Order creation lives in
/// `CheckoutService`.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderModel, ServiceError> {
        Order::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))
    }

    pub async fn get_order_items(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<OrderItemModel>, ServiceError> {
        // Verify existence so an unknown order is a 404, not an empty list.
        self.get_order(order_id).await?;

        Ok(OrderItem::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .order_by_asc(order_item::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    /// Lists an owner's orders, newest first.
    pub async fn list_orders_for_owner(
        &self,
        owner_id: &str,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<OrderModel>, u64), ServiceError> {
        let paginator = Order::find()
            .filter(order::Column::OwnerId.eq(owner_id))
            .order_by_desc(order::Column::CreatedAt)
            .paginate(&*self.db, per_page);

        let total = paginator.num_items().await?;
        let data = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((data, total))
    }

    /// Overwrites the order status. Any status can move to any other status;
    /// there is no transition table.
    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<OrderModel, ServiceError> {
        let existing = self.get_order(order_id).await?;

        let mut model: order::ActiveModel = existing.into();
        model.status = Set(new_status);
        model.updated_at = Set(Utc::now());
        let updated = model.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::OrderStatusChanged {
                order_id,
                status: new_status.to_string(),
            })
            .await;

        info!("Order {} status set to {}", order_id, new_status);
        Ok(updated)
    }

    /// Cancels an order. Delivered orders cannot be cancelled; cancelling an
    /// already-cancelled order is a no-op.
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: Uuid) -> Result<OrderModel, ServiceError> {
        let existing = self.get_order(order_id).await?;

        match existing.status {
            OrderStatus::Delivered => Err(ServiceError::InvalidOperation(format!(
                "Order {} has already been delivered",
                order_id
            ))),
            OrderStatus::Cancelled => Ok(existing),
            _ => {
                let mut model: order::ActiveModel = existing.into();
                model.status = Set(OrderStatus::Cancelled);
                model.updated_at = Set(Utc::now());
                let updated = model.update(&*self.db).await?;

                self.event_sender
                    .send_or_log(Event::OrderCancelled(order_id))
                    .await;

                info!("Order {} cancelled", order_id);
                Ok(updated)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn order_status_round_trips_through_strings() {
        assert_eq!(OrderStatus::Pending.to_string(), "pending");
        assert_eq!(OrderStatus::Cancelled.to_string(), "cancelled");
        assert_eq!(OrderStatus::from_str("shipped").unwrap(), OrderStatus::Shipped);
        assert!(OrderStatus::from_str("mislaid").is_err());
    }

    #[test]
    fn order_status_serde_uses_lowercase() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Processing).unwrap(),
            "\"processing\""
        );
        let status: OrderStatus = serde_json::from_str("\"delivered\"").unwrap();
        assert_eq!(status, OrderStatus::Delivered);
    }
}
