use crate::{
    entities::{cart_item, order, order_item, CartItem, OrderStatus},
    errors::ServiceError,
    events::{Event, EventSender},
    services::coupons::CouponService,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

/// Checkout workflow: turns an owner's cart into an order.
///
/// The whole pipeline runs in one transaction. Order, order items, coupon
/// redemption and the cart clear commit together or not at all, so a failed
/// redemption can never leave a half-written order behind.
#[derive(Clone)]
pub struct CheckoutService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    coupon_service: CouponService,
}

/// Delivery details captured verbatim on the order.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ShippingInfo {
    #[validate(length(min = 1, message = "Recipient name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Street address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "Postal code is required"))]
    pub postal_code: String,
    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitOrderInput {
    pub owner_id: String,
    pub shipping_info: ShippingInfo,
    pub coupon_code: Option<String>,
}

/// Outcome of a successful checkout.
#[derive(Debug, Clone, Serialize)]
pub struct OrderConfirmation {
    pub order_id: Uuid,
    pub total_amount: Decimal,
    pub item_count: usize,
    pub coupon_code: Option<String>,
}

impl CheckoutService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        coupon_service: CouponService,
    ) -> Self {
        Self {
            db,
            event_sender,
            coupon_service,
        }
    }

    /// Submits the owner's cart as an order.
    ///
    /// Pipeline: load cart lines, redeem the coupon if one was given, price
    /// the order from the line snapshots, insert the order and its items,
    /// clear the cart, commit. Stock is not decremented here.
    ///
    /// # Errors
    ///
    /// * `ServiceError::InvalidOperation` - empty cart, or the coupon is
    ///   expired or exhausted
    /// * `ServiceError::NotFound` - unknown coupon code
    /// * `ServiceError::ValidationError` - malformed shipping details
    #[instrument(skip(self, input), fields(owner_id = %input.owner_id))]
    pub async fn submit_order(
        &self,
        input: SubmitOrderInput,
    ) -> Result<OrderConfirmation, ServiceError> {
        input.shipping_info.validate()?;

        let txn = self.db.begin().await?;

        let lines = CartItem::find()
            .filter(cart_item::Column::OwnerId.eq(&input.owner_id))
            .all(&txn)
            .await?;

        if lines.is_empty() {
            return Err(ServiceError::InvalidOperation("Cart is empty".to_string()));
        }

        let coupon = match &input.coupon_code {
            Some(code) => Some(self.coupon_service.redeem(&txn, code).await?),
            None => None,
        };

        let subtotal: Decimal = lines
            .iter()
            .map(|line| line.unit_price * Decimal::from(line.quantity))
            .sum();

        let total_amount = match &coupon {
            Some(coupon) => apply_discount(subtotal, coupon.discount_percent),
            None => subtotal.round_dp(2),
        };

        let order_id = Uuid::new_v4();
        let now = Utc::now();

        let order = order::ActiveModel {
            id: Set(order_id),
            owner_id: Set(input.owner_id.clone()),
            status: Set(OrderStatus::Pending),
            total_amount: Set(total_amount),
            coupon_code: Set(coupon.as_ref().map(|c| c.code.clone())),
            shipping_info: Set(serde_json::to_value(&input.shipping_info)
                .map_err(|e| ServiceError::InternalError(e.to_string()))?),
            created_at: Set(now),
            updated_at: Set(now),
        };
        order.insert(&txn).await?;

        let item_count = lines.len();
        for line in &lines {
            let item = order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                book_id: Set(line.book_id.clone()),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
                created_at: Set(now),
            };
            item.insert(&txn).await?;
        }

        CartItem::delete_many()
            .filter(cart_item::Column::OwnerId.eq(&input.owner_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::OrderCreated(order_id))
            .await;
        if let Some(coupon) = &coupon {
            self.event_sender
                .send_or_log(Event::CouponRedeemed {
                    code: coupon.code.clone(),
                    order_id,
                })
                .await;
        }

        info!(
            "Order {} submitted for {} ({} items, total {})",
            order_id, input.owner_id, item_count, total_amount
        );

        Ok(OrderConfirmation {
            order_id,
            total_amount,
            item_count,
            coupon_code: coupon.map(|c| c.code),
        })
    }
}

/// Percent-off total, rounded to cents.
fn apply_discount(subtotal: Decimal, discount_percent: Decimal) -> Decimal {
    let factor = Decimal::ONE - discount_percent / Decimal::from(100);
    (subtotal * factor).round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn apply_discount_twenty_percent() {
        assert_eq!(apply_discount(dec!(25.00), dec!(20)), dec!(20.00));
    }

    #[test]
    fn apply_discount_zero_percent_is_identity() {
        assert_eq!(apply_discount(dec!(19.99), dec!(0)), dec!(19.99));
    }

    #[test]
    fn apply_discount_full_discount_is_free() {
        assert_eq!(apply_discount(dec!(42.37), dec!(100)), dec!(0.00));
    }

    #[test]
    fn apply_discount_rounds_to_cents() {
        // 10.00 * 0.85 = 8.50; 9.99 * 0.85 = 8.4915 -> 8.49
        assert_eq!(apply_discount(dec!(9.99), dec!(15)), dec!(8.49));
    }

    #[test]
    fn shipping_info_validation() {
        let info = ShippingInfo {
            name: "Alice".to_string(),
            address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            postal_code: "12345".to_string(),
            country: "US".to_string(),
            email: "alice@example.com".to_string(),
        };
        assert!(info.validate().is_ok());

        let bad = ShippingInfo {
            email: "not-an-email".to_string(),
            ..info
        };
        assert!(bad.validate().is_err());
    }
}
