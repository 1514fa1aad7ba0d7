use crate::{
    entities::{coupon, Coupon, CouponModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Coupon catalog and redemption service.
///
/// Codes are normalized to upper case on write and on lookup, so `save20` and
/// `SAVE20` are the same coupon. Redemption is a single conditional UPDATE and
/// never over-counts under concurrent checkouts.
#[derive(Clone)]
pub struct CouponService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCouponInput {
    pub code: String,
    pub discount_percent: Decimal,
    pub expires_at: DateTime<Utc>,
    pub max_uses: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCouponInput {
    pub discount_percent: Option<Decimal>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_uses: Option<i32>,
}

impl CouponService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Creates a coupon. The code is upper-cased before storage.
    ///
    /// # Errors
    ///
    /// * `ServiceError::ValidationError` - discount outside [0, 100] or
    ///   non-positive `max_uses`
    /// * `ServiceError::Conflict` - a coupon with this code already exists
    #[instrument(skip(self))]
    pub async fn create_coupon(
        &self,
        input: CreateCouponInput,
    ) -> Result<CouponModel, ServiceError> {
        validate_discount(input.discount_percent)?;
        if input.max_uses <= 0 {
            return Err(ServiceError::ValidationError(
                "max_uses must be greater than zero".to_string(),
            ));
        }

        let code = normalize_code(&input.code)?;

        let existing = Coupon::find()
            .filter(coupon::Column::Code.eq(&code))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Coupon {} already exists",
                code
            )));
        }

        let coupon_id = Uuid::new_v4();
        let model = coupon::ActiveModel {
            id: Set(coupon_id),
            code: Set(code.clone()),
            discount_percent: Set(input.discount_percent),
            expires_at: Set(input.expires_at),
            max_uses: Set(input.max_uses),
            used_count: Set(0),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        };

        let model = model.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::CouponCreated(coupon_id))
            .await;

        info!("Created coupon {} ({}% off)", code, model.discount_percent);
        Ok(model)
    }

    /// Updates a coupon's discount, expiry or usage cap. The code and usage
    /// count are immutable here.
    #[instrument(skip(self))]
    pub async fn update_coupon(
        &self,
        id: Uuid,
        input: UpdateCouponInput,
    ) -> Result<CouponModel, ServiceError> {
        let existing = Coupon::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Coupon {} not found", id)))?;

        if let Some(discount) = input.discount_percent {
            validate_discount(discount)?;
        }
        if let Some(max_uses) = input.max_uses {
            if max_uses <= 0 {
                return Err(ServiceError::ValidationError(
                    "max_uses must be greater than zero".to_string(),
                ));
            }
        }

        let mut model: coupon::ActiveModel = existing.into();
        if let Some(discount) = input.discount_percent {
            model.discount_percent = Set(discount);
        }
        if let Some(expires_at) = input.expires_at {
            model.expires_at = Set(expires_at);
        }
        if let Some(max_uses) = input.max_uses {
            model.max_uses = Set(max_uses);
        }
        model.updated_at = Set(Utc::now());

        Ok(model.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_coupon(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = Coupon::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Coupon {} not found", id)));
        }
        Ok(())
    }

    pub async fn get_coupon(&self, id: Uuid) -> Result<CouponModel, ServiceError> {
        Coupon::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Coupon {} not found", id)))
    }

    pub async fn list_coupons(&self) -> Result<Vec<CouponModel>, ServiceError> {
        Ok(Coupon::find()
            .order_by_asc(coupon::Column::Code)
            .all(&*self.db)
            .await?)
    }

    /// Coupons that are currently redeemable: unexpired and under their cap.
    pub async fn list_active_coupons(&self) -> Result<Vec<CouponModel>, ServiceError> {
        Ok(Coupon::find()
            .filter(coupon::Column::ExpiresAt.gt(Utc::now()))
            .filter(
                Expr::col(coupon::Column::UsedCount).lt(Expr::col(coupon::Column::MaxUses)),
            )
            .order_by_asc(coupon::Column::Code)
            .all(&*self.db)
            .await?)
    }

    /// Checks whether a code can be redeemed right now, without consuming a
    /// use. Distinguishes unknown, expired and exhausted codes.
    #[instrument(skip(self))]
    pub async fn validate_coupon(&self, code: &str) -> Result<CouponModel, ServiceError> {
        let code = normalize_code(code)?;

        let model = Coupon::find()
            .filter(coupon::Column::Code.eq(&code))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Coupon {} not found", code)))?;

        classify_unusable(&model)?;
        Ok(model)
    }

    /// Consumes one use of a coupon with a single conditional UPDATE:
    /// the increment only applies while the coupon is unexpired and under its
    /// cap, so concurrent redemptions cannot exceed `max_uses`.
    ///
    /// Takes any connection so checkout can redeem inside its transaction.
    #[instrument(skip(self, conn))]
    pub async fn redeem<C: ConnectionTrait>(
        &self,
        conn: &C,
        code: &str,
    ) -> Result<CouponModel, ServiceError> {
        let code = normalize_code(code)?;

        let result = Coupon::update_many()
            .col_expr(
                coupon::Column::UsedCount,
                Expr::col(coupon::Column::UsedCount).add(1),
            )
            .col_expr(coupon::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(coupon::Column::Code.eq(&code))
            .filter(coupon::Column::ExpiresAt.gt(Utc::now()))
            .filter(
                Expr::col(coupon::Column::UsedCount).lt(Expr::col(coupon::Column::MaxUses)),
            )
            .exec(conn)
            .await?;

        if result.rows_affected == 0 {
            // Re-read to report why the conditional update missed.
            let model = Coupon::find()
                .filter(coupon::Column::Code.eq(&code))
                .one(conn)
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("Coupon {} not found", code)))?;
            classify_unusable(&model)?;
            return Err(ServiceError::InvalidOperation(format!(
                "Coupon {} could not be redeemed",
                code
            )));
        }

        Coupon::find()
            .filter(coupon::Column::Code.eq(&code))
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Coupon {} not found", code)))
    }
}

fn normalize_code(code: &str) -> Result<String, ServiceError> {
    let code = code.trim().to_uppercase();
    if code.is_empty() {
        return Err(ServiceError::ValidationError(
            "Coupon code cannot be empty".to_string(),
        ));
    }
    Ok(code)
}

fn validate_discount(discount: Decimal) -> Result<(), ServiceError> {
    if discount < Decimal::ZERO || discount > Decimal::from(100) {
        return Err(ServiceError::ValidationError(
            "Discount must be between 0 and 100 percent".to_string(),
        ));
    }
    Ok(())
}

fn classify_unusable(model: &CouponModel) -> Result<(), ServiceError> {
    if model.expires_at <= Utc::now() {
        return Err(ServiceError::InvalidOperation(format!(
            "Coupon {} has expired",
            model.code
        )));
    }
    if model.used_count >= model.max_uses {
        return Err(ServiceError::InvalidOperation(format!(
            "Coupon {} has reached its usage limit",
            model.code
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn sample_coupon(expires_in_days: i64, max_uses: i32, used_count: i32) -> CouponModel {
        CouponModel {
            id: Uuid::new_v4(),
            code: "SAVE20".to_string(),
            discount_percent: dec!(20.00),
            expires_at: Utc::now() + Duration::days(expires_in_days),
            max_uses,
            used_count,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn normalize_code_trims_and_uppercases() {
        assert_eq!(normalize_code("  save20 ").unwrap(), "SAVE20");
        assert!(matches!(
            normalize_code("   "),
            Err(ServiceError::ValidationError(_))
        ));
    }

    #[test]
    fn validate_discount_bounds() {
        assert!(validate_discount(Decimal::ZERO).is_ok());
        assert!(validate_discount(dec!(100)).is_ok());
        assert!(validate_discount(dec!(100.01)).is_err());
        assert!(validate_discount(dec!(-5)).is_err());
    }

    #[test]
    fn classify_unusable_accepts_live_coupon() {
        let coupon = sample_coupon(7, 5, 4);
        assert!(classify_unusable(&coupon).is_ok());
    }

    #[test]
    fn classify_unusable_reports_expiry_before_exhaustion() {
        let coupon = sample_coupon(-1, 1, 1);
        match classify_unusable(&coupon).unwrap_err() {
            ServiceError::InvalidOperation(msg) => assert!(msg.contains("expired")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn classify_unusable_reports_exhausted_coupon() {
        let coupon = sample_coupon(7, 3, 3);
        match classify_unusable(&coupon).unwrap_err() {
            ServiceError::InvalidOperation(msg) => assert!(msg.contains("usage limit")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
