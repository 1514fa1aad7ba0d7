use crate::{
    entities::{contact_inquiry, ContactInquiry, ContactInquiryModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

/// Contact form inbox.
#[derive(Clone)]
pub struct ContactService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateInquiryInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Subject is required"))]
    pub subject: String,
    #[validate(length(min = 1, max = 5000, message = "Message must be 1-5000 characters"))]
    pub message: String,
}

impl ContactService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_inquiry(
        &self,
        input: CreateInquiryInput,
    ) -> Result<ContactInquiryModel, ServiceError> {
        input.validate()?;

        let inquiry_id = Uuid::new_v4();
        let model = contact_inquiry::ActiveModel {
            id: Set(inquiry_id),
            name: Set(input.name),
            email: Set(input.email),
            subject: Set(input.subject),
            message: Set(input.message),
            created_at: Set(Utc::now()),
        };

        let model = model.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ContactInquiryReceived(inquiry_id))
            .await;

        info!("Received contact inquiry {}", inquiry_id);
        Ok(model)
    }

    pub async fn get_inquiry(&self, id: Uuid) -> Result<ContactInquiryModel, ServiceError> {
        ContactInquiry::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Inquiry {} not found", id)))
    }

    /// Newest inquiries first.
    pub async fn list_inquiries(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<ContactInquiryModel>, u64), ServiceError> {
        let paginator = ContactInquiry::find()
            .order_by_desc(contact_inquiry::Column::CreatedAt)
            .paginate(&*self.db, per_page);

        let total = paginator.num_items().await?;
        let data = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((data, total))
    }

    #[instrument(skip(self))]
    pub async fn delete_inquiry(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = ContactInquiry::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Inquiry {} not found", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inquiry_input_validation() {
        let input = CreateInquiryInput {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            subject: "Shipping question".to_string(),
            message: "When does vol-2 restock?".to_string(),
        };
        assert!(input.validate().is_ok());

        let blank_subject = CreateInquiryInput {
            subject: String::new(),
            ..input
        };
        assert!(blank_subject.validate().is_err());
    }
}
