use crate::{
    entities::{review, Book, Review, ReviewModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Book reviews, one per reader per book.
#[derive(Clone)]
pub struct ReviewService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReviewInput {
    pub owner_id: String,
    pub book_id: String,
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateReviewInput {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

impl ReviewService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Submits a review.
    ///
    /// # Errors
    ///
    /// * `ServiceError::ValidationError` - rating outside 1-5
    /// * `ServiceError::NotFound` - book does not exist
    /// * `ServiceError::Conflict` - the owner already reviewed this book
    #[instrument(skip(self, input), fields(book_id = %input.book_id))]
    pub async fn create_review(
        &self,
        input: CreateReviewInput,
    ) -> Result<ReviewModel, ServiceError> {
        validate_rating(input.rating)?;

        Book::find_by_id(&input.book_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Book {} not found", input.book_id)))?;

        let existing = Review::find()
            .filter(review::Column::OwnerId.eq(&input.owner_id))
            .filter(review::Column::BookId.eq(&input.book_id))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Book {} has already been reviewed by this reader",
                input.book_id
            )));
        }

        let review_id = Uuid::new_v4();
        let model = review::ActiveModel {
            id: Set(review_id),
            owner_id: Set(input.owner_id),
            book_id: Set(input.book_id.clone()),
            rating: Set(input.rating),
            comment: Set(input.comment),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        };

        let model = model.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ReviewSubmitted {
                book_id: input.book_id,
                review_id,
            })
            .await;

        Ok(model)
    }

    pub async fn get_review(&self, id: Uuid) -> Result<ReviewModel, ServiceError> {
        Review::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Review {} not found", id)))
    }

    /// All reviews for a book, newest first.
    pub async fn list_reviews_for_book(
        &self,
        book_id: &str,
    ) -> Result<Vec<ReviewModel>, ServiceError> {
        Ok(Review::find()
            .filter(review::Column::BookId.eq(book_id))
            .order_by_desc(review::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self, input))]
    pub async fn update_review(
        &self,
        id: Uuid,
        input: UpdateReviewInput,
    ) -> Result<ReviewModel, ServiceError> {
        let existing = self.get_review(id).await?;

        if let Some(rating) = input.rating {
            validate_rating(rating)?;
        }

        let mut model: review::ActiveModel = existing.into();
        if let Some(rating) = input.rating {
            model.rating = Set(rating);
        }
        if let Some(comment) = input.comment {
            model.comment = Set(Some(comment));
        }
        model.updated_at = Set(Utc::now());

        Ok(model.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_review(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = Review::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Review {} not found", id)));
        }
        Ok(())
    }
}

fn validate_rating(rating: i32) -> Result<(), ServiceError> {
    if !(1..=5).contains(&rating) {
        return Err(ServiceError::ValidationError(
            "Rating must be between 1 and 5".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
    }
}
