use crate::{
    entities::{wishlist_item, Book, BookModel, WishlistItem, WishlistItemModel},
    errors::ServiceError,
    events::{Event, EventSender},
    services::carts::BookSummary,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Per-owner saved books. Mirrors the cart's owner/book keying but carries no
/// quantity or price.
#[derive(Clone)]
pub struct WishlistService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

/// A wishlist entry joined with its book snapshot. `book` is `None` when the
/// book has since left the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct WishlistEntry {
    pub id: Uuid,
    pub book_id: String,
    pub added_at: chrono::DateTime<Utc>,
    pub book: Option<BookSummary>,
}

impl WishlistService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Saves a book to the owner's wishlist.
    ///
    /// # Errors
    ///
    /// * `ServiceError::NotFound` - book does not exist
    /// * `ServiceError::Conflict` - book is already on the wishlist
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        owner_id: &str,
        book_id: &str,
    ) -> Result<WishlistItemModel, ServiceError> {
        Book::find_by_id(book_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Book {} not found", book_id)))?;

        let existing = WishlistItem::find()
            .filter(wishlist_item::Column::OwnerId.eq(owner_id))
            .filter(wishlist_item::Column::BookId.eq(book_id))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Book {} is already on the wishlist",
                book_id
            )));
        }

        let model = wishlist_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(owner_id.to_string()),
            book_id: Set(book_id.to_string()),
            added_at: Set(Utc::now()),
        };

        let model = model.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ItemAddedToWishlist {
                owner_id: owner_id.to_string(),
                book_id: book_id.to_string(),
            })
            .await;

        Ok(model)
    }

    /// Lists the owner's wishlist, oldest saves first, joined with the book
    /// catalog for display.
    #[instrument(skip(self))]
    pub async fn list_items(&self, owner_id: &str) -> Result<Vec<WishlistEntry>, ServiceError> {
        let rows: Vec<(WishlistItemModel, Option<BookModel>)> = WishlistItem::find()
            .filter(wishlist_item::Column::OwnerId.eq(owner_id))
            .order_by_asc(wishlist_item::Column::AddedAt)
            .find_also_related(Book)
            .all(&*self.db)
            .await?;

        let entries = rows
            .into_iter()
            .map(|(item, book)| WishlistEntry {
                id: item.id,
                book_id: item.book_id,
                added_at: item.added_at,
                book: book.map(BookSummary::from),
            })
            .collect();

        Ok(entries)
    }

    /// Removes a book from the wishlist. Removing an absent book is a no-op.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, owner_id: &str, book_id: &str) -> Result<(), ServiceError> {
        let deleted = WishlistItem::delete_many()
            .filter(wishlist_item::Column::OwnerId.eq(owner_id))
            .filter(wishlist_item::Column::BookId.eq(book_id))
            .exec(&*self.db)
            .await?;

        if deleted.rows_affected > 0 {
            self.event_sender
                .send_or_log(Event::ItemRemovedFromWishlist {
                    owner_id: owner_id.to_string(),
                    book_id: book_id.to_string(),
                })
                .await;
        }

        Ok(())
    }

    /// Deletes the owner's whole wishlist. Idempotent.
    #[instrument(skip(self))]
    pub async fn clear(&self, owner_id: &str) -> Result<u64, ServiceError> {
        let result = WishlistItem::delete_many()
            .filter(wishlist_item::Column::OwnerId.eq(owner_id))
            .exec(&*self.db)
            .await?;

        info!(
            "Cleared {} wishlist entries for {}",
            result.rows_affected, owner_id
        );
        Ok(result.rows_affected)
    }
}
