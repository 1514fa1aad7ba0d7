use crate::{
    entities::{book, cart_item, Book, BookModel, CartItem, CartItemModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Shopping cart service.
///
/// A cart is the set of `cart_item` rows belonging to one owner; there is no
/// separate cart header. Adding a book that is already in the cart merges
/// quantities, and every mutation re-checks stock before committing.
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

/// Display snapshot of a catalog book, taken at read time.
#[derive(Debug, Clone, Serialize)]
pub struct BookSummary {
    pub title: String,
    pub author: String,
    pub price: Decimal,
    pub stock_quantity: i32,
}

impl From<BookModel> for BookSummary {
    fn from(book: BookModel) -> Self {
        Self {
            title: book.title,
            author: book.author,
            price: book.price,
            stock_quantity: book.stock_quantity,
        }
    }
}

/// One cart line with the derived line total. `book` is a best-effort
/// enrichment; a line whose book has left the catalog carries `None` rather
/// than failing the read.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub id: Uuid,
    pub book_id: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub line_total: Decimal,
    pub book: Option<BookSummary>,
}

/// A full cart view: lines plus the running subtotal.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub owner_id: String,
    pub items: Vec<CartLine>,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddToCartInput {
    pub owner_id: String,
    pub book_id: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCartItemInput {
    pub owner_id: String,
    pub book_id: String,
    pub quantity: i32,
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Adds a book to the owner's cart, merging with an existing line when the
    /// book is already present. The merged quantity is checked against the
    /// book's current stock; the unit price is snapshotted from the book at
    /// insert time and refreshed on merge.
    ///
    /// # Errors
    ///
    /// * `ServiceError::ValidationError` - quantity is not positive
    /// * `ServiceError::NotFound` - book does not exist
    /// * `ServiceError::InsufficientStock` - requested quantity exceeds stock
    #[instrument(skip(self))]
    pub async fn add_item(&self, input: AddToCartInput) -> Result<CartView, ServiceError> {
        if input.quantity <= 0 {
            return Err(ServiceError::ValidationError(
                "Quantity must be greater than zero".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let book = Book::find_by_id(&input.book_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Book {} not found", input.book_id)))?;

        let existing = CartItem::find()
            .filter(cart_item::Column::OwnerId.eq(&input.owner_id))
            .filter(cart_item::Column::BookId.eq(&input.book_id))
            .one(&txn)
            .await?;

        let new_quantity = match &existing {
            Some(line) => line.quantity + input.quantity,
            None => input.quantity,
        };

        check_stock(&book, new_quantity)?;

        match existing {
            Some(line) => {
                let mut line: cart_item::ActiveModel = line.into();
                line.quantity = Set(new_quantity);
                line.unit_price = Set(book.price);
                line.updated_at = Set(Utc::now());
                line.update(&txn).await?;
            }
            None => {
                let line = cart_item::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    owner_id: Set(input.owner_id.clone()),
                    book_id: Set(input.book_id.clone()),
                    quantity: Set(input.quantity),
                    unit_price: Set(book.price),
                    created_at: Set(Utc::now()),
                    updated_at: Set(Utc::now()),
                };
                line.insert(&txn).await?;
            }
        }

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::ItemAddedToCart {
                owner_id: input.owner_id.clone(),
                book_id: input.book_id.clone(),
            })
            .await;

        info!(
            "Added book {} x{} to cart for {}",
            input.book_id, input.quantity, input.owner_id
        );
        self.get_cart(&input.owner_id).await
    }

    /// Sets the quantity of a cart line. A quantity of zero or less removes
    /// the line; a positive quantity is validated against stock.
    ///
    /// # Errors
    ///
    /// * `ServiceError::NotFound` - the book is not in the cart
    /// * `ServiceError::InsufficientStock` - quantity exceeds stock
    #[instrument(skip(self))]
    pub async fn set_item_quantity(
        &self,
        input: UpdateCartItemInput,
    ) -> Result<CartView, ServiceError> {
        let txn = self.db.begin().await?;

        let line = CartItem::find()
            .filter(cart_item::Column::OwnerId.eq(&input.owner_id))
            .filter(cart_item::Column::BookId.eq(&input.book_id))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Book {} is not in the cart", input.book_id))
            })?;

        if input.quantity <= 0 {
            let line: cart_item::ActiveModel = line.into();
            line.delete(&txn).await?;
        } else {
            let book = Book::find_by_id(&input.book_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Book {} not found", input.book_id))
                })?;

            check_stock(&book, input.quantity)?;

            let mut line: cart_item::ActiveModel = line.into();
            line.quantity = Set(input.quantity);
            line.updated_at = Set(Utc::now());
            line.update(&txn).await?;
        }

        txn.commit().await?;
        self.get_cart(&input.owner_id).await
    }

    /// Removes a single book from the cart. Fails with `NotFound` if the
    /// owner has no line for that book.
    #[instrument(skip(self))]
    pub async fn remove_item(
        &self,
        owner_id: &str,
        book_id: &str,
    ) -> Result<CartView, ServiceError> {
        let deleted = CartItem::delete_many()
            .filter(cart_item::Column::OwnerId.eq(owner_id))
            .filter(cart_item::Column::BookId.eq(book_id))
            .exec(&*self.db)
            .await?;

        if deleted.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Book {} is not in the cart",
                book_id
            )));
        }

        self.event_sender
            .send_or_log(Event::ItemRemovedFromCart {
                owner_id: owner_id.to_string(),
                book_id: book_id.to_string(),
            })
            .await;

        self.get_cart(owner_id).await
    }

    /// Returns the owner's cart with lines joined against the book catalog.
    /// An owner with no lines gets an empty cart, never an error.
    #[instrument(skip(self))]
    pub async fn get_cart(&self, owner_id: &str) -> Result<CartView, ServiceError> {
        let rows: Vec<(CartItemModel, Option<BookModel>)> = CartItem::find()
            .filter(cart_item::Column::OwnerId.eq(owner_id))
            .order_by_asc(cart_item::Column::CreatedAt)
            .find_also_related(Book)
            .all(&*self.db)
            .await?;

        let mut items = Vec::with_capacity(rows.len());
        let mut subtotal = Decimal::ZERO;

        for (line, book) in rows {
            let line_total = line.unit_price * Decimal::from(line.quantity);
            subtotal += line_total;

            items.push(CartLine {
                id: line.id,
                book_id: line.book_id,
                unit_price: line.unit_price,
                quantity: line.quantity,
                line_total,
                book: book.map(BookSummary::from),
            });
        }

        Ok(CartView {
            owner_id: owner_id.to_string(),
            items,
            subtotal,
        })
    }

    /// Deletes every line in the owner's cart. Idempotent.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self, owner_id: &str) -> Result<u64, ServiceError> {
        let result = CartItem::delete_many()
            .filter(cart_item::Column::OwnerId.eq(owner_id))
            .exec(&*self.db)
            .await?;

        if result.rows_affected > 0 {
            self.event_sender
                .send_or_log(Event::CartCleared {
                    owner_id: owner_id.to_string(),
                })
                .await;
        }

        info!("Cleared {} cart lines for {}", result.rows_affected, owner_id);
        Ok(result.rows_affected)
    }
}

fn check_stock(book: &book::Model, requested: i32) -> Result<(), ServiceError> {
    if requested > book.stock_quantity {
        return Err(ServiceError::InsufficientStock(format!(
            "Only {} copies of {} in stock",
            book.stock_quantity, book.id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_book(stock: i32) -> book::Model {
        book::Model {
            id: "vol-1".to_string(),
            title: "The Rust Programming Language".to_string(),
            author: "Klabnik & Nichols".to_string(),
            description: None,
            thumbnail_url: None,
            price: dec!(29.99),
            stock_quantity: stock,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn check_stock_allows_up_to_available() {
        let book = sample_book(3);
        assert!(check_stock(&book, 3).is_ok());
        assert!(check_stock(&book, 1).is_ok());
    }

    #[test]
    fn check_stock_rejects_over_available() {
        let book = sample_book(2);
        let err = check_stock(&book, 3).unwrap_err();
        match err {
            ServiceError::InsufficientStock(msg) => {
                assert!(msg.contains("Only 2 copies"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn add_to_cart_input_deserialization() {
        let json = r#"{
            "owner_id": "alice",
            "book_id": "vol-1",
            "quantity": 2
        }"#;

        let input: AddToCartInput =
            serde_json::from_str(json).expect("deserialization should succeed");
        assert_eq!(input.owner_id, "alice");
        assert_eq!(input.book_id, "vol-1");
        assert_eq!(input.quantity, 2);
    }

    #[test]
    fn cart_line_total_uses_unit_price_snapshot() {
        let line = CartLine {
            id: Uuid::new_v4(),
            book_id: "vol-1".to_string(),
            unit_price: dec!(12.50),
            quantity: 3,
            line_total: dec!(12.50) * Decimal::from(3),
            book: Some(BookSummary::from(sample_book(5))),
        };
        assert_eq!(line.line_total, dec!(37.50));
    }
}
