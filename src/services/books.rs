use crate::{
    entities::{book, Book, BookModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};

/// Catalog administration. Book ids come from the caller (external catalog
/// identifiers), so creating the same id twice is a conflict rather than an
/// upsert.
#[derive(Clone)]
pub struct BookService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookInput {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub price: Decimal,
    pub stock_quantity: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBookInput {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub price: Option<Decimal>,
    pub stock_quantity: Option<i32>,
}

impl BookService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input), fields(book_id = %input.id))]
    pub async fn create_book(&self, input: CreateBookInput) -> Result<BookModel, ServiceError> {
        validate_book_fields(&input.id, input.price, input.stock_quantity)?;

        if Book::find_by_id(&input.id).one(&*self.db).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Book {} already exists",
                input.id
            )));
        }

        let model = book::ActiveModel {
            id: Set(input.id.clone()),
            title: Set(input.title),
            author: Set(input.author),
            description: Set(input.description),
            thumbnail_url: Set(input.thumbnail_url),
            price: Set(input.price),
            stock_quantity: Set(input.stock_quantity),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        };

        let model = model.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::BookCreated(input.id))
            .await;

        Ok(model)
    }

    pub async fn get_book(&self, id: &str) -> Result<BookModel, ServiceError> {
        Book::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Book {} not found", id)))
    }

    /// Paginated catalog listing, optionally filtered by a substring match on
    /// title or author.
    pub async fn list_books(
        &self,
        search: Option<&str>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<BookModel>, u64), ServiceError> {
        let mut query = Book::find();

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(book::Column::Title.contains(term))
                    .add(book::Column::Author.contains(term)),
            );
        }

        let paginator = query
            .order_by_asc(book::Column::Title)
            .paginate(&*self.db, per_page);

        let total = paginator.num_items().await?;
        let data = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((data, total))
    }

    #[instrument(skip(self, input))]
    pub async fn update_book(
        &self,
        id: &str,
        input: UpdateBookInput,
    ) -> Result<BookModel, ServiceError> {
        let existing = self.get_book(id).await?;

        if let Some(price) = input.price {
            if price < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Price cannot be negative".to_string(),
                ));
            }
        }
        if let Some(stock) = input.stock_quantity {
            if stock < 0 {
                return Err(ServiceError::ValidationError(
                    "Stock quantity cannot be negative".to_string(),
                ));
            }
        }

        let mut model: book::ActiveModel = existing.into();
        if let Some(title) = input.title {
            model.title = Set(title);
        }
        if let Some(author) = input.author {
            model.author = Set(author);
        }
        if let Some(description) = input.description {
            model.description = Set(Some(description));
        }
        if let Some(thumbnail_url) = input.thumbnail_url {
            model.thumbnail_url = Set(Some(thumbnail_url));
        }
        if let Some(price) = input.price {
            model.price = Set(price);
        }
        if let Some(stock) = input.stock_quantity {
            model.stock_quantity = Set(stock);
        }
        model.updated_at = Set(Utc::now());

        let updated = model.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::BookUpdated(id.to_string()))
            .await;

        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_book(&self, id: &str) -> Result<(), ServiceError> {
        let result = Book::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Book {} not found", id)));
        }

        self.event_sender
            .send_or_log(Event::BookDeleted(id.to_string()))
            .await;

        info!("Deleted book {}", id);
        Ok(())
    }
}

fn validate_book_fields(id: &str, price: Decimal, stock: i32) -> Result<(), ServiceError> {
    if id.trim().is_empty() {
        return Err(ServiceError::ValidationError(
            "Book id cannot be empty".to_string(),
        ));
    }
    if price < Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "Price cannot be negative".to_string(),
        ));
    }
    if stock < 0 {
        return Err(ServiceError::ValidationError(
            "Stock quantity cannot be negative".to_string(),
        ));
    }
    Ok(())
}
