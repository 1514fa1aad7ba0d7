use std::sync::Arc;

use axum::Router;
use bookstore_api::{
    config::AppConfig,
    db,
    entities::{book, BookModel},
    events::{self, EventSender},
    handlers::AppServices,
    AppState,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use tokio::sync::mpsc;

/// Test harness: application state over a fresh in-memory SQLite database with
/// the real migrations applied. One connection so the in-memory db survives
/// across queries.
pub struct TestApp {
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new("sqlite::memory:");
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");

        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let db = Arc::new(pool);
        let services = AppServices::new(db.clone(), Arc::new(event_sender.clone()));

        let state = AppState {
            db,
            config: cfg,
            event_sender,
            services,
        };

        Self {
            state,
            _event_task: event_task,
        }
    }

    /// The full v1 router with this app's state, for request-level tests.
    #[allow(dead_code)]
    pub fn router(&self) -> Router {
        Router::new()
            .nest("/api/v1", bookstore_api::api_v1_routes())
            .with_state(self.state.clone())
    }

    /// Insert a catalog book.
    #[allow(dead_code)]
    pub async fn seed_book(&self, id: &str, price: Decimal, stock: i32) -> BookModel {
        let model = book::ActiveModel {
            id: Set(id.to_string()),
            title: Set(format!("Title of {}", id)),
            author: Set("Test Author".to_string()),
            description: Set(None),
            thumbnail_url: Set(None),
            price: Set(price),
            stock_quantity: Set(stock),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        };

        model
            .insert(&*self.state.db)
            .await
            .expect("failed to seed book")
    }
}
