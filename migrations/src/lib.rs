pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_books_table;
mod m20240101_000002_create_cart_items_table;
mod m20240101_000003_create_coupons_table;
mod m20240101_000004_create_orders_table;
mod m20240101_000005_create_order_items_table;
mod m20240101_000006_create_users_table;
mod m20240101_000007_create_wishlist_items_table;
mod m20240101_000008_create_contact_inquiries_table;
mod m20240101_000009_create_reviews_table;
mod m20240301_000010_add_unique_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_books_table::Migration),
            Box::new(m20240101_000002_create_cart_items_table::Migration),
            Box::new(m20240101_000003_create_coupons_table::Migration),
            Box::new(m20240101_000004_create_orders_table::Migration),
            Box::new(m20240101_000005_create_order_items_table::Migration),
            Box::new(m20240101_000006_create_users_table::Migration),
            Box::new(m20240101_000007_create_wishlist_items_table::Migration),
            Box::new(m20240101_000008_create_contact_inquiries_table::Migration),
            Box::new(m20240101_000009_create_reviews_table::Migration),
            Box::new(m20240301_000010_add_unique_indexes::Migration),
        ]
    }
}
