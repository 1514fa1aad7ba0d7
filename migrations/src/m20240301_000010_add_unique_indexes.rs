use sea_orm_migration::prelude::*;

use super::m20240101_000002_create_cart_items_table::CartItems;
use super::m20240101_000007_create_wishlist_items_table::WishlistItems;
use super::m20240101_000009_create_reviews_table::Reviews;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// One line per (owner, book) across carts, wishlists and reviews.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_cart_items_owner_book")
                    .table(CartItems::Table)
                    .col(CartItems::OwnerId)
                    .col(CartItems::BookId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_wishlist_items_owner_book")
                    .table(WishlistItems::Table)
                    .col(WishlistItems::OwnerId)
                    .col(WishlistItems::BookId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_reviews_owner_book")
                    .table(Reviews::Table)
                    .col(Reviews::OwnerId)
                    .col(Reviews::BookId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("uq_cart_items_owner_book")
                    .table(CartItems::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("uq_wishlist_items_owner_book")
                    .table(WishlistItems::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("uq_reviews_owner_book")
                    .table(Reviews::Table)
                    .to_owned(),
            )
            .await
    }
}
