mod common;

use bookstore_api::{
    errors::ServiceError,
    services::{
        contacts::CreateInquiryInput,
        reviews::{CreateReviewInput, UpdateReviewInput},
        users::{CreateUserInput, UpdateUserInput},
    },
};
use common::TestApp;
use rust_decimal_macros::dec;

#[tokio::test]
async fn user_crud_round_trip() {
    let app = TestApp::new().await;
    let users = &app.state.services.users;

    let created = users
        .create_user(CreateUserInput {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            first_name: Some("Alice".to_string()),
            last_name: None,
        })
        .await
        .expect("create");

    let by_name = users
        .get_user_by_username("alice")
        .await
        .expect("lookup by username");
    assert_eq!(by_name.id, created.id);

    let updated = users
        .update_user(
            created.id,
            UpdateUserInput {
                email: Some("alice@books.example".to_string()),
                first_name: None,
                last_name: Some("Liddell".to_string()),
            },
        )
        .await
        .expect("update");
    assert_eq!(updated.email, "alice@books.example");
    assert_eq!(updated.last_name.as_deref(), Some("Liddell"));
    assert_eq!(updated.username, "alice");

    users.delete_user(created.id).await.expect("delete");
    let err = users.get_user(created.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn duplicate_username_or_email_conflicts() {
    let app = TestApp::new().await;
    let users = &app.state.services.users;

    users
        .create_user(CreateUserInput {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            first_name: None,
            last_name: None,
        })
        .await
        .expect("create");

    let err = users
        .create_user(CreateUserInput {
            username: "alice".to_string(),
            email: "other@example.com".to_string(),
            first_name: None,
            last_name: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    let err = users
        .create_user(CreateUserInput {
            username: "alice2".to_string(),
            email: "alice@example.com".to_string(),
            first_name: None,
            last_name: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn wishlist_add_list_remove() {
    let app = TestApp::new().await;
    app.seed_book("vol-1", dec!(12.00), 4).await;
    app.seed_book("vol-2", dec!(8.00), 0).await;

    let wishlists = &app.state.services.wishlists;
    wishlists.add_item("alice", "vol-1").await.expect("add");
    wishlists.add_item("alice", "vol-2").await.expect("add");

    // Duplicate saves conflict.
    let err = wishlists.add_item("alice", "vol-1").await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    let entries = wishlists.list_items("alice").await.expect("list");
    assert_eq!(entries.len(), 2);
    let first = entries[0].book.as_ref().expect("book snapshot");
    let second = entries[1].book.as_ref().expect("book snapshot");
    assert!(first.stock_quantity > 0);
    assert_eq!(second.stock_quantity, 0);

    wishlists.remove_item("alice", "vol-1").await.expect("remove");
    // Removing again is a no-op.
    wishlists.remove_item("alice", "vol-1").await.expect("noop");

    let removed = wishlists.clear("alice").await.expect("clear");
    assert_eq!(removed, 1);
}

#[tokio::test]
async fn contact_inquiries_paginate_newest_first() {
    let app = TestApp::new().await;
    let contacts = &app.state.services.contacts;

    for n in 1..=3 {
        contacts
            .create_inquiry(CreateInquiryInput {
                name: format!("Reader {}", n),
                email: format!("reader{}@example.com", n),
                subject: format!("Question {}", n),
                message: "Do you ship abroad?".to_string(),
            })
            .await
            .expect("create");
    }

    let (page, total) = contacts.list_inquiries(1, 2).await.expect("page 1");
    assert_eq!(total, 3);
    assert_eq!(page.len(), 2);

    let (rest, _) = contacts.list_inquiries(2, 2).await.expect("page 2");
    assert_eq!(rest.len(), 1);

    contacts.delete_inquiry(page[0].id).await.expect("delete");
    let err = contacts.get_inquiry(page[0].id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn one_review_per_reader_per_book() {
    let app = TestApp::new().await;
    app.seed_book("vol-1", dec!(12.00), 4).await;

    let reviews = &app.state.services.reviews;
    let created = reviews
        .create_review(CreateReviewInput {
            owner_id: "alice".to_string(),
            book_id: "vol-1".to_string(),
            rating: 4,
            comment: Some("Solid read".to_string()),
        })
        .await
        .expect("create");

    let err = reviews
        .create_review(CreateReviewInput {
            owner_id: "alice".to_string(),
            book_id: "vol-1".to_string(),
            rating: 5,
            comment: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    let updated = reviews
        .update_review(
            created.id,
            UpdateReviewInput {
                rating: Some(5),
                comment: None,
            },
        )
        .await
        .expect("update");
    assert_eq!(updated.rating, 5);
    assert_eq!(updated.comment.as_deref(), Some("Solid read"));

    let for_book = reviews.list_reviews_for_book("vol-1").await.expect("list");
    assert_eq!(for_book.len(), 1);

    let err = reviews
        .create_review(CreateReviewInput {
            owner_id: "bob".to_string(),
            book_id: "vol-1".to_string(),
            rating: 9,
            comment: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
}
