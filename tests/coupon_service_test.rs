mod common;

use bookstore_api::{errors::ServiceError, services::coupons::CreateCouponInput};
use chrono::{Duration, Utc};
use common::TestApp;
use rust_decimal_macros::dec;

fn coupon_input(code: &str, days: i64, max_uses: i32) -> CreateCouponInput {
    CreateCouponInput {
        code: code.to_string(),
        discount_percent: dec!(20.00),
        expires_at: Utc::now() + Duration::days(days),
        max_uses,
    }
}

#[tokio::test]
async fn create_uppercases_code_and_rejects_duplicates() {
    let app = TestApp::new().await;
    let coupons = &app.state.services.coupons;

    let created = coupons
        .create_coupon(coupon_input("save20", 7, 5))
        .await
        .expect("create");
    assert_eq!(created.code, "SAVE20");
    assert_eq!(created.used_count, 0);

    let err = coupons
        .create_coupon(coupon_input("SAVE20", 7, 5))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn validate_is_case_insensitive_and_does_not_consume() {
    let app = TestApp::new().await;
    let coupons = &app.state.services.coupons;
    coupons
        .create_coupon(coupon_input("SAVE20", 7, 1))
        .await
        .expect("create");

    let first = coupons.validate_coupon("save20").await.expect("validate");
    assert_eq!(first.code, "SAVE20");
    assert_eq!(first.used_count, 0);

    // Validation is repeatable; it never burns a use.
    let second = coupons.validate_coupon("SAVE20").await.expect("revalidate");
    assert_eq!(second.used_count, 0);
}

#[tokio::test]
async fn validate_distinguishes_unknown_expired_and_exhausted() {
    let app = TestApp::new().await;
    let coupons = &app.state.services.coupons;

    let err = coupons.validate_coupon("NOPE").await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    coupons
        .create_coupon(coupon_input("EXPIRED", -1, 5))
        .await
        .expect("create expired");
    let err = coupons.validate_coupon("EXPIRED").await.unwrap_err();
    match err {
        ServiceError::InvalidOperation(msg) => assert!(msg.contains("expired")),
        other => panic!("unexpected error: {:?}", other),
    }

    coupons
        .create_coupon(coupon_input("ONCE", 7, 1))
        .await
        .expect("create");
    coupons
        .redeem(&*app.state.db, "ONCE")
        .await
        .expect("redeem");
    let err = coupons.validate_coupon("ONCE").await.unwrap_err();
    match err {
        ServiceError::InvalidOperation(msg) => assert!(msg.contains("usage limit")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn redeem_increments_until_cap() {
    let app = TestApp::new().await;
    let coupons = &app.state.services.coupons;
    coupons
        .create_coupon(coupon_input("TWICE", 7, 2))
        .await
        .expect("create");

    let first = coupons
        .redeem(&*app.state.db, "TWICE")
        .await
        .expect("first redeem");
    assert_eq!(first.used_count, 1);

    let second = coupons
        .redeem(&*app.state.db, "TWICE")
        .await
        .expect("second redeem");
    assert_eq!(second.used_count, 2);

    let err = coupons.redeem(&*app.state.db, "TWICE").await.unwrap_err();
    match err {
        ServiceError::InvalidOperation(msg) => assert!(msg.contains("usage limit")),
        other => panic!("unexpected error: {:?}", other),
    }

    // The cap was never exceeded.
    let model = coupons.validate_coupon("TWICE").await.unwrap_err();
    assert!(matches!(model, ServiceError::InvalidOperation(_)));
}

#[tokio::test]
async fn active_list_excludes_expired_and_exhausted() {
    let app = TestApp::new().await;
    let coupons = &app.state.services.coupons;

    coupons
        .create_coupon(coupon_input("LIVE", 7, 5))
        .await
        .expect("create");
    coupons
        .create_coupon(coupon_input("GONE", -1, 5))
        .await
        .expect("create expired");
    coupons
        .create_coupon(coupon_input("SPENT", 7, 1))
        .await
        .expect("create");
    coupons
        .redeem(&*app.state.db, "SPENT")
        .await
        .expect("exhaust");

    let active = coupons.list_active_coupons().await.expect("list");
    let codes: Vec<_> = active.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(codes, vec!["LIVE"]);

    let all = coupons.list_coupons().await.expect("list all");
    assert_eq!(all.len(), 3);
}
