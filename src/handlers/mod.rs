pub mod books;
pub mod carts;
pub mod checkout;
pub mod common;
pub mod contacts;
pub mod coupons;
pub mod orders;
pub mod reviews;
pub mod users;
pub mod wishlists;

use crate::events::EventSender;
use crate::services::{
    BookService, CartService, CheckoutService, ContactService, CouponService, OrderService,
    ReviewService, UserService, WishlistService,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub use crate::AppState;

/// Container for the explicitly constructed store objects the HTTP handlers
/// call into. Built once at startup and shared through `AppState`.
#[derive(Clone)]
pub struct AppServices {
    pub books: Arc<BookService>,
    pub carts: Arc<CartService>,
    pub checkout: Arc<CheckoutService>,
    pub coupons: Arc<CouponService>,
    pub orders: Arc<OrderService>,
    pub users: Arc<UserService>,
    pub wishlists: Arc<WishlistService>,
    pub contacts: Arc<ContactService>,
    pub reviews: Arc<ReviewService>,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        let coupons = CouponService::new(db.clone(), event_sender.clone());
        let checkout = Arc::new(CheckoutService::new(
            db.clone(),
            event_sender.clone(),
            coupons.clone(),
        ));

        Self {
            books: Arc::new(BookService::new(db.clone(), event_sender.clone())),
            carts: Arc::new(CartService::new(db.clone(), event_sender.clone())),
            checkout,
            coupons: Arc::new(coupons),
            orders: Arc::new(OrderService::new(db.clone(), event_sender.clone())),
            users: Arc::new(UserService::new(db.clone(), event_sender.clone())),
            wishlists: Arc::new(WishlistService::new(db.clone(), event_sender.clone())),
            contacts: Arc::new(ContactService::new(db.clone(), event_sender.clone())),
            reviews: Arc::new(ReviewService::new(db, event_sender)),
        }
    }
}
