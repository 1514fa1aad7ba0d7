pub mod books;
pub mod carts;
pub mod checkout;
pub mod contacts;
pub mod coupons;
pub mod orders;
pub mod reviews;
pub mod users;
pub mod wishlists;

pub use books::BookService;
pub use carts::CartService;
pub use checkout::CheckoutService;
pub use contacts::ContactService;
pub use coupons::CouponService;
pub use orders::OrderService;
pub use reviews::ReviewService;
pub use users::UserService;
pub use wishlists::WishlistService;
