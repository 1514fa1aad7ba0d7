//! SeaORM entities backing the bookstore collections.

pub mod book;
pub mod cart_item;
pub mod contact_inquiry;
pub mod coupon;
pub mod order;
pub mod order_item;
pub mod review;
pub mod user;
pub mod wishlist_item;

pub use book::{Entity as Book, Model as BookModel};
pub use cart_item::{Entity as CartItem, Model as CartItemModel};
pub use contact_inquiry::{Entity as ContactInquiry, Model as ContactInquiryModel};
pub use coupon::{Entity as Coupon, Model as CouponModel};
pub use order::{Entity as Order, Model as OrderModel, OrderStatus};
pub use order_item::{Entity as OrderItem, Model as OrderItemModel};
pub use review::{Entity as Review, Model as ReviewModel};
pub use user::{Entity as User, Model as UserModel};
pub use wishlist_item::{Entity as WishlistItem, Model as WishlistItemModel};
