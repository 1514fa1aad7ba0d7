use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookstore API",
        version = "1.0.0",
        description = r#"
# Bookstore API

Backend for an online bookstore: catalog, per-user carts, coupon discounts,
checkout, order tracking, wishlists, reviews and contact inquiries.

## Responses

Successful responses are wrapped in a standard envelope:

```json
{
  "success": true,
  "data": { },
  "message": null,
  "errors": null
}
```

Errors carry an HTTP status plus a body:

```json
{
  "error": "Not Found",
  "message": "Book vol-1 not found",
  "timestamp": "2025-06-01T10:30:00Z"
}
```

## Pagination

List endpoints accept `page` (default 1) and `limit` (default 20); `GET /books`
also accepts `search` for title/author filtering.
        "#
    ),
    servers(
        (url = "http://localhost:8080/api/v1", description = "Local development")
    ),
    tags(
        (name = "Books", description = "Catalog endpoints"),
        (name = "Cart", description = "Shopping cart endpoints"),
        (name = "Checkout", description = "Order submission"),
        (name = "Orders", description = "Order tracking and lifecycle"),
        (name = "Coupons", description = "Coupon management and validation"),
        (name = "Users", description = "Profile endpoints"),
        (name = "Wishlist", description = "Saved books"),
        (name = "Contact", description = "Contact inquiries"),
        (name = "Reviews", description = "Book reviews"),
        (name = "Health", description = "Health check endpoints")
    ),
    components(
        schemas(
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,
            crate::ListQuery,
            crate::handlers::coupons::DiscountInfo,
            crate::handlers::coupons::CouponValidation,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_generates() {
        let openapi = ApiDocV1::openapi();
        assert_eq!(openapi.info.title, "Bookstore API");
        assert!(openapi.components.is_some());
    }
}
