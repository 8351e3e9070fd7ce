pub mod cart;
pub mod orders;
pub mod products;

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::{web, HttpRequest};
use utoipa::OpenApi;

use crate::errors::AppError;

#[derive(OpenApi)]
#[openapi(
    paths(
        cart::get_cart,
        cart::add_to_cart,
        cart::remove_from_cart,
        cart::list_carts,
        cart::sort_cart_items,
        orders::create_order,
        orders::list_user_orders,
        orders::update_order_status,
        products::create_product,
        products::get_product,
        products::update_product,
        products::delete_product,
    ),
    tags(
        (name = "cart", description = "Per-user shopping carts"),
        (name = "orders", description = "Checkout and order status"),
        (name = "products", description = "Catalog maintenance"),
    )
)]
pub struct ApiDoc;

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid request body: {}", err)).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid query string: {}", err)).into()
}

/// Register every route. Expects `web::Data<AppServices>` in app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .service(
            web::scope("/cart")
                .route("", web::get().to(cart::list_carts))
                .route("/", web::get().to(cart::list_carts))
                .route("/sort/{order}", web::get().to(cart::sort_cart_items))
                .route("/{user_id}", web::get().to(cart::get_cart))
                .route("/{user_id}/add", web::post().to(cart::add_to_cart))
                .route("/{user_id}/remove", web::post().to(cart::remove_from_cart)),
        )
        .service(
            web::scope("/orders")
                .route("", web::post().to(orders::create_order))
                .route("/", web::post().to(orders::create_order))
                .route("/{user_id}", web::get().to(orders::list_user_orders))
                .route("/{order_id}/status", web::patch().to(orders::update_order_status)),
        )
        .service(
            web::scope("/products")
                .route("", web::post().to(products::create_product))
                .route("/{id}", web::get().to(products::get_product))
                .route("/{id}", web::put().to(products::update_product))
                .route("/{id}", web::delete().to(products::delete_product)),
        );
}
