use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::AppServices;
use crate::domain::cart::{Cart, CartItemInput};
use crate::domain::product::CartItemsReport;
use crate::errors::AppError;

use super::products::ProductResponse;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CartItemRequest {
    pub product_id: String,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    #[serde(default)]
    pub items: Vec<CartItemRequest>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RemoveFromCartParams {
    /// Product to drop from the cart.
    pub product_id: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SortCartItemsParams {
    /// Field to sort by. Defaults to `title`.
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
}

fn default_sort_by() -> String {
    "title".to_string()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemResponse {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub id: Uuid,
    pub user_id: String,
    pub items: Vec<CartItemResponse>,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        CartResponse {
            id: cart.id,
            user_id: cart.user_id,
            items: cart
                .items
                .into_iter()
                .map(|i| CartItemResponse {
                    product_id: i.product_id,
                    quantity: i.quantity,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AggregatedItemResponse {
    #[serde(flatten)]
    pub product: ProductResponse,
    /// Units of this product across every cart.
    pub quantity: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemsReportResponse {
    pub sort_by: String,
    pub order: String,
    pub total_items: usize,
    pub items: Vec<AggregatedItemResponse>,
}

impl From<CartItemsReport> for CartItemsReportResponse {
    fn from(report: CartItemsReport) -> Self {
        CartItemsReportResponse {
            sort_by: report.sort_by.as_str().to_string(),
            order: report.order.as_str().to_string(),
            total_items: report.items.len(),
            items: report
                .items
                .into_iter()
                .map(|i| AggregatedItemResponse {
                    product: i.product.into(),
                    quantity: i.quantity,
                })
                .collect(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /cart/{user_id}
///
/// Returns the user's cart, creating an empty one on first access.
#[utoipa::path(
    get,
    path = "/cart/{user_id}",
    params(("user_id" = String, Path, description = "Cart owner")),
    responses(
        (status = 200, description = "The user's cart", body = CartResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "cart"
)]
pub async fn get_cart(
    services: web::Data<AppServices>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    let cart = web::block(move || services.carts.get_or_create(&user_id)).await??;

    Ok(HttpResponse::Ok().json(CartResponse::from(cart)))
}

/// POST /cart/{user_id}/add
///
/// Merges every submitted item into the cart: a product already in the cart
/// has its quantity increased, anything else is appended.
#[utoipa::path(
    post,
    path = "/cart/{user_id}/add",
    params(("user_id" = String, Path, description = "Cart owner")),
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
        (status = 400, description = "Empty item list, malformed product id or quantity"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Cart was modified concurrently"),
    ),
    tag = "cart"
)]
pub async fn add_to_cart(
    services: web::Data<AppServices>,
    path: web::Path<String>,
    body: web::Json<AddToCartRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    let batch: Vec<CartItemInput> = body
        .into_inner()
        .items
        .into_iter()
        .map(|i| CartItemInput {
            product_id: i.product_id,
            quantity: i.quantity,
        })
        .collect();

    let cart = web::block(move || services.carts.add_items(&user_id, &batch)).await??;

    Ok(HttpResponse::Ok().json(CartResponse::from(cart)))
}

/// POST /cart/{user_id}/remove?product_id=...
#[utoipa::path(
    post,
    path = "/cart/{user_id}/remove",
    params(
        ("user_id" = String, Path, description = "Cart owner"),
        RemoveFromCartParams,
    ),
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
        (status = 400, description = "Malformed product id"),
        (status = 404, description = "Cart not found"),
    ),
    tag = "cart"
)]
pub async fn remove_from_cart(
    services: web::Data<AppServices>,
    path: web::Path<String>,
    query: web::Query<RemoveFromCartParams>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    let product_id = query.into_inner().product_id;

    let cart = web::block(move || services.carts.remove_item(&user_id, &product_id)).await??;

    Ok(HttpResponse::Ok().json(CartResponse::from(cart)))
}

/// GET /cart/
#[utoipa::path(
    get,
    path = "/cart/",
    responses((status = 200, description = "Every cart", body = Vec<CartResponse>)),
    tag = "cart"
)]
pub async fn list_carts(services: web::Data<AppServices>) -> Result<HttpResponse, AppError> {
    let carts = web::block(move || services.carts.list_all_carts()).await??;

    let body: Vec<CartResponse> = carts.into_iter().map(CartResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /cart/sort/{order}
///
/// Reporting view: quantities summed per product over all carts, joined with
/// the catalog and sorted by `sort_by` in `order` (`asc` or `desc`).
#[utoipa::path(
    get,
    path = "/cart/sort/{order}",
    params(
        ("order" = String, Path, description = "`asc` or `desc`"),
        SortCartItemsParams,
    ),
    responses(
        (status = 200, description = "Aggregated cart items", body = CartItemsReportResponse),
        (status = 400, description = "Unknown order or sort field"),
    ),
    tag = "cart"
)]
pub async fn sort_cart_items(
    services: web::Data<AppServices>,
    path: web::Path<String>,
    query: web::Query<SortCartItemsParams>,
) -> Result<HttpResponse, AppError> {
    let order = path.into_inner();
    let sort_by = query.into_inner().sort_by;

    let report = web::block(move || services.carts.aggregate_items(&order, &sort_by)).await??;

    Ok(HttpResponse::Ok().json(CartItemsReportResponse::from(report)))
}
