use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::AppServices;
use crate::domain::order::Order;
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

/// Checkout request. Clients may also send `items` and `total`; both are
/// ignored because the order is always rebuilt from the stored cart.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub user_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// One of pending, processing, shipped, delivered, cancelled (any case).
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub product_id: Uuid,
    pub quantity: i32,
    /// Unit price captured at checkout.
    pub price: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: String,
    pub items: Vec<OrderItemResponse>,
    pub total: String,
    pub status: String,
    pub created_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        OrderResponse {
            id: order.id,
            user_id: order.user_id,
            items: order
                .items
                .into_iter()
                .map(|i| OrderItemResponse {
                    product_id: i.product_id,
                    quantity: i.quantity,
                    price: i.price.to_string(),
                })
                .collect(),
            total: order.total.to_string(),
            status: order.status.to_string(),
            created_at: order.created_at.to_rfc3339(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Checks out the user's cart: prices each item from the catalog, stores a
/// pending order and empties the cart. Cart items whose product has left the
/// catalog are dropped from the order.
#[utoipa::path(
    post,
    path = "/orders/",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order created", body = OrderResponse),
        (status = 400, description = "Cart is empty"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    services: web::Data<AppServices>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = body.into_inner().user_id;

    let order = web::block(move || services.checkout.create_order(&user_id)).await??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /orders/{user_id}
#[utoipa::path(
    get,
    path = "/orders/{user_id}",
    params(("user_id" = String, Path, description = "Order owner")),
    responses((status = 200, description = "The user's orders, oldest first", body = Vec<OrderResponse>)),
    tag = "orders"
)]
pub async fn list_user_orders(
    services: web::Data<AppServices>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    let orders = web::block(move || services.orders.list_orders(&user_id)).await??;

    let body: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// PATCH /orders/{order_id}/status
#[utoipa::path(
    patch,
    path = "/orders/{order_id}/status",
    params(("order_id" = String, Path, description = "Order id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Updated order", body = OrderResponse),
        (status = 400, description = "Invalid status or malformed order id"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Transition not allowed by the status policy"),
    ),
    tag = "orders"
)]
pub async fn update_order_status(
    services: web::Data<AppServices>,
    path: web::Path<String>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let status = body.into_inner().status;

    let order = web::block(move || services.orders.update_status(&order_id, &status)).await??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}
