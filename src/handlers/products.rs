use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::AppServices;
use crate::domain::product::{NewProduct, Product, ProductChanges};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub title: String,
    pub description: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
    #[serde(default, alias = "discountPercentage")]
    pub discount_percentage: f64,
    #[serde(default)]
    pub rating: f64,
    pub stock: i32,
    pub brand: String,
    pub category: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Every field is optional; omitted fields keep their stored value.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    #[serde(alias = "discountPercentage")]
    pub discount_percentage: Option<f64>,
    pub rating: Option<f64>,
    pub stock: Option<i32>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub thumbnail: Option<String>,
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: String,
    pub discount_percentage: f64,
    pub rating: f64,
    pub stock: i32,
    pub brand: String,
    pub category: String,
    pub thumbnail: Option<String>,
    pub images: Vec<String>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        ProductResponse {
            id: p.id,
            title: p.title,
            description: p.description,
            price: p.price.to_string(),
            discount_percentage: p.discount_percentage,
            rating: p.rating,
            stock: p.stock,
            brand: p.brand,
            category: p.category,
            thumbnail: p.thumbnail,
            images: p.images,
        }
    }
}

fn parse_price(raw: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(raw).map_err(|e| AppError::BadRequest(format!("Invalid price '{}': {}", raw, e)))
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /products
#[utoipa::path(
    post,
    path = "/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid price or stock"),
    ),
    tag = "products"
)]
pub async fn create_product(
    services: web::Data<AppServices>,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let price = parse_price(&body.price)?;
    let product = NewProduct {
        title: body.title,
        description: body.description,
        price,
        discount_percentage: body.discount_percentage,
        rating: body.rating,
        stock: body.stock,
        brand: body.brand,
        category: body.category,
        thumbnail: body.thumbnail,
        images: body.images,
    };

    let created = web::block(move || services.catalog.create_product(product)).await??;

    Ok(HttpResponse::Created().json(ProductResponse::from(created)))
}

/// GET /products/{id}
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 400, description = "Malformed product id"),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn get_product(
    services: web::Data<AppServices>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let product = web::block(move || services.catalog.get_product(&id)).await??;

    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// PUT /products/{id}
#[utoipa::path(
    put,
    path = "/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Malformed product id, price or stock"),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn update_product(
    services: web::Data<AppServices>,
    path: web::Path<String>,
    body: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let body = body.into_inner();
    let changes = ProductChanges {
        title: body.title,
        description: body.description,
        price: body.price.as_deref().map(parse_price).transpose()?,
        discount_percentage: body.discount_percentage,
        rating: body.rating,
        stock: body.stock,
        brand: body.brand,
        category: body.category,
        thumbnail: body.thumbnail,
        images: body.images,
    };

    let product = web::block(move || services.catalog.update_product(&id, changes)).await??;

    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// DELETE /products/{id}
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 400, description = "Malformed product id"),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn delete_product(
    services: web::Data<AppServices>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    web::block(move || services.catalog.delete_product(&id)).await??;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Product deleted" })))
}
