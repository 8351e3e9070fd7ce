use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::cart::{Cart, CartItem};
use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderItem, OrderStatus};
use crate::domain::product::{NewProduct, Product, ProductChanges};
use crate::schema::{carts, orders, products};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = carts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartRow {
    pub id: Uuid,
    pub user_id: String,
    pub items: Value,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = carts)]
pub struct NewCartRow {
    pub id: Uuid,
    pub user_id: String,
    pub items: Value,
}

impl TryFrom<CartRow> for Cart {
    type Error = DomainError;

    fn try_from(row: CartRow) -> Result<Self, Self::Error> {
        let items: Vec<CartItem> = serde_json::from_value(row.items)
            .map_err(|e| DomainError::Internal(format!("corrupt cart {}: {}", row.id, e)))?;
        Ok(Cart {
            id: row.id,
            user_id: row.user_id,
            items,
            version: row.version,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub user_id: String,
    pub items: Value,
    pub total: BigDecimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub user_id: String,
    pub items: Value,
    pub total: BigDecimal,
    pub status: String,
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let items: Vec<OrderItem> = serde_json::from_value(row.items)
            .map_err(|e| DomainError::Internal(format!("corrupt order {}: {}", row.id, e)))?;
        let status: OrderStatus = row
            .status
            .parse()
            .map_err(|e| DomainError::Internal(format!("order {}: {}", row.id, e)))?;
        Ok(Order {
            id: row.id,
            user_id: row.user_id,
            items,
            total: row.total,
            status,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: BigDecimal,
    pub discount_percentage: f64,
    pub rating: f64,
    pub stock: i32,
    pub brand: String,
    pub category: String,
    pub thumbnail: Option<String>,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: BigDecimal,
    pub discount_percentage: f64,
    pub rating: f64,
    pub stock: i32,
    pub brand: String,
    pub category: String,
    pub thumbnail: Option<String>,
    pub images: Vec<String>,
}

impl NewProductRow {
    pub fn new(id: Uuid, p: NewProduct) -> Self {
        Self {
            id,
            title: p.title,
            description: p.description,
            price: p.price,
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

/// `None` fields are left out of the `UPDATE`.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = products)]
pub struct ProductChangesRow {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<BigDecimal>,
    pub discount_percentage: Option<f64>,
    pub rating: Option<f64>,
    pub stock: Option<i32>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub thumbnail: Option<String>,
    pub images: Option<Vec<String>>,
}

impl From<ProductChanges> for ProductChangesRow {
    fn from(c: ProductChanges) -> Self {
        Self {
            title: c.title,
            description: c.description,
            price: c.price,
            discount_percentage: c.discount_percentage,
            rating: c.rating,
            stock: c.stock,
            brand: c.brand,
            category: c.category,
            thumbnail: c.thumbnail,
            images: c.images,
        }
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            title: row.title,
            description: row.description,
            price: row.price,
            discount_percentage: row.discount_percentage,
            rating: row.rating,
            stock: row.stock,
            brand: row.brand,
            category: row.category,
            thumbnail: row.thumbnail,
            images: row.images,
            created_at: row.created_at,
        }
    }
}
