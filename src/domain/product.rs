use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::cart::Cart;
use super::errors::DomainError;

/// Catalog entry. The cart core only ever reads `price`; the remaining fields
/// are carried for the catalog endpoints and the cross-cart report.
#[derive(Debug, Clone)]
pub struct Product {
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

#[derive(Debug, Clone)]
pub struct NewProduct {
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

/// Partial update of a catalog entry. `None` leaves the stored value as is.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
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

impl ProductChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.discount_percentage.is_none()
            && self.rating.is_none()
            && self.stock.is_none()
            && self.brand.is_none()
            && self.category.is_none()
            && self.thumbnail.is_none()
            && self.images.is_none()
    }

    pub fn apply_to(self, product: &mut Product) {
        if let Some(title) = self.title {
            product.title = title;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(discount) = self.discount_percentage {
            product.discount_percentage = discount;
        }
        if let Some(rating) = self.rating {
            product.rating = rating;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(brand) = self.brand {
            product.brand = brand;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if self.thumbnail.is_some() {
            product.thumbnail = self.thumbnail;
        }
        if let Some(images) = self.images {
            product.images = images;
        }
    }
}

/// Largest price the catalog stores (`NUMERIC(12, 2)`), exclusive.
const PRICE_LIMIT: i64 = 10_000_000_000;

/// A catalog price must be non-negative, have at most two decimal places and
/// fit the stored precision.
pub fn validate_price(price: &BigDecimal) -> Result<(), DomainError> {
    if *price < BigDecimal::from(0) {
        return Err(DomainError::InvalidInput("price must not be negative".to_string()));
    }
    let (_, scale) = price.normalized().as_bigint_and_exponent();
    if scale > 2 {
        return Err(DomainError::InvalidInput(format!(
            "price must have at most 2 decimal places, got {price}"
        )));
    }
    if *price >= BigDecimal::from(PRICE_LIMIT) {
        return Err(DomainError::InvalidInput(format!("price {price} is too large")));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(DomainError::InvalidSortOrder),
        }
    }
}

/// Fields the cross-cart report can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    Price,
    Rating,
    Stock,
    Brand,
    Category,
    DiscountPercentage,
    Quantity,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Price => "price",
            SortField::Rating => "rating",
            SortField::Stock => "stock",
            SortField::Brand => "brand",
            SortField::Category => "category",
            SortField::DiscountPercentage => "discount_percentage",
            SortField::Quantity => "quantity",
        }
    }

    fn compare(self, a: &AggregatedProduct, b: &AggregatedProduct) -> Ordering {
        match self {
            SortField::Title => a.product.title.cmp(&b.product.title),
            SortField::Price => a.product.price.cmp(&b.product.price),
            SortField::Rating => a.product.rating.total_cmp(&b.product.rating),
            SortField::Stock => a.product.stock.cmp(&b.product.stock),
            SortField::Brand => a.product.brand.cmp(&b.product.brand),
            SortField::Category => a.product.category.cmp(&b.product.category),
            SortField::DiscountPercentage => a
                .product
                .discount_percentage
                .total_cmp(&b.product.discount_percentage),
            SortField::Quantity => a.quantity.cmp(&b.quantity),
        }
    }
}

impl FromStr for SortField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(SortField::Title),
            "price" => Ok(SortField::Price),
            "rating" => Ok(SortField::Rating),
            "stock" => Ok(SortField::Stock),
            "brand" => Ok(SortField::Brand),
            "category" => Ok(SortField::Category),
            "discount_percentage" | "discountPercentage" => Ok(SortField::DiscountPercentage),
            "quantity" => Ok(SortField::Quantity),
            other => Err(DomainError::InvalidInput(format!(
                "cannot sort by '{other}'"
            ))),
        }
    }
}

/// A catalog product annotated with the quantity held across all carts.
#[derive(Debug, Clone)]
pub struct AggregatedProduct {
    pub product: Product,
    pub quantity: i64,
}

#[derive(Debug, Clone)]
pub struct CartItemsReport {
    pub sort_by: SortField,
    pub order: SortDirection,
    pub items: Vec<AggregatedProduct>,
}

/// Sum quantities per product across every cart.
pub fn total_quantities(carts: &[Cart]) -> HashMap<Uuid, i64> {
    let mut totals = HashMap::new();
    for item in carts.iter().flat_map(|c| c.items.iter()) {
        *totals.entry(item.product_id).or_insert(0) += i64::from(item.quantity);
    }
    totals
}

/// Join `products` with `totals` and sort. Ties keep title order so the
/// report is stable across calls.
pub fn build_report(
    products: Vec<Product>,
    totals: &HashMap<Uuid, i64>,
    sort_by: SortField,
    order: SortDirection,
) -> CartItemsReport {
    let mut items: Vec<AggregatedProduct> = products
        .into_iter()
        .map(|product| AggregatedProduct {
            quantity: totals.get(&product.id).copied().unwrap_or(0),
            product,
        })
        .collect();

    items.sort_by(|a, b| {
        let ordering = sort_by
            .compare(a, b)
            .then_with(|| a.product.title.cmp(&b.product.title));
        match order {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    CartItemsReport {
        sort_by,
        order,
        items,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::cart::CartItem;

    pub(crate) fn product_with_price(price: &str) -> Product {
        Product {
            id: Uuid::new_v4(),
            title: format!("Product at {price}"),
            description: "test product".to_string(),
            price: BigDecimal::from_str(price).unwrap(),
            discount_percentage: 0.0,
            rating: 4.0,
            stock: 10,
            brand: "Acme".to_string(),
            category: "misc".to_string(),
            thumbnail: None,
            images: vec![],
            created_at: Utc::now(),
        }
    }

    fn cart(items: Vec<CartItem>) -> Cart {
        Cart {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4().to_string(),
            items,
            version: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn price_validation_matches_stored_precision() {
        for ok in ["0", "9.99", "10.50", "10.500", "9999999999.99"] {
            assert!(validate_price(&BigDecimal::from_str(ok).unwrap()).is_ok(), "{ok}");
        }
        for bad in ["-0.01", "1.999", "10000000000"] {
            assert!(
                matches!(
                    validate_price(&BigDecimal::from_str(bad).unwrap()),
                    Err(DomainError::InvalidInput(_))
                ),
                "{bad}"
            );
        }
    }

    #[test]
    fn changes_only_touch_given_fields() {
        let mut product = product_with_price("10.00");
        let changes = ProductChanges {
            price: Some(BigDecimal::from_str("12.50").unwrap()),
            stock: Some(0),
            ..Default::default()
        };
        assert!(!changes.is_empty());

        changes.apply_to(&mut product);

        assert_eq!(product.price, BigDecimal::from_str("12.50").unwrap());
        assert_eq!(product.stock, 0);
        assert_eq!(product.title, "Product at 10.00");
        assert!(ProductChanges::default().is_empty());
    }

    #[test]
    fn quantities_are_summed_across_users() {
        let p = Uuid::new_v4();
        let q = Uuid::new_v4();
        let carts = vec![
            cart(vec![CartItem { product_id: p, quantity: 2 }]),
            cart(vec![
                CartItem { product_id: p, quantity: 3 },
                CartItem { product_id: q, quantity: 1 },
            ]),
        ];

        let totals = total_quantities(&carts);

        assert_eq!(totals[&p], 5);
        assert_eq!(totals[&q], 1);
    }

    #[test]
    fn report_sorts_by_price_descending() {
        let cheap = product_with_price("1.00");
        let pricey = product_with_price("99.00");
        let totals = HashMap::from([(cheap.id, 1), (pricey.id, 7)]);

        let report = build_report(
            vec![cheap.clone(), pricey.clone()],
            &totals,
            SortField::Price,
            SortDirection::Desc,
        );

        assert_eq!(report.items[0].product.id, pricey.id);
        assert_eq!(report.items[0].quantity, 7);
        assert_eq!(report.items[1].product.id, cheap.id);
    }

    #[test]
    fn report_sorts_by_quantity_ascending() {
        let a = product_with_price("5.00");
        let b = product_with_price("6.00");
        let totals = HashMap::from([(a.id, 9), (b.id, 2)]);

        let report = build_report(vec![a, b.clone()], &totals, SortField::Quantity, SortDirection::Asc);

        assert_eq!(report.items[0].product.id, b.id);
    }

    #[test]
    fn sort_direction_is_case_insensitive() {
        assert_eq!("DESC".parse::<SortDirection>().unwrap(), SortDirection::Desc);
        assert!(matches!(
            "sideways".parse::<SortDirection>(),
            Err(DomainError::InvalidSortOrder)
        ));
    }

    #[test]
    fn unknown_sort_field_is_invalid_input() {
        assert!(matches!(
            "colour".parse::<SortField>(),
            Err(DomainError::InvalidInput(_))
        ));
    }
}
