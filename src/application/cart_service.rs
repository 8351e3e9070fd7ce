use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::cart::{merge_items, parse_product_id, remove_product, Cart, CartItem, CartItemInput};
use crate::domain::errors::DomainError;
use crate::domain::ports::{CartRepository, CatalogRepository};
use crate::domain::product::{build_report, total_quantities, CartItemsReport, SortDirection, SortField};

use super::MAX_WRITE_ATTEMPTS;

pub struct CartService {
    carts: Arc<dyn CartRepository>,
    catalog: Arc<dyn CatalogRepository>,
}

impl CartService {
    pub fn new(carts: Arc<dyn CartRepository>, catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { carts, catalog }
    }

    /// Return the user's cart, creating an empty one on first access.
    pub fn get_or_create(&self, user_id: &str) -> Result<Cart, DomainError> {
        match self.carts.find_by_user(user_id)? {
            Some(cart) => Ok(cart),
            None => self.carts.create_if_missing(user_id),
        }
    }

    /// Merge a batch of additions into the user's cart with a single write.
    ///
    /// Every entry is validated before anything is written: a malformed id is
    /// `InvalidReference`, a non-positive quantity is `InvalidInput` and an id
    /// with no catalog product is `NotFound`.
    pub fn add_items(&self, user_id: &str, batch: &[CartItemInput]) -> Result<Cart, DomainError> {
        if batch.is_empty() {
            return Err(DomainError::EmptyBatch);
        }

        let additions = batch
            .iter()
            .map(|input| {
                let product_id = parse_product_id(&input.product_id)?;
                if input.quantity <= 0 {
                    return Err(DomainError::InvalidInput(format!(
                        "quantity must be greater than 0, got {}",
                        input.quantity
                    )));
                }
                Ok(CartItem {
                    product_id,
                    quantity: input.quantity,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.ensure_products_exist(&additions)?;

        self.update_items(user_id, |items| merge_items(items, &additions))?;
        log::debug!("Merged {} item(s) into cart of user {}", additions.len(), user_id);

        self.reload(user_id)
    }

    /// Remove a product from the user's cart. Removing a product that is not
    /// in the cart leaves it unchanged.
    pub fn remove_item(&self, user_id: &str, product_id: &str) -> Result<Cart, DomainError> {
        if self.carts.find_by_user(user_id)?.is_none() {
            return Err(DomainError::NotFound("Cart"));
        }
        let product_id = parse_product_id(product_id)?;

        self.update_items(user_id, |items| Ok(remove_product(items, product_id)))?;

        self.reload(user_id)
    }

    pub fn list_all_carts(&self) -> Result<Vec<Cart>, DomainError> {
        self.carts.list_all()
    }

    /// Quantities of every product across all carts, joined with the catalog
    /// and sorted. Products no longer in the catalog are left out.
    pub fn aggregate_items(&self, order: &str, sort_by: &str) -> Result<CartItemsReport, DomainError> {
        let order: SortDirection = order.parse()?;
        let sort_by: SortField = sort_by.parse()?;

        let carts = self.carts.list_all()?;
        let totals = total_quantities(&carts);
        let ids: Vec<Uuid> = totals.keys().copied().collect();
        let products = self.catalog.find_by_ids(&ids)?;

        Ok(build_report(products, &totals, sort_by, order))
    }

    fn ensure_products_exist(&self, items: &[CartItem]) -> Result<(), DomainError> {
        let wanted: HashSet<Uuid> = items.iter().map(|i| i.product_id).collect();
        let ids: Vec<Uuid> = wanted.iter().copied().collect();
        let found: HashSet<Uuid> = self
            .catalog
            .find_by_ids(&ids)?
            .into_iter()
            .map(|p| p.id)
            .collect();

        if wanted.is_subset(&found) {
            Ok(())
        } else {
            Err(DomainError::NotFound("Product"))
        }
    }

    /// Read the cart, apply `change` to its items and write them back only if
    /// nobody else wrote in between, retrying on conflict.
    fn update_items<F>(&self, user_id: &str, change: F) -> Result<(), DomainError>
    where
        F: Fn(Vec<CartItem>) -> Result<Vec<CartItem>, DomainError>,
    {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let cart = self.get_or_create(user_id)?;
            let items = change(cart.items)?;

            if self.carts.replace_items(user_id, &items, cart.version)? {
                return Ok(());
            }
            log::warn!(
                "Cart of user {} changed concurrently (attempt {}/{})",
                user_id,
                attempt,
                MAX_WRITE_ATTEMPTS
            );
        }

        Err(DomainError::ConcurrentModification(user_id.to_string()))
    }

    fn reload(&self, user_id: &str) -> Result<Cart, DomainError> {
        self.carts
            .find_by_user(user_id)?
            .ok_or(DomainError::NotFound("Cart"))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::*;
    use crate::domain::cart::Cart;
    use crate::domain::product::NewProduct;
    use crate::infrastructure::memory::{InMemoryCartRepository, InMemoryCatalog};

    fn new_product(title: &str, price: &str) -> NewProduct {
        NewProduct {
            title: title.to_string(),
            description: String::new(),
            price: BigDecimal::from_str(price).unwrap(),
            discount_percentage: 0.0,
            rating: 0.0,
            stock: 5,
            brand: "Acme".to_string(),
            category: "misc".to_string(),
            thumbnail: None,
            images: vec![],
        }
    }

    fn input(product_id: Uuid, quantity: i32) -> CartItemInput {
        CartItemInput {
            product_id: product_id.to_string(),
            quantity,
        }
    }

    fn setup() -> (CartService, InMemoryCartRepository, InMemoryCatalog) {
        let carts = InMemoryCartRepository::new();
        let catalog = InMemoryCatalog::new();
        let service = CartService::new(Arc::new(carts.clone()), Arc::new(catalog.clone()));
        (service, carts, catalog)
    }

    /// A repository whose conditional writes always lose the race.
    struct AlwaysStale(InMemoryCartRepository);

    impl CartRepository for AlwaysStale {
        fn find_by_user(&self, user_id: &str) -> Result<Option<Cart>, DomainError> {
            self.0.find_by_user(user_id)
        }
        fn create_if_missing(&self, user_id: &str) -> Result<Cart, DomainError> {
            self.0.create_if_missing(user_id)
        }
        fn replace_items(&self, _: &str, _: &[CartItem], _: i64) -> Result<bool, DomainError> {
            Ok(false)
        }
        fn list_all(&self) -> Result<Vec<Cart>, DomainError> {
            self.0.list_all()
        }
    }

    #[test]
    fn get_or_create_persists_an_empty_cart_once() {
        let (service, carts, _) = setup();

        let first = service.get_or_create("alice").unwrap();
        let second = service.get_or_create("alice").unwrap();

        assert!(first.items.is_empty());
        assert_eq!(first.id, second.id);
        assert_eq!(carts.list_all().unwrap().len(), 1);
    }

    #[test]
    fn adding_same_product_twice_merges_quantities() {
        let (service, _, catalog) = setup();
        let p = catalog.create(new_product("mug", "4.00")).unwrap();

        service.add_items("alice", &[input(p, 2)]).unwrap();
        let cart = service.add_items("alice", &[input(p, 3)]).unwrap();

        assert_eq!(cart.items, vec![CartItem { product_id: p, quantity: 5 }]);
    }

    #[test]
    fn whole_batch_is_merged_in_one_call() {
        let (service, _, catalog) = setup();
        let p1 = catalog.create(new_product("mug", "4.00")).unwrap();
        let p2 = catalog.create(new_product("cup", "2.00")).unwrap();

        let cart = service
            .add_items("alice", &[input(p1, 1), input(p2, 2), input(p1, 1)])
            .unwrap();

        assert_eq!(
            cart.items,
            vec![
                CartItem { product_id: p1, quantity: 2 },
                CartItem { product_id: p2, quantity: 2 },
            ]
        );
    }

    #[test]
    fn empty_batch_is_rejected() {
        let (service, _, _) = setup();
        assert!(matches!(
            service.add_items("alice", &[]),
            Err(DomainError::EmptyBatch)
        ));
    }

    #[test]
    fn malformed_product_id_is_invalid_reference() {
        let (service, carts, _) = setup();
        let bad = CartItemInput {
            product_id: "12345".to_string(),
            quantity: 1,
        };

        let err = service.add_items("alice", &[bad]).unwrap_err();

        assert!(matches!(err, DomainError::InvalidReference(_)));
        assert!(carts.find_by_user("alice").unwrap().is_none());
    }

    #[test]
    fn unknown_product_is_not_found_and_nothing_is_written() {
        let (service, carts, catalog) = setup();
        let known = catalog.create(new_product("mug", "4.00")).unwrap();

        let err = service
            .add_items("alice", &[input(known, 1), input(Uuid::new_v4(), 1)])
            .unwrap_err();

        assert!(matches!(err, DomainError::NotFound("Product")));
        assert!(carts.find_by_user("alice").unwrap().is_none());
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        let (service, _, catalog) = setup();
        let p = catalog.create(new_product("mug", "4.00")).unwrap();

        assert!(matches!(
            service.add_items("alice", &[input(p, 0)]),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn remove_without_cart_is_not_found() {
        let (service, _, _) = setup();
        let err = service
            .remove_item("ghost", &Uuid::new_v4().to_string())
            .unwrap_err();

        assert!(matches!(err, DomainError::NotFound("Cart")));
    }

    #[test]
    fn remove_with_malformed_id_is_invalid_reference() {
        let (service, _, _) = setup();
        service.get_or_create("alice").unwrap();

        assert!(matches!(
            service.remove_item("alice", "nope"),
            Err(DomainError::InvalidReference(_))
        ));
    }

    #[test]
    fn removing_absent_product_leaves_cart_unchanged() {
        let (service, _, catalog) = setup();
        let p = catalog.create(new_product("mug", "4.00")).unwrap();
        let before = service.add_items("alice", &[input(p, 2)]).unwrap();

        let after = service
            .remove_item("alice", &Uuid::new_v4().to_string())
            .unwrap();

        assert_eq!(after.items, before.items);
    }

    #[test]
    fn remove_drops_the_product() {
        let (service, _, catalog) = setup();
        let p1 = catalog.create(new_product("mug", "4.00")).unwrap();
        let p2 = catalog.create(new_product("cup", "2.00")).unwrap();
        service
            .add_items("alice", &[input(p1, 1), input(p2, 1)])
            .unwrap();

        let cart = service.remove_item("alice", &p1.to_string()).unwrap();

        assert_eq!(cart.items, vec![CartItem { product_id: p2, quantity: 1 }]);
    }

    #[test]
    fn persistent_write_conflicts_surface_as_concurrent_modification() {
        let catalog = InMemoryCatalog::new();
        let p = catalog.create(new_product("mug", "4.00")).unwrap();
        let service = CartService::new(
            Arc::new(AlwaysStale(InMemoryCartRepository::new())),
            Arc::new(catalog),
        );

        let err = service.add_items("alice", &[input(p, 1)]).unwrap_err();

        assert!(matches!(err, DomainError::ConcurrentModification(u) if u == "alice"));
    }

    #[test]
    fn aggregate_sums_across_users_and_drops_deleted_products() {
        let (service, _, catalog) = setup();
        let mug = catalog.create(new_product("mug", "4.00")).unwrap();
        let cup = catalog.create(new_product("cup", "2.00")).unwrap();
        let gone = catalog.create(new_product("old", "1.00")).unwrap();
        service.add_items("alice", &[input(mug, 2), input(gone, 1)]).unwrap();
        service.add_items("bob", &[input(mug, 1), input(cup, 4)]).unwrap();
        catalog.delete(gone).unwrap();

        let report = service.aggregate_items("ASC", "title").unwrap();

        let rows: Vec<(String, i64)> = report
            .items
            .iter()
            .map(|i| (i.product.title.clone(), i.quantity))
            .collect();
        assert_eq!(rows, vec![("cup".to_string(), 4), ("mug".to_string(), 3)]);
    }

    #[test]
    fn aggregate_rejects_bad_direction() {
        let (service, _, _) = setup();
        assert!(matches!(
            service.aggregate_items("up", "title"),
            Err(DomainError::InvalidSortOrder)
        ));
    }
}
