use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use crate::domain::catalog::{Category, NewCategory, Product, ProductFilter, ProductInput, ProductView};
use crate::domain::errors::DomainError;
use crate::domain::order::{page_offset, CartItem, ListResult, NewOrder, OrderItemView, OrderView};
use crate::domain::ports::{
    CatalogRepository, CatalogUnitOfWork, CatalogWork, OrderRepository, OrderUnitOfWork,
    TransactionWork,
};

#[derive(Debug, Clone, Default)]
struct State {
    categories: HashMap<Uuid, Category>,
    products: HashMap<Uuid, Product>,
    orders: Vec<OrderView>,
}

impl State {
    fn view(&self, product: &Product) -> Result<ProductView, DomainError> {
        let category = self
            .categories
            .get(&product.category_id)
            .cloned()
            .ok_or_else(|| DomainError::Internal(format!("dangling category {}", product.category_id)))?;
        Ok(ProductView {
            product: product.clone(),
            category,
        })
    }

    fn ensure_category(&self, id: Uuid) -> Result<(), DomainError> {
        if self.categories.contains_key(&id) {
            Ok(())
        } else {
            Err(DomainError::InvalidInput(format!("unknown category {id}")))
        }
    }

    fn category_by_slug(&self, slug: &str) -> Option<Category> {
        self.categories.values().find(|c| c.slug == slug).cloned()
    }

    fn insert_category(&mut self, category: NewCategory) -> Result<Category, DomainError> {
        if self.category_by_slug(&category.slug).is_some() {
            return Err(DomainError::Conflict(format!(
                "category slug '{}' already exists",
                category.slug
            )));
        }
        let created = Category {
            id: Uuid::new_v4(),
            name: category.name,
            slug: category.slug,
            description: category.description,
            created_at: Utc::now(),
        };
        self.categories.insert(created.id, created.clone());
        Ok(created)
    }

    fn insert_product(&mut self, input: ProductInput) -> Result<ProductView, DomainError> {
        self.ensure_category(input.category_id)?;
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            price: input.price,
            discount_price: input.discount_price,
            stock: input.stock,
            image_url: input.image_url,
            category_id: input.category_id,
            created_at: now,
            updated_at: now,
        };
        self.products.insert(product.id, product.clone());
        self.view(&product)
    }
}

/// A thread-safe in-memory catalog and order store.
///
/// Transactions run against a copy of the state while holding the lock and
/// replace it only on success, so concurrent orders are fully serialised
/// and a failed order leaves nothing behind.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, DomainError> {
        self.state
            .lock()
            .map_err(|_| DomainError::Internal("store lock poisoned".into()))
    }

    /// Number of committed orders.
    pub fn order_count(&self) -> Result<usize, DomainError> {
        Ok(self.lock()?.orders.len())
    }
}

impl CatalogRepository for InMemoryStore {
    fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        let state = self.lock()?;
        let mut categories: Vec<Category> = state.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError> {
        Ok(self.lock()?.category_by_slug(slug))
    }

    fn create_category(&self, category: NewCategory) -> Result<Category, DomainError> {
        self.lock()?.insert_category(category)
    }

    fn list_products(&self, filter: &ProductFilter) -> Result<Vec<ProductView>, DomainError> {
        let state = self.lock()?;
        let needle = filter.q.as_ref().map(|q| q.to_lowercase());
        let mut matches = Vec::new();
        for product in state.products.values() {
            if let Some(needle) = &needle {
                if !product.name.to_lowercase().contains(needle)
                    && !product.description.to_lowercase().contains(needle)
                {
                    continue;
                }
            }
            let view = state.view(product)?;
            if let Some(slug) = &filter.category {
                if &view.category.slug != slug {
                    continue;
                }
            }
            matches.push(view);
        }
        matches.sort_by(|a, b| {
            b.product
                .created_at
                .cmp(&a.product.created_at)
                .then_with(|| a.product.id.cmp(&b.product.id))
        });
        Ok(matches)
    }

    fn find_product(&self, id: Uuid) -> Result<Option<ProductView>, DomainError> {
        let state = self.lock()?;
        state.products.get(&id).map(|p| state.view(p)).transpose()
    }

    fn create_product(&self, input: ProductInput) -> Result<ProductView, DomainError> {
        self.lock()?.insert_product(input)
    }

    fn update_product(&self, id: Uuid, input: ProductInput) -> Result<ProductView, DomainError> {
        let mut state = self.lock()?;
        state.ensure_category(input.category_id)?;
        let product = state
            .products
            .get_mut(&id)
            .ok_or(DomainError::NotFound("Product"))?;
        product.name = input.name;
        product.description = input.description;
        product.price = input.price;
        product.discount_price = input.discount_price;
        product.stock = input.stock;
        product.image_url = input.image_url;
        product.category_id = input.category_id;
        product.updated_at = Utc::now();
        let product = product.clone();
        state.view(&product)
    }

    fn delete_product(&self, id: Uuid) -> Result<Product, DomainError> {
        let mut state = self.lock()?;
        state
            .products
            .remove(&id)
            .ok_or(DomainError::NotFound("Product"))
    }

    fn count_products(&self) -> Result<i64, DomainError> {
        Ok(self.lock()?.products.len() as i64)
    }

    fn in_catalog_transaction(&self, work: CatalogWork<'_>) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        let mut snapshot = state.clone();
        work(&mut SnapshotUnitOfWork {
            state: &mut snapshot,
        } as &mut dyn CatalogUnitOfWork)?;
        *state = snapshot;
        Ok(())
    }
}

/// Unit of work over a private copy of the store state.
struct SnapshotUnitOfWork<'a> {
    state: &'a mut State,
}

impl OrderUnitOfWork for SnapshotUnitOfWork<'_> {
    fn find_product_for_update(&mut self, id: Uuid) -> Result<Option<Product>, DomainError> {
        Ok(self.state.products.get(&id).cloned())
    }

    fn create_order_with_items(
        &mut self,
        order: NewOrder,
        items: &[CartItem],
    ) -> Result<OrderView, DomainError> {
        let view = OrderView {
            id: Uuid::new_v4(),
            client_name: order.client.name,
            client_phone: order.client.phone,
            client_address: order.client.address,
            total_amount: order.total_amount,
            created_at: Utc::now(),
            items: items
                .iter()
                .map(|i| OrderItemView {
                    id: Uuid::new_v4(),
                    product_id: i.product_id,
                    quantity: i.quantity,
                    price_at_time: i.unit_price.clone(),
                })
                .collect(),
        };
        self.state.orders.push(view.clone());
        Ok(view)
    }

    fn decrement_stock(&mut self, id: Uuid, amount: i32) -> Result<(), DomainError> {
        let product = self
            .state
            .products
            .get_mut(&id)
            .ok_or(DomainError::NotFound("Product"))?;
        if product.stock < amount {
            return Err(DomainError::Internal(format!(
                "stock of product {id} would become negative"
            )));
        }
        product.stock -= amount;
        product.updated_at = Utc::now();
        Ok(())
    }
}

impl CatalogUnitOfWork for SnapshotUnitOfWork<'_> {
    fn count_products(&mut self) -> Result<i64, DomainError> {
        Ok(self.state.products.len() as i64)
    }

    fn find_category_by_slug(&mut self, slug: &str) -> Result<Option<Category>, DomainError> {
        Ok(self.state.category_by_slug(slug))
    }

    fn create_category(&mut self, category: NewCategory) -> Result<Category, DomainError> {
        self.state.insert_category(category)
    }

    fn create_product(&mut self, input: ProductInput) -> Result<ProductView, DomainError> {
        self.state.insert_product(input)
    }
}

impl OrderRepository for InMemoryStore {
    fn in_transaction(&self, work: TransactionWork<'_>) -> Result<OrderView, DomainError> {
        let mut state = self.lock()?;
        let mut snapshot = state.clone();
        let mut uow = SnapshotUnitOfWork {
            state: &mut snapshot,
        };
        let order = work(&mut uow as &mut dyn OrderUnitOfWork)?;
        *state = snapshot;
        Ok(order)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        let state = self.lock()?;
        Ok(state.orders.iter().find(|o| o.id == id).cloned())
    }

    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let state = self.lock()?;
        let offset = usize::try_from(page_offset(page, limit)).unwrap_or(usize::MAX);
        let items = state
            .orders
            .iter()
            .rev()
            .skip(offset)
            .take(limit.max(0) as usize)
            .map(|o| OrderView {
                items: vec![],
                ..o.clone()
            })
            .collect();
        Ok(ListResult {
            items,
            total: state.orders.len() as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::thread;

    use bigdecimal::BigDecimal;

    use super::*;
    use crate::application::order_engine::place_order;
    use crate::domain::errors::StockShortfall;
    use crate::domain::order::ClientInfo;

    fn store_with_product(stock: i32) -> (InMemoryStore, Uuid) {
        let store = InMemoryStore::new();
        let category = store
            .create_category(NewCategory::new("Electronics".into(), None, None).unwrap())
            .unwrap();
        let product = store
            .create_product(ProductInput {
                name: "Wireless Headphones".into(),
                description: "Noise-cancelling".into(),
                price: BigDecimal::from_str("199.99").unwrap(),
                discount_price: None,
                stock,
                image_url: None,
                category_id: category.id,
            })
            .unwrap();
        (store, product.product.id)
    }

    fn order(store: &InMemoryStore, items: Vec<CartItem>) -> Result<OrderView, DomainError> {
        store.in_transaction(Box::new(move |uow: &mut dyn OrderUnitOfWork| {
            place_order(
                uow,
                ClientInfo {
                    name: "Ada".into(),
                    phone: "555".into(),
                    address: "1 Main St".into(),
                },
                &items,
            )
        }))
    }

    fn line(product_id: Uuid, quantity: i32) -> CartItem {
        CartItem {
            product_id,
            quantity,
            unit_price: BigDecimal::from_str("10.00").unwrap(),
        }
    }

    fn stock_of(store: &InMemoryStore, id: Uuid) -> i32 {
        store.find_product(id).unwrap().unwrap().product.stock
    }

    #[test]
    fn committed_order_decrements_stock() {
        let (store, p) = store_with_product(5);

        let placed = order(&store, vec![line(p, 3)]).unwrap();

        assert_eq!(placed.total_amount, BigDecimal::from_str("30.00").unwrap());
        assert_eq!(stock_of(&store, p), 2);
        assert_eq!(store.order_count().unwrap(), 1);
    }

    #[test]
    fn failed_order_rolls_back_earlier_lines() {
        let (store, p1) = store_with_product(5);

        let err = order(&store, vec![line(p1, 1), line(Uuid::new_v4(), 1)]).unwrap_err();

        assert!(matches!(err, DomainError::StockUnavailable(StockShortfall::Missing { .. })));
        assert_eq!(stock_of(&store, p1), 5);
        assert_eq!(store.order_count().unwrap(), 0);
    }

    #[test]
    fn concurrent_orders_for_last_unit_allow_exactly_one() {
        let (store, p) = store_with_product(1);

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || order(&store, vec![line(p, 1)]))
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results.iter().any(|r| matches!(
            r,
            Err(DomainError::StockUnavailable(StockShortfall::Insufficient { .. }))
        )));
        assert_eq!(stock_of(&store, p), 0);
    }

    #[test]
    fn product_filter_matches_description_case_insensitively() {
        let (store, _) = store_with_product(1);

        let hits = store
            .list_products(&ProductFilter::new(Some("NOISE".into()), None))
            .unwrap();
        let misses = store
            .list_products(&ProductFilter::new(None, Some("books".into())))
            .unwrap();

        assert_eq!(hits.len(), 1);
        assert!(misses.is_empty());
    }

    #[test]
    fn failed_catalog_transaction_leaves_nothing_behind() {
        let store = InMemoryStore::new();

        let err = store
            .in_catalog_transaction(Box::new(|uow: &mut dyn CatalogUnitOfWork| {
                let books = uow.create_category(NewCategory::new("Books".into(), None, None)?)?;
                uow.create_product(ProductInput {
                    name: "Programming Guide".into(),
                    description: String::new(),
                    price: BigDecimal::from(50),
                    discount_price: None,
                    stock: 1,
                    image_url: None,
                    category_id: books.id,
                })?;
                uow.create_product(ProductInput {
                    name: "Orphan".into(),
                    description: String::new(),
                    price: BigDecimal::from(1),
                    discount_price: None,
                    stock: 1,
                    image_url: None,
                    category_id: Uuid::new_v4(),
                })?;
                Ok(())
            }))
            .unwrap_err();

        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert!(store.list_categories().unwrap().is_empty());
        assert_eq!(store.count_products().unwrap(), 0);
    }

    #[test]
    fn duplicate_slug_conflicts() {
        let store = InMemoryStore::new();
        store
            .create_category(NewCategory::new("Books".into(), None, None).unwrap())
            .unwrap();

        let err = store
            .create_category(NewCategory::new("Books".into(), None, None).unwrap())
            .unwrap_err();

        assert!(matches!(err, DomainError::Conflict(_)));
    }
}
