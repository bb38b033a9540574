use uuid::Uuid;

use super::catalog::{Category, NewCategory, Product, ProductFilter, ProductInput, ProductView};
use super::errors::DomainError;
use super::order::{CartItem, ListResult, NewOrder, OrderView};

pub trait CatalogRepository: Send + Sync + 'static {
    fn list_categories(&self) -> Result<Vec<Category>, DomainError>;
    fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError>;
    fn create_category(&self, category: NewCategory) -> Result<Category, DomainError>;

    fn list_products(&self, filter: &ProductFilter) -> Result<Vec<ProductView>, DomainError>;
    fn find_product(&self, id: Uuid) -> Result<Option<ProductView>, DomainError>;
    fn create_product(&self, input: ProductInput) -> Result<ProductView, DomainError>;
    fn update_product(&self, id: Uuid, input: ProductInput) -> Result<ProductView, DomainError>;
    fn delete_product(&self, id: Uuid) -> Result<Product, DomainError>;
    fn count_products(&self) -> Result<i64, DomainError>;

    /// Runs `work` atomically: committed when it returns `Ok`, rolled back otherwise.
    fn in_catalog_transaction(&self, work: CatalogWork<'_>) -> Result<(), DomainError>;
}

/// Catalog writes that become visible together or not at all.
pub trait CatalogUnitOfWork {
    fn count_products(&mut self) -> Result<i64, DomainError>;
    fn find_category_by_slug(&mut self, slug: &str) -> Result<Option<Category>, DomainError>;
    fn create_category(&mut self, category: NewCategory) -> Result<Category, DomainError>;
    fn create_product(&mut self, input: ProductInput) -> Result<ProductView, DomainError>;
}

pub type CatalogWork<'a> =
    Box<dyn FnOnce(&mut dyn CatalogUnitOfWork) -> Result<(), DomainError> + Send + 'a>;

/// Store operations available to the order engine inside one transaction.
///
/// Every call made through a unit of work becomes visible to other
/// transactions only if the enclosing `OrderRepository::in_transaction`
/// returns `Ok`.
pub trait OrderUnitOfWork {
    /// Reads a product and locks it against concurrent stock changes until
    /// the unit of work ends.
    fn find_product_for_update(&mut self, id: Uuid) -> Result<Option<Product>, DomainError>;
    fn create_order_with_items(
        &mut self,
        order: NewOrder,
        items: &[CartItem],
    ) -> Result<OrderView, DomainError>;
    fn decrement_stock(&mut self, id: Uuid, amount: i32) -> Result<(), DomainError>;
}

pub type TransactionWork<'a> =
    Box<dyn FnOnce(&mut dyn OrderUnitOfWork) -> Result<OrderView, DomainError> + Send + 'a>;

pub trait OrderRepository: Send + Sync + 'static {
    /// Runs `work` atomically: committed when it returns `Ok`, rolled back otherwise.
    fn in_transaction(&self, work: TransactionWork<'_>) -> Result<OrderView, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError>;
    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError>;
}
