use std::sync::Arc;

use uuid::Uuid;

use crate::domain::catalog::{Category, NewCategory, ProductFilter, ProductInput, ProductView};
use crate::domain::errors::DomainError;
use crate::domain::ports::CatalogRepository;

pub struct CatalogService {
    repo: Arc<dyn CatalogRepository>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn CatalogRepository>) -> Self {
        Self { repo }
    }

    pub fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        self.repo.list_categories()
    }

    pub fn create_category(&self, category: NewCategory) -> Result<Category, DomainError> {
        let created = self.repo.create_category(category)?;
        log::info!("category '{}' created", created.slug);
        Ok(created)
    }

    pub fn list_products(&self, filter: &ProductFilter) -> Result<Vec<ProductView>, DomainError> {
        self.repo.list_products(filter)
    }

    pub fn get_product(&self, id: Uuid) -> Result<ProductView, DomainError> {
        self.repo
            .find_product(id)?
            .ok_or(DomainError::NotFound("Product"))
    }

    pub fn create_product(&self, input: ProductInput) -> Result<ProductView, DomainError> {
        input.validate()?;
        let created = self.repo.create_product(input)?;
        log::info!("product {} created", created.product.id);
        Ok(created)
    }

    pub fn update_product(&self, id: Uuid, input: ProductInput) -> Result<ProductView, DomainError> {
        input.validate()?;
        let updated = self.repo.update_product(id, input)?;
        log::info!("product {id} updated");
        Ok(updated)
    }

    pub fn delete_product(&self, id: Uuid) -> Result<(), DomainError> {
        self.repo.delete_product(id)?;
        log::info!("product {id} deleted");
        Ok(())
    }
}
