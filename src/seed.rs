use std::str::FromStr;

use bigdecimal::BigDecimal;

use crate::domain::catalog::{NewCategory, ProductInput};
use crate::domain::errors::DomainError;
use crate::domain::ports::{CatalogRepository, CatalogUnitOfWork};

const CATEGORIES: &[(&str, &str, &str)] = &[
    ("Electronics", "electronics", "Electronic devices and accessories"),
    ("Clothing", "clothing", "Fashion and apparel items"),
    ("Books", "books", "Physical and digital books"),
    ("Home & Garden", "home-garden", "Home improvement and gardening products"),
];

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price: &'static str,
    stock: i32,
    category: &'static str,
    image_url: &'static str,
}

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "Wireless Headphones",
        description: "Premium noise-cancelling wireless headphones with 30-hour battery life",
        price: "199.99",
        stock: 45,
        category: "electronics",
        image_url: "https://images.unsplash.com/photo-1505740420928-5e560c06d30e?w=800&q=80",
    },
    SeedProduct {
        name: "Smart Watch",
        description: "Fitness tracking smartwatch with heart rate monitor and GPS",
        price: "299.99",
        stock: 23,
        category: "electronics",
        image_url: "https://images.unsplash.com/photo-1523275335684-37898b6baf30?w=800&q=80",
    },
    SeedProduct {
        name: "Cotton T-Shirt",
        description: "Comfortable 100% organic cotton t-shirt in multiple colors",
        price: "29.99",
        stock: 150,
        category: "clothing",
        image_url: "https://images.unsplash.com/photo-1521572163474-6864f9cf17ab?w=800&q=80",
    },
    SeedProduct {
        name: "Programming Guide",
        description: "Comprehensive guide to modern web development and best practices",
        price: "49.99",
        stock: 67,
        category: "books",
        image_url: "https://images.unsplash.com/photo-1532012197267-da84d127e765?w=800&q=80",
    },
    SeedProduct {
        name: "Garden Tool Set",
        description: "Professional 10-piece garden tool set with ergonomic handles",
        price: "89.99",
        stock: 34,
        category: "home-garden",
        image_url: "https://images.unsplash.com/photo-1416879595882-3373a0480b5b?w=800&q=80",
    },
    SeedProduct {
        name: "Laptop Stand",
        description: "Adjustable aluminum laptop stand for better ergonomics",
        price: "59.99",
        stock: 0,
        category: "electronics",
        image_url: "https://images.unsplash.com/photo-1527864550417-7fd91fc51a46?w=800&q=80",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories_created: usize,
    pub products_created: usize,
}

/// Loads the demo catalog in one transaction. Refuses to run when any
/// product already exists; categories whose slug is already taken are reused.
pub fn seed_catalog(catalog: &dyn CatalogRepository) -> Result<SeedSummary, DomainError> {
    let mut summary = SeedSummary {
        categories_created: 0,
        products_created: 0,
    };
    catalog.in_catalog_transaction(Box::new(|uow: &mut dyn CatalogUnitOfWork| {
        seed_into(uow, &mut summary)
    }))?;
    log::info!(
        "catalog seeded: {} categories, {} products",
        summary.categories_created,
        summary.products_created
    );
    Ok(summary)
}

fn seed_into(uow: &mut dyn CatalogUnitOfWork, summary: &mut SeedSummary) -> Result<(), DomainError> {
    if uow.count_products()? > 0 {
        return Err(DomainError::InvalidInput(
            "Database is not empty. Seed command aborted.".into(),
        ));
    }

    for &(name, slug, description) in CATEGORIES {
        if uow.find_category_by_slug(slug)?.is_none() {
            uow.create_category(NewCategory {
                name: name.to_string(),
                slug: slug.to_string(),
                description: description.to_string(),
            })?;
            summary.categories_created += 1;
        }
    }

    for p in PRODUCTS {
        let category = uow
            .find_category_by_slug(p.category)?
            .ok_or(DomainError::NotFound("Category"))?;
        let price = BigDecimal::from_str(p.price)
            .map_err(|e| DomainError::Internal(format!("bad seed price {}: {e}", p.price)))?;
        uow.create_product(ProductInput {
            name: p.name.to_string(),
            description: p.description.to_string(),
            price,
            discount_price: None,
            stock: p.stock,
            image_url: Some(p.image_url.to_string()),
            category_id: category.id,
        })?;
        summary.products_created += 1;
    }
    Ok(())
}
