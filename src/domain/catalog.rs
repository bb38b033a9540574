use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;
use super::order::is_whole_cents;

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub description: String,
}

impl NewCategory {
    /// Builds a category, deriving the slug from the name when none is given.
    pub fn new(
        name: String,
        slug: Option<String>,
        description: Option<String>,
    ) -> Result<Self, DomainError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::InvalidInput("category name must not be empty".into()));
        }
        let slug = match slug {
            Some(s) => s.trim().to_string(),
            None => slugify(&name),
        };
        if !is_valid_slug(&slug) {
            return Err(DomainError::InvalidInput(format!(
                "slug '{slug}' must contain only lowercase letters, digits and '-'"
            )));
        }
        Ok(Self {
            name,
            slug,
            description: description.unwrap_or_default(),
        })
    }
}

/// Lowercases `name` and collapses every run of non-alphanumerics into one `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub discount_price: Option<BigDecimal>,
    pub stock: i32,
    pub image_url: Option<String>,
    pub category_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product together with the category it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductView {
    pub product: Product,
    pub category: Category,
}

/// Fields accepted when creating or replacing a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub discount_price: Option<BigDecimal>,
    pub stock: i32,
    pub image_url: Option<String>,
    pub category_id: Uuid,
}

impl ProductInput {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidInput("product name must not be empty".into()));
        }
        if self.price < BigDecimal::zero() {
            return Err(DomainError::InvalidInput("price must not be negative".into()));
        }
        let amounts = std::iter::once(("price", &self.price))
            .chain(self.discount_price.iter().map(|d| ("discount price", d)));
        for (field, amount) in amounts {
            if !is_whole_cents(amount) {
                return Err(DomainError::InvalidInput(format!(
                    "{field} {amount} has more than two decimal places"
                )));
            }
        }
        if self.stock < 0 {
            return Err(DomainError::InvalidInput("stock must not be negative".into()));
        }
        if let Some(discount) = &self.discount_price {
            if *discount < BigDecimal::zero() {
                return Err(DomainError::InvalidInput(
                    "discount price must not be negative".into(),
                ));
            }
            if *discount > self.price {
                return Err(DomainError::InvalidInput(format!(
                    "discount price {discount} exceeds price {}",
                    self.price
                )));
            }
        }
        Ok(())
    }
}

/// Criteria for listing products. Empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Case-insensitive substring matched against name or description.
    pub q: Option<String>,
    /// Category slug.
    pub category: Option<String>,
}

impl ProductFilter {
    pub fn new(q: Option<String>, category: Option<String>) -> Self {
        let non_blank = |s: Option<String>| s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            q: non_blank(q),
            category: non_blank(category),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn input(price: &str, discount: Option<&str>) -> ProductInput {
        ProductInput {
            name: "Laptop Stand".to_string(),
            description: String::new(),
            price: BigDecimal::from_str(price).unwrap(),
            discount_price: discount.map(|d| BigDecimal::from_str(d).unwrap()),
            stock: 1,
            image_url: None,
            category_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Home & Garden"), "home-garden");
        assert_eq!(slugify("  Books "), "books");
    }

    #[test]
    fn slug_validation_rejects_uppercase_and_spaces() {
        assert!(is_valid_slug("home-garden"));
        assert!(!is_valid_slug("Home"));
        assert!(!is_valid_slug("a b"));
        assert!(!is_valid_slug(""));
    }

    #[test]
    fn new_category_derives_slug() {
        let c = NewCategory::new("Home & Garden".into(), None, None).unwrap();
        assert_eq!(c.slug, "home-garden");
        assert_eq!(c.description, "");
    }

    #[test]
    fn new_category_rejects_blank_name() {
        assert!(matches!(
            NewCategory::new("   ".into(), None, None),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn discount_above_price_is_rejected() {
        assert!(input("10.00", Some("12.00")).validate().is_err());
        assert!(input("10.00", Some("10.00")).validate().is_ok());
        assert!(input("10.00", None).validate().is_ok());
    }

    #[test]
    fn sub_cent_amounts_are_rejected() {
        assert!(input("9.999", None).validate().is_err());
        assert!(input("10.00", Some("4.995")).validate().is_err());
        assert!(input("9.990", Some("4.50")).validate().is_ok());
    }

    #[test]
    fn negative_price_is_rejected() {
        assert!(input("-1", None).validate().is_err());
    }

    #[test]
    fn filter_drops_blank_values() {
        let f = ProductFilter::new(Some("  ".into()), Some("books".into()));
        assert!(f.q.is_none());
        assert_eq!(f.category.as_deref(), Some("books"));
    }
}
