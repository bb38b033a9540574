use thiserror::Error;
use uuid::Uuid;

/// Why a cart line could not be fulfilled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockShortfall {
    /// No product exists with the requested id.
    Missing { product_id: Uuid },
    /// The product exists but has fewer units than requested.
    Insufficient {
        product_id: Uuid,
        name: String,
        requested: i32,
        available: i32,
    },
}

impl StockShortfall {
    pub fn product_id(&self) -> Uuid {
        match self {
            StockShortfall::Missing { product_id }
            | StockShortfall::Insufficient { product_id, .. } => *product_id,
        }
    }
}

impl std::fmt::Display for StockShortfall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockShortfall::Missing { product_id } => {
                write!(f, "Insufficient stock for product: unknown product {product_id}")
            }
            StockShortfall::Insufficient {
                name,
                requested,
                available,
                ..
            } => write!(
                f,
                "Insufficient stock for product: {name} (requested {requested}, available {available})"
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    StockUnavailable(StockShortfall),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal error: {0}")]
    Internal(String),
}
