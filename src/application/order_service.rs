use std::sync::Arc;

use bigdecimal::{BigDecimal, Zero};
use uuid::Uuid;

use super::order_engine::place_order;
use crate::domain::errors::DomainError;
use crate::domain::order::{is_whole_cents, CartItem, ClientInfo, ListResult, OrderView};
use crate::domain::ports::{OrderRepository, OrderUnitOfWork};

pub const MAX_PAGE_SIZE: i64 = 100;

pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
}

impl OrderService {
    pub fn new(repo: Arc<dyn OrderRepository>) -> Self {
        Self { repo }
    }

    /// Validates the request shape, then places the order in one transaction.
    pub fn create_order(
        &self,
        client: ClientInfo,
        items: Vec<CartItem>,
    ) -> Result<OrderView, DomainError> {
        validate_request(&client, &items)?;

        let result = self
            .repo
            .in_transaction(Box::new(move |uow: &mut dyn OrderUnitOfWork| {
                place_order(uow, client, &items)
            }));

        match &result {
            Ok(order) => log::info!(
                "order {} placed: {} item(s), total {}",
                order.id,
                order.items.len(),
                order.total_amount
            ),
            Err(DomainError::StockUnavailable(shortfall)) => {
                log::warn!("order rejected: {shortfall}")
            }
            Err(e) => log::error!("order creation failed: {e}"),
        }
        result
    }

    pub fn get_order(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        self.repo.find_by_id(id)
    }

    pub fn list_orders(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        self.repo.list(page.max(1), limit.clamp(1, MAX_PAGE_SIZE))
    }
}

fn validate_request(client: &ClientInfo, items: &[CartItem]) -> Result<(), DomainError> {
    for (field, value) in [
        ("name", &client.name),
        ("phone", &client.phone),
        ("address", &client.address),
    ] {
        if value.trim().is_empty() {
            return Err(DomainError::InvalidInput(format!(
                "clientInfo.{field} must not be empty"
            )));
        }
    }
    if items.is_empty() {
        return Err(DomainError::InvalidInput("cart must not be empty".into()));
    }
    for item in items {
        if item.quantity <= 0 {
            return Err(DomainError::InvalidInput(format!(
                "quantity for product {} must be positive",
                item.product_id
            )));
        }
        if item.unit_price < BigDecimal::zero() {
            return Err(DomainError::InvalidInput(format!(
                "price for product {} must not be negative",
                item.product_id
            )));
        }
        if !is_whole_cents(&item.unit_price) {
            return Err(DomainError::InvalidInput(format!(
                "price {} for product {} has more than two decimal places",
                item.unit_price, item.product_id
            )));
        }
    }
    Ok(())
}
