use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::errors::{DomainError, StockShortfall};
use crate::domain::order::{cart_total, CartItem, ClientInfo, NewOrder, OrderView};
use crate::domain::ports::OrderUnitOfWork;

/// Places an order through `uow`.
///
/// Every cart line is checked against live stock, in cart order, before
/// anything is written. Lines naming the same product draw on one stock
/// count. The first missing product or short line aborts with
/// `DomainError::StockUnavailable`. The order and its items are then
/// inserted and each product's stock is decremented. The caller owns the
/// transaction boundary and must discard `uow` on `Err`.
pub fn place_order(
    uow: &mut dyn OrderUnitOfWork,
    client: ClientInfo,
    items: &[CartItem],
) -> Result<OrderView, DomainError> {
    let mut requested: HashMap<Uuid, i32> = HashMap::new();
    for item in items {
        let Some(product) = uow.find_product_for_update(item.product_id)? else {
            return Err(DomainError::StockUnavailable(StockShortfall::Missing {
                product_id: item.product_id,
            }));
        };
        let total = requested.entry(product.id).or_insert(0);
        *total = total.saturating_add(item.quantity);
        if product.stock < *total {
            return Err(DomainError::StockUnavailable(StockShortfall::Insufficient {
                product_id: product.id,
                name: product.name,
                requested: *total,
                available: product.stock,
            }));
        }
    }

    let order = uow.create_order_with_items(
        NewOrder {
            client,
            total_amount: cart_total(items),
        },
        items,
    )?;

    for item in items {
        uow.decrement_stock(item.product_id, item.quantity)?;
    }

    Ok(order)
}
