use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub name: String,
    pub phone: String,
    pub address: String,
}

/// One line of a submitted cart. `unit_price` is taken as given by the caller.
#[derive(Debug, Clone)]
pub struct CartItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

/// Order header handed to the store; id and timestamp are assigned there.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub client: ClientInfo,
    pub total_amount: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price_at_time: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderView {
    pub id: Uuid,
    pub client_name: String,
    pub client_phone: String,
    pub client_address: String,
    pub total_amount: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemView>,
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<OrderView>,
    pub total: i64,
}

/// Decimal places kept by every stored money amount.
pub const MONEY_SCALE: i64 = 2;

/// True when `amount` has no digits below whole cents.
pub fn is_whole_cents(amount: &BigDecimal) -> bool {
    amount.with_scale(MONEY_SCALE) == *amount
}

/// Rows to skip for a 1-based `page`; saturates rather than overflowing.
pub fn page_offset(page: i64, limit: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(limit.max(0))
}

/// Sum of `unit_price * quantity` over the cart.
pub fn cart_total(items: &[CartItem]) -> BigDecimal {
    items
        .iter()
        .map(|i| &i.unit_price * &BigDecimal::from(i.quantity))
        .sum()
}
