use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::catalog::{Category, Product};
use crate::domain::order::{OrderItemView, OrderView};
use crate::schema::{categories, order_items, orders, products};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CategoryRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = categories)]
pub struct NewCategoryRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = products)]
#[diesel(belongs_to(CategoryRow, foreign_key = category_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
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

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub discount_price: Option<BigDecimal>,
    pub stock: i32,
    pub image_url: Option<String>,
    pub category_id: Uuid,
}

/// Full replacement of a product's editable columns; `None` writes NULL.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = products)]
#[diesel(treat_none_as_null = true)]
pub struct ProductChangeset {
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub discount_price: Option<BigDecimal>,
    pub stock: i32,
    pub image_url: Option<String>,
    pub category_id: Uuid,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            discount_price: row.discount_price,
            stock: row.stock,
            image_url: row.image_url,
            category_id: row.category_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub client_name: String,
    pub client_phone: String,
    pub client_address: String,
    pub total_amount: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub client_name: String,
    pub client_phone: String,
    pub client_address: String,
    pub total_amount: BigDecimal,
}

impl OrderRow {
    pub fn into_view(self, items: Vec<OrderItemRow>) -> OrderView {
        OrderView {
            id: self.id,
            client_name: self.client_name,
            client_phone: self.client_phone,
            client_address: self.client_address,
            total_amount: self.total_amount,
            created_at: self.created_at,
            items: items.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub position: i32,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price_at_time: BigDecimal,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub position: i32,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price_at_time: BigDecimal,
}

impl From<OrderItemRow> for OrderItemView {
    fn from(row: OrderItemRow) -> Self {
        OrderItemView {
            id: row.id,
            product_id: row.product_id,
            quantity: row.quantity,
            price_at_time: row.price_at_time,
        }
    }
}
