use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::catalog::{Category, NewCategory, Product, ProductFilter, ProductInput, ProductView};
use crate::domain::errors::DomainError;
use crate::domain::order::{page_offset, CartItem, ListResult, NewOrder, OrderView};
use crate::domain::ports::{
    CatalogRepository, CatalogUnitOfWork, CatalogWork, OrderRepository, OrderUnitOfWork,
    TransactionWork,
};
use crate::schema::{categories, order_items, orders, products};

use super::models::{
    CategoryRow, NewCategoryRow, NewOrderItemRow, NewOrderRow, NewProductRow, OrderItemRow,
    OrderRow, ProductChangeset, ProductRow,
};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<DieselError> for DomainError {
    fn from(e: DieselError) -> Self {
        match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                DomainError::Conflict(info.message().to_string())
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                DomainError::InvalidInput(info.message().to_string())
            }
            other => DomainError::Internal(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

/// Escapes `LIKE` wildcards so user text matches literally.
fn like_pattern(q: &str) -> String {
    let escaped = q
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn into_view((product, category): (ProductRow, CategoryRow)) -> ProductView {
    ProductView {
        product: product.into(),
        category: category.into(),
    }
}

fn with_category(conn: &mut PgConnection, row: ProductRow) -> Result<ProductView, DomainError> {
    let category = categories::table
        .find(row.category_id)
        .select(CategoryRow::as_select())
        .first(conn)?;
    Ok(into_view((row, category)))
}

fn find_category_by_slug(
    conn: &mut PgConnection,
    slug: &str,
) -> Result<Option<Category>, DomainError> {
    let row = categories::table
        .filter(categories::slug.eq(slug))
        .select(CategoryRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row.map(Into::into))
}

fn insert_category(conn: &mut PgConnection, category: NewCategory) -> Result<Category, DomainError> {
    let row = diesel::insert_into(categories::table)
        .values(&NewCategoryRow {
            id: Uuid::new_v4(),
            name: category.name,
            slug: category.slug,
            description: category.description,
        })
        .returning(CategoryRow::as_returning())
        .get_result(conn)?;
    Ok(row.into())
}

fn insert_product(conn: &mut PgConnection, input: ProductInput) -> Result<ProductView, DomainError> {
    let row = diesel::insert_into(products::table)
        .values(&NewProductRow {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            price: input.price,
            discount_price: input.discount_price,
            stock: input.stock,
            image_url: input.image_url,
            category_id: input.category_id,
        })
        .returning(ProductRow::as_returning())
        .get_result(conn)?;
    with_category(conn, row)
}

fn count_products(conn: &mut PgConnection) -> Result<i64, DomainError> {
    Ok(products::table.count().get_result(conn)?)
}

// ── Store ─────────────────────────────────────────────────────────────────────

/// PostgreSQL-backed catalog and order store.
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CatalogRepository for PgStore {
    fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = categories::table
            .select(CategoryRow::as_select())
            .order(categories::name.asc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError> {
        let mut conn = self.pool.get()?;
        find_category_by_slug(&mut conn, slug)
    }

    fn create_category(&self, category: NewCategory) -> Result<Category, DomainError> {
        let mut conn = self.pool.get()?;
        insert_category(&mut conn, category)
    }

    fn list_products(&self, filter: &ProductFilter) -> Result<Vec<ProductView>, DomainError> {
        let mut conn = self.pool.get()?;

        let mut query = products::table
            .inner_join(categories::table)
            .select((ProductRow::as_select(), CategoryRow::as_select()))
            .into_boxed();
        if let Some(q) = &filter.q {
            let pattern = like_pattern(q);
            query = query.filter(
                products::name
                    .ilike(pattern.clone())
                    .or(products::description.ilike(pattern)),
            );
        }
        if let Some(slug) = &filter.category {
            query = query.filter(categories::slug.eq(slug.clone()));
        }

        let rows: Vec<(ProductRow, CategoryRow)> = query
            .order((products::created_at.desc(), products::id.asc()))
            .load(&mut conn)?;
        Ok(rows.into_iter().map(into_view).collect())
    }

    fn find_product(&self, id: Uuid) -> Result<Option<ProductView>, DomainError> {
        let mut conn = self.pool.get()?;
        let row: Option<(ProductRow, CategoryRow)> = products::table
            .inner_join(categories::table)
            .filter(products::id.eq(id))
            .select((ProductRow::as_select(), CategoryRow::as_select()))
            .first(&mut conn)
            .optional()?;
        Ok(row.map(into_view))
    }

    fn create_product(&self, input: ProductInput) -> Result<ProductView, DomainError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, DomainError, _>(|conn| insert_product(conn, input))
    }

    fn update_product(&self, id: Uuid, input: ProductInput) -> Result<ProductView, DomainError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            let row = diesel::update(products::table.find(id))
                .set(&ProductChangeset {
                    name: input.name,
                    description: input.description,
                    price: input.price,
                    discount_price: input.discount_price,
                    stock: input.stock,
                    image_url: input.image_url,
                    category_id: input.category_id,
                    updated_at: Utc::now(),
                })
                .returning(ProductRow::as_returning())
                .get_result(conn)
                .optional()?
                .ok_or(DomainError::NotFound("Product"))?;
            with_category(conn, row)
        })
    }

    fn delete_product(&self, id: Uuid) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::delete(products::table.find(id))
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .optional()?
            .ok_or(DomainError::NotFound("Product"))?;
        Ok(row.into())
    }

    fn count_products(&self) -> Result<i64, DomainError> {
        let mut conn = self.pool.get()?;
        count_products(&mut conn)
    }

    fn in_catalog_transaction(&self, work: CatalogWork<'_>) -> Result<(), DomainError> {
        let mut pooled = self.pool.get()?;
        let conn: &mut PgConnection = &mut pooled;

        conn.transaction::<_, DomainError, _>(|conn| {
            let mut uow = PgUnitOfWork { conn };
            work(&mut uow as &mut dyn CatalogUnitOfWork)
        })
    }
}

/// Unit of work bound to one open transaction on a pooled connection.
struct PgUnitOfWork<'a> {
    conn: &'a mut PgConnection,
}

impl OrderUnitOfWork for PgUnitOfWork<'_> {
    fn find_product_for_update(&mut self, id: Uuid) -> Result<Option<Product>, DomainError> {
        let row = products::table
            .find(id)
            .select(ProductRow::as_select())
            .for_update()
            .first(&mut *self.conn)
            .optional()?;
        Ok(row.map(Into::into))
    }

    fn create_order_with_items(
        &mut self,
        order: NewOrder,
        items: &[CartItem],
    ) -> Result<OrderView, DomainError> {
        let order_row = diesel::insert_into(orders::table)
            .values(&NewOrderRow {
                id: Uuid::new_v4(),
                client_name: order.client.name,
                client_phone: order.client.phone,
                client_address: order.client.address,
                total_amount: order.total_amount,
            })
            .returning(OrderRow::as_returning())
            .get_result(&mut *self.conn)?;

        let new_items: Vec<NewOrderItemRow> = items
            .iter()
            .zip(0..)
            .map(|(item, position)| NewOrderItemRow {
                id: Uuid::new_v4(),
                order_id: order_row.id,
                position,
                product_id: item.product_id,
                quantity: item.quantity,
                price_at_time: item.unit_price.clone(),
            })
            .collect();
        let item_rows = diesel::insert_into(order_items::table)
            .values(&new_items)
            .returning(OrderItemRow::as_returning())
            .get_results(&mut *self.conn)?;

        Ok(order_row.into_view(item_rows))
    }

    fn decrement_stock(&mut self, id: Uuid, amount: i32) -> Result<(), DomainError> {
        let updated = diesel::update(products::table.find(id))
            .set((
                products::stock.eq(products::stock - amount),
                products::updated_at.eq(Utc::now()),
            ))
            .execute(&mut *self.conn)?;
        if updated == 0 {
            return Err(DomainError::NotFound("Product"));
        }
        Ok(())
    }
}

impl CatalogUnitOfWork for PgUnitOfWork<'_> {
    fn count_products(&mut self) -> Result<i64, DomainError> {
        count_products(&mut *self.conn)
    }

    fn find_category_by_slug(&mut self, slug: &str) -> Result<Option<Category>, DomainError> {
        find_category_by_slug(&mut *self.conn, slug)
    }

    fn create_category(&mut self, category: NewCategory) -> Result<Category, DomainError> {
        insert_category(&mut *self.conn, category)
    }

    fn create_product(&mut self, input: ProductInput) -> Result<ProductView, DomainError> {
        insert_product(&mut *self.conn, input)
    }
}

impl OrderRepository for PgStore {
    fn in_transaction(&self, work: TransactionWork<'_>) -> Result<OrderView, DomainError> {
        let mut pooled = self.pool.get()?;
        let conn: &mut PgConnection = &mut pooled;

        conn.transaction::<_, DomainError, _>(|conn| {
            let mut uow = PgUnitOfWork { conn };
            work(&mut uow as &mut dyn OrderUnitOfWork)
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .filter(orders::id.eq(id))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items = order_items::table
            .filter(order_items::order_id.eq(order.id))
            .select(OrderItemRow::as_select())
            .order(order_items::position.asc())
            .load(&mut conn)?;

        Ok(Some(order.into_view(items)))
    }

    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let mut conn = self.pool.get()?;

        let offset = page_offset(page, limit);
        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = orders::table.count().get_result(conn)?;

            let rows = orders::table
                .select(OrderRow::as_select())
                .order(orders::created_at.desc())
                .limit(limit)
                .offset(offset)
                .load(conn)?;

            Ok(ListResult {
                items: rows.into_iter().map(|o| o.into_view(vec![])).collect(),
                total,
            })
        })
    }
}
