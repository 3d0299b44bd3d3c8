//! PostgreSQL store.

use super::seed::{seed_products, seed_users};
use super::{
    Backend, OrderDraft, SeedReport, Store, StoreError, StoreResult, UserCredentials, check_stock,
};
use crate::catalog::{ProductQuery, like_pattern};
use crate::db::{
    DatabasePool, ORDER_COLUMNS, OrderItemRow, OrderRow, PRODUCT_COLUMNS, ProductRow, UserRow,
};
use crate::models::{
    AdminStats, ExportData, Order, OrderItem, OrderStatus, Product, ProductInput, User,
};
use crate::orders::OrderNumbering;
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, username, email, name, role, password_hash";

/// Store backed by PostgreSQL through a sqlx pool.
#[derive(Clone)]
pub struct PgStore {
    db: DatabasePool,
}

impl PgStore {
    /// Creates a store over an established pool.
    #[must_use]
    pub fn new(db: DatabasePool) -> Self {
        Self { db }
    }

    fn pool(&self) -> &PgPool {
        self.db.pool()
    }

    /// Loads order lines for the given orders, grouped by order id and kept
    /// in placement position.
    async fn load_items(&self, order_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, Vec<OrderItem>>> {
        let rows: Vec<OrderItemRow> = sqlx::query_as(
            r#"
            SELECT order_id, product_id, name, price, quantity
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY order_id, position
            "#,
        )
        .bind(order_ids)
        .fetch_all(self.pool())
        .await?;

        let mut grouped: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            grouped.entry(row.order_id).or_default().push(row.into());
        }
        Ok(grouped)
    }

    async fn assemble_orders(&self, rows: Vec<OrderRow>) -> StoreResult<Vec<Order>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut items = self.load_items(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let lines = items.remove(&row.id).unwrap_or_default();
                row.into_order(lines).map_err(StoreError::Corrupt)
            })
            .collect()
    }

    async fn fetch_orders_where(
        &self,
        clause: &str,
        bind: Option<&str>,
    ) -> StoreResult<Vec<Order>> {
        let sql = format!("SELECT {} FROM orders {}", ORDER_COLUMNS, clause);
        let mut query = sqlx::query_as::<_, OrderRow>(&sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let rows = query.fetch_all(self.pool()).await?;
        self.assemble_orders(rows).await
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> Backend {
        Backend::Postgres
    }

    async fn list_products(&self, query: &ProductQuery) -> StoreResult<Vec<Product>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM products WHERE TRUE", PRODUCT_COLUMNS));

        if let Some(category) = &query.category {
            builder.push(" AND category = ").push_bind(category.clone());
        }
        if let Some(term) = &query.search {
            let pattern = like_pattern(term);
            builder
                .push(" AND (LOWER(name) LIKE ")
                .push_bind(pattern.clone())
                .push(" OR LOWER(description) LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        builder.push(" ");
        builder.push(query.sort.map_or("ORDER BY id ASC", |s| s.order_by()));

        let rows: Vec<ProductRow> = builder.build_query_as().fetch_all(self.pool()).await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn get_product(&self, id: i32) -> StoreResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(Product::from))
    }

    async fn list_categories(&self) -> StoreResult<Vec<String>> {
        let categories: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT category FROM products ORDER BY category")
                .fetch_all(self.pool())
                .await?;
        Ok(categories)
    }

    async fn create_product(&self, input: ProductInput) -> StoreResult<Product> {
        let sql = format!(
            r#"
            INSERT INTO products (name, description, price, category, image, stock)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        );
        let row: ProductRow = sqlx::query_as(&sql)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price)
            .bind(&input.category)
            .bind(&input.image)
            .bind(input.stock)
            .fetch_one(self.pool())
            .await?;
        Ok(row.into())
    }

    async fn update_product(&self, id: i32, input: ProductInput) -> StoreResult<Option<Product>> {
        let sql = format!(
            r#"
            UPDATE products
            SET name = $2, description = $3, price = $4, category = $5, image = $6,
                stock = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        );
        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price)
            .bind(&input.category)
            .bind(&input.image)
            .bind(input.stock)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(Product::from))
    }

    async fn delete_product(&self, id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn place_order(
        &self,
        draft: OrderDraft,
        numbering: &OrderNumbering,
    ) -> StoreResult<Order> {
        let requested = draft.requested_quantities();
        let product_ids: Vec<i32> = requested.keys().copied().collect();

        // Dropping the transaction on any early return rolls it back.
        let mut tx = self.pool().begin().await?;

        let sql = format!(
            "SELECT {} FROM products WHERE id = ANY($1) ORDER BY id FOR UPDATE",
            PRODUCT_COLUMNS
        );
        let locked: HashMap<i32, ProductRow> = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(&product_ids)
            .fetch_all(&mut *tx)
            .await?
            .into_iter()
            .map(|row| (row.id, row))
            .collect();

        check_stock(&draft, |id| locked.get(&id).map(|p| p.stock))?;

        let order = draft.into_order(numbering.next_number(), Utc::now(), |id| {
            locked.get(&id).map(|p| (p.name.clone(), p.price))
        })?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, order_number, customer_name, customer_email, customer_address,
                                subtotal, shipping, tax, total, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(order.id)
        .bind(&order.order_number)
        .bind(&order.customer.name)
        .bind(&order.customer.email)
        .bind(&order.customer.address)
        .bind(order.subtotal)
        .bind(order.shipping)
        .bind(order.tax)
        .bind(order.total)
        .bind(order.status.as_str())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for (position, item) in order.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, position, product_id, name, price, quantity)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(order.id)
            .bind(position as i32)
            .bind(item.id)
            .bind(&item.name)
            .bind(item.price)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        for (&product_id, &quantity) in &requested {
            sqlx::query(
                "UPDATE products SET stock = stock - $1, updated_at = NOW() WHERE id = $2",
            )
            .bind(quantity)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(order_number = %order.order_number, "Order transaction committed");

        Ok(order)
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        self.fetch_orders_where("ORDER BY created_at DESC, order_number DESC", None)
            .await
    }

    async fn get_order_by_number(&self, order_number: &str) -> StoreResult<Option<Order>> {
        let mut orders = self
            .fetch_orders_where("WHERE order_number = $1", Some(order_number))
            .await?;
        Ok(orders.pop())
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> StoreResult<Option<Order>> {
        let sql = format!(
            "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            ORDER_COLUMNS
        );
        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(self.pool())
            .await?;

        match row {
            Some(row) => Ok(self.assemble_orders(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn delete_order(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn max_order_sequence(&self, prefix: &str) -> StoreResult<Option<u64>> {
        let max: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT MAX(CAST(SUBSTRING(order_number FROM LENGTH($1) + 2) AS BIGINT))
            FROM orders
            WHERE order_number ~ ('^' || $1 || '-[0-9]+$')
            "#,
        )
        .bind(prefix)
        .fetch_one(self.pool())
        .await?;
        Ok(max.and_then(|v| u64::try_from(v).ok()))
    }

    async fn find_credentials(&self, username: &str) -> StoreResult<Option<UserCredentials>> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(username)
            .fetch_optional(self.pool())
            .await?;
        row.map(|r| r.into_credentials().map_err(StoreError::Corrupt))
            .transpose()
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let sql = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
        let rows: Vec<UserRow> = sqlx::query_as(&sql).fetch_all(self.pool()).await?;
        rows.into_iter()
            .map(|r| {
                r.into_credentials()
                    .map(|c| c.user)
                    .map_err(StoreError::Corrupt)
            })
            .collect()
    }

    async fn delete_user(&self, id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn stats(&self) -> StoreResult<AdminStats> {
        let (products, users, orders, total_value): (i64, i64, i64, Decimal) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM products),
                (SELECT COUNT(*) FROM users),
                (SELECT COUNT(*) FROM orders),
                (SELECT COALESCE(SUM(total), 0) FROM orders)
            "#,
        )
        .fetch_one(self.pool())
        .await?;

        Ok(AdminStats {
            products,
            users,
            orders,
            total_value,
        })
    }

    async fn seed(&self) -> StoreResult<SeedReport> {
        let users = seed_users();
        let mut report = SeedReport::default();
        let mut tx = self.pool().begin().await?;

        for product in seed_products() {
            let result = sqlx::query(
                r#"
                INSERT INTO products (name, description, price, category, image, stock)
                SELECT $1, $2, $3, $4, $5, $6
                WHERE NOT EXISTS (SELECT 1 FROM products WHERE name = $1)
                "#,
            )
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(&product.category)
            .bind(&product.image)
            .bind(product.stock)
            .execute(&mut *tx)
            .await?;
            report.products += result.rows_affected() as usize;
        }

        for (user, password_hash) in users {
            let result = sqlx::query(
                r#"
                INSERT INTO users (username, email, name, role, password_hash)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (username) DO NOTHING
                "#,
            )
            .bind(user.username)
            .bind(user.email)
            .bind(user.name)
            .bind(user.role.as_str())
            .bind(&password_hash)
            .execute(&mut *tx)
            .await?;
            report.users += result.rows_affected() as usize;
        }

        tx.commit().await?;
        info!(
            products = report.products,
            users = report.users,
            "Seeded database"
        );
        Ok(report)
    }

    async fn clear(&self) -> StoreResult<()> {
        sqlx::query("TRUNCATE order_items, orders, products, users RESTART IDENTITY")
            .execute(self.pool())
            .await?;
        info!("Cleared database");
        Ok(())
    }

    async fn export(&self) -> StoreResult<ExportData> {
        let products = self.list_products(&ProductQuery::default()).await?;
        let users = self.list_users().await?;
        let orders = self.list_orders().await?;
        Ok(ExportData {
            products,
            users,
            orders,
        })
    }
}
