//! In-memory store used when PostgreSQL is not reachable.

use super::seed::{seed_products, seed_users};
use super::{
    Backend, OrderDraft, SeedReport, Store, StoreResult, UserCredentials, check_stock,
};
use crate::catalog::{ProductQuery, distinct_categories};
use crate::models::{AdminStats, ExportData, Order, OrderStatus, Product, ProductInput, User};
use crate::orders::OrderNumbering;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug)]
struct Catalog {
    products: BTreeMap<i32, Product>,
    next_id: i32,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            products: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl Catalog {
    fn insert(&mut self, input: ProductInput) -> Product {
        let product = input.into_product(self.next_id);
        self.next_id += 1;
        self.products.insert(product.id, product.clone());
        product
    }
}

#[derive(Debug)]
struct Accounts {
    users: BTreeMap<i32, UserCredentials>,
    next_id: i32,
}

impl Default for Accounts {
    fn default() -> Self {
        Self {
            users: BTreeMap::new(),
            next_id: 1,
        }
    }
}

/// Process-memory store.
///
/// Lock order is catalog, then orders, then accounts. Order placement holds
/// the catalog write lock for the whole check, number, record and decrement
/// sequence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    catalog: RwLock<Catalog>,
    /// Orders in placement order.
    orders: RwLock<Vec<Order>>,
    accounts: RwLock<Accounts>,
}

impl MemoryStore {
    /// Creates a store with no data.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a store holding the mock catalog and demo accounts.
    #[must_use]
    pub fn seeded() -> Self {
        let store = Self::empty();
        let report = store.seed_now();
        debug!(
            products = report.products,
            users = report.users,
            "Memory store seeded"
        );
        store
    }

    fn seed_now(&self) -> SeedReport {
        let mut report = SeedReport::default();

        {
            let mut catalog = self.catalog.write();
            for input in seed_products() {
                if catalog.products.values().any(|p| p.name == input.name) {
                    continue;
                }
                catalog.insert(input);
                report.products += 1;
            }
        }

        let mut accounts = self.accounts.write();
        for (seed, password_hash) in seed_users() {
            if accounts
                .users
                .values()
                .any(|c| c.user.username == seed.username)
            {
                continue;
            }
            let id = accounts.next_id;
            accounts.next_id += 1;
            accounts.users.insert(
                id,
                UserCredentials {
                    user: User {
                        id,
                        username: seed.username.to_string(),
                        email: seed.email.to_string(),
                        name: seed.name.to_string(),
                        role: seed.role,
                    },
                    password_hash,
                },
            );
            report.users += 1;
        }

        report
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> Backend {
        Backend::Memory
    }

    async fn list_products(&self, query: &ProductQuery) -> StoreResult<Vec<Product>> {
        Ok(query.apply(self.catalog.read().products.values()))
    }

    async fn get_product(&self, id: i32) -> StoreResult<Option<Product>> {
        Ok(self.catalog.read().products.get(&id).cloned())
    }

    async fn list_categories(&self) -> StoreResult<Vec<String>> {
        Ok(distinct_categories(self.catalog.read().products.values()))
    }

    async fn create_product(&self, input: ProductInput) -> StoreResult<Product> {
        Ok(self.catalog.write().insert(input))
    }

    async fn update_product(&self, id: i32, input: ProductInput) -> StoreResult<Option<Product>> {
        let mut catalog = self.catalog.write();
        Ok(catalog.products.get_mut(&id).map(|slot| {
            *slot = input.into_product(id);
            slot.clone()
        }))
    }

    async fn delete_product(&self, id: i32) -> StoreResult<bool> {
        Ok(self.catalog.write().products.remove(&id).is_some())
    }

    async fn place_order(
        &self,
        draft: OrderDraft,
        numbering: &OrderNumbering,
    ) -> StoreResult<Order> {
        let mut catalog = self.catalog.write();

        check_stock(&draft, |id| catalog.products.get(&id).map(|p| p.stock))?;

        let order_number = numbering.next_number();
        let order = draft.into_order(order_number, Utc::now(), |id| {
            catalog
                .products
                .get(&id)
                .map(|p| (p.name.clone(), p.price))
        })?;

        for item in &order.items {
            if let Some(product) = catalog.products.get_mut(&item.id) {
                product.stock -= item.quantity;
            }
        }

        self.orders.write().push(order.clone());
        Ok(order)
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        // Placement order is creation order.
        Ok(self.orders.read().iter().rev().cloned().collect())
    }

    async fn get_order_by_number(&self, order_number: &str) -> StoreResult<Option<Order>> {
        Ok(self
            .orders
            .read()
            .iter()
            .find(|o| o.order_number == order_number)
            .cloned())
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> StoreResult<Option<Order>> {
        let mut orders = self.orders.write();
        Ok(orders.iter_mut().find(|o| o.id == id).map(|order| {
            order.status = status;
            order.updated_at = Utc::now();
            order.clone()
        }))
    }

    async fn delete_order(&self, id: Uuid) -> StoreResult<bool> {
        let mut orders = self.orders.write();
        let before = orders.len();
        orders.retain(|o| o.id != id);
        Ok(orders.len() != before)
    }

    async fn max_order_sequence(&self, prefix: &str) -> StoreResult<Option<u64>> {
        let numbering = OrderNumbering::new(prefix, 0);
        Ok(self
            .orders
            .read()
            .iter()
            .filter_map(|o| numbering.parse_sequence(&o.order_number))
            .max())
    }

    async fn find_credentials(&self, username: &str) -> StoreResult<Option<UserCredentials>> {
        Ok(self
            .accounts
            .read()
            .users
            .values()
            .find(|c| c.user.username == username)
            .cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self
            .accounts
            .read()
            .users
            .values()
            .map(|c| c.user.clone())
            .collect())
    }

    async fn delete_user(&self, id: i32) -> StoreResult<bool> {
        Ok(self.accounts.write().users.remove(&id).is_some())
    }

    async fn stats(&self) -> StoreResult<AdminStats> {
        let products = self.catalog.read().products.len() as i64;
        let (orders, total_value) = {
            let orders = self.orders.read();
            let total: Decimal = orders.iter().map(|o| o.total).sum();
            (orders.len() as i64, total)
        };
        let users = self.accounts.read().users.len() as i64;

        Ok(AdminStats {
            products,
            users,
            orders,
            total_value,
        })
    }

    async fn seed(&self) -> StoreResult<SeedReport> {
        let report = self.seed_now();
        info!(
            products = report.products,
            users = report.users,
            "Seeded memory store"
        );
        Ok(report)
    }

    async fn clear(&self) -> StoreResult<()> {
        let mut catalog = self.catalog.write();
        let mut orders = self.orders.write();
        let mut accounts = self.accounts.write();
        *catalog = Catalog::default();
        orders.clear();
        *accounts = Accounts::default();
        info!("Cleared memory store");
        Ok(())
    }

    async fn export(&self) -> StoreResult<ExportData> {
        let products = self.catalog.read().products.values().cloned().collect();
        let users = self.list_users().await?;
        let orders = self.list_orders().await?;
        Ok(ExportData {
            products,
            users,
            orders,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Customer;
    use crate::store::StoreError;
    use rust_decimal_macros::dec;

    fn draft(lines: Vec<(i32, i32)>) -> OrderDraft {
        OrderDraft {
            customer: Customer {
                name: "Ada Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                address: "12 Analytical St".to_string(),
            },
            lines,
            subtotal: dec!(100),
            shipping: dec!(5),
            tax: dec!(8),
            total: dec!(113),
        }
    }

    async fn stock_of(store: &MemoryStore, id: i32) -> i32 {
        store.get_product(id).await.unwrap().unwrap().stock
    }

    #[tokio::test]
    async fn test_seeded_store_contents() {
        let store = MemoryStore::seeded();
        let products = store.list_products(&ProductQuery::default()).await.unwrap();
        assert_eq!(products.len(), 9);
        assert_eq!(
            products.iter().map(|p| p.id).collect::<Vec<_>>(),
            (1..=9).collect::<Vec<_>>()
        );
        assert_eq!(store.list_users().await.unwrap().len(), 3);
        assert_eq!(
            store.list_categories().await.unwrap(),
            vec!["books", "clothing", "electronics"]
        );
    }

    #[tokio::test]
    async fn test_place_order_decrements_and_snapshots() {
        let store = MemoryStore::seeded();
        let numbering = OrderNumbering::default();

        let order = store.place_order(draft(vec![(3, 5)]), &numbering).await.unwrap();
        assert_eq!(order.order_number, "VUE-1001");
        assert_eq!(order.items[0].name, "Wireless Headphones");
        assert_eq!(order.items[0].price, dec!(89.99));
        assert_eq!(stock_of(&store, 3).await, 10);
    }

    #[tokio::test]
    async fn test_failed_order_changes_nothing() {
        let store = MemoryStore::seeded();
        let numbering = OrderNumbering::default();

        let result = store
            .place_order(draft(vec![(1, 1), (3, 20)]), &numbering)
            .await;
        assert!(matches!(
            result,
            Err(StoreError::InsufficientStock {
                product_id: 3,
                available: 15,
                requested: 20
            })
        ));
        assert_eq!(stock_of(&store, 1).await, 50);
        assert_eq!(stock_of(&store, 3).await, 15);
        assert!(store.list_orders().await.unwrap().is_empty());
        assert_eq!(numbering.current(), 1000);
    }

    #[tokio::test]
    async fn test_duplicate_lines_cannot_wrap_stock_check() {
        let store = MemoryStore::seeded();
        let numbering = OrderNumbering::default();

        let result = store
            .place_order(draft(vec![(3, i32::MAX), (3, 2)]), &numbering)
            .await;
        assert!(matches!(
            result,
            Err(StoreError::InsufficientStock {
                product_id: 3,
                available: 15,
                ..
            })
        ));
        assert_eq!(stock_of(&store, 3).await, 15);
        assert!(store.list_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_product_rejected() {
        let store = MemoryStore::seeded();
        let result = store
            .place_order(draft(vec![(999, 1)]), &OrderNumbering::default())
            .await;
        assert!(matches!(result, Err(StoreError::ProductNotFound(999))));
    }

    #[tokio::test]
    async fn test_orders_listed_newest_first() {
        let store = MemoryStore::seeded();
        let numbering = OrderNumbering::default();
        store.place_order(draft(vec![(1, 1)]), &numbering).await.unwrap();
        store.place_order(draft(vec![(2, 1)]), &numbering).await.unwrap();

        let orders = store.list_orders().await.unwrap();
        assert_eq!(orders[0].order_number, "VUE-1002");
        assert_eq!(orders[1].order_number, "VUE-1001");
    }

    #[tokio::test]
    async fn test_update_and_delete_order() {
        let store = MemoryStore::seeded();
        let order = store
            .place_order(draft(vec![(1, 1)]), &OrderNumbering::default())
            .await
            .unwrap();

        let updated = store
            .update_order_status(order.id, OrderStatus::Shipped)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Shipped);
        assert!(updated.updated_at >= order.updated_at);

        assert!(store.delete_order(order.id).await.unwrap());
        assert!(!store.delete_order(order.id).await.unwrap());
        assert!(
            store
                .update_order_status(order.id, OrderStatus::Delivered)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_max_order_sequence() {
        let store = MemoryStore::seeded();
        assert_eq!(store.max_order_sequence("VUE").await.unwrap(), None);

        let numbering = OrderNumbering::new("VUE", 1041);
        store.place_order(draft(vec![(1, 1)]), &numbering).await.unwrap();
        assert_eq!(store.max_order_sequence("VUE").await.unwrap(), Some(1042));
        assert_eq!(store.max_order_sequence("SHOP").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_product_crud() {
        let store = MemoryStore::seeded();
        let input = ProductInput {
            name: "Rust Mug".to_string(),
            description: "Ferris on a mug".to_string(),
            price: dec!(14.50),
            category: "kitchen".to_string(),
            image: String::new(),
            stock: 7,
        };

        let created = store.create_product(input.clone()).await.unwrap();
        assert_eq!(created.id, 10);

        let mut changed = input;
        changed.stock = 3;
        let updated = store.update_product(10, changed.clone()).await.unwrap().unwrap();
        assert_eq!(updated.stock, 3);
        assert!(store.update_product(77, changed).await.unwrap().is_none());

        assert!(store.delete_product(10).await.unwrap());
        assert!(store.get_product(10).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_seed_is_idempotent_and_clear_resets() {
        let store = MemoryStore::seeded();
        assert_eq!(store.seed().await.unwrap(), SeedReport::default());

        store
            .place_order(draft(vec![(1, 2)]), &OrderNumbering::default())
            .await
            .unwrap();
        store.clear().await.unwrap();
        let stats = store.stats().await.unwrap();
        assert_eq!((stats.products, stats.users, stats.orders), (0, 0, 0));
        assert_eq!(stats.total_value, Decimal::ZERO);

        let report = store.seed().await.unwrap();
        assert_eq!(report, SeedReport { products: 9, users: 3 });
        assert!(store.get_product(1).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_stats_and_export() {
        let store = MemoryStore::seeded();
        store
            .place_order(draft(vec![(1, 1)]), &OrderNumbering::default())
            .await
            .unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.products, 9);
        assert_eq!(stats.users, 3);
        assert_eq!(stats.orders, 1);
        assert_eq!(stats.total_value, dec!(113));

        let export = store.export().await.unwrap();
        assert_eq!(export.products.len(), 9);
        assert_eq!(export.users.len(), 3);
        assert_eq!(export.orders.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_user() {
        let store = MemoryStore::seeded();
        assert!(store.delete_user(2).await.unwrap());
        assert!(store.find_credentials("john").await.unwrap().is_none());
        assert!(!store.delete_user(2).await.unwrap());
    }
}
