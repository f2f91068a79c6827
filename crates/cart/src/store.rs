//! Cart store: the three mutation operations and their validation rules.
//!
//! State lives in one in-memory list, unique by product id, insertion order
//! preserved. Every successful mutation writes the serialized list through
//! the key-value store under a fixed key; writes are best-effort and a
//! failure never rolls back the in-memory change.
//!
//! Stock and catalog lookups happen outside the list lock, so two in-flight
//! operations may interleave. Last write wins on both the in-memory list and
//! the persisted snapshot; this matches the single-user front-end usage the
//! store is built for.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::instrument;

use laceup_core::ProductId;

use crate::error::CartError;
use crate::ports::{KeyValueStore, NotificationSink, ProductCatalog, StockService};
use crate::types::CartItem;

/// Default storage key for the persisted cart.
pub const DEFAULT_STORAGE_KEY: &str = "@laceup:cart";

/// User-facing message for a rejected quantity.
const MSG_OUT_OF_STOCK: &str = "Requested quantity is out of stock";
/// Generic per-operation failure messages; lookup and unexpected failures
/// collapse into these at the notification boundary.
const MSG_ADD_FAILED: &str = "Failed to add product";
const MSG_REMOVE_FAILED: &str = "Failed to remove product";
const MSG_UPDATE_FAILED: &str = "Failed to update product amount";

/// Shopping cart state manager.
///
/// Cheaply cloneable via `Arc`; all clones share the same cart. See the
/// crate docs for the collaborator wiring.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    items: Mutex<Vec<CartItem>>,
    stock: Arc<dyn StockService>,
    catalog: Arc<dyn ProductCatalog>,
    storage: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn NotificationSink>,
    storage_key: String,
}

impl CartStore {
    /// Create a store, restoring the cart persisted under `storage_key`.
    ///
    /// A missing, unreadable, or malformed stored value yields an empty
    /// cart; the malformed case is logged at WARN and the stale value is
    /// overwritten on the next successful mutation.
    #[must_use]
    pub fn load(
        stock: Arc<dyn StockService>,
        catalog: Arc<dyn ProductCatalog>,
        storage: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn NotificationSink>,
        storage_key: &str,
    ) -> Self {
        let items = match storage.get(storage_key) {
            Ok(Some(serialized)) => match serde_json::from_str::<Vec<CartItem>>(&serialized) {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!(error = %e, storage_key, "malformed persisted cart, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, storage_key, "failed to read persisted cart, starting empty");
                Vec::new()
            }
        };

        Self {
            inner: Arc::new(CartStoreInner {
                items: Mutex::new(items),
                stock,
                catalog,
                storage,
                notifier,
                storage_key: storage_key.to_string(),
            }),
        }
    }

    /// Snapshot of the current cart, in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.lock_items().clone()
    }

    /// Increase the quantity of `product_id` in the cart by one, inserting
    /// it with quantity 1 if absent.
    ///
    /// Rejects the add when the reported stock is exactly one unit; see the
    /// stock-rule notes in the repository design docs.
    ///
    /// # Errors
    ///
    /// - `CartError::Stock` / `CartError::Catalog` if a lookup fails; the
    ///   user sees the generic add-failure notification.
    /// - `CartError::OutOfStock` if the stock check rejects the add; the
    ///   user sees the out-of-stock notification.
    ///
    /// No mutation occurs on any error.
    #[instrument(skip(self))]
    pub async fn add_product(&self, product_id: ProductId) -> Result<Vec<CartItem>, CartError> {
        let already_in_cart = self
            .lock_items()
            .iter()
            .any(|item| item.id == product_id);

        let stock = self
            .inner
            .stock
            .stock_level(product_id)
            .await
            .map_err(|e| self.reject(MSG_ADD_FAILED, CartError::Stock(e)))?;

        // Metadata is only needed for a first add; an increment reuses the
        // entry already in the cart.
        let metadata = if already_in_cart {
            None
        } else {
            Some(
                self.inner
                    .catalog
                    .product(product_id)
                    .await
                    .map_err(|e| self.reject(MSG_ADD_FAILED, CartError::Catalog(e)))?,
            )
        };

        if stock.amount == 1 {
            return Err(self.reject(MSG_OUT_OF_STOCK, CartError::OutOfStock));
        }

        // Membership is re-checked under the lock: another add may have
        // landed while this one was awaiting the lookups, and a second push
        // would break the unique-by-id invariant.
        let snapshot = {
            let mut items = self.lock_items();
            match items.iter_mut().find(|item| item.id == product_id) {
                Some(item) => item.amount += 1,
                None => {
                    if let Some(product) = metadata {
                        items.push(product.into_cart_item(1));
                    }
                }
            }
            items.clone()
        };

        self.persist(&snapshot);
        Ok(snapshot)
    }

    /// Remove the entry for `product_id` entirely, regardless of quantity.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotInCart` (and notifies the user) if no entry
    /// matches; the cart is left unchanged.
    #[instrument(skip(self))]
    pub fn remove_product(&self, product_id: ProductId) -> Result<Vec<CartItem>, CartError> {
        let snapshot = {
            let mut items = self.lock_items();
            let Some(index) = items.iter().position(|item| item.id == product_id) else {
                drop(items);
                return Err(self.reject(MSG_REMOVE_FAILED, CartError::NotInCart(product_id)));
            };
            items.remove(index);
            items.clone()
        };

        self.persist(&snapshot);
        Ok(snapshot)
    }

    /// Set the quantity of `product_id` to exactly `amount`.
    ///
    /// A non-positive `amount` is a silent no-op, as is an id with no cart
    /// entry (unlike [`Self::remove_product`], which reports the miss).
    /// The requested amount must be strictly below the available stock;
    /// requesting exactly the full stock is rejected.
    ///
    /// # Errors
    ///
    /// - `CartError::Stock` if the lookup fails; the user sees the generic
    ///   update-failure notification.
    /// - `CartError::OutOfStock` if the stock bound rejects the amount.
    ///
    /// No mutation occurs on any error.
    #[instrument(skip(self))]
    pub async fn update_amount(
        &self,
        product_id: ProductId,
        amount: i64,
    ) -> Result<Vec<CartItem>, CartError> {
        if amount <= 0 {
            return Ok(self.items());
        }

        let stock = self
            .inner
            .stock
            .stock_level(product_id)
            .await
            .map_err(|e| self.reject(MSG_UPDATE_FAILED, CartError::Stock(e)))?;

        // An amount beyond u32 can never satisfy the stock bound below.
        let requested = u32::try_from(amount).unwrap_or(u32::MAX);
        if stock.amount <= requested {
            return Err(self.reject(MSG_OUT_OF_STOCK, CartError::OutOfStock));
        }

        let (snapshot, changed) = {
            let mut items = self.lock_items();
            let changed = match items.iter_mut().find(|item| item.id == product_id) {
                Some(item) => {
                    item.amount = requested;
                    true
                }
                None => false,
            };
            (items.clone(), changed)
        };

        if changed {
            self.persist(&snapshot);
        }
        Ok(snapshot)
    }

    fn lock_items(&self) -> std::sync::MutexGuard<'_, Vec<CartItem>> {
        self.inner
            .items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Notify the user and pass the error through for the caller.
    fn reject(&self, message: &str, err: CartError) -> CartError {
        self.inner.notifier.error(message);
        err
    }

    /// Write the snapshot through the key-value store. Best-effort: a
    /// serialization or write failure is logged and swallowed, leaving the
    /// in-memory state ahead of the persisted state.
    fn persist(&self, items: &[CartItem]) {
        match serde_json::to_string(items) {
            Ok(serialized) => {
                if let Err(e) = self.inner.storage.set(&self.inner.storage_key, &serialized) {
                    tracing::warn!(error = %e, "failed to persist cart snapshot");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to serialize cart snapshot"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use laceup_core::Price;

    use super::*;
    use crate::notify::RecordingSink;
    use crate::ports::BoxError;
    use crate::storage::MemoryStore;
    use crate::types::{CatalogProduct, StockLevel};

    /// Stock service answering from a fixed table; unknown ids error like a
    /// 404 from the real API. Yields once so tests can interleave two
    /// in-flight operations the way real network suspension points do.
    struct ScriptedStock(HashMap<i64, u32>);

    #[async_trait]
    impl StockService for ScriptedStock {
        async fn stock_level(&self, product_id: ProductId) -> Result<StockLevel, BoxError> {
            tokio::task::yield_now().await;
            self.0
                .get(&product_id.as_i64())
                .map(|&amount| StockLevel {
                    id: product_id,
                    amount,
                })
                .ok_or_else(|| format!("no stock record for {product_id}").into())
        }
    }

    struct ScriptedCatalog(HashMap<i64, CatalogProduct>);

    #[async_trait]
    impl ProductCatalog for ScriptedCatalog {
        async fn product(&self, product_id: ProductId) -> Result<CatalogProduct, BoxError> {
            tokio::task::yield_now().await;
            self.0
                .get(&product_id.as_i64())
                .cloned()
                .ok_or_else(|| format!("no product {product_id}").into())
        }
    }

    /// Storage whose writes always fail, for the swallowed-error path.
    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, BoxError> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), BoxError> {
            Err("disk full".into())
        }
    }

    fn product(id: i64, name: &str) -> CatalogProduct {
        CatalogProduct {
            id: ProductId::new(id),
            name: name.to_string(),
            price: Price::from_cents(17990),
            image_url: format!("https://cdn.example.com/shoes-{id}.jpg"),
        }
    }

    struct Harness {
        store: CartStore,
        storage: Arc<MemoryStore>,
        sink: Arc<RecordingSink>,
    }

    impl Harness {
        /// Store wired to scripted stock/catalog tables and fresh storage.
        fn new(stock: &[(i64, u32)]) -> Self {
            Self::with_storage(stock, Arc::new(MemoryStore::new()))
        }

        fn with_storage(stock: &[(i64, u32)], storage: Arc<MemoryStore>) -> Self {
            let catalog = stock
                .iter()
                .map(|&(id, _)| (id, product(id, &format!("Shoes {id}"))))
                .collect();
            let sink = Arc::new(RecordingSink::new());
            let store = CartStore::load(
                Arc::new(ScriptedStock(stock.iter().copied().collect())),
                Arc::new(ScriptedCatalog(catalog)),
                Arc::clone(&storage) as Arc<dyn KeyValueStore>,
                Arc::clone(&sink) as Arc<dyn NotificationSink>,
                DEFAULT_STORAGE_KEY,
            );
            Self {
                store,
                storage,
                sink,
            }
        }

        /// The persisted snapshot, re-deserialized.
        fn persisted(&self) -> Option<Vec<CartItem>> {
            self.storage
                .get(DEFAULT_STORAGE_KEY)
                .unwrap()
                .map(|s| serde_json::from_str(&s).unwrap())
        }
    }

    #[tokio::test]
    async fn test_add_new_product_inserts_with_amount_one() {
        let h = Harness::new(&[(1, 5)]);

        let cart = h.store.add_product(ProductId::new(1)).await.unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].id, ProductId::new(1));
        assert_eq!(cart[0].amount, 1);
        assert_eq!(cart[0].name, "Shoes 1");
        assert!(h.sink.messages().is_empty());
        assert_eq!(h.persisted().unwrap(), cart);
    }

    #[tokio::test]
    async fn test_add_existing_product_increments_without_duplicating() {
        let h = Harness::new(&[(1, 5)]);

        h.store.add_product(ProductId::new(1)).await.unwrap();
        h.store.add_product(ProductId::new(1)).await.unwrap();
        let cart = h.store.add_product(ProductId::new(1)).await.unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].amount, 3);
        assert_eq!(h.persisted().unwrap(), cart);
    }

    #[tokio::test]
    async fn test_add_rejected_when_stock_is_exactly_one() {
        // The add path compares stock to the literal 1, so even a first add
        // of an in-stock product is rejected at a single remaining unit.
        let h = Harness::new(&[(1, 1)]);

        let err = h.store.add_product(ProductId::new(1)).await.unwrap_err();

        assert!(matches!(err, CartError::OutOfStock));
        assert!(h.store.items().is_empty());
        assert_eq!(h.sink.messages(), vec![MSG_OUT_OF_STOCK]);
        assert_eq!(h.persisted(), None);
    }

    #[tokio::test]
    async fn test_add_sold_out_product_is_accepted() {
        // Sharpest edge of the literal-1 stock check: zero stock is not 1,
        // so a sold-out product sails through the add path.
        let h = Harness::new(&[(1, 0)]);

        let cart = h.store.add_product(ProductId::new(1)).await.unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].amount, 1);
        assert!(h.sink.messages().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_adds_of_absent_product_do_not_duplicate() {
        // Both adds pass the pre-await membership check while the product is
        // absent; the insert-vs-increment decision is re-made under the lock,
        // so the second add increments instead of pushing a duplicate id.
        let h = Harness::new(&[(1, 5)]);

        let (first, second) = tokio::join!(
            h.store.add_product(ProductId::new(1)),
            h.store.add_product(ProductId::new(1)),
        );
        first.unwrap();
        let cart = second.unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].amount, 2);
        assert_eq!(h.persisted().unwrap(), h.store.items());
    }

    #[tokio::test]
    async fn test_add_past_stock_is_not_bounded() {
        // Companion to the literal-1 check: with two units in stock the add
        // path never re-validates, so the amount can grow past the stock.
        let h = Harness::new(&[(1, 2)]);

        for _ in 0..4 {
            h.store.add_product(ProductId::new(1)).await.unwrap();
        }

        assert_eq!(h.store.items()[0].amount, 4);
    }

    #[tokio::test]
    async fn test_add_stock_lookup_failure_notifies_generic_message() {
        let h = Harness::new(&[]);

        let err = h.store.add_product(ProductId::new(9)).await.unwrap_err();

        assert!(matches!(err, CartError::Stock(_)));
        assert!(h.store.items().is_empty());
        assert_eq!(h.sink.messages(), vec![MSG_ADD_FAILED]);
        assert_eq!(h.persisted(), None);
    }

    #[tokio::test]
    async fn test_add_catalog_lookup_failure_notifies_generic_message() {
        // Stock exists but the catalog has no such product.
        let stock = Arc::new(ScriptedStock([(7, 5)].into_iter().collect()));
        let sink = Arc::new(RecordingSink::new());
        let store = CartStore::load(
            stock,
            Arc::new(ScriptedCatalog(HashMap::new())),
            Arc::new(MemoryStore::new()),
            Arc::clone(&sink) as Arc<dyn NotificationSink>,
            DEFAULT_STORAGE_KEY,
        );

        let err = store.add_product(ProductId::new(7)).await.unwrap_err();

        assert!(matches!(err, CartError::Catalog(_)));
        assert!(store.items().is_empty());
        assert_eq!(sink.messages(), vec![MSG_ADD_FAILED]);
    }

    #[tokio::test]
    async fn test_remove_present_product_keeps_order_of_others() {
        let h = Harness::new(&[(1, 5), (2, 5), (3, 5)]);
        h.store.add_product(ProductId::new(1)).await.unwrap();
        h.store.add_product(ProductId::new(2)).await.unwrap();
        h.store.add_product(ProductId::new(3)).await.unwrap();

        let cart = h.store.remove_product(ProductId::new(2)).unwrap();

        let ids: Vec<i64> = cart.iter().map(|i| i.id.as_i64()).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(h.sink.messages().is_empty());
        assert_eq!(h.persisted().unwrap(), cart);
    }

    #[tokio::test]
    async fn test_remove_absent_product_notifies_and_leaves_cart() {
        let h = Harness::new(&[(1, 5)]);
        h.store.add_product(ProductId::new(1)).await.unwrap();
        let before = h.store.items();

        let err = h.store.remove_product(ProductId::new(42)).unwrap_err();

        assert!(matches!(err, CartError::NotInCart(id) if id == ProductId::new(42)));
        assert_eq!(h.store.items(), before);
        assert_eq!(h.sink.messages(), vec![MSG_REMOVE_FAILED]);
    }

    #[tokio::test]
    async fn test_update_non_positive_amount_is_silent_noop() {
        let h = Harness::new(&[(1, 5)]);
        h.store.add_product(ProductId::new(1)).await.unwrap();
        let before = h.store.items();

        let zero = h.store.update_amount(ProductId::new(1), 0).await.unwrap();
        let negative = h.store.update_amount(ProductId::new(1), -3).await.unwrap();

        assert_eq!(zero, before);
        assert_eq!(negative, before);
        assert!(h.sink.messages().is_empty());
    }

    #[tokio::test]
    async fn test_update_to_exactly_full_stock_is_rejected() {
        let h = Harness::new(&[(1, 5)]);
        h.store.add_product(ProductId::new(1)).await.unwrap();

        let err = h
            .store
            .update_amount(ProductId::new(1), 5)
            .await
            .unwrap_err();

        assert!(matches!(err, CartError::OutOfStock));
        assert_eq!(h.store.items()[0].amount, 1);
        assert_eq!(h.sink.messages(), vec![MSG_OUT_OF_STOCK]);
    }

    #[tokio::test]
    async fn test_update_to_one_below_stock_is_accepted() {
        let h = Harness::new(&[(1, 5)]);
        h.store.add_product(ProductId::new(1)).await.unwrap();

        let cart = h.store.update_amount(ProductId::new(1), 4).await.unwrap();

        assert_eq!(cart[0].amount, 4);
        assert_eq!(h.persisted().unwrap(), cart);
    }

    #[tokio::test]
    async fn test_update_sets_exact_amount() {
        let h = Harness::new(&[(1, 10)]);
        h.store.add_product(ProductId::new(1)).await.unwrap();

        let cart = h.store.update_amount(ProductId::new(1), 3).await.unwrap();

        assert_eq!(cart[0].amount, 3);
        assert!(h.sink.messages().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_entry_is_silent_noop() {
        // Unlike remove, updating an id that is not in the cart reports
        // nothing at all.
        let h = Harness::new(&[(1, 10)]);

        let cart = h.store.update_amount(ProductId::new(1), 3).await.unwrap();

        assert!(cart.is_empty());
        assert!(h.sink.messages().is_empty());
        assert_eq!(h.persisted(), None);
    }

    #[tokio::test]
    async fn test_update_stock_lookup_failure_notifies_generic_message() {
        let h = Harness::new(&[]);

        let err = h
            .store
            .update_amount(ProductId::new(1), 3)
            .await
            .unwrap_err();

        assert!(matches!(err, CartError::Stock(_)));
        assert_eq!(h.sink.messages(), vec![MSG_UPDATE_FAILED]);
    }

    #[tokio::test]
    async fn test_load_restores_persisted_cart() {
        let storage = Arc::new(MemoryStore::new());
        let h = Harness::with_storage(&[(1, 5), (2, 5)], Arc::clone(&storage));
        h.store.add_product(ProductId::new(1)).await.unwrap();
        h.store.add_product(ProductId::new(2)).await.unwrap();
        let before = h.store.items();

        // A second store over the same storage sees the same cart.
        let reloaded = Harness::with_storage(&[(1, 5), (2, 5)], storage);
        assert_eq!(reloaded.store.items(), before);
    }

    #[test]
    fn test_load_missing_value_yields_empty_cart() {
        let h = Harness::new(&[]);
        assert!(h.store.items().is_empty());
    }

    #[test]
    fn test_load_malformed_value_yields_empty_cart() {
        let storage = Arc::new(MemoryStore::with_entry(DEFAULT_STORAGE_KEY, "{not json"));
        let h = Harness::with_storage(&[], storage);
        assert!(h.store.items().is_empty());
    }

    #[tokio::test]
    async fn test_persistence_failure_is_swallowed() {
        let sink = Arc::new(RecordingSink::new());
        let store = CartStore::load(
            Arc::new(ScriptedStock([(1, 5)].into_iter().collect())),
            Arc::new(ScriptedCatalog(
                [(1, product(1, "Shoes 1"))].into_iter().collect(),
            )),
            Arc::new(FailingStore),
            Arc::clone(&sink) as Arc<dyn NotificationSink>,
            DEFAULT_STORAGE_KEY,
        );

        // The write fails, but the operation succeeds and memory moves ahead
        // of the persisted state.
        let cart = store.add_product(ProductId::new(1)).await.unwrap();
        assert_eq!(cart[0].amount, 1);
        assert!(sink.messages().is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let h = Harness::new(&[(1, 5)]);
        let clone = h.store.clone();

        h.store.add_product(ProductId::new(1)).await.unwrap();

        assert_eq!(clone.items().len(), 1);
    }
}
