//! Cart Store.
//!
//! Local, observable mirror of the server-side cart. Local state only changes
//! after the server has confirmed a mutation, and then to whatever the server
//! returned; a failed call leaves the cart exactly as it was.
//!
//! Snapshots are published over a [`tokio::sync::watch`] channel, so a new
//! subscriber immediately sees the latest cart.

use std::collections::HashSet;
use std::sync::Arc;

use marketa_core::{CartLine, LineId, ProductId, ProductSnapshot};
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::error::add_breadcrumb;
use crate::gateway::{CartGateway, GatewayError};
use crate::messages;
use crate::notify::{Notifier, Severity};

/// Errors returned by cart operations.
///
/// By the time one of these is returned the user has already been notified
/// where the operation calls for it.
#[derive(Debug, Error)]
pub enum CartError {
    /// The server rejected the quantity because of insufficient stock.
    #[error("Requested quantity of {product} exceeds the available stock")]
    StockConflict { product: String },

    /// The quantity does not fit a cart line.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Any other API failure.
    #[error("Storefront API error: {0}")]
    Gateway(#[from] GatewayError),
}

/// Observable cart cache reconciled with the remote cart.
///
/// Cheap to clone; clones share the same cart.
///
/// Calls are not queued. Two overlapping `add_item` calls for the same product
/// both read the same starting quantity, so the second may overwrite the first
/// with a stale value. Front ends that allow that should serialise cart actions
/// themselves.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    gateway: Arc<dyn CartGateway>,
    notifier: Arc<dyn Notifier>,
    lines: watch::Sender<Vec<CartLine>>,
}

impl CartStore {
    /// Create an empty store. Call [`CartStore::load`] to fetch the cart.
    #[must_use]
    pub fn new(gateway: Arc<dyn CartGateway>, notifier: Arc<dyn Notifier>) -> Self {
        let (lines, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(CartStoreInner {
                gateway,
                notifier,
                lines,
            }),
        }
    }

    /// Create a store and load the current cart.
    ///
    /// A failed load is logged and leaves the store empty.
    pub async fn connect(gateway: Arc<dyn CartGateway>, notifier: Arc<dyn Notifier>) -> Self {
        let store = Self::new(gateway, notifier);
        if let Err(e) = store.load().await {
            warn!(error = %e, "Initial cart load failed, starting empty");
        }
        store
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Subscribe to cart snapshots. The current cart is available right away.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<CartLine>> {
        self.inner.lines.subscribe()
    }

    /// Copy of the current cart.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CartLine> {
        self.inner.lines.borrow().clone()
    }

    /// Quantity of a product in the cart, 0 if absent. Never calls the API.
    #[must_use]
    pub fn get_quantity(&self, product_id: ProductId) -> u32 {
        self.inner
            .lines
            .borrow()
            .iter()
            .find(|line| line.product_id == product_id)
            .map_or(0, |line| line.quantity)
    }

    /// The line holding a product, if any.
    #[must_use]
    pub fn line_for_product(&self, product_id: ProductId) -> Option<CartLine> {
        self.inner
            .lines
            .borrow()
            .iter()
            .find(|line| line.product_id == product_id)
            .cloned()
    }

    fn line(&self, line_id: LineId) -> Option<CartLine> {
        self.inner
            .lines
            .borrow()
            .iter()
            .find(|line| line.id == line_id)
            .cloned()
    }

    /// Sum of price times quantity over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.inner
            .lines
            .borrow()
            .iter()
            .map(CartLine::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Number of units in the cart.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.inner
            .lines
            .borrow()
            .iter()
            .map(|line| u64::from(line.quantity))
            .sum()
    }

    #[must_use]
    pub fn has_items(&self) -> bool {
        !self.inner.lines.borrow().is_empty()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Replace the local cart with the server's.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if the cart could not be fetched. Nothing is
    /// shown to the user.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<(), CartError> {
        let lines = self.inner.gateway.fetch_cart().await.map_err(|e| {
            warn!(error = %e, "Failed to load cart");
            CartError::Gateway(e)
        })?;

        let lines = normalize(lines);
        debug!(lines = lines.len(), "Cart loaded");
        self.inner.lines.send_replace(lines);
        Ok(())
    }

    /// Add one unit of a product.
    ///
    /// Creates a line with quantity 1, or raises the existing line by one.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::StockConflict`] if the server refuses the quantity
    /// (an out-of-stock warning has been shown), or the gateway error for any
    /// other failure.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_item(&self, product: &ProductSnapshot) -> Result<(), CartError> {
        add_breadcrumb(
            "cart",
            "Add item",
            Some(&[("product_id", product.id.to_string().as_str())]),
        );

        if let Some(line) = self.line_for_product(product.id) {
            let requested = line.quantity.saturating_add(1);
            return match self
                .inner
                .gateway
                .set_line_quantity(line.id, requested)
                .await
            {
                Ok(updated) => {
                    debug!(line_id = %line.id, quantity = updated.quantity, "Line increased");
                    self.apply_quantity(line.id, updated.quantity);
                    Ok(())
                }
                Err(e) => Err(self.report_failure(&product.name, e)),
            };
        }

        match self.inner.gateway.add_line(product.id, 1).await {
            Ok(line) => {
                debug!(line_id = %line.id, "Line added");
                self.insert_line(line);
                Ok(())
            }
            Err(e) => Err(self.report_failure(&product.name, e)),
        }
    }

    /// Set the quantity of a line.
    ///
    /// A quantity of zero or less removes the line and shows a "removed" note.
    /// Otherwise the line ends up with the quantity the server returned.
    ///
    /// # Errors
    ///
    /// Same as [`CartStore::add_item`] and [`CartStore::remove_item_by_id`].
    /// Returns [`CartError::InvalidQuantity`] for quantities above `u32::MAX`.
    #[instrument(skip(self))]
    pub async fn update_quantity(&self, line_id: LineId, quantity: i64) -> Result<(), CartError> {
        if quantity <= 0 {
            self.remove_item_by_id(line_id).await?;
            self.inner.notifier.show(Severity::Info, &messages::REMOVED);
            return Ok(());
        }

        let requested =
            u32::try_from(quantity).map_err(|_| CartError::InvalidQuantity(quantity))?;
        let product_name = self
            .line(line_id)
            .map_or_else(|| format!("item {line_id}"), |line| line.product.name);

        match self
            .inner
            .gateway
            .set_line_quantity(line_id, requested)
            .await
        {
            Ok(updated) => {
                if updated.quantity != requested {
                    debug!(requested, confirmed = updated.quantity, "Server adjusted quantity");
                }
                self.apply_quantity(line_id, updated.quantity);
                Ok(())
            }
            Err(e) => Err(self.report_failure(&product_name, e)),
        }
    }

    /// Take one unit of a product out of the cart, removing the line at zero.
    ///
    /// # Errors
    ///
    /// See [`CartStore::update_quantity`].
    #[instrument(skip(self))]
    pub async fn decrease_quantity(&self, product_id: ProductId) -> Result<(), CartError> {
        let Some(line) = self.line_for_product(product_id) else {
            debug!("Product not in cart, nothing to decrease");
            return Ok(());
        };

        self.update_quantity(line.id, i64::from(line.quantity) - 1)
            .await
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if the server did not remove the line. The
    /// failure is logged, not shown, and the local cart is unchanged.
    #[instrument(skip(self))]
    pub async fn remove_item_by_id(&self, line_id: LineId) -> Result<(), CartError> {
        add_breadcrumb(
            "cart",
            "Remove item",
            Some(&[("line_id", line_id.to_string().as_str())]),
        );

        if let Err(e) = self.inner.gateway.remove_line(line_id).await {
            warn!(error = %e, "Failed to remove cart line");
            return Err(CartError::Gateway(e));
        }

        self.inner
            .lines
            .send_modify(|lines| lines.retain(|line| line.id != line_id));
        debug!("Line removed");
        Ok(())
    }

    /// Remove the line holding a product. Does nothing if the product is absent.
    ///
    /// # Errors
    ///
    /// See [`CartStore::remove_item_by_id`].
    #[instrument(skip(self))]
    pub async fn remove_item_by_product(&self, product_id: ProductId) -> Result<(), CartError> {
        match self.line_for_product(product_id) {
            Some(line) => self.remove_item_by_id(line.id).await,
            None => {
                debug!("Product not in cart, nothing to remove");
                Ok(())
            }
        }
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if the server did not clear the cart. The
    /// failure is logged, not shown, and the local cart is unchanged.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<(), CartError> {
        add_breadcrumb("cart", "Clear cart", None);

        if let Err(e) = self.inner.gateway.clear_cart().await {
            warn!(error = %e, "Failed to clear cart");
            return Err(CartError::Gateway(e));
        }

        self.inner.lines.send_replace(Vec::new());
        debug!("Cart cleared");
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Publish a server-confirmed quantity. Zero drops the line.
    ///
    /// Subscribers are only notified when the cart actually changed.
    fn apply_quantity(&self, line_id: LineId, quantity: u32) {
        self.inner.lines.send_if_modified(|lines| {
            if quantity == 0 {
                let before = lines.len();
                lines.retain(|line| line.id != line_id);
                return lines.len() != before;
            }

            match lines.iter_mut().find(|line| line.id == line_id) {
                Some(line) if line.quantity != quantity => {
                    line.quantity = quantity;
                    true
                }
                _ => false,
            }
        });
    }

    /// Publish a line returned by the server, keeping one line per product.
    fn insert_line(&self, line: CartLine) {
        self.inner.lines.send_modify(|lines| {
            match lines
                .iter_mut()
                .find(|l| l.id == line.id || l.product_id == line.product_id)
            {
                Some(existing) => *existing = line,
                None => lines.push(line),
            }
        });
    }

    /// Notify the user about a failed quantity change and build the error.
    fn report_failure(&self, product_name: &str, err: GatewayError) -> CartError {
        if err.is_stock_conflict() {
            warn!(error = %err, product = product_name, "Stock conflict");
            self.inner.notifier.show_out_of_stock(product_name);
            return CartError::StockConflict {
                product: product_name.to_string(),
            };
        }

        warn!(error = %err, product = product_name, "Cart update failed");
        self.inner
            .notifier
            .show(Severity::Error, &messages::CART_UPDATE_FAILED);
        CartError::Gateway(err)
    }
}

/// Drop lines that would break the cart invariants: zero quantities and
/// repeated products.
fn normalize(lines: Vec<CartLine>) -> Vec<CartLine> {
    let mut seen = HashSet::new();
    lines
        .into_iter()
        .filter(|line| {
            if line.quantity == 0 {
                warn!(line_id = %line.id, "Dropping cart line with zero quantity");
                return false;
            }
            if !seen.insert(line.product_id) {
                warn!(
                    line_id = %line.id,
                    product_id = %line.product_id,
                    "Dropping duplicate cart line"
                );
                return false;
            }
            true
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use marketa_core::Price;

    use super::*;
    use crate::gateway::{GatewayCall, InMemoryGateway, Operation};
    use crate::notify::RecordingNotifier;
    use crate::testing::product;

    fn store(gateway: &InMemoryGateway) -> (CartStore, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let store = CartStore::new(Arc::new(gateway.clone()), notifier.clone());
        (store, notifier)
    }

    /// Gateway with a Laptop (stock 10) and a Mouse (stock 2), and the Laptop
    /// in the cart as line 100.
    fn seeded(quantity: u32) -> InMemoryGateway {
        InMemoryGateway::new()
            .with_product(product(1, "Laptop", 10))
            .with_product(product(5, "Mouse", 2))
            .with_line(LineId::new(100), ProductId::new(1), quantity)
    }

    async fn loaded(gateway: &InMemoryGateway) -> (CartStore, Arc<RecordingNotifier>) {
        let (store, notifier) = store(gateway);
        store.load().await.unwrap();
        gateway.reset_calls();
        (store, notifier)
    }

    #[tokio::test]
    async fn test_add_new_product_creates_line() {
        let gateway = InMemoryGateway::new().with_product(product(5, "Mouse", 2));
        let (store, notifier) = loaded(&gateway).await;

        store.add_item(&product(5, "Mouse", 2)).await.unwrap();

        assert_eq!(store.get_quantity(ProductId::new(5)), 1);
        assert_eq!(store.snapshot().len(), 1);
        assert_eq!(
            gateway.calls(),
            vec![GatewayCall::AddLine {
                product_id: ProductId::new(5),
                quantity: 1
            }]
        );
        assert_eq!(gateway.call_count(Operation::SetLineQuantity), 0);
        assert!(notifier.is_empty());
    }

    #[tokio::test]
    async fn test_add_existing_product_increments() {
        let gateway = seeded(2);
        let (store, _) = loaded(&gateway).await;

        store.add_item(&product(1, "Laptop", 10)).await.unwrap();

        assert_eq!(store.get_quantity(ProductId::new(1)), 3);
        assert_eq!(
            gateway.calls(),
            vec![GatewayCall::SetLineQuantity {
                line_id: LineId::new(100),
                quantity: 3
            }]
        );
        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_stock_conflict_leaves_cart_unchanged() {
        let gateway = InMemoryGateway::new()
            .with_product(product(5, "Mouse", 2))
            .with_line(LineId::new(7), ProductId::new(5), 2);
        let (store, notifier) = loaded(&gateway).await;
        let mut rx = store.subscribe();
        rx.borrow_and_update();

        let err = store.add_item(&product(5, "Mouse", 2)).await.unwrap_err();

        assert!(matches!(err, CartError::StockConflict { ref product } if product == "Mouse"));
        assert_eq!(store.get_quantity(ProductId::new(5)), 2);
        assert!(!rx.has_changed().unwrap());

        let notes = notifier.take();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].severity, Severity::Warning);
        assert_eq!(notes[0].title, messages::OUT_OF_STOCK_TITLE);
        assert!(notes[0].message.contains("Mouse"));
    }

    #[tokio::test]
    async fn test_other_failure_shows_generic_error() {
        let gateway = InMemoryGateway::new().with_product(product(5, "Mouse", 2));
        let (store, notifier) = loaded(&gateway).await;
        gateway.fail_next(Operation::AddLine, 1);

        let err = store.add_item(&product(5, "Mouse", 2)).await.unwrap_err();

        assert!(matches!(err, CartError::Gateway(GatewayError::Unavailable(_))));
        assert!(!store.has_items());
        assert_eq!(notifier.count(Severity::Error), 1);
        assert_eq!(notifier.all()[0].title, messages::CART_UPDATE_FAILED.title);
    }

    #[tokio::test]
    async fn test_update_quantity_non_positive_removes() {
        for quantity in [0, -1] {
            let gateway = seeded(3);
            let (store, notifier) = loaded(&gateway).await;

            store
                .update_quantity(LineId::new(100), quantity)
                .await
                .unwrap();

            assert!(store.line_for_product(ProductId::new(1)).is_none());
            assert_eq!(
                gateway.calls(),
                vec![GatewayCall::RemoveLine(LineId::new(100))]
            );
            let notes = notifier.take();
            assert_eq!(notes.len(), 1);
            assert_eq!(notes[0].severity, Severity::Info);
            assert_eq!(notes[0].title, messages::REMOVED.title);
        }
    }

    #[tokio::test]
    async fn test_update_quantity_uses_server_value() {
        let gateway = seeded(1);
        let (store, _) = loaded(&gateway).await;

        store.update_quantity(LineId::new(100), 4).await.unwrap();
        assert_eq!(store.get_quantity(ProductId::new(1)), 4);
        assert_eq!(gateway.lines()[0].quantity, 4);
    }

    #[tokio::test]
    async fn test_stock_drop_between_adds_keeps_last_quantity() {
        let gateway = seeded(1);
        let (store, notifier) = loaded(&gateway).await;

        store.add_item(&product(1, "Laptop", 10)).await.unwrap();
        assert_eq!(store.get_quantity(ProductId::new(1)), 2);

        gateway.set_stock(ProductId::new(1), 2);
        let err = store.add_item(&product(1, "Laptop", 10)).await.unwrap_err();

        assert!(matches!(err, CartError::StockConflict { .. }));
        assert_eq!(store.get_quantity(ProductId::new(1)), 2);
        assert_eq!(gateway.lines()[0].quantity, 2);
        assert_eq!(notifier.count(Severity::Warning), 1);
    }

    #[tokio::test]
    async fn test_unchanged_quantity_publishes_nothing() {
        let gateway = seeded(3);
        let (store, _) = loaded(&gateway).await;
        let mut rx = store.subscribe();
        rx.borrow_and_update();

        store.update_quantity(LineId::new(100), 3).await.unwrap();

        assert!(!rx.has_changed().unwrap());
        assert_eq!(store.get_quantity(ProductId::new(1)), 3);
    }

    #[tokio::test]
    async fn test_update_of_unknown_local_line_publishes_nothing() {
        let gateway = seeded(3);
        // Never loaded: the server knows line 100, the local cart does not
        let (store, _) = store(&gateway);
        let mut rx = store.subscribe();
        rx.borrow_and_update();

        store.update_quantity(LineId::new(100), 4).await.unwrap();

        assert!(!rx.has_changed().unwrap());
        assert!(store.snapshot().is_empty());
        assert_eq!(gateway.lines()[0].quantity, 4);
    }

    #[tokio::test]
    async fn test_update_quantity_rejects_overflow() {
        let gateway = seeded(1);
        let (store, _) = loaded(&gateway).await;

        let err = store
            .update_quantity(LineId::new(100), i64::from(u32::MAX) + 1)
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidQuantity(_)));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_decrease_keeps_line_above_zero() {
        let gateway = seeded(2);
        let (store, notifier) = loaded(&gateway).await;

        store.decrease_quantity(ProductId::new(1)).await.unwrap();

        assert_eq!(store.get_quantity(ProductId::new(1)), 1);
        assert_eq!(
            gateway.calls(),
            vec![GatewayCall::SetLineQuantity {
                line_id: LineId::new(100),
                quantity: 1
            }]
        );
        assert!(notifier.is_empty());
    }

    #[tokio::test]
    async fn test_decrease_to_zero_removes_line() {
        let gateway = seeded(1);
        let (store, notifier) = loaded(&gateway).await;

        store.decrease_quantity(ProductId::new(1)).await.unwrap();

        assert!(!store.has_items());
        assert_eq!(
            gateway.calls(),
            vec![GatewayCall::RemoveLine(LineId::new(100))]
        );
        assert_eq!(notifier.count(Severity::Info), 1);
    }

    #[tokio::test]
    async fn test_get_quantity_is_local() {
        let gateway = seeded(2);
        let (store, _) = loaded(&gateway).await;

        assert_eq!(store.get_quantity(ProductId::new(1)), 2);
        assert_eq!(store.get_quantity(ProductId::new(42)), 0);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_clear_cart_publishes_empty_snapshot() {
        let gateway = seeded(2);
        let (store, _) = loaded(&gateway).await;
        let mut rx = store.subscribe();
        rx.borrow_and_update();

        store.clear_cart().await.unwrap();

        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_empty());
        assert!(store.subscribe().borrow().is_empty());
    }

    #[tokio::test]
    async fn test_remove_failure_is_silent() {
        let gateway = seeded(2);
        let (store, notifier) = loaded(&gateway).await;
        gateway.fail_next(Operation::RemoveLine, 1);

        assert!(store.update_quantity(LineId::new(100), 0).await.is_err());

        assert_eq!(store.get_quantity(ProductId::new(1)), 2);
        assert!(notifier.is_empty());
    }

    #[tokio::test]
    async fn test_clear_failure_keeps_lines() {
        let gateway = seeded(2);
        let (store, notifier) = loaded(&gateway).await;
        gateway.fail_next(Operation::ClearCart, 1);

        assert!(store.clear_cart().await.is_err());
        assert!(store.has_items());
        assert!(notifier.is_empty());
    }

    #[tokio::test]
    async fn test_remove_by_product() {
        let gateway = seeded(2);
        let (store, _) = loaded(&gateway).await;

        store
            .remove_item_by_product(ProductId::new(42))
            .await
            .unwrap();
        assert!(gateway.calls().is_empty());

        store
            .remove_item_by_product(ProductId::new(1))
            .await
            .unwrap();
        assert_eq!(
            gateway.calls(),
            vec![GatewayCall::RemoveLine(LineId::new(100))]
        );
        assert!(!store.has_items());
    }

    #[tokio::test]
    async fn test_new_subscriber_sees_latest_cart() {
        let gateway = seeded(2);
        let (store, _) = loaded(&gateway).await;

        let rx = store.subscribe();
        assert_eq!(rx.borrow().len(), 1);
        assert_eq!(rx.borrow()[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_totals() {
        let gateway = InMemoryGateway::new()
            .with_product(product(1, "Laptop", 10))
            .with_product(product(5, "Mouse", 10))
            .with_line(LineId::new(100), ProductId::new(1), 2)
            .with_line(LineId::new(101), ProductId::new(5), 1);
        let (store, _) = loaded(&gateway).await;

        assert_eq!(store.item_count(), 3);
        assert_eq!(store.total(), Decimal::new(4500, 0));
    }

    #[tokio::test]
    async fn test_total_saturates_on_huge_prices() {
        let mut laptop = product(1, "Laptop", 10);
        laptop.price = Price::new(Decimal::MAX).unwrap();
        let mut mouse = product(5, "Mouse", 10);
        mouse.price = laptop.price;
        let gateway = InMemoryGateway::new()
            .with_product(laptop)
            .with_product(mouse)
            .with_line(LineId::new(100), ProductId::new(1), 2)
            .with_line(LineId::new(101), ProductId::new(5), 1);
        let (store, _) = loaded(&gateway).await;

        assert_eq!(store.total(), Decimal::MAX);
    }

    #[tokio::test]
    async fn test_connect_survives_failed_load() {
        let gateway = seeded(2);
        gateway.fail_next(Operation::FetchCart, 1);
        let notifier = Arc::new(RecordingNotifier::new());

        let store = CartStore::connect(Arc::new(gateway.clone()), notifier.clone()).await;

        assert!(!store.has_items());
        assert!(notifier.is_empty());
        store.load().await.unwrap();
        assert_eq!(store.get_quantity(ProductId::new(1)), 2);
    }

    #[test]
    fn test_normalize_drops_duplicates_and_zeroes() {
        let line = |id: i64, product_id: i64, quantity: u32| CartLine {
            id: LineId::new(id),
            cart_id: None,
            product_id: ProductId::new(product_id),
            quantity,
            product: product(product_id, "Item", 10),
        };

        let lines = normalize(vec![line(1, 1, 1), line(2, 1, 3), line(3, 2, 0), line(4, 3, 2)]);

        let ids: Vec<_> = lines.iter().map(|l| l.id.as_i64()).collect();
        assert_eq!(ids, vec![1, 4]);
    }
}
