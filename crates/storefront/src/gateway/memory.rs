//! In-memory cart gateway.
//!
//! Keeps the [`CartGateway`] contract against local state: stock limits
//! produce `Conflict`, payment statuses are scripted, and failures can be
//! injected per operation. Every call is recorded so tests can assert on
//! exactly which round trips happened.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use marketa_core::{
    CartId, CartLine, CheckoutStart, LineId, PaymentStatus, ProductId, ProductSnapshot,
};

use super::{CartGateway, GatewayError};

/// Cart id reported on every line.
const CART_ID: CartId = CartId::new(1);

/// Gateway operations, used to inject failures and count calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FetchCart,
    AddLine,
    SetLineQuantity,
    RemoveLine,
    ClearCart,
    StartCheckout,
    ConfirmPayment,
}

/// A recorded gateway call with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    FetchCart,
    AddLine {
        product_id: ProductId,
        quantity: u32,
    },
    SetLineQuantity {
        line_id: LineId,
        quantity: u32,
    },
    RemoveLine(LineId),
    ClearCart,
    StartCheckout,
    ConfirmPayment(String),
}

impl GatewayCall {
    /// The operation this call belongs to.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::FetchCart => Operation::FetchCart,
            Self::AddLine { .. } => Operation::AddLine,
            Self::SetLineQuantity { .. } => Operation::SetLineQuantity,
            Self::RemoveLine(_) => Operation::RemoveLine,
            Self::ClearCart => Operation::ClearCart,
            Self::StartCheckout => Operation::StartCheckout,
            Self::ConfirmPayment(_) => Operation::ConfirmPayment,
        }
    }
}

#[derive(Debug, Default)]
struct InMemoryState {
    catalog: HashMap<ProductId, ProductSnapshot>,
    lines: Vec<CartLine>,
    next_line_id: i64,
    sessions: u32,
    payments: VecDeque<Result<PaymentStatus, String>>,
    failures: HashMap<Operation, u32>,
    calls: Vec<GatewayCall>,
}

impl InMemoryState {
    /// Record a call and consume an injected failure for it, if any.
    fn enter(&mut self, call: GatewayCall) -> Result<(), GatewayError> {
        let operation = call.operation();
        self.calls.push(call);

        match self.failures.get_mut(&operation) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                Err(GatewayError::Unavailable(format!(
                    "injected failure for {operation:?}"
                )))
            }
            _ => Ok(()),
        }
    }

    fn product(&self, product_id: ProductId) -> Result<&ProductSnapshot, GatewayError> {
        self.catalog
            .get(&product_id)
            .ok_or_else(|| GatewayError::NotFound(format!("Product not found: {product_id}")))
    }

    fn check_stock(&self, product_id: ProductId, quantity: u32) -> Result<(), GatewayError> {
        let product = self.product(product_id)?;
        if quantity > product.stock {
            return Err(GatewayError::Conflict {
                status: 409,
                message: format!(
                    "Requested quantity {quantity} exceeds stock {} for {}",
                    product.stock, product.name
                ),
            });
        }
        Ok(())
    }

    fn allocate_line_id(&mut self) -> LineId {
        self.next_line_id += 1;
        LineId::new(self.next_line_id)
    }
}

/// In-memory storefront backend.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryGateway {
    /// Create an empty backend with no products.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, InMemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a product in the catalog.
    #[must_use]
    pub fn with_product(self, product: ProductSnapshot) -> Self {
        self.state().catalog.insert(product.id, product);
        self
    }

    /// Seed a cart line. The product must already be registered.
    ///
    /// # Panics
    ///
    /// Panics if the product is not in the catalog.
    #[must_use]
    pub fn with_line(self, line_id: LineId, product_id: ProductId, quantity: u32) -> Self {
        {
            let mut state = self.state();
            let product = state
                .catalog
                .get(&product_id)
                .cloned()
                .unwrap_or_else(|| panic!("product {product_id} must be registered first"));
            state.next_line_id = state.next_line_id.max(line_id.as_i64());
            state.lines.push(CartLine {
                id: line_id,
                cart_id: Some(CART_ID),
                product_id,
                quantity,
                product,
            });
        }
        self
    }

    /// Queue the status returned by the next payment confirmation.
    ///
    /// Once the script runs out every confirmation reports `pending`.
    pub fn script_payment(&self, status: PaymentStatus) {
        self.state().payments.push_back(Ok(status));
    }

    /// Queue a transport failure for the next payment confirmation.
    pub fn script_payment_error(&self, message: impl Into<String>) {
        self.state().payments.push_back(Err(message.into()));
    }

    /// Make the next `times` calls of `operation` fail.
    pub fn fail_next(&self, operation: Operation, times: u32) {
        *self.state().failures.entry(operation).or_insert(0) += times;
    }

    /// Change the stock of a registered product.
    pub fn set_stock(&self, product_id: ProductId, stock: u32) {
        if let Some(product) = self.state().catalog.get_mut(&product_id) {
            product.stock = stock;
        }
    }

    /// Every call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state().calls.clone()
    }

    /// Number of calls made to `operation`.
    #[must_use]
    pub fn call_count(&self, operation: Operation) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    /// Forget recorded calls.
    pub fn reset_calls(&self) {
        self.state().calls.clear();
    }

    /// Server-side cart contents.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.state().lines.clone()
    }
}

#[async_trait]
impl CartGateway for InMemoryGateway {
    async fn fetch_cart(&self) -> Result<Vec<CartLine>, GatewayError> {
        let mut state = self.state();
        state.enter(GatewayCall::FetchCart)?;
        Ok(state.lines.clone())
    }

    async fn add_line(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartLine, GatewayError> {
        let mut state = self.state();
        state.enter(GatewayCall::AddLine {
            product_id,
            quantity,
        })?;

        // Adding a product that is already in the cart merges into its line
        let existing = state
            .lines
            .iter()
            .position(|line| line.product_id == product_id);
        let current = existing
            .and_then(|index| state.lines.get(index))
            .map_or(0, |line| line.quantity);
        let requested = current.saturating_add(quantity);
        state.check_stock(product_id, requested)?;

        if let Some(line) = existing.and_then(|index| state.lines.get_mut(index)) {
            line.quantity = requested;
            return Ok(line.clone());
        }

        let product = state.product(product_id)?.clone();
        let line = CartLine {
            id: state.allocate_line_id(),
            cart_id: Some(CART_ID),
            product_id,
            quantity: requested,
            product,
        };
        state.lines.push(line.clone());
        Ok(line)
    }

    async fn set_line_quantity(
        &self,
        line_id: LineId,
        quantity: u32,
    ) -> Result<CartLine, GatewayError> {
        let mut state = self.state();
        state.enter(GatewayCall::SetLineQuantity { line_id, quantity })?;

        let product_id = state
            .lines
            .iter()
            .find(|line| line.id == line_id)
            .map(|line| line.product_id)
            .ok_or_else(|| GatewayError::NotFound(format!("Cart item not found: {line_id}")))?;
        state.check_stock(product_id, quantity)?;

        let line = state
            .lines
            .iter_mut()
            .find(|line| line.id == line_id)
            .ok_or_else(|| GatewayError::NotFound(format!("Cart item not found: {line_id}")))?;
        line.quantity = quantity;
        Ok(line.clone())
    }

    async fn remove_line(&self, line_id: LineId) -> Result<(), GatewayError> {
        let mut state = self.state();
        state.enter(GatewayCall::RemoveLine(line_id))?;
        state.lines.retain(|line| line.id != line_id);
        Ok(())
    }

    async fn clear_cart(&self) -> Result<(), GatewayError> {
        let mut state = self.state();
        state.enter(GatewayCall::ClearCart)?;
        state.lines.clear();
        Ok(())
    }

    async fn start_checkout(&self) -> Result<CheckoutStart, GatewayError> {
        let mut state = self.state();
        state.enter(GatewayCall::StartCheckout)?;

        if state.lines.is_empty() {
            return Err(GatewayError::Api {
                status: 400,
                message: "Cart is empty".to_string(),
            });
        }

        state.sessions += 1;
        let session_id = format!("cs_test_{}", state.sessions);
        Ok(CheckoutStart {
            checkout_url: format!("https://pay.test/checkout/{session_id}"),
            session_id,
        })
    }

    async fn confirm_payment(&self, session_id: &str) -> Result<PaymentStatus, GatewayError> {
        let mut state = self.state();
        state.enter(GatewayCall::ConfirmPayment(session_id.to_string()))?;

        match state.payments.pop_front() {
            Some(Ok(status)) => Ok(status),
            Some(Err(message)) => Err(GatewayError::Unavailable(message)),
            None => Ok(PaymentStatus::Pending),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::product;

    #[tokio::test]
    async fn test_add_line_respects_stock() {
        let gateway = InMemoryGateway::new().with_product(product(1, "Laptop", 2));

        let line = gateway.add_line(ProductId::new(1), 2).await.unwrap();
        assert_eq!(line.quantity, 2);

        let err = gateway.add_line(ProductId::new(1), 1).await.unwrap_err();
        assert!(err.is_stock_conflict());
        assert_eq!(gateway.lines().len(), 1);
        assert_eq!(gateway.lines()[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_set_line_quantity_unknown_line() {
        let gateway = InMemoryGateway::new().with_product(product(1, "Laptop", 5));
        let err = gateway
            .set_line_quantity(LineId::new(99), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_seeded_line_ids_do_not_collide() {
        let gateway = InMemoryGateway::new()
            .with_product(product(1, "Laptop", 5))
            .with_product(product(2, "Mouse", 5))
            .with_line(LineId::new(100), ProductId::new(1), 1);

        let line = gateway.add_line(ProductId::new(2), 1).await.unwrap();
        assert_eq!(line.id, LineId::new(101));
    }

    #[tokio::test]
    async fn test_injected_failures_are_consumed() {
        let gateway = InMemoryGateway::new();
        gateway.fail_next(Operation::FetchCart, 1);

        assert!(gateway.fetch_cart().await.is_err());
        assert!(gateway.fetch_cart().await.is_ok());
        assert_eq!(gateway.call_count(Operation::FetchCart), 2);
    }

    #[tokio::test]
    async fn test_payment_script_then_pending() {
        let gateway = InMemoryGateway::new();
        gateway.script_payment(PaymentStatus::Unpaid);
        gateway.script_payment_error("connection reset");

        assert_eq!(
            gateway.confirm_payment("cs").await.unwrap(),
            PaymentStatus::Unpaid
        );
        assert!(gateway.confirm_payment("cs").await.is_err());
        assert_eq!(
            gateway.confirm_payment("cs").await.unwrap(),
            PaymentStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_start_checkout_requires_items() {
        let gateway = InMemoryGateway::new()
            .with_product(product(1, "Laptop", 5))
            .with_line(LineId::new(1), ProductId::new(1), 1);

        let start = gateway.start_checkout().await.unwrap();
        assert_eq!(start.session_id, "cs_test_1");

        gateway.clear_cart().await.unwrap();
        assert!(gateway.start_checkout().await.is_err());
    }
}
