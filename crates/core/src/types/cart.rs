//! Cart line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CartId, LineId, ProductId, ProductSnapshot};

/// One product entry in a cart, carrying its own quantity.
///
/// `id` is assigned by the server. `product_id` is a non-owning reference to
/// the catalog entry and is unique within a cart. A line is removed rather
/// than left at quantity zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: LineId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cart_id: Option<CartId>,
    pub product_id: ProductId,
    pub quantity: u32,
    pub product: ProductSnapshot,
}

impl CartLine {
    /// Price of this line (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price.line_total(self.quantity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_cart_line() {
        let json = r#"{
            "id": 100,
            "cart_id": 1,
            "product_id": 1,
            "quantity": 2,
            "product": { "id": 1, "name": "Laptop", "price": "1500", "stock": 10 }
        }"#;

        let line: CartLine = serde_json::from_str(json).unwrap();
        assert_eq!(line.id, LineId::new(100));
        assert_eq!(line.cart_id, Some(CartId::new(1)));
        assert_eq!(line.product_id, ProductId::new(1));
        assert_eq!(line.quantity, 2);
        assert_eq!(line.line_total(), Decimal::new(3000, 0));
    }

    #[test]
    fn test_cart_id_is_optional() {
        let json = r#"{
            "id": 7,
            "product_id": 3,
            "quantity": 1,
            "product": { "id": 3, "name": "Cable", "price": "4.99", "stock": 3 }
        }"#;

        let line: CartLine = serde_json::from_str(json).unwrap();
        assert!(line.cart_id.is_none());
        assert!(!serde_json::to_string(&line).unwrap().contains("cart_id"));
    }
}
