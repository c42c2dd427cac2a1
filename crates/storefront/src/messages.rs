//! User-facing notification texts.

/// A fixed title and message pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub title: &'static str,
    pub message: &'static str,
}

pub const REMOVED: Message = Message {
    title: "Product removed",
    message: "The product is no longer in the cart",
};

pub const LOGIN_REQUIRED: Message = Message {
    title: "Login required",
    message: "Please sign in to confirm your order",
};

pub const PAYMENT_CONFIRMED: Message = Message {
    title: "Payment confirmed!",
    message: "Your order has been created",
};

pub const CHECKOUT_FAILED: Message = Message {
    title: "Something went wrong",
    message: "Error creating order. Please try again",
};

pub const CART_UPDATE_FAILED: Message = Message {
    title: "Something went wrong",
    message: "The cart could not be updated. Please try again",
};

pub const CHECKOUT_IN_PROGRESS: Message = Message {
    title: "Checkout in progress",
    message: "Finish or cancel the current payment first",
};

pub const PAYMENT_FAILED: Message = Message {
    title: "Payment failed",
    message: "The payment was not completed. Please try again",
};

pub const PAYMENT_STATUS_UNAVAILABLE: Message = Message {
    title: "Something went wrong",
    message: "The payment status could not be checked. Please contact support if you were charged",
};

pub const PAYMENT_TIMEOUT: Message = Message {
    title: "Payment not confirmed",
    message: "We stopped waiting for the payment. Please try again",
};

pub const OUT_OF_STOCK_TITLE: &str = "Out of stock";

/// Message body for a stock conflict on `product_name`.
#[must_use]
pub fn out_of_stock_message(product_name: &str) -> String {
    format!("The requested quantity of {product_name} exceeds the product's stock")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_stock_message_names_product() {
        assert_eq!(
            out_of_stock_message("Mouse"),
            "The requested quantity of Mouse exceeds the product's stock"
        );
    }
}
