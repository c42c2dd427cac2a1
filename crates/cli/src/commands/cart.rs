//! Cart commands.

#![allow(clippy::print_stdout)]

use marketa_core::ProductId;
use marketa_storefront::cart::CartStore;
use marketa_storefront::error::Result;
use marketa_storefront::state::AppState;

/// Look a product up and add one unit of it.
pub async fn add(state: &AppState, product_id: ProductId) -> Result<()> {
    let product = state.api().product(product_id).await?;
    state.cart().add_item(&product).await?;
    show(state.cart());
    Ok(())
}

/// Print the cart.
pub fn show(cart: &CartStore) {
    let lines = cart.snapshot();
    if lines.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    println!("{:>6}  {:>8}  {:<32} {:>4}  {:>12}", "LINE", "PRODUCT", "NAME", "QTY", "SUBTOTAL");
    for line in &lines {
        let subtotal = format!("${:.2}", line.line_total());
        println!(
            "{:>6}  {:>8}  {:<32} {:>4}  {subtotal:>12}",
            line.id,
            line.product_id,
            truncate(&line.product.name, 32),
            line.quantity,
        );
    }
    println!(
        "{} item(s), total ${:.2}",
        cart.item_count(),
        cart.total()
    );
}

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        return name.to_string();
    }
    let mut short: String = name.chars().take(width.saturating_sub(1)).collect();
    short.push('…');
    short
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_long_names() {
        assert_eq!(truncate("Mouse", 8), "Mouse");
        assert_eq!(truncate("Mechanical keyboard", 8), "Mechani…");
    }
}
