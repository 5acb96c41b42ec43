//! Stable idempotency keys for charge creation.
//!
//! A client that retries checkout submission must not create a second
//! charge. The key is a SHA-256 digest of the normalized cart plus the
//! customer identity: line order doesn't matter, formatting doesn't matter,
//! but any change to what is actually being bought produces a new key.

use sha2::{Digest, Sha256};

use tidewater_core::types::CartLineItem;

/// Derive the idempotency key for creating a charge.
#[must_use]
pub fn charge_idempotency_key(items: &[CartLineItem], customer_email: Option<&str>) -> String {
    let mut lines: Vec<String> = items
        .iter()
        .map(|item| {
            format!(
                "{}\x1f{}\x1f{}\x1f{}",
                item.sku,
                item.quantity,
                item.option.trim().to_ascii_lowercase(),
                item.declared_unit_price
                    .map_or_else(String::new, |p| p.cents().to_string()),
            )
        })
        .collect();
    lines.sort_unstable();

    let mut hasher = Sha256::new();
    hasher.update(
        customer_email
            .map_or("anonymous", str::trim)
            .to_ascii_lowercase(),
    );
    for line in &lines {
        hasher.update([0x1e]);
        hasher.update(line);
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidewater_core::types::Sku;

    fn line(sku: &str, quantity: u32, option: &str) -> CartLineItem {
        CartLineItem {
            sku: Sku::new(sku),
            quantity,
            option: option.to_owned(),
            declared_unit_price: None,
            shipping_override: None,
            weight: None,
        }
    }

    #[test]
    fn test_line_order_does_not_matter() {
        let a = [line("A", 1, "Large"), line("B", 2, "")];
        let b = [line("B", 2, ""), line("A", 1, "large ")];
        assert_eq!(
            charge_idempotency_key(&a, Some("x@example.com")),
            charge_idempotency_key(&b, Some("X@example.com")),
        );
    }

    #[test]
    fn test_cart_changes_change_the_key() {
        let a = [line("A", 1, "Large")];
        let b = [line("A", 2, "Large")];
        assert_ne!(
            charge_idempotency_key(&a, Some("x@example.com")),
            charge_idempotency_key(&b, Some("x@example.com")),
        );
        assert_ne!(
            charge_idempotency_key(&a, Some("x@example.com")),
            charge_idempotency_key(&a, Some("y@example.com")),
        );
        assert_ne!(
            charge_idempotency_key(&a, Some("x@example.com")),
            charge_idempotency_key(&a, None),
        );
    }
}
