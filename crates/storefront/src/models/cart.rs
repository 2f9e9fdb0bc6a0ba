//! Cart lines and the denormalized product snapshot joined onto them.

use buildhive_core::{CartLineId, Money, ProductId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::catalog::Product;

/// Product fields the cart endpoints join onto each line.
///
/// `quantity` here is the seller's stock level, not the cart quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub compare_at_price: Option<Decimal>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            slug: Some(product.slug.clone()),
            price: product.price,
            compare_at_price: product.compare_at_price,
            quantity: product.quantity,
            business_name: product
                .businesses
                .as_ref()
                .map(|b| b.business_name.clone()),
            image_url: product.images.first().map(|i| i.image_url.clone()),
        }
    }
}

/// One line of the server-side cart.
///
/// Some cart endpoints return the joined product under `products`, others
/// under `product`; the alias absorbs both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: CartLineId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(default, alias = "products")]
    pub product: Option<ProductSnapshot>,
}

impl CartLine {
    /// Line subtotal, or zero when the product join is missing.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.product
            .as_ref()
            .map_or_else(Money::zero_pkr, |p| Money::pkr(p.price).times(self.quantity))
    }
}

/// Server-computed cart totals from the summary endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartSummary {
    #[serde(default, alias = "itemCount")]
    pub item_count: u32,
    #[serde(default)]
    pub subtotal: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_line_accepts_products_alias() {
        let json = r#"{
            "id": "line-1",
            "product_id": "p-1",
            "quantity": 3,
            "products": {"id": "p-1", "name": "Cement 50kg", "price": "1250", "quantity": 40}
        }"#;
        let line: CartLine = serde_json::from_str(json).expect("deserialize");
        let product = line.product.as_ref().expect("joined product");
        assert_eq!(product.name, "Cement 50kg");
        assert_eq!(line.line_total().amount, Decimal::from(3750));
    }

    #[test]
    fn test_cart_line_without_product_totals_zero() {
        let json = r#"{"id": "line-2", "product_id": "p-9", "quantity": 2}"#;
        let line: CartLine = serde_json::from_str(json).expect("deserialize");
        assert!(line.product.is_none());
        assert_eq!(line.line_total().amount, Decimal::ZERO);
    }

    #[test]
    fn test_snapshot_from_product_takes_first_image() {
        let json = r#"{
            "id": "p-3",
            "name": "Bricks",
            "slug": "bricks",
            "price": "25",
            "product_images": [
                {"image_url": "https://cdn/a.jpg"},
                {"image_url": "https://cdn/b.jpg"}
            ]
        }"#;
        let product: Product = serde_json::from_str(json).expect("deserialize");
        let snapshot = ProductSnapshot::from(&product);
        assert_eq!(snapshot.image_url.as_deref(), Some("https://cdn/a.jpg"));
    }
}
