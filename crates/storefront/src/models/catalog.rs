//! Catalog resources: products and categories.

use buildhive_core::{BusinessId, CategoryId, ProductId, ProductStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A marketplace product listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub business_id: Option<BusinessId>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub compare_at_price: Option<Decimal>,
    /// Units in stock.
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub total_reviews: Option<i64>,
    #[serde(default, alias = "product_images")]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub businesses: Option<BusinessRef>,
    #[serde(default)]
    pub categories: Option<CategoryRef>,
}

impl Product {
    /// Seller display name, falling back when the join is absent.
    #[must_use]
    pub fn seller_name(&self) -> &str {
        self.businesses
            .as_ref()
            .map_or("Unknown", |b| b.business_name.as_str())
    }
}

/// A product image record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    #[serde(default)]
    pub id: Option<String>,
    pub image_url: String,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default)]
    pub is_primary: Option<bool>,
}

/// Denormalized seller name joined onto a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRef {
    pub business_name: String,
}

/// Denormalized category joined onto a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

/// One page of product listings plus pagination metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPage {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default, alias = "meta")]
    pub pagination: Option<super::PageMeta>,
}

/// A product category.
///
/// The backend spells some category fields both ways depending on the
/// endpoint, hence the aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, alias = "isActive")]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub display_order: Option<i32>,
    #[serde(default)]
    pub product_count: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_seller_name_fallback() {
        let json = r#"{"id": "p-1", "name": "Cement 50kg", "slug": "cement-50kg", "price": "1250"}"#;
        let product: Product = serde_json::from_str(json).expect("deserialize");
        assert_eq!(product.seller_name(), "Unknown");
        assert_eq!(product.price, Decimal::from(1250));
    }

    #[test]
    fn test_product_images_alias() {
        let json = r#"{
            "id": "p-2",
            "name": "Rebar",
            "slug": "rebar",
            "price": "300",
            "product_images": [{"image_url": "https://cdn/x.jpg"}]
        }"#;
        let product: Product = serde_json::from_str(json).expect("deserialize");
        assert_eq!(product.images.len(), 1);
    }

    #[test]
    fn test_category_is_active_alias() {
        let json = r#"{"id": "c-1", "name": "Steel", "isActive": true}"#;
        let category: Category = serde_json::from_str(json).expect("deserialize");
        assert_eq!(category.is_active, Some(true));
    }
}
