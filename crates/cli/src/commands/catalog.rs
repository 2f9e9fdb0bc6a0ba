//! Catalog browsing commands.

use buildhive_core::Money;
use buildhive_storefront::api::ProductQuery;
use buildhive_storefront::error::Result;

use crate::context::AppContext;

pub async fn list_products(
    ctx: &AppContext,
    search: Option<String>,
    category: Option<String>,
    page: u32,
) -> Result<()> {
    let query = ProductQuery {
        search,
        category_id: category,
        page: Some(page),
        ..ProductQuery::default()
    };
    let listing = ctx.products.list(&query).await?;

    if listing.products.is_empty() {
        println!("No products found");
        return Ok(());
    }

    for product in &listing.products {
        println!(
            "{}  {}  {}  [{}]",
            product.id,
            Money::pkr(product.price),
            product.name,
            product.seller_name(),
        );
    }
    if let Some(meta) = &listing.pagination {
        println!("page {} of {} ({} products)", meta.page, meta.total_pages, meta.total);
    }
    Ok(())
}

pub async fn show_product(ctx: &AppContext, key: &str) -> Result<()> {
    let product = ctx.products.get(key).await?;

    println!("{}", product.name);
    println!("id:     {}", product.id);
    println!("price:  {}", Money::pkr(product.price));
    if let Some(compare) = product.compare_at_price {
        println!("was:    {}", Money::pkr(compare));
    }
    println!("stock:  {}", product.quantity);
    println!("seller: {}", product.seller_name());
    if let Some(category) = &product.categories {
        println!("category: {}", category.name);
    }
    if !product.description.is_empty() {
        println!("\n{}", product.description);
    }
    Ok(())
}

pub async fn list_categories(ctx: &AppContext) -> Result<()> {
    let categories = ctx.categories.list().await?;
    for category in categories.iter() {
        match category.product_count {
            Some(count) => println!("{}  {}  ({count} products)", category.id, category.name),
            None => println!("{}  {}", category.id, category.name),
        }
    }
    Ok(())
}
