//! Cart commands, all operating through the synchronizer's mirror.

use std::io::Write;

use buildhive_core::CartLineId;
use buildhive_storefront::error::Result;

use crate::context::AppContext;

pub async fn show(ctx: &AppContext) -> Result<()> {
    ctx.cart.refresh().await?;

    let lines = ctx.cart.lines();
    if lines.is_empty() {
        println!("Your cart is empty");
        return Ok(());
    }

    for line in &lines {
        let name = line
            .product
            .as_ref()
            .map_or("(unavailable product)", |p| p.name.as_str());
        println!(
            "{}  {} x{}  {}",
            line.id,
            name,
            line.quantity,
            line.line_total(),
        );
    }
    println!("----");
    println!("{} items, subtotal {}", ctx.cart.total_quantity(), ctx.cart.subtotal());
    Ok(())
}

pub async fn add(ctx: &AppContext, product_key: &str, qty: u32) -> Result<()> {
    let product = ctx.products.get(product_key).await?;
    ctx.cart.refresh().await?;
    ctx.cart.add(&product, qty).await?;
    println!("Added {} x{}", product.name, qty);
    Ok(())
}

pub async fn set_qty(ctx: &AppContext, line: &str, qty: u32) -> Result<()> {
    ctx.cart.refresh().await?;
    let line_id = CartLineId::new(line);
    ctx.cart.update_quantity(&line_id, qty).await?;
    if qty < 1 {
        println!("Quantities below 1 are ignored; use `cart remove` instead");
    } else {
        println!("Updated");
    }
    Ok(())
}

pub async fn remove(ctx: &AppContext, line: &str) -> Result<()> {
    ctx.cart.refresh().await?;
    ctx.cart.remove(&CartLineId::new(line)).await?;
    println!("Removed");
    Ok(())
}

pub async fn clear(ctx: &AppContext, yes: bool) -> Result<()> {
    ctx.cart.refresh().await?;
    let cleared = ctx
        .cart
        .clear_with_prompt(|| yes || confirm("Empty your cart?"))
        .await?;
    if cleared {
        println!("Cart emptied");
    } else {
        println!("Kept the cart");
    }
    Ok(())
}

/// y/N prompt on the terminal.
pub fn confirm(question: &str) -> bool {
    print!("{question} [y/N] ");
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}
