//! Order history and tracking commands.

use buildhive_core::{Money, OrderId};
use buildhive_storefront::api::OrderListQuery;
use buildhive_storefront::error::Result;

use crate::context::AppContext;

pub async fn list(ctx: &AppContext, page: u32) -> Result<()> {
    let query = OrderListQuery {
        page: Some(page),
        ..OrderListQuery::default()
    };
    let (orders, meta) = ctx.orders.list(&query).await?;

    if orders.is_empty() {
        println!("No orders yet");
        return Ok(());
    }

    for order in &orders {
        println!(
            "{}  {}  {:?}/{:?}  {}",
            order.id,
            order.order_number,
            order.status,
            order.payment_status,
            Money::pkr(order.total_amount),
        );
    }
    if meta.total_pages > 1 {
        println!("page {} of {}", meta.page, meta.total_pages);
    }
    Ok(())
}

pub async fn show(ctx: &AppContext, id: &str) -> Result<()> {
    let order = ctx.orders.get(&OrderId::new(id)).await?;

    println!("Order {}", order.order_number);
    println!("status:   {:?}", order.status);
    println!("payment:  {:?} ({:?})", order.payment_status, order.payment_method);
    for item in &order.items {
        let name = item.product_name.as_deref().unwrap_or("(product)");
        println!("  {} x{}  {}", name, item.quantity, Money::pkr(item.price).times(item.quantity));
    }
    println!("subtotal: {}", Money::pkr(order.subtotal));
    println!("tax:      {}", Money::pkr(order.tax_amount));
    println!("total:    {}", Money::pkr(order.total_amount));
    if let Some(address) = &order.shipping_address {
        println!("ship to:  {}, {}, {}", address.full_name, address.address_line1, address.city);
    }
    Ok(())
}

pub async fn cancel(ctx: &AppContext, id: &str) -> Result<()> {
    let order = ctx.orders.cancel(&OrderId::new(id)).await?;
    println!("Order {} is now {:?}", order.order_number, order.status);
    Ok(())
}

pub async fn track(ctx: &AppContext, id: &str) -> Result<()> {
    match ctx.orders.tracking(&OrderId::new(id)).await? {
        Some(tracking) => {
            if let Some(carrier) = &tracking.carrier {
                println!("carrier: {carrier}");
            }
            if let Some(number) = &tracking.tracking_number {
                println!("tracking number: {number}");
            }
            for event in &tracking.events {
                let when = event
                    .timestamp
                    .map_or_else(String::new, |t| format!("{t}  "));
                let location = event.location.as_deref().unwrap_or("");
                println!("  {when}{}  {location}", event.status);
            }
            if tracking.events.is_empty() {
                println!("No tracking events yet");
            }
        }
        None => println!("No tracking available for this order yet"),
    }
    Ok(())
}
