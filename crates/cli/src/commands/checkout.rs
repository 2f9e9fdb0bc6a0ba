//! Checkout command: collect the form from flags and drive the
//! orchestrator, including the interactive card step.

use clap::Args;

use buildhive_core::PaymentMethod;
use buildhive_storefront::checkout::{CardConfirmer, CheckoutForm, SubmitOutcome};
use buildhive_storefront::error::Result;
use buildhive_storefront::models::PaymentSession;

use crate::commands::cart::confirm;
use crate::context::AppContext;

#[derive(Debug, Args)]
pub struct CheckoutArgs {
    /// Recipient full name
    #[arg(long)]
    pub name: String,

    /// Contact phone number
    #[arg(long)]
    pub phone: String,

    /// Street address
    #[arg(long)]
    pub address: String,

    /// Apartment, floor, landmark
    #[arg(long)]
    pub address2: Option<String>,

    /// City
    #[arg(long)]
    pub city: String,

    /// Province or state
    #[arg(long)]
    pub state: String,

    /// Postal code
    #[arg(long)]
    pub postal_code: String,

    /// Country
    #[arg(long, default_value = "Pakistan")]
    pub country: String,

    /// Delivery notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Payment method: cod or card
    #[arg(long, default_value = "cod")]
    pub method: String,
}

pub async fn place(ctx: &AppContext, args: CheckoutArgs) -> Result<()> {
    let payment_method = match args.method.as_str() {
        "card" => PaymentMethod::Card,
        _ => PaymentMethod::Cod,
    };

    let form = CheckoutForm {
        full_name: args.name,
        phone: args.phone,
        address_line1: args.address,
        address_line2: args.address2,
        city: args.city,
        state: args.state,
        postal_code: args.postal_code,
        country: args.country,
        notes: args.notes,
        payment_method,
    };

    ctx.cart.refresh().await?;

    let totals = buildhive_storefront::checkout::CheckoutTotals::from_subtotal(
        ctx.cart.subtotal().amount,
    );
    println!("subtotal: PKR {:.2}", totals.subtotal);
    println!("tax:      PKR {:.2}", totals.tax);
    println!("total:    PKR {:.2}", totals.total);

    match ctx.checkout.submit(&form, &ctx.cart).await? {
        SubmitOutcome::Placed { order_number } => {
            println!("Order {order_number} placed");
        }
        SubmitOutcome::CardConfirmationRequired(session) => {
            println!("Order {} created, awaiting card payment", session.order_number);
            let confirmer = TerminalCardConfirmer;
            let order_number = ctx.checkout.confirm_card(&confirmer, &ctx.cart).await?;
            println!("Payment confirmed, order {order_number} placed");
        }
    }
    Ok(())
}

/// Stands in for the card widget: shows the gateway handoff data and asks
/// for confirmation on the terminal.
struct TerminalCardConfirmer;

impl CardConfirmer for TerminalCardConfirmer {
    async fn confirm(&self, session: &PaymentSession) -> std::result::Result<(), String> {
        println!("gateway key: {}", session.publishable_key);
        println!("client secret: {}", session.client_secret);
        if confirm("Complete the card payment in your browser, then confirm. Paid?") {
            Ok(())
        } else {
            Err("Card payment was not completed".to_string())
        }
    }
}
