//! BuildHive terminal storefront.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! buildhive products list --search cement
//! buildhive products show cement-50kg
//! buildhive categories
//!
//! # Sign in and manage the cart
//! buildhive login -e you@example.com -p secret
//! buildhive cart add <product-id> --qty 2
//! buildhive cart show
//!
//! # Check out
//! buildhive checkout --name "Mason Khan" --phone +923001234567 \
//!     --address "12-B Canal Road" --city Lahore --state Punjab \
//!     --postal-code 54000 --method cod
//!
//! # Orders
//! buildhive orders list
//! buildhive orders track <order-id>
//! ```
//!
//! # Environment Variables
//!
//! - `BUILDHIVE_API_BASE_URL` - Backend API base URL (required)
//! - `BUILDHIVE_SESSION_FILE` - Session jar path (optional)

#![cfg_attr(not(test), forbid(unsafe_code))]
// Terminal output is this binary's whole purpose.
#![allow(clippy::print_stdout, clippy::print_stderr)]

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod context;

use context::AppContext;

#[derive(Parser)]
#[command(name = "buildhive")]
#[command(author, version, about = "BuildHive construction materials marketplace")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Create a new buyer account
    Register {
        /// Full name
        #[arg(short, long)]
        name: String,

        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password (min 8 characters)
        #[arg(short, long)]
        password: String,

        /// Phone number
        #[arg(long)]
        phone: Option<String>,
    },
    /// Sign out and clear the local session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Browse products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// List product categories
    Categories,
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order from the cart
    Checkout(commands::checkout::CheckoutArgs),
    /// View orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List products with optional filters
    List {
        /// Full-text search
        #[arg(short, long)]
        search: Option<String>,

        /// Filter by category id
        #[arg(short, long)]
        category: Option<String>,

        /// Page number
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Show one product by id or slug
    Show {
        /// Product id or slug
        key: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart contents
    Show,
    /// Add a product to the cart
    Add {
        /// Product id or slug
        product: String,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        qty: u32,
    },
    /// Set the quantity of a cart line
    SetQty {
        /// Cart line id
        line: String,

        /// New quantity (at least 1)
        qty: u32,
    },
    /// Remove a cart line
    Remove {
        /// Cart line id
        line: String,
    },
    /// Empty the cart
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum OrderAction {
    /// List your orders
    List {
        /// Page number
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Show one order
    Show {
        /// Order id
        id: String,
    },
    /// Cancel an order that has not shipped
    Cancel {
        /// Order id
        id: String,
    },
    /// Show shipment tracking
    Track {
        /// Order id
        id: String,
    },
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "buildhive=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::debug!("command failed: {e}");
        eprintln!("error: {}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> buildhive_storefront::error::Result<()> {
    let ctx = AppContext::init().await?;

    match cli.command {
        Commands::Login { email, password } => commands::session::login(&ctx, &email, &password).await,
        Commands::Register {
            name,
            email,
            password,
            phone,
        } => commands::session::register(&ctx, &name, &email, &password, phone.as_deref()).await,
        Commands::Logout => commands::session::logout(&ctx).await,
        Commands::Whoami => commands::session::whoami(&ctx),
        Commands::Products { action } => match action {
            ProductAction::List {
                search,
                category,
                page,
            } => commands::catalog::list_products(&ctx, search, category, page).await,
            ProductAction::Show { key } => commands::catalog::show_product(&ctx, &key).await,
        },
        Commands::Categories => commands::catalog::list_categories(&ctx).await,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx).await,
            CartAction::Add { product, qty } => commands::cart::add(&ctx, &product, qty).await,
            CartAction::SetQty { line, qty } => commands::cart::set_qty(&ctx, &line, qty).await,
            CartAction::Remove { line } => commands::cart::remove(&ctx, &line).await,
            CartAction::Clear { yes } => commands::cart::clear(&ctx, yes).await,
        },
        Commands::Checkout(args) => commands::checkout::place(&ctx, args).await,
        Commands::Orders { action } => match action {
            OrderAction::List { page } => commands::orders::list(&ctx, page).await,
            OrderAction::Show { id } => commands::orders::show(&ctx, &id).await,
            OrderAction::Cancel { id } => commands::orders::cancel(&ctx, &id).await,
            OrderAction::Track { id } => commands::orders::track(&ctx, &id).await,
        },
    }
}
