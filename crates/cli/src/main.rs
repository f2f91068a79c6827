//! Laceup CLI - Cart operations from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Add one unit of product 3 to the cart
//! laceup add 3
//!
//! # Set the quantity of product 3 to 5
//! laceup update 3 5
//!
//! # Remove product 3 entirely
//! laceup remove 3
//!
//! # Print the cart
//! laceup show
//!
//! # Empty the persisted cart
//! laceup clear
//! ```
//!
//! # Environment Variables
//!
//! - `LACEUP_API_BASE_URL` - Base URL of the shop API (required)
//! - `LACEUP_API_TIMEOUT_SECS`, `LACEUP_CART_FILE`, `LACEUP_CART_KEY` - see
//!   the `laceup-cart` config module

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "laceup")]
#[command(author, version, about = "Laceup cart CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add one unit of a product to the cart
    Add {
        /// Product id
        product_id: i64,
    },
    /// Remove a product from the cart entirely
    Remove {
        /// Product id
        product_id: i64,
    },
    /// Set the quantity of a product already in the cart
    Update {
        /// Product id
        product_id: i64,
        /// New quantity; values of zero or less leave the cart unchanged
        amount: i64,
    },
    /// Print the cart
    Show,
    /// Empty the persisted cart
    Clear,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::cart::CartCliError> {
    match cli.command {
        Commands::Add { product_id } => commands::cart::add(product_id).await?,
        Commands::Remove { product_id } => commands::cart::remove(product_id)?,
        Commands::Update { product_id, amount } => {
            commands::cart::update(product_id, amount).await?;
        }
        Commands::Show => commands::cart::show()?,
        Commands::Clear => commands::cart::clear()?,
    }
    Ok(())
}
