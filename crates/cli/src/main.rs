//! RocketShoes CLI - Drive the storefront cart from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! rocketshoes list
//!
//! # Add one unit of product 1
//! rocketshoes add 1
//!
//! # Set product 1 to three units
//! rocketshoes update 1 3
//!
//! # Remove product 1
//! rocketshoes remove 1
//! ```
//!
//! Configuration is read from the environment (and `.env`); see
//! `rocket_shoes_cart::config` for the variables.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rocket_shoes_cart::CartConfig;
use rocket_shoes_core::ProductId;

mod commands;

#[derive(Parser)]
#[command(name = "rocketshoes")]
#[command(author, version, about = "RocketShoes cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart
    List,
    /// Add one unit of a product
    Add {
        /// Product ID
        product_id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        product_id: ProductId,
    },
    /// Set the quantity of a product already in the cart
    Update {
        /// Product ID
        product_id: ProductId,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
}

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rocket_shoes_cart=info,rocket_shoes_cli=info".into());

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = CartConfig::from_env()?;
    let session = commands::cart::Session::open(&config)?;

    match cli.command {
        Commands::List => session.list(),
        Commands::Add { product_id } => session.add(product_id).await,
        Commands::Remove { product_id } => session.remove(product_id).await,
        Commands::Update { product_id, amount } => session.update(product_id, amount).await,
    }
    Ok(())
}
