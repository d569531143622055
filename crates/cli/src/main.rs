//! eShop CLI - Basket inspection and development tools.
//!
//! # Usage
//!
//! ```bash
//! # Print a buyer's stored basket
//! eshop-cli basket show u1
//!
//! # Remove a buyer's basket
//! eshop-cli basket clear u1
//!
//! # Issue a development bearer token
//! eshop-cli token issue --sub u1 --ttl-secs 3600
//! ```
//!
//! # Commands
//!
//! - `basket show` / `basket clear` - Operate on the configured store directly
//! - `token issue` - Mint a token signed with `BASKET_JWT_SECRET`

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "eshop-cli")]
#[command(author, version, about = "eShop basket CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or remove stored baskets
    Basket {
        #[command(subcommand)]
        action: BasketAction,
    },
    /// Manage bearer tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand)]
enum BasketAction {
    /// Print a buyer's basket as JSON
    Show {
        /// Buyer id
        buyer: String,
    },
    /// Remove a buyer's basket
    Clear {
        /// Buyer id
        buyer: String,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Issue a bearer token for a buyer
    Issue {
        /// Subject (buyer id)
        #[arg(short, long)]
        sub: String,

        /// Lifetime in seconds
        #[arg(short, long, default_value_t = 3600)]
        ttl_secs: u64,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Basket { action } => match action {
            BasketAction::Show { buyer } => commands::basket::show(&buyer).await?,
            BasketAction::Clear { buyer } => commands::basket::clear(&buyer).await?,
        },
        Commands::Token { action } => match action {
            TokenAction::Issue { sub, ttl_secs } => commands::token::issue(&sub, ttl_secs)?,
        },
    }
    Ok(())
}
