//! Basket store commands.
//!
//! These talk to the cache named by `BASKET_STORE_URL` directly, bypassing
//! the HTTP API. With the default `memory://` store every invocation starts
//! empty, so they are only useful against Redis.
//!
//! # Environment Variables
//!
//! - `BASKET_STORE_URL` - `redis://...` or `rediss://...`

use eshop_basket::config::StoreConfig;
use eshop_basket::store::{BasketStore, CacheBackend};
use eshop_core::BuyerId;

use super::CommandError;

async fn open_store() -> Result<BasketStore<CacheBackend>, CommandError> {
    dotenvy::dotenv().ok();

    let config = StoreConfig::from_env()?;
    if config.is_memory() {
        tracing::warn!("BASKET_STORE_URL is memory://, results will always be empty");
    }

    tracing::info!("Connecting to basket store...");
    let cache = CacheBackend::from_url(&config.url).await?;
    Ok(BasketStore::new(cache))
}

/// Print the buyer's basket as JSON, or "no basket" if none is stored.
///
/// # Errors
///
/// Returns `CommandError` if the buyer id is invalid or the store fails.
pub async fn show(buyer: &str) -> Result<(), CommandError> {
    let buyer_id = BuyerId::parse(buyer)?;
    let store = open_store().await?;

    let rendered = match store.get(&buyer_id).await? {
        Some(basket) => serde_json::to_string_pretty(&basket)?,
        None => "no basket".to_string(),
    };

    #[allow(clippy::print_stdout)]
    {
        println!("{rendered}");
    }

    Ok(())
}

/// Remove the buyer's basket.
///
/// # Errors
///
/// Returns `CommandError` if the buyer id is invalid or the store fails.
pub async fn clear(buyer: &str) -> Result<(), CommandError> {
    let buyer_id = BuyerId::parse(buyer)?;
    let store = open_store().await?;

    let existed = store.delete(&buyer_id).await?;
    tracing::info!(existed, "Basket clear for {} complete", buyer_id);

    #[allow(clippy::print_stdout)]
    {
        if existed {
            println!("removed basket for {buyer_id}");
        } else {
            println!("no basket for {buyer_id}");
        }
    }

    Ok(())
}
