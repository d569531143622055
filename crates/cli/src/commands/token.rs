//! Development token commands.
//!
//! # Environment Variables
//!
//! - `BASKET_JWT_SECRET` - Shared HS256 secret
//! - `BASKET_JWT_ISSUER` / `BASKET_JWT_AUDIENCE` - Copied into the token

use std::time::Duration;

use eshop_basket::auth::TokenIssuer;
use eshop_basket::config::AuthConfig;
use eshop_core::BuyerId;

use super::CommandError;

/// Issue a token for `sub` valid for `ttl_secs` and print it.
///
/// # Errors
///
/// Returns `CommandError` if the secret is missing or weak, or the subject
/// is not a valid buyer id.
pub fn issue(sub: &str, ttl_secs: u64) -> Result<(), CommandError> {
    dotenvy::dotenv().ok();

    let buyer_id = BuyerId::parse(sub)?;
    let config = AuthConfig::from_env()?;

    let token = TokenIssuer::new(&config).issue(&buyer_id, Duration::from_secs(ttl_secs))?;
    tracing::info!("Issued token for {} (expires in {}s)", buyer_id, ttl_secs);

    #[allow(clippy::print_stdout)]
    {
        println!("{token}");
    }

    Ok(())
}
