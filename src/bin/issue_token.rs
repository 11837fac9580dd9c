//! Issue an API token for a user
//!
//! Tokens are provisioned out of band rather than through the HTTP API.
//! Points at the same config.yml (and INKPRESS_* overrides) as the server.

use anyhow::Result;
use std::path::Path;

use inkpress::config::Config;
use inkpress::db::{self, repositories::SqlxTokenRepository, repositories::TokenRepository};

#[tokio::main]
async fn main() -> Result<()> {
    let user_id = std::env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --bin issue-token <USER_ID>");
        std::process::exit(1);
    });

    let config = Config::load_with_env(Path::new("config.yml"))?;
    let pool = db::create_pool(&config.database).await?;
    db::migrations::run_migrations(&pool).await?;

    let token = uuid::Uuid::new_v4().simple().to_string();
    let repo = SqlxTokenRepository::new(pool);
    repo.insert(&token, &user_id).await?;

    println!("\nUser  : {}", user_id);
    println!("Token : {}\n", token);
    println!("# Send it as:");
    println!("Authorization: Bearer {}", token);

    Ok(())
}
