//! Creates the users database and its `users` table
//!
//! Reads `DATABASE_PATH` (default `users.db`). Safe to run more than once.

use agent_console::config::Config;
use agent_console::users::UserDb;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();
    let path = &config.persistence.database_path;
    println!("Setting up users database at {}...", path);

    match UserDb::new(path).await {
        Ok(_) => {
            println!("✓ Database '{}' ready with table 'users'.", path);
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Failed to set up database: {}", e);
            Err(e.into())
        }
    }
}
