//! # Storefront Application Library
//!
//! State, commands and startup for the storefront. The CLI in `main.rs`
//! is a thin shell around this library.
//!
//! ## Module Organization
//! ```text
//! storefront_app/
//! ├── lib.rs          ◄─── You are here (tracing, bootstrap)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports, Session
//! │   ├── db.rs       ◄─── Database + checkout service
//! │   ├── cart.rs     ◄─── Session cart
//! │   └── config.rs   ◄─── StoreConfig loading
//! ├── commands/
//! │   ├── cart.rs     ◄─── Cart manipulation
//! │   ├── wishlist.rs ◄─── Wishlist
//! │   └── checkout.rs ◄─── Checkout and order confirmation
//! ├── cli.rs          ◄─── JSON request files for the CLI
//! └── error.rs        ◄─── API error type for commands
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod state;

use tracing::info;
use tracing_subscriber::EnvFilter;

use state::{DbState, StoreConfig};
use storefront_db::{Database, DbConfig};

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=storefront=trace` - Show trace for the app only
/// - Default: INFO, DEBUG for the app
///
/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,storefront=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Opens the configured database and builds the database state.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Resolve Database Path ────────────────────────────────────────────► │
/// │     • database_path from config / STOREFRONT_DB_PATH                    │
/// │     • else the platform data directory                                  │
/// │                                                                         │
/// │  2. Connect to Database ──────────────────────────────────────────────► │
/// │     • SQLite with WAL mode, foreign keys on                             │
/// │     • Run pending migrations                                            │
/// │                                                                         │
/// │  3. Build DbState ────────────────────────────────────────────────────► │
/// │     • Checkout service bound to the configured order prefix             │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn bootstrap(config: &StoreConfig) -> Result<DbState, Box<dyn std::error::Error>> {
    let db_path = config.resolve_database_path()?;
    info!(?db_path, store = %config.store_name, "Database path determined");

    let db = Database::new(DbConfig::new(db_path)).await?;
    info!("Database connected and migrations applied");

    Ok(DbState::new(db, &config.order_prefix)?)
}
