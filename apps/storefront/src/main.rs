//! # Storefront CLI
//!
//! ## Usage
//! ```bash
//! # Place an order from a request file
//! storefront checkout request.json
//!
//! # Show an order and its line items
//! storefront order PQ-20241
//!
//! # Use a specific config file
//! storefront --config ./storefront.toml checkout request.json
//! ```
//!
//! Results are printed to stdout as JSON. Exit status is 0 for a placed or
//! found order, 2 for a rejected checkout, 1 for anything else.

use std::path::PathBuf;
use std::process::ExitCode;

use serde::Serialize;
use tracing::error;

use storefront_app::cli::{run_checkout_file, CheckoutFile};
use storefront_app::commands::checkout::get_order;
use storefront_app::state::StoreConfig;

enum Command {
    Checkout(PathBuf),
    Order(String),
}

fn print_usage() {
    println!("Storefront");
    println!();
    println!("Usage: storefront [OPTIONS] <COMMAND>");
    println!();
    println!("Commands:");
    println!("  checkout <REQUEST.json>   Place an order from a request file");
    println!("  order <ORDER_NUMBER>      Show an order and its line items");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>       Config file (default: platform config dir)");
    println!("  -h, --help                Show this help message");
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    storefront_app::init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<PathBuf> = None;
    let mut command: Option<Command> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                print_usage();
                return ExitCode::SUCCESS;
            }
            "checkout" if i + 1 < args.len() => {
                command = Some(Command::Checkout(PathBuf::from(&args[i + 1])));
                i += 1;
            }
            "order" if i + 1 < args.len() => {
                command = Some(Command::Order(args[i + 1].clone()));
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }

    let Some(command) = command else {
        print_usage();
        return ExitCode::from(1);
    };

    match run(config_path, command).await {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::from(1)
        }
    }
}

async fn run(
    config_path: Option<PathBuf>,
    command: Command,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = StoreConfig::load(config_path)?;
    let db = storefront_app::bootstrap(&config).await?;

    let code = match command {
        Command::Checkout(path) => {
            let contents = std::fs::read_to_string(&path)?;
            let file: CheckoutFile = serde_json::from_str(&contents)?;

            match run_checkout_file(&db, &config, file).await {
                Ok(response) => {
                    print_json(&response)?;
                    if response.is_confirmed() {
                        ExitCode::SUCCESS
                    } else {
                        ExitCode::from(2)
                    }
                }
                Err(api_error) => {
                    print_json(&api_error)?;
                    ExitCode::from(1)
                }
            }
        }
        Command::Order(order_number) => match get_order(&db, &order_number).await {
            Ok(details) => {
                print_json(&details)?;
                ExitCode::SUCCESS
            }
            Err(api_error) => {
                print_json(&api_error)?;
                ExitCode::from(1)
            }
        },
    };

    db.inner().close().await;
    Ok(code)
}
