//! Marketa CLI - cart and checkout from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! marketa cart show
//!
//! # Add one unit of product 5, then take it out again
//! marketa cart add 5
//! marketa cart decrease 5
//!
//! # Set line 100 to three units (zero or less removes it)
//! marketa cart set 100 3
//!
//! # Pay for the cart
//! marketa checkout
//! ```
//!
//! # Environment Variables
//!
//! - `MARKETA_API_URL` - Base URL of the storefront API (required)
//! - `MARKETA_API_TOKEN` - Bearer token; without it checkout asks you to sign in
//! - `SENTRY_DSN` - Error tracking (optional)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use marketa_core::{LineId, ProductId};
use marketa_storefront::config::StorefrontConfig;
use marketa_storefront::error::{AppError, Result};
use marketa_storefront::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod console;

#[derive(Parser)]
#[command(name = "marketa")]
#[command(author, version, about = "Marketa storefront cart and checkout")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Pay for the cart and wait for the payment to be confirmed
    Checkout,
}

#[derive(Subcommand)]
enum CartAction {
    /// List cart lines and the total
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        product: ProductId,
    },
    /// Take one unit of a product out of the cart
    Decrease {
        /// Product ID
        product: ProductId,
    },
    /// Set the quantity of a line; zero or less removes it
    Set {
        /// Cart line ID
        line: LineId,
        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove {
        /// Cart line ID
        line: LineId,
    },
    /// Remove the line holding a product
    RemoveProduct {
        /// Product ID
        product: ProductId,
    },
    /// Empty the cart
    Clear,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            console::print_error(&AppError::from(e));
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "marketa_storefront=info,marketa_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, config).await {
        e.capture();
        tracing::debug!(error = %e, "Command failed");
        console::print_error(&e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<()> {
    let state = AppState::connect(config, Arc::new(console::ConsoleNotifier)).await?;

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(state.cart()),
            CartAction::Add { product } => commands::cart::add(&state, product).await?,
            CartAction::Decrease { product } => {
                state.cart().decrease_quantity(product).await?;
                commands::cart::show(state.cart());
            }
            CartAction::Set { line, quantity } => {
                state.cart().update_quantity(line, quantity).await?;
                commands::cart::show(state.cart());
            }
            CartAction::Remove { line } => {
                state.cart().remove_item_by_id(line).await?;
                commands::cart::show(state.cart());
            }
            CartAction::RemoveProduct { product } => {
                state.cart().remove_item_by_product(product).await?;
                commands::cart::show(state.cart());
            }
            CartAction::Clear => {
                state.cart().clear_cart().await?;
                commands::cart::show(state.cart());
            }
        },
        Commands::Checkout => commands::checkout::run(&state).await?,
    }
    Ok(())
}
