//! Taiyuan CLI - browse the storefront catalog from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Root categories, or the whole forest
//! ty-cli categories
//! ty-cli categories --tree
//!
//! # One category with every product in its subtree, cheapest first
//! ty-cli category 64f1c0 --sort price-low
//!
//! # Filtered product listing
//! ty-cli products --search oolong --max-price 500 --transport post
//!
//! # Manage the persisted bearer token
//! ty-cli token set <TOKEN>
//! ty-cli token status
//! ```
//!
//! # Commands
//!
//! - `categories`, `category` - Category roots, forest and single subtrees
//! - `products`, `product`, `top` - Product listings and details
//! - `transports`, `carousels`, `settings` - Remaining catalog entities
//! - `token set|clear|status` - Bearer token management

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use taiyuan_core::{Price, TransportId};
use taiyuan_storefront::catalog::{ProductQuery, SortOrder};
use taiyuan_storefront::config::StorefrontConfig;
use taiyuan_storefront::{StorefrontError, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "ty-cli")]
#[command(author, version, about = "Taiyuan storefront catalog browser")]
struct Cli {
    /// Print raw JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List root categories
    Categories {
        /// Print the full category forest
        #[arg(long)]
        tree: bool,
    },
    /// Show one category and the products of its whole subtree
    Category {
        /// Category id
        id: String,

        #[command(flatten)]
        filter: FilterArgs,
    },
    /// List products
    Products {
        /// Only products in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Only featured products
        #[arg(long, conflicts_with = "category")]
        featured: bool,

        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Show one product
    Product {
        /// Product id
        id: String,
    },
    /// List best sellers
    Top,
    /// List transport methods
    Transports,
    /// List home page carousel slides
    Carousels,
    /// Show store settings
    Settings,
    /// Manage the persisted bearer token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Store a bearer token
    Set {
        /// Token value
        token: String,
    },
    /// Remove the stored token
    Clear,
    /// Report whether a token is stored
    Status,
}

/// Filters shared by product listings.
#[derive(Args)]
struct FilterArgs {
    /// Case-insensitive name search
    #[arg(short, long)]
    search: Option<String>,

    /// Lowest price to include
    #[arg(long)]
    min_price: Option<Decimal>,

    /// Highest price to include
    #[arg(long)]
    max_price: Option<Decimal>,

    /// Transport method id (repeatable; any match)
    #[arg(short, long = "transport")]
    transports: Vec<String>,

    /// Listing order (`featured`, `price-low`, `price-high`, `newest`)
    #[arg(long, default_value = "featured")]
    sort: SortOrder,

    /// Include inactive products
    #[arg(long)]
    include_inactive: bool,
}

impl FilterArgs {
    fn into_query(self) -> ProductQuery {
        let mut query = ProductQuery::new()
            .price_range(
                self.min_price.map(Price::new),
                self.max_price.map(Price::new),
            )
            .sort(self.sort);
        if let Some(term) = self.search {
            query = query.search(term);
        }
        for transport in self.transports {
            query = query.transport(TransportId::new(transport));
        }
        if self.include_inactive {
            query = query.include_inactive();
        }
        query
    }
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
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "taiyuan_storefront=info,taiyuan_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli, &config).await {
        error::report(&e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &StorefrontConfig) -> Result<(), StorefrontError> {
    let storefront = taiyuan_storefront::Storefront::from_config(config)?;

    if let Commands::Token { action } = &cli.command {
        let tokens =
            commands::token::Tokens::new(storefront.client().tokens(), &config.token_path);
        return match action {
            TokenAction::Set { token } => tokens.set(token.clone()),
            TokenAction::Clear => tokens.clear(),
            TokenAction::Status => {
                tokens.status();
                Ok(())
            }
        };
    }

    let catalog = commands::catalog::Catalog::new(storefront, cli.json);
    let result = match cli.command {
        Commands::Categories { tree } => catalog.categories(tree).await,
        Commands::Category { id, filter } => catalog.category(&id, &filter.into_query()).await,
        Commands::Products {
            category,
            featured,
            filter,
        } => {
            catalog
                .products(category.as_deref(), featured, &filter.into_query())
                .await
        }
        Commands::Product { id } => catalog.product(&id).await,
        Commands::Top => catalog.top().await,
        Commands::Transports => catalog.transports().await,
        Commands::Carousels => catalog.carousels().await,
        Commands::Settings => catalog.settings().await,
        Commands::Token { .. } => Ok(()),
    };

    catalog.warn_if_signed_out().await;
    result
}
