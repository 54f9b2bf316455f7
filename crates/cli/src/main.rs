//! Jhytermax CLI - shop, check out and administer the marketplace from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (password from `--password` or `JHYTERMAX_PASSWORD`)
//! JHYTERMAX_PASSWORD=secret jx auth login -u ada
//!
//! # Browse the catalog
//! jx products list
//!
//! # Place an order for two baskets of product 7 delivered to location 2
//! jx checkout --item 7:2 --location 2 --pay
//!
//! # Admin: move an order along
//! jx orders set-status 12 shipped
//! ```
//!
//! Credentials are kept in `JHYTERMAX_CREDENTIALS_PATH` between runs.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use jhytermax_core::{CategoryId, LocationId, OrderId, OrderStatus, ProductId, Role, StateId};
use jhytermax_storefront::session::FileStore;
use jhytermax_storefront::{AppState, StorefrontConfig};
use rust_decimal::Decimal;
use secrecy::SecretString;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

mod commands;

use commands::checkout::CartLine;

#[derive(Parser)]
#[command(name = "jx")]
#[command(author, version, about = "Jhytermax marketplace CLI")]
struct Cli {
    /// Override the REST API origin
    #[arg(long, global = true, env = "JHYTERMAX_API_BASE")]
    api_base: Option<Url>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in, sign up and inspect the session
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Browse and manage products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Browse and manage categories
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// List and manage orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Delivery states and locations
    Reference {
        #[command(subcommand)]
        action: ReferenceAction,
    },
    /// Start, verify and list payments
    Payments {
        #[command(subcommand)]
        action: PaymentAction,
    },
    /// Admin dashboard
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Fill a cart and place an order
    Checkout {
        /// Cart line as `<product_id>[:<quantity>]`; repeatable
        #[arg(short, long = "item", required = true)]
        items: Vec<CartLine>,

        /// Delivery location id
        #[arg(short, long)]
        location: Option<LocationId>,

        /// Street address for the courier
        #[arg(short, long)]
        address: Option<String>,

        /// Notes for the order
        #[arg(short, long)]
        notes: Option<String>,

        /// Start a payment for the new order
        #[arg(long)]
        pay: bool,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Sign in and store the credential pair
    Login {
        /// Username or email
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "JHYTERMAX_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "JHYTERMAX_PASSWORD", hide_env_values = true)]
        password: String,

        /// Account role (`buyer`, `admin`)
        #[arg(short, long, default_value = "buyer")]
        role: Role,
    },
    /// Forget the stored credential pair
    Logout,
    /// Show the signed-in profile
    Whoami,
}

#[derive(Subcommand)]
enum ProductAction {
    /// List the catalog
    List,
    /// Show one product
    Show { id: ProductId },
    /// Create a product (admin)
    Create {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        price: Decimal,

        #[arg(short, long)]
        quantity: u32,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        category: Option<CategoryId>,

        /// Image file to upload
        #[arg(short, long)]
        image: Option<PathBuf>,
    },
    /// Delete a product (admin)
    Delete { id: ProductId },
}

#[derive(Subcommand)]
enum CategoryAction {
    /// List categories
    List,
    /// Create a category (admin)
    Create { name: String },
    /// Rename a category (admin)
    Rename { id: CategoryId, name: String },
    /// Delete a category (admin)
    Delete { id: CategoryId },
}

#[derive(Subcommand)]
enum OrderAction {
    /// List your orders (every order for admins)
    List {
        #[arg(short, long)]
        status: Option<OrderStatus>,
    },
    /// Show one order with its items
    Show { id: OrderId },
    /// Change an order's status (admin)
    SetStatus { id: OrderId, status: OrderStatus },
}

#[derive(Subcommand)]
enum ReferenceAction {
    /// List delivery states
    States,
    /// List delivery locations
    Locations {
        #[arg(short, long)]
        state: Option<StateId>,
    },
}

#[derive(Subcommand)]
enum PaymentAction {
    /// Start a payment for an order
    Initiate {
        order: OrderId,

        #[arg(long)]
        phone: Option<String>,
    },
    /// Verify a payment by transaction reference
    Verify { tx_ref: String },
    /// List your payments
    List,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Catalog figures and low-stock products
    Summary,
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

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "jhytermax=info,jx=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = StorefrontConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);
    init_tracing();

    let mut config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };
    if let Some(api_base) = cli.api_base.clone() {
        config.api_base = api_base;
    }

    if let Err(e) = run(cli, config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(FileStore::new(&config.credentials_path));
    let state = AppState::new(config, store)?;

    match cli.command {
        Commands::Auth { action } => match action {
            AuthAction::Login { username, password } => {
                commands::auth::login(&state, &username, SecretString::from(password)).await?;
            }
            AuthAction::Register {
                username,
                email,
                password,
                role,
            } => {
                let password = SecretString::from(password);
                commands::auth::register(&state, username, &email, password, role).await?;
            }
            AuthAction::Logout => commands::auth::logout(&state)?,
            AuthAction::Whoami => commands::auth::whoami(&state).await?,
        },
        Commands::Products { action } => match action {
            ProductAction::List => commands::catalog::list_products(&state).await?,
            ProductAction::Show { id } => commands::catalog::show_product(&state, id).await?,
            ProductAction::Create {
                name,
                price,
                quantity,
                description,
                category,
                image,
            } => {
                let draft = commands::catalog::NewProduct {
                    name,
                    price,
                    quantity,
                    description,
                    category,
                    image,
                };
                commands::catalog::create_product(&state, draft).await?;
            }
            ProductAction::Delete { id } => commands::catalog::delete_product(&state, id).await?,
        },
        Commands::Categories { action } => match action {
            CategoryAction::List => commands::catalog::list_categories(&state).await?,
            CategoryAction::Create { name } => {
                commands::catalog::create_category(&state, &name).await?;
            }
            CategoryAction::Rename { id, name } => {
                commands::catalog::rename_category(&state, id, &name).await?;
            }
            CategoryAction::Delete { id } => {
                commands::catalog::delete_category(&state, id).await?;
            }
        },
        Commands::Orders { action } => match action {
            OrderAction::List { status } => commands::orders::list(&state, status).await?,
            OrderAction::Show { id } => commands::orders::show(&state, id).await?,
            OrderAction::SetStatus { id, status } => {
                commands::orders::set_status(&state, id, status).await?;
            }
        },
        Commands::Reference { action } => match action {
            ReferenceAction::States => commands::orders::states(&state).await?,
            ReferenceAction::Locations { state: state_id } => {
                commands::orders::locations(&state, state_id).await?;
            }
        },
        Commands::Payments { action } => match action {
            PaymentAction::Initiate { order, phone } => {
                commands::payments::initiate(&state, order, phone).await?;
            }
            PaymentAction::Verify { tx_ref } => commands::payments::verify(&state, &tx_ref).await?,
            PaymentAction::List => commands::payments::list(&state).await?,
        },
        Commands::Admin { action } => match action {
            AdminAction::Summary => commands::admin::summary(&state).await?,
        },
        Commands::Checkout {
            items,
            location,
            address,
            notes,
            pay,
        } => {
            let request = commands::checkout::CheckoutRequest {
                items,
                location,
                address,
                notes,
                pay,
            };
            commands::checkout::run(&state, request).await?;
        }
    }
    Ok(())
}
