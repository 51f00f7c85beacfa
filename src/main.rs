//! Canteen CLI
//!
//! Browse the menu and place orders against the configured backend.

use std::{
    io::{self, Write},
    process::ExitCode,
};

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tabled::{builder::Builder, settings::Style};
use tracing::error;
use tracing_subscriber::EnvFilter;

use canteen::{
    cart::Cart,
    catalog::{CatalogItem, Category, MenuItemId},
    config::ClientConfig,
    orders::BuyerId,
    receipt::CartReceipt,
    session::{Buyer, NotificationLevel, Session},
};

/// Canteen ordering client
#[derive(Debug, Parser)]
#[command(name = "canteen", about = "Canteen ordering client", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ClientConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the menu
    Menu {
        /// Only items whose name or description contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Only items in this category
        #[arg(short, long, value_enum)]
        category: Option<Category>,

        /// Only items currently being served
        #[arg(short, long)]
        available: bool,
    },

    /// Build a cart and check it out
    Order {
        /// Buyer identifier
        #[arg(short, long)]
        buyer: u64,

        /// Pickup time slot (e.g. "12:30-12:45")
        #[arg(short, long)]
        slot: String,

        /// Cart line as ID=QUANTITY, repeatable
        #[arg(short, long = "item", value_parser = parse_line, required = true)]
        items: Vec<(MenuItemId, i64)>,
    },
}

impl Cli {
    fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::load() {
        Ok(cli) => cli,
        Err(err) => err.exit(),
    };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&cli.config.log_level)),
        )
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");

            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.config;
    let cart = Cart::new().with_tax_rate(config.tax_rate);

    let mut session = Session::new(
        config.collaborators()?,
        cart,
        config.payment_method,
        config.currency,
    );

    let loaded = session.refresh_catalog().await;

    if loaded.level == NotificationLevel::Error {
        bail!(loaded.message);
    }

    let mut out = io::stdout().lock();

    match cli.command {
        Command::Menu {
            search,
            category,
            available,
        } => {
            let items = session
                .catalog()
                .search(search.as_deref().unwrap_or_default())
                .filter(|item| category.is_none_or(|category| item.category == category))
                .filter(|item| !available || item.available);

            write_menu(&mut out, items)?;
        }
        Command::Order { buyer, slot, items } => {
            session.sign_in(Buyer {
                id: BuyerId::new(buyer),
                name: format!("buyer {buyer}"),
            });

            for (item_id, quantity) in items {
                session.add_to_cart(item_id);
                session.cart_mut().set_quantity(item_id, quantity);
            }

            CartReceipt::from_totals(&session.totals())?.write_to(&mut out)?;

            let notification = session.checkout(&slot).await;

            writeln!(out, "\n{notification}")?;

            let Some(placed) = session.placed_orders().last() else {
                bail!("checkout did not complete");
            };

            writeln!(
                out,
                "Order {} ({}), transaction {}",
                placed.confirmation.order_id,
                placed.confirmation.status,
                placed.payment.transaction_id.as_deref().unwrap_or("-"),
            )?;
        }
    }

    Ok(())
}

fn write_menu<'a>(
    out: &mut impl Write,
    items: impl Iterator<Item = &'a CatalogItem>,
) -> io::Result<()> {
    let mut builder = Builder::default();

    builder.push_record(["ID", "Item", "Category", "Price", "Available"]);

    for item in items {
        builder.push_record([
            item.id.to_string(),
            item.name.clone(),
            item.category.to_string(),
            item.price.to_string(),
            if item.available { "yes" } else { "no" }.to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());

    writeln!(out, "{table}")
}

/// Parse an `ID=QUANTITY` cart line.
fn parse_line(s: &str) -> Result<(MenuItemId, i64), String> {
    let Some((id, quantity)) = s.split_once('=') else {
        return Err(format!("expected ID=QUANTITY, got: {s}"));
    };

    let id = id
        .trim()
        .parse::<u32>()
        .map_err(|err| format!("invalid item id in {s}: {err}"))?;

    let quantity = quantity
        .trim()
        .parse::<i64>()
        .map_err(|err| format!("invalid quantity in {s}: {err}"))?;

    Ok((MenuItemId::new(id), quantity))
}
