//! Command line interface
//!
//! `checkout quote` prices a cart against a fixture set, `checkout place`
//! additionally stores the order in Postgres and `checkout token` builds cart
//! item tokens.

use std::{io, path::PathBuf, sync::Arc};

use clap::{Args, Parser, Subcommand};
use jiff::Timestamp;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    catalog::{
        models::{ProductId, PropertyPriceId, VariationId},
        token::{CartItemToken, TokenError},
    },
    checkout::{
        engine::CheckoutEngine,
        request::{CartLine, CheckoutRequest},
        views::OrderShortView,
    },
    database::{self, Db},
    errors::CheckoutError,
    fixtures::{Fixture, FixtureError},
    observability::LoggingConfig,
    orders::{OrderPlacement, PlaceOrderError, PgOrderStore},
    payments::PaymentMethodId,
    profiles::ProfileId,
    receipt::{Receipt, ReceiptError},
    shipping::models::TransportId,
};

/// Errors surfaced by a CLI command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Fixture set failed to load.
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    /// Token encoding failed.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Pricing failed.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// Placing the order failed.
    #[error(transparent)]
    PlaceOrder(#[from] PlaceOrderError),

    /// Database connection failed.
    #[error("failed to connect to database: {0}")]
    Database(#[from] sqlx::Error),

    /// Receipt rendering failed.
    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    /// JSON output failed.
    #[error("failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Output failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// Checkout pricing engine
#[derive(Debug, Parser)]
#[command(name = "checkout", about = "Checkout pricing engine", long_about = None)]
pub struct Cli {
    /// Logging settings
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Load arguments from the command line, after reading `.env` if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Price a cart and print the receipt
    Quote(QuoteArgs),

    /// Price a cart and store the order
    Place(PlaceArgs),

    /// Encode a cart item token
    Token(TokenArgs),
}

/// Where the store data comes from.
#[derive(Debug, Clone, Args)]
pub struct StoreArgs {
    /// Fixture directory
    #[arg(long, env = "CHECKOUT_FIXTURES", default_value = "./fixtures")]
    pub fixtures: PathBuf,

    /// Fixture set name
    #[arg(short = 's', long, env = "CHECKOUT_FIXTURE_SET", default_value = "demo")]
    pub set: String,
}

impl StoreArgs {
    /// Loads the fixture set and builds an engine over it.
    ///
    /// # Errors
    ///
    /// Returns an error if the fixture set cannot be loaded.
    pub fn engine(&self) -> Result<CheckoutEngine, FixtureError> {
        Fixture::from_set_in(&self.fixtures, &self.set)?.into_engine()
    }
}

/// The cart and choices to price.
#[derive(Debug, Clone, Args)]
pub struct RequestArgs {
    /// Cart line as `TOKEN[@CATEGORY][:QUANTITY]`
    #[arg(short, long = "item", value_name = "LINE")]
    pub items: Vec<CartLine>,

    /// Coupon code
    #[arg(short, long = "coupon", value_name = "CODE")]
    pub coupons: Vec<String>,

    /// Billing profile id
    #[arg(long)]
    pub billing: Option<ProfileId>,

    /// Shipping profile id
    #[arg(long)]
    pub shipping: Option<ProfileId>,

    /// Transport id; without one every delivery option is quoted
    #[arg(short, long)]
    pub transport: Option<TransportId>,

    /// Optional service of the chosen transport
    #[arg(long = "service", value_name = "NAME")]
    pub services: Vec<String>,

    /// Payment method id
    #[arg(long)]
    pub payment_id: Option<PaymentMethodId>,

    /// Payment method as `NAME[-SUFFIX]` or `NAME[:SUFFIX]`
    #[arg(short, long)]
    pub payment: Option<String>,

    /// Order comment
    #[arg(long)]
    pub comment: Option<String>,

    /// Price as of this instant instead of now
    #[arg(long, value_name = "TIMESTAMP")]
    pub at: Option<Timestamp>,
}

impl RequestArgs {
    /// The checkout request described by these arguments.
    pub fn request(&self) -> CheckoutRequest {
        CheckoutRequest {
            items: self.items.clone(),
            comment: self.comment.clone(),
            billing_profile: self.billing,
            shipping_profile: self.shipping,
            transport: self.transport,
            services: self.services.clone(),
            payment_id: self.payment_id,
            payment_method: self.payment.clone(),
            coupons: self.coupons.clone(),
        }
    }

    /// Pricing instant.
    pub fn now(&self) -> Timestamp {
        self.at.unwrap_or_else(Timestamp::now)
    }
}

/// Arguments of `checkout quote`.
#[derive(Debug, Clone, Args)]
pub struct QuoteArgs {
    /// Store data
    #[command(flatten)]
    pub store: StoreArgs,

    /// Cart and choices
    #[command(flatten)]
    pub request: RequestArgs,

    /// Print the order view as JSON instead of a receipt
    #[arg(long)]
    pub json: bool,
}

/// Arguments of `checkout place`.
#[derive(Debug, Clone, Args)]
pub struct PlaceArgs {
    /// Store data
    #[command(flatten)]
    pub store: StoreArgs,

    /// Cart and choices
    #[command(flatten)]
    pub request: RequestArgs,

    /// `PostgreSQL` connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,

    /// Customer the order belongs to
    #[arg(short, long)]
    pub user: Uuid,

    /// Print the order view as JSON instead of a receipt
    #[arg(long)]
    pub json: bool,
}

/// Arguments of `checkout token`.
#[derive(Debug, Clone, Args)]
pub struct TokenArgs {
    /// Product id
    pub product: ProductId,

    /// Variation id
    #[arg(short, long, default_value_t = 0)]
    pub variation: VariationId,

    /// Selected property price id
    #[arg(short, long = "property", value_name = "ID")]
    pub properties: Vec<PropertyPriceId>,
}

impl TokenArgs {
    /// The token described by these arguments.
    pub fn token(&self) -> CartItemToken {
        self.properties.iter().fold(
            CartItemToken::new(self.product).with_variation(self.variation),
            |token, &property| token.with_property(property),
        )
    }
}

impl Command {
    /// Runs the command, writing its output to `out`.
    ///
    /// # Errors
    ///
    /// Returns a [`CliError`] if loading, pricing, storing or writing fails.
    pub async fn run(&self, mut out: impl io::Write) -> Result<(), CliError> {
        match self {
            Command::Quote(args) => {
                let engine = args.store.engine()?;
                let view = engine
                    .quote(&args.request.request(), args.request.now())
                    .await?;

                write_view(&mut out, &view, args.json)
            }
            Command::Place(args) => {
                let engine = args.store.engine()?;
                let db = Db::new(database::connect(&args.database_url).await?);
                let placement = OrderPlacement::new(engine, Arc::new(PgOrderStore::new(db)));

                let checkout = placement
                    .place(&args.request.request(), args.user, args.request.now())
                    .await?;

                write_view(&mut out, &checkout.view, args.json)
            }
            Command::Token(args) => {
                writeln!(out, "{}", args.token().encode()?)?;

                Ok(())
            }
        }
    }
}

fn write_view(
    out: &mut impl io::Write,
    view: &OrderShortView,
    json: bool,
) -> Result<(), CliError> {
    if json {
        serde_json::to_writer_pretty(&mut *out, view)?;
        writeln!(out)?;
    } else {
        Receipt::new(view)?.write_to(out)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_quote_request() -> TestResult {
        let cli = Cli::try_parse_from([
            "checkout",
            "quote",
            "-i",
            "WzEsMF0@2:3",
            "-c",
            "TEN",
            "--shipping",
            "2",
            "-t",
            "1",
            "--service",
            "insurance",
            "-p",
            "advance-payment:ING",
            "--at",
            "2026-10-15T12:00:00Z",
            "--json",
        ])?;

        let Command::Quote(args) = cli.command else {
            return Err(io::Error::other(format!("expected quote, got {:?}", cli.command)).into());
        };

        let request = args.request.request();

        assert!(args.json, "expected --json to be set");
        assert_eq!(
            request.items,
            [CartLine::new("WzEsMF0").in_category(2).times(3)]
        );
        assert_eq!(request.coupons, ["TEN"]);
        assert_eq!(request.shipping_profile, Some(2));
        assert_eq!(request.transport, Some(1));
        assert_eq!(request.services, ["insurance"]);
        assert_eq!(request.payment_method.as_deref(), Some("advance-payment:ING"));
        assert_eq!(args.request.now(), "2026-10-15T12:00:00Z".parse::<Timestamp>()?);

        Ok(())
    }

    #[test]
    fn rejects_malformed_cart_line() {
        let result = Cli::try_parse_from(["checkout", "quote", "-i", "WzEsMF0:lots"]);

        assert!(result.is_err(), "expected an invalid quantity to be rejected");
    }

    #[tokio::test]
    async fn token_command_prints_encoded_token() -> TestResult {
        let cli = Cli::try_parse_from(["checkout", "token", "1", "-v", "11", "-p", "101"])?;
        let mut out = Vec::new();

        cli.command.run(&mut out).await?;

        let printed = String::from_utf8(out)?;
        let token = CartItemToken::decode(printed.trim())?;

        assert_eq!(token.product, 1);
        assert_eq!(token.variation, 11);
        assert_eq!(token.properties.as_slice(), [101]);

        Ok(())
    }

    #[tokio::test]
    async fn quote_command_prints_json_view() -> TestResult {
        let token = CartItemToken::new(3).encode()?;
        let cli = Cli::try_parse_from([
            "checkout",
            "quote",
            "-i",
            &format!("{token}:2"),
            "--at",
            "2026-10-15T12:00:00Z",
            "--json",
        ])?;

        let mut out = Vec::new();

        cli.command.run(&mut out).await?;

        let view: OrderShortView = serde_json::from_slice(&out)?;

        assert_eq!(view.totals.quantity, 2);
        assert_eq!(view.totals.total, rust_decimal::Decimal::from(60));

        Ok(())
    }

    #[tokio::test]
    async fn quote_command_prints_receipt() -> TestResult {
        let token = CartItemToken::new(1).encode()?;
        let cli = Cli::try_parse_from(["checkout", "quote", "-i", &token])?;
        let mut out = Vec::new();

        cli.command.run(&mut out).await?;

        let printed = String::from_utf8(out)?;

        assert!(printed.contains("Trail Runner"), "expected item title, got {printed}");

        Ok(())
    }
}
