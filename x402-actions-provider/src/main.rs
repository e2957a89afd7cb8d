//! Command line for the x402 agent actions.
//!
//! # Usage
//!
//! ```bash
//! # List services on the configured wallet network
//! cargo run -p x402-actions-provider -- discover --max-usdc-price 0.1
//!
//! # Request a service, then pay one of the surfaced options
//! cargo run -p x402-actions-provider -- request https://api.example.com/weather
//! cargo run -p x402-actions-provider -- pay https://api.example.com/weather \
//!     --option '{"scheme":"exact","network":"base-sepolia",...}'
//!
//! # Configure logging level
//! RUST_LOG=debug cargo run -p x402-actions-provider -- services
//! ```
//!
//! # Environment Variables
//!
//! - `X402_CONFIG` - Path to TOML configuration file (default: `x402.toml`)
//! - `RUST_LOG` - Log level filter (default: `info`)
//!
//! A `.env` file in the working directory is loaded first.

use std::collections::BTreeMap;
use std::io::Write;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;
use x402_actions::facilitators::DEFAULT_FACILITATOR;
use x402_actions_http::HttpMethod;
use x402_actions_provider::provider::{
    DISCOVER_X402_SERVICES, LIST_REGISTERED_FACILITATORS, LIST_REGISTERED_SERVICES,
    MAKE_HTTP_REQUEST, MAKE_HTTP_REQUEST_WITH_X402, REGISTER_X402_SERVICE,
    RETRY_HTTP_REQUEST_WITH_X402,
};
use x402_actions_provider::{ActionProvider, AgentConfig, X402ActionProvider};

#[derive(Parser, Debug)]
#[command(name = "x402-agent")]
#[command(about = "Discover, call and pay x402 services")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, short, env = "X402_CONFIG", default_value = "x402.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the action definitions.
    Actions,
    /// Discover services payable from the wallet network.
    Discover {
        /// Facilitator to query.
        #[arg(long, default_value = DEFAULT_FACILITATOR)]
        facilitator: String,
        /// Price ceiling in whole USDC.
        #[arg(long, default_value = "1")]
        max_usdc_price: Decimal,
        /// Protocol versions to keep.
        #[arg(long = "x402-version", default_values_t = [1u8, 2])]
        x402_versions: Vec<u8>,
        /// Keep services whose description or URL contains this.
        #[arg(long)]
        keyword: Option<String>,
    },
    /// Request a URL without paying.
    Request(RequestArgs),
    /// Retry a request, paying the given option.
    Pay {
        #[command(flatten)]
        request: RequestArgs,
        /// Payment option JSON, exactly as returned by `request`.
        #[arg(long)]
        option: String,
    },
    /// Request a URL and pay automatically if required.
    Fetch(RequestArgs),
    /// Allow a service URL.
    Register {
        /// Service URL or prefix.
        url: String,
    },
    /// List allowed services.
    Services,
    /// List facilitators.
    Facilitators,
}

#[derive(Args, Debug)]
struct RequestArgs {
    /// Endpoint URL.
    url: String,
    /// HTTP method.
    #[arg(long, short = 'X', default_value = "GET", value_parser = parse_method)]
    method: HttpMethod,
    /// Header as `name=value`; repeatable.
    #[arg(long = "header", short = 'H', value_parser = parse_pair)]
    headers: Vec<(String, String)>,
    /// Query parameter as `name=value`; repeatable.
    #[arg(long = "query", short = 'q', value_parser = parse_pair)]
    query_params: Vec<(String, String)>,
    /// JSON request body.
    #[arg(long, short = 'd')]
    body: Option<String>,
}

impl RequestArgs {
    fn to_json(&self) -> Result<Value, serde_json::Error> {
        let mut args = json!({"url": self.url, "method": self.method});
        if !self.headers.is_empty() {
            args["headers"] = json!(self.headers.iter().cloned().collect::<BTreeMap<_, _>>());
        }
        if !self.query_params.is_empty() {
            args["query_params"] =
                json!(self.query_params.iter().cloned().collect::<BTreeMap<_, _>>());
        }
        if let Some(body) = &self.body {
            args["body"] = serde_json::from_str(body)?;
        }
        Ok(args)
    }
}

fn parse_method(raw: &str) -> Result<HttpMethod, String> {
    serde_json::from_value(json!(raw.to_ascii_uppercase()))
        .map_err(|_| format!("unsupported method {raw}"))
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_owned(), v.trim().to_owned()))
        .ok_or_else(|| format!("expected name=value, got {raw}"))
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run(Cli::parse()).await {
        tracing::error!("x402-agent failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = AgentConfig::load_from(&cli.config)?;
    tracing::debug!(
        network = %config.network,
        services = config.x402.registered_services.len(),
        "Loaded configuration"
    );

    let mut provider = X402ActionProvider::new(config.x402.clone())?;

    let (action, args) = match cli.command {
        Command::Actions => {
            return print(&serde_json::to_string_pretty(&provider.actions())?);
        }
        Command::Discover {
            facilitator,
            max_usdc_price,
            x402_versions,
            keyword,
        } => (
            DISCOVER_X402_SERVICES,
            json!({
                "facilitator": facilitator,
                "max_usdc_price": max_usdc_price,
                "x402_versions": x402_versions,
                "keyword": keyword,
            }),
        ),
        Command::Request(request) => (MAKE_HTTP_REQUEST, request.to_json()?),
        Command::Pay { request, option } => {
            let mut args = request.to_json()?;
            args["selected_payment_option"] = serde_json::from_str(&option)?;
            (RETRY_HTTP_REQUEST_WITH_X402, args)
        }
        Command::Fetch(request) => (MAKE_HTTP_REQUEST_WITH_X402, request.to_json()?),
        Command::Register { url } => (REGISTER_X402_SERVICE, json!({"url": url})),
        Command::Services => (LIST_REGISTERED_SERVICES, Value::Null),
        Command::Facilitators => (LIST_REGISTERED_FACILITATORS, Value::Null),
    };

    let wallet = config.wallet()?;
    if !provider.supports_network(&wallet.network()) {
        tracing::warn!(network = %config.network, "Network is not supported by the x402 actions");
    }
    tracing::info!(action, address = %wallet.address(), "Running action");
    let output = provider.invoke(wallet.as_ref(), action, args).await?;
    print(&output)
}

fn print(output: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{output}")?;
    Ok(())
}
