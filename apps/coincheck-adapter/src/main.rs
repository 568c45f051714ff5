//! Coincheck Adapter Probe
//!
//! Connects to Coincheck with the configured credentials and exercises the
//! read-only gateway operations: capabilities, fee, ticker, portfolio and
//! the latest trades. Prints a JSON summary.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin coincheck-adapter
//! ```
//!
//! # Environment Variables
//!
//! - `COINCHECK_ADAPTER_CONFIG`: Config file path (default: config.yaml)
//! - `RUST_LOG`: Log filter (overrides `observability.logging.level`)

use std::sync::Arc;

use anyhow::Context;
use coincheck_adapter::config::load_config;
use coincheck_adapter::infrastructure::observability::{MetricsConfig, init_metrics, init_tracing};
use coincheck_adapter::{CoincheckHttpClient, ExchangePort, OrderGateway, TradeQuery};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let path = std::env::var("COINCHECK_ADAPTER_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());
    let config = load_config(Some(&path)).with_context(|| format!("loading {path}"))?;

    init_tracing(&config.observability.logging)?;

    if let Some(addr) = config.observability.metrics_addr {
        init_metrics(&MetricsConfig::with_addr(addr))?;
    }

    let client = CoincheckHttpClient::new(&config.venue.to_client_config())?;
    let gateway = Arc::new(OrderGateway::new(client, config.gateway.to_gateway_config()));

    let capabilities = gateway.capabilities();
    tracing::info!(
        venue = capabilities.name,
        fee = %gateway.fee(),
        pair = %gateway.config().pair,
        trade_page_size = gateway.config().trade_page_size,
        base_url = %config.venue.base_url,
        "Coincheck adapter started"
    );

    let ticker = gateway.ticker().await?;
    let portfolio = gateway.portfolio().await?;
    let trades = gateway.trades(TradeQuery::latest()).await?;

    tracing::info!(
        bid = %ticker.bid,
        ask = %ticker.ask,
        assets = portfolio.len(),
        trades = trades.len(),
        "Probe complete"
    );

    let summary = serde_json::json!({
        "capabilities": capabilities,
        "fee": gateway.fee(),
        "ticker": ticker,
        "portfolio": portfolio,
        "latest_trade": trades.last(),
        "trade_count": trades.len(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}

/// Load `.env` from the working directory or the nearest ancestor that has one.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}
