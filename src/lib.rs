//! Swap status reconciliation
//!
//! Answers "what happened to the swap started by address X?" by correlating
//! the `create_orders` table, the relay's log stream and the matching
//! engine's settlement view into one report.

pub mod api;
pub mod config;
pub mod error;
pub mod logs;
pub mod metrics;
pub mod orderbook;
pub mod status;
pub mod store;
pub mod tool;

pub use config::Settings;
pub use status::{StatusFlags, StatusReconciler, StatusReport};

use logs::LokiClient;
use orderbook::OrderbookClient;
use status::ReconcilerSettings;
use store::PgOrderStore;

use anyhow::{Context, Result};
use std::sync::Arc;

/// Wire the production clients from configuration
pub fn build_reconciler(settings: &Settings) -> Result<StatusReconciler> {
    let store = PgOrderStore::new(&settings.database).context("Invalid database configuration")?;
    let logs = LokiClient::new(&settings.log_search).context("Failed to build log search client")?;
    let orderbook =
        OrderbookClient::new(&settings.matched_orders).context("Failed to build orderbook client")?;

    Ok(StatusReconciler::new(
        Arc::new(store),
        Arc::new(logs),
        Arc::new(orderbook),
        ReconcilerSettings::from(&settings.log_search),
    ))
}
