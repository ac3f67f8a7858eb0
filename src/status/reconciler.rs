//! Status reconciliation pipeline
//!
//! Runs strictly in order, each stage free to end the run:
//! 1. Lookup: earliest `create_orders` row for the address
//! 2. Derive window: `created_at` to epoch seconds (failure is recorded, not fatal)
//! 3. Confirm creation: `create_id` must appear in relay logs around `created_at`
//! 4. Settlement check: matching-engine state of both legs
//! 5. Report: narrative plus the six-flag summary

use super::report::{Outcome, StatusReport};
use super::timestamp::normalize_timestamp;
use super::StatusFlags;
use crate::config::LogSearchConfig;
use crate::logs::{contains_create_id, LogSearch, TimeWindow};
use crate::metrics;
use crate::orderbook::{MatchedOrderResult, MatchedOrders};
use crate::store::{OrderRecord, OrderStore};

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Knobs the pipeline needs from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerSettings {
    /// Half-width of the log window around `created_at`
    pub window_secs: i64,
    pub log_limit: u32,
}

impl Default for ReconcilerSettings {
    fn default() -> Self {
        Self {
            window_secs: 300,
            log_limit: 100,
        }
    }
}

impl From<&LogSearchConfig> for ReconcilerSettings {
    fn from(config: &LogSearchConfig) -> Self {
        Self {
            window_secs: config.window_secs,
            log_limit: config.limit,
        }
    }
}

/// Pipeline position
#[derive(Debug)]
enum Stage {
    Lookup,
    DeriveWindow(OrderRecord),
    ConfirmCreation { create_id: String, timestamp: i64 },
    SettlementCheck { create_id: String },
}

#[derive(Debug)]
enum Step {
    Continue(Stage),
    Terminal(Outcome),
}

/// Stack-local state of one run
struct Run<'a> {
    address: &'a str,
    sections: Vec<String>,
    flags: Option<StatusFlags>,
}

impl Run<'_> {
    fn push(&mut self, section: impl Into<String>) {
        self.sections.push(section.into());
    }
}

/// Correlates the order store, relay logs and matching engine into one report
pub struct StatusReconciler {
    store: Arc<dyn OrderStore>,
    logs: Arc<dyn LogSearch>,
    orderbook: Arc<dyn MatchedOrders>,
    settings: ReconcilerSettings,
}

impl StatusReconciler {
    pub fn new(
        store: Arc<dyn OrderStore>,
        logs: Arc<dyn LogSearch>,
        orderbook: Arc<dyn MatchedOrders>,
        settings: ReconcilerSettings,
    ) -> Self {
        Self {
            store,
            logs,
            orderbook,
            settings,
        }
    }

    /// Tool entry point: the rendered report for an initiator source address
    pub async fn transaction_status(&self, initiator_address: &str) -> String {
        self.reconcile(initiator_address).await.render()
    }

    /// Run the pipeline. Never fails; every failure ends up in the report.
    pub async fn reconcile(&self, initiator_address: &str) -> StatusReport {
        let started = Instant::now();
        info!("Reconciling status for initiator {}", initiator_address);

        let mut run = Run {
            address: initiator_address,
            sections: vec![format!(
                "Transaction status for initiator_source_address '{}':\n",
                initiator_address
            )],
            flags: None,
        };

        let mut stage = Stage::Lookup;
        let outcome = loop {
            debug!("Entering stage {:?}", stage);
            let step = match stage {
                Stage::Lookup => self.lookup(&mut run).await,
                Stage::DeriveWindow(record) => self.derive_window(&mut run, record),
                Stage::ConfirmCreation {
                    create_id,
                    timestamp,
                } => self.confirm_creation(&mut run, create_id, timestamp).await,
                Stage::SettlementCheck { create_id } => {
                    self.settlement_check(&mut run, create_id).await
                }
            };

            match step {
                Step::Continue(next) => stage = next,
                Step::Terminal(outcome) => break outcome,
            }
        };

        metrics::record_reconciliation(outcome, started.elapsed().as_secs_f64());
        info!(
            "Reconciliation for {} finished: {}",
            initiator_address,
            outcome.as_str()
        );

        StatusReport::new(run.sections, run.flags, outcome)
    }

    async fn lookup(&self, run: &mut Run<'_>) -> Step {
        match self.store.fetch_earliest_order(run.address).await {
            Ok(Some(record)) => {
                let mut section = String::from("Database results from create_orders:\n");
                for (name, value) in record.columns() {
                    section.push_str(&format!("{}: {}\n", name, value.unwrap_or("None")));
                }
                run.push(section);
                Step::Continue(Stage::DeriveWindow(record))
            }
            Ok(None) => {
                run.push(format!(
                    "No data found for initiator_source_address '{}' in create_orders.\n",
                    run.address
                ));
                Step::Terminal(Outcome::NotFound)
            }
            Err(e) => {
                warn!("Order store lookup failed: {}", e);
                metrics::record_external_failure("store", e.kind());
                run.push(format!("Database query error: {}\n", e));
                Step::Terminal(Outcome::StoreFailed)
            }
        }
    }

    fn derive_window(&self, run: &mut Run<'_>, record: OrderRecord) -> Step {
        let timestamp = record.created_at().and_then(|raw| match normalize_timestamp(raw) {
            Ok(ts) => Some(ts),
            Err(e) => {
                warn!("Could not parse created_at: {}", e);
                run.push(format!("Failed to parse timestamp '{}': {}\n", raw, e));
                None
            }
        });

        match (record.create_id(), timestamp) {
            (Some(create_id), Some(timestamp)) => Step::Continue(Stage::ConfirmCreation {
                create_id: create_id.to_string(),
                timestamp,
            }),
            _ => {
                debug!("No create_id or timestamp available, skipping log confirmation");
                Step::Terminal(Outcome::Incomplete)
            }
        }
    }

    async fn confirm_creation(&self, run: &mut Run<'_>, create_id: String, timestamp: i64) -> Step {
        let source = self.logs.source_name();
        let window = TimeWindow::around(timestamp, self.settings.window_secs);

        let batch = match self.logs.search_logs(window, self.settings.log_limit).await {
            Ok(batch) => batch,
            Err(e) => {
                warn!("Log search failed: {}", e);
                metrics::record_external_failure("logs", e.kind());
                run.push(format!("\nLogs from {}: Error fetching logs: {}\n", source, e));
                return Step::Terminal(Outcome::LogQueryFailed);
            }
        };

        let dump = if batch.is_empty() {
            "No logs found.".to_string()
        } else {
            batch.join("\n")
        };
        let log_section = format!(
            "Logs from {} (±{}s around {}):\n{}\n",
            source, self.settings.window_secs, timestamp, dump
        );

        if contains_create_id(&batch, &create_id) {
            info!("create_id {} confirmed in {} logs", create_id, source);
            run.push(format!(
                "\nOrder created successfully: create_id '{}' found in {} logs.\n",
                create_id, source
            ));
            run.push(log_section);
            Step::Continue(Stage::SettlementCheck { create_id })
        } else {
            info!("create_id {} not found in {} logs", create_id, source);
            run.push(format!(
                "\nOrder not confirmed: create_id '{}' not found in {} logs.\n",
                create_id, source
            ));
            run.push(log_section);
            Step::Terminal(Outcome::NotConfirmed)
        }
    }

    async fn settlement_check(&self, run: &mut Run<'_>, create_id: String) -> Step {
        let result = self.orderbook.fetch_matched_order(&create_id).await;

        let response = match &result {
            MatchedOrderResult::Matched { raw, .. } | MatchedOrderResult::Unmatched { raw, .. } => {
                raw.clone()
            }
            MatchedOrderResult::Failed(e) => {
                metrics::record_external_failure("orderbook", e.kind());
                format!("Error: {}", e)
            }
        };
        run.push(format!(
            "\nMatched order API response for create_id '{}':\n{}\n",
            create_id, response
        ));

        let flags = StatusFlags::derive(true, &result);

        if flags.matched {
            run.push(format!(
                "\nOrder matched successfully for create_id '{}'.\n",
                create_id
            ));
        }
        let milestones = [
            (flags.user_initiated, "User has initiated"),
            (flags.cobi_initiated, "Cobi has initiated"),
            (flags.user_redeemed, "User has redeemed"),
            (flags.cobi_redeemed, "Cobi has redeemed"),
        ];
        for (reached, what) in milestones {
            if reached {
                run.push(format!(
                    "{} the transaction for create_id '{}'.\n",
                    what, create_id
                ));
            }
        }

        run.flags = Some(flags);
        Step::Terminal(Outcome::Completed)
    }
}
