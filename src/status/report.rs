//! Accumulated reconciliation narrative

use super::StatusFlags;

/// Where a reconciliation run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No `create_orders` row for the address
    NotFound,
    /// Order store unreachable or query failed
    StoreFailed,
    /// Row found but without a usable `create_id` or `created_at`
    Incomplete,
    /// Relay logs in the window never mention the order
    NotConfirmed,
    /// Relay log search failed
    LogQueryFailed,
    /// Settlement checked and summarised
    Completed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::NotFound => "not_found",
            Outcome::StoreFailed => "store_failed",
            Outcome::Incomplete => "incomplete",
            Outcome::NotConfirmed => "not_confirmed",
            Outcome::LogQueryFailed => "log_query_failed",
            Outcome::Completed => "completed",
        }
    }
}

/// Report sections in the order they were produced
#[derive(Debug, Clone)]
pub struct StatusReport {
    sections: Vec<String>,
    flags: Option<StatusFlags>,
    outcome: Outcome,
}

impl StatusReport {
    pub(crate) fn new(sections: Vec<String>, flags: Option<StatusFlags>, outcome: Outcome) -> Self {
        Self {
            sections,
            flags,
            outcome,
        }
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Present only when the settlement check ran
    pub fn flags(&self) -> Option<StatusFlags> {
        self.flags
    }

    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    pub fn render(&self) -> String {
        let mut out: String = self.sections.concat();
        if let Some(flags) = &self.flags {
            out.push_str(&flags.summary());
        }
        out
    }
}

impl std::fmt::Display for StatusReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}
