//! Six-flag settlement summary

use crate::orderbook::MatchedOrderResult;

/// Progress of a swap as far as the reconciler could confirm it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusFlags {
    pub created: bool,
    pub matched: bool,
    pub user_initiated: bool,
    pub cobi_initiated: bool,
    pub user_redeemed: bool,
    pub cobi_redeemed: bool,
}

impl StatusFlags {
    /// Flags for a confirmed order, settlement state taken from the matching engine.
    /// Each flag is derived independently: a missing leg only suppresses its own two.
    pub fn derive(created: bool, matched_order: &MatchedOrderResult) -> Self {
        let mut flags = StatusFlags {
            created,
            ..Default::default()
        };

        let Some(order) = matched_order.order() else {
            return flags;
        };

        flags.matched = order.has_any_leg();

        if let Some(leg) = &order.source_swap {
            flags.user_initiated = leg.is_initiated();
            flags.user_redeemed = leg.is_redeemed();
        }

        if let Some(leg) = &order.destination_swap {
            flags.cobi_initiated = leg.is_initiated();
            flags.cobi_redeemed = leg.is_redeemed();
        }

        flags
    }

    /// Labelled flags in report order
    pub fn entries(&self) -> [(&'static str, bool); 6] {
        [
            ("Order Created", self.created),
            ("Order Matched", self.matched),
            ("User Initiated", self.user_initiated),
            ("Cobi Initiated", self.cobi_initiated),
            ("User Redeemed", self.user_redeemed),
            ("Cobi Redeemed", self.cobi_redeemed),
        ]
    }

    pub fn all_set(&self) -> bool {
        self.entries().iter().all(|(_, set)| *set)
    }

    /// `Final Transaction Status Summary` block
    pub fn summary(&self) -> String {
        let mut summary = String::from("\nFinal Transaction Status Summary:\n");
        for (label, set) in self.entries() {
            summary.push_str(&format!("- {}: {}\n", label, if set { "Yes" } else { "No" }));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MatchedOrderError;
    use crate::orderbook::{MatchedOrderResponse, MatchedOrderResult};

    fn from_body(body: &str) -> MatchedOrderResult {
        let response: MatchedOrderResponse = serde_json::from_str(body).unwrap();
        MatchedOrderResult::from_response(response, body.to_string())
    }

    #[test]
    fn test_empty_ok_result_not_matched() {
        let flags = StatusFlags::derive(true, &from_body(r#"{"status":"Ok","result":{}}"#));
        assert_eq!(
            flags,
            StatusFlags {
                created: true,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_empty_leg_object_not_matched() {
        let flags = StatusFlags::derive(
            true,
            &from_body(r#"{"status":"Ok","result":{"source_swap":{}}}"#),
        );
        assert!(!flags.matched);
        assert!(!flags.user_initiated);
        assert!(!flags.user_redeemed);
    }

    #[test]
    fn test_non_ok_status_not_matched() {
        let flags = StatusFlags::derive(
            true,
            &from_body(r#"{"status":"Pending","result":{"source_swap":{"redeem_tx_hash":"0x1"}}}"#),
        );
        assert!(!flags.matched);
        assert!(!flags.user_redeemed);
    }

    #[test]
    fn test_missing_leg_only_suppresses_its_own_flags() {
        let flags = StatusFlags::derive(
            true,
            &from_body(
                r#"{"status":"Ok","result":{"destination_swap":{"initiate_tx_hash":"0xd","redeem_tx_hash":"0xe","current_confirmations":6,"required_confirmations":6}}}"#,
            ),
        );
        assert!(flags.matched);
        assert!(!flags.user_initiated);
        assert!(!flags.user_redeemed);
        assert!(flags.cobi_initiated);
        assert!(flags.cobi_redeemed);
    }

    #[test]
    fn test_insufficient_confirmations() {
        let flags = StatusFlags::derive(
            true,
            &from_body(
                r#"{"status":"Ok","result":{"source_swap":{"initiate_tx_hash":"0xa","current_confirmations":0,"required_confirmations":1}}}"#,
            ),
        );
        assert!(flags.matched);
        assert!(!flags.user_initiated);
    }

    #[test]
    fn test_redeem_without_initiate() {
        let flags = StatusFlags::derive(
            true,
            &from_body(r#"{"status":"Ok","result":{"source_swap":{"redeem_tx_hash":"0xr"}}}"#),
        );
        assert!(!flags.user_initiated);
        assert!(flags.user_redeemed);
    }

    #[test]
    fn test_failed_lookup_keeps_created() {
        let failed = MatchedOrderResult::Failed(MatchedOrderError::Status {
            create_id: "abc".to_string(),
            status: 500,
        });
        let flags = StatusFlags::derive(true, &failed);
        assert!(flags.created);
        assert!(!flags.matched);
    }

    #[test]
    fn test_summary_order_and_format() {
        let flags = StatusFlags {
            created: true,
            user_initiated: true,
            ..Default::default()
        };
        assert_eq!(
            flags.summary(),
            "\nFinal Transaction Status Summary:\n\
             - Order Created: Yes\n\
             - Order Matched: No\n\
             - User Initiated: Yes\n\
             - Cobi Initiated: No\n\
             - User Redeemed: No\n\
             - Cobi Redeemed: No\n"
        );
    }
}
