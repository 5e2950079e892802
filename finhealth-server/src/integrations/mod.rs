//! Mock bank and payment-provider integrations.
//!
//! Stand-ins for real banking APIs: fixed summaries with the shape a real
//! integration would return. Each payload carries a note marking it as a
//! placeholder.

use serde::{Deserialize, Serialize};

/// Aggregate account summary from the mock bank integration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankAccountSummary {
    pub provider: String,
    pub accounts: u32,
    pub average_balance: f64,
    pub monthly_inflows: f64,
    pub monthly_outflows: f64,
    pub note: String,
}

/// Payment-rail summary from the mock payments integration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRailSummary {
    pub provider: String,
    pub upi_collections: f64,
    pub card_sales: f64,
    pub chargebacks: f64,
    pub note: String,
}

/// Summary from "MockBank A".
pub fn bank_a_summary() -> BankAccountSummary {
    BankAccountSummary {
        provider: "MockBank A".to_string(),
        accounts: 2,
        average_balance: 125_000.0,
        monthly_inflows: 420_000.0,
        monthly_outflows: 395_000.0,
        note: "Replace with real banking API integration".to_string(),
    }
}

/// Summary from "MockBank B".
pub fn bank_b_summary() -> PaymentRailSummary {
    PaymentRailSummary {
        provider: "MockBank B".to_string(),
        upi_collections: 180_000.0,
        card_sales: 95_000.0,
        chargebacks: 1_200.0,
        note: "Replace with real payment API integration".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_a_payload_shape() {
        let json = serde_json::to_value(bank_a_summary()).expect("serialize");
        assert_eq!(json["provider"], "MockBank A");
        assert_eq!(json["accounts"], 2);
        assert!(json["note"].as_str().unwrap().contains("Replace"));
    }

    #[test]
    fn test_bank_b_payload_shape() {
        let json = serde_json::to_value(bank_b_summary()).expect("serialize");
        assert_eq!(json["provider"], "MockBank B");
        assert_eq!(json["chargebacks"], 1200.0);
    }
}
