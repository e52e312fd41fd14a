use serde_derive::{Deserialize, Serialize};

/// A charge request against the processor. Amounts are integer cents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargeRequest {
    pub amount_cents: i64,
    pub currency: String,
    /// Customer being charged
    pub customer_id: String,
    /// Managed account receiving the funds
    pub destination_account_id: String,
}

/// Processor view of a completed (or attempted) charge.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Charge {
    pub id: String,
    pub status: String,
    pub amount: i64,
}

/// A tokenized card held by the processor; only the token and display data
/// ever reach this system.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Card {
    pub id: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub last4: String,
    #[serde(default)]
    pub exp_month: u32,
    #[serde(default)]
    pub exp_year: u32,
}
