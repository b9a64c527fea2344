use serde::{Deserialize, Serialize};

/// How much of the total price is held against the card at booking time.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct DepositPolicy {
    #[serde(default)]
    pub enabled: bool,
    /// Percentage of the total price, mutually exclusive with `fixed_amount`.
    pub percentage: Option<u32>,
    /// Fixed deposit in minor currency units.
    pub fixed_amount: Option<i64>,
    /// Floor in minor currency units.
    pub minimum_amount: Option<i64>,
}

/// One step of the cancellation schedule: cancelling at least
/// `days_before_booking` days ahead forfeits `charge_percentage` of the fee
/// base.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct CancellationTier {
    pub days_before_booking: i64,
    pub charge_percentage: u32,
}

/// Per-space-type policy configuration, read-only to this core.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SpacePolicy {
    #[serde(default)]
    pub deposit: DepositPolicy,
    #[serde(default)]
    pub cancellation_tiers: Vec<CancellationTier>,
}
