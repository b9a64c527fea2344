use crate::domain::models::booking::{Booking, STATUS_PENDING};
use crate::domain::models::policy::SpacePolicy;
use chrono::{DateTime, NaiveTime, Utc};
use serde::Serialize;

/// What cancelling a booking right now would cost the customer.
#[derive(Debug, Serialize, Clone)]
pub struct CancellationAssessment {
    pub days_until_start: i64,
    pub charge_percentage: u32,
    /// Forfeited from the held deposit, minor units.
    pub fee_amount: i64,
    /// Returned to the customer, minor units.
    pub released_amount: i64,
    pub rationale: String,
}

/// Pure fee computation; policy lookup is the caller's responsibility.
///
/// The theoretical fee is a percentage of the *total price*, then clamped to
/// the held deposit: a forfeiture can never exceed what was actually
/// authorized. The asymmetry (fee base is the total, bound is the deposit)
/// matches the billing rules and must not be "fixed".
pub fn assess_cancellation(
    booking: &Booking,
    policy: &SpacePolicy,
    now: DateTime<Utc>,
) -> CancellationAssessment {
    let days_until_start = days_until_start(booking, now);

    // Nothing has been captured for a pending booking, so cancelling one is
    // always free. The tiers are not consulted.
    if booking.status == STATUS_PENDING {
        return CancellationAssessment {
            days_until_start,
            charge_percentage: 0,
            fee_amount: 0,
            released_amount: booking.deposit_amount,
            rationale: "No payment has been captured for this booking yet; cancellation is free of charge. Once confirmed, the deposit becomes subject to the cancellation schedule.".to_string(),
        };
    }

    let mut tiers = policy.cancellation_tiers.clone();
    tiers.sort_by(|a, b| b.days_before_booking.cmp(&a.days_before_booking));

    // First tier (most days out first) the booking still qualifies for.
    // Incomplete policy data defaults to a full charge.
    let charge_percentage = tiers
        .iter()
        .find(|tier| tier.days_before_booking <= days_until_start)
        .map(|tier| tier.charge_percentage)
        .unwrap_or(100);

    let theoretical_fee = booking.total_price * i64::from(charge_percentage) / 100;
    let fee_amount = theoretical_fee.min(booking.deposit_amount);
    let released_amount = booking.deposit_amount - fee_amount;

    let rationale = format!(
        "Cancelling {} day(s) before the booking start forfeits {}% of the booking total, bounded by the held deposit: {} charged, {} released.",
        days_until_start,
        charge_percentage,
        format_amount(fee_amount),
        format_amount(released_amount),
    );

    CancellationAssessment {
        days_until_start,
        charge_percentage,
        fee_amount,
        released_amount,
        rationale,
    }
}

fn days_until_start(booking: &Booking, now: DateTime<Utc>) -> i64 {
    let start_of_day = NaiveTime::from_hms_opt(0, 0, 0).unwrap();
    let start = booking
        .date
        .and_time(booking.start_time.unwrap_or(start_of_day))
        .and_utc();

    // Ceiling division; any fraction of a day counts as a full day out.
    let seconds = (start - now).num_seconds();
    if seconds % 86_400 > 0 {
        seconds / 86_400 + 1
    } else {
        seconds / 86_400
    }
}

/// Minor units → `"50.00"`.
pub fn format_amount(minor: i64) -> String {
    format!("{}.{:02}", minor / 100, (minor % 100).abs())
}
