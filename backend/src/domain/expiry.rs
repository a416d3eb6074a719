//! Expiry calculation and coverage status derivation.
//!
//! Coverage ends either a fixed number of calendar months after the purchase
//! date, or on an explicit customer-supplied date. Month arithmetic follows
//! chrono's calendar rules: adding a month to a month-end date clamps to the
//! last valid day of the target month (2025-01-31 + 1 month = 2025-02-28).
//!
//! Coverage status is a pure function of the expiry date and "today" and is
//! never persisted.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::models::warranty::WarrantyValidationError;

/// Durations offered by the issue and manual-add forms, in months.
pub const ALLOWED_DURATIONS_MONTHS: [u32; 6] = [6, 12, 18, 24, 36, 60];

/// A record is "expiring soon" from 30 days (inclusive) before its expiry
/// date through the expiry date itself.
pub const EXPIRING_SOON_WINDOW_DAYS: i64 = 30;

/// How the end of coverage was specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageTerms {
    /// Fixed duration in months, one of [`ALLOWED_DURATIONS_MONTHS`]
    Duration(u32),
    /// Explicit end-of-coverage date, must not precede the purchase date
    Custom(NaiveDate),
}

/// Expiry date plus the duration shown on dashboards. In custom mode the
/// duration is a 30-day approximation for display only and is never used
/// for a coverage decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedCoverage {
    pub expiry_date: NaiveDate,
    pub duration_months: u32,
}

impl CoverageTerms {
    /// Compute the expiry date and display duration for a purchase date.
    pub fn resolve(&self, purchase_date: NaiveDate) -> Result<ResolvedCoverage, WarrantyValidationError> {
        match *self {
            CoverageTerms::Duration(months) => {
                if !ALLOWED_DURATIONS_MONTHS.contains(&months) {
                    return Err(WarrantyValidationError::UnsupportedDuration(months));
                }
                let expiry_date = add_months(purchase_date, months);
                Ok(ResolvedCoverage {
                    expiry_date,
                    duration_months: months,
                })
            }
            CoverageTerms::Custom(expiry_date) => {
                if expiry_date < purchase_date {
                    return Err(WarrantyValidationError::ExpiryBeforePurchase);
                }
                Ok(ResolvedCoverage {
                    expiry_date,
                    duration_months: approximate_months(purchase_date, expiry_date),
                })
            }
        }
    }
}

/// Calendar-month addition with month-end clamping.
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    // checked_add_months only fails past NaiveDate::MAX (year ~262000)
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// Approximate a day span as months, rounding against a 30-day month.
/// Display-only; coverage decisions always use the expiry date itself.
pub fn approximate_months(purchase_date: NaiveDate, expiry_date: NaiveDate) -> u32 {
    let days = expiry_date.signed_duration_since(purchase_date).num_days();
    (days as f64 / 30.0).round() as u32
}

/// Coverage status derived from the expiry date and "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoverageStatus {
    Active,
    ExpiringSoon,
    Expired,
}

impl CoverageStatus {
    /// Expiring-soon records are still in coverage.
    pub fn is_in_coverage(&self) -> bool {
        !matches!(self, CoverageStatus::Expired)
    }
}

/// Derive the coverage status of a record on a given day.
///
/// A record whose expiry date is today is still in coverage; "expired"
/// begins the day after. The expiring-soon window is inclusive at exactly
/// 30 days out.
pub fn coverage_status(expiry_date: NaiveDate, today: NaiveDate) -> CoverageStatus {
    let days_left = expiry_date.signed_duration_since(today).num_days();
    if days_left < 0 {
        CoverageStatus::Expired
    } else if days_left <= EXPIRING_SOON_WINDOW_DAYS {
        CoverageStatus::ExpiringSoon
    } else {
        CoverageStatus::Active
    }
}
