//! Mapping between domain models and the public DTOs in the `shared` crate.
//!
//! Coverage status and dashboard summary counts are derived here, at
//! response time, from the stored expiry date. The DTO `status` field is
//! computed output, never persisted state.

use chrono::NaiveDate;

use crate::domain::commands::verify::VerifiedWarranty;
use crate::domain::expiry::{self, CoverageStatus};
use crate::domain::models::warranty::{
    LifecycleEvent, VerificationStatus, Warranty, WarrantyKind, WarrantyValidationError,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` request field into a calendar date.
pub fn parse_request_date(s: &str) -> Result<NaiveDate, WarrantyValidationError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| WarrantyValidationError::InvalidDate(s.to_string()))
}

pub fn to_warranty_dto(warranty: &Warranty, today: NaiveDate) -> shared::Warranty {
    shared::Warranty {
        id: warranty.id.clone(),
        code: warranty.code.clone(),
        kind: to_kind_dto(warranty.kind),
        verification_status: to_verification_dto(warranty.verification_status),
        seller_id: warranty.seller_id.clone(),
        seller_email: warranty.seller_email.clone(),
        seller_name: warranty.seller_name.clone(),
        buyer_id: warranty.buyer_id.clone(),
        buyer_email: warranty.buyer_email.clone(),
        customer_name: warranty.customer_name.clone(),
        customer_phone: warranty.customer_phone.clone(),
        product_model: warranty.product_model.clone(),
        brand: warranty.brand.clone(),
        serial_number: warranty.serial_number.clone(),
        notes: warranty.notes.clone(),
        purchase_date: warranty.purchase_date.format(DATE_FORMAT).to_string(),
        expiry_date: warranty.expiry_date.format(DATE_FORMAT).to_string(),
        duration_months: warranty.duration_months,
        status: to_status_dto(expiry::coverage_status(warranty.expiry_date, today)),
        claimed_at: warranty.claimed_at.map(|t| t.to_rfc3339()),
        previous_owner: warranty.previous_owner.clone(),
        transferred_at: warranty.transferred_at.map(|t| t.to_rfc3339()),
        created_at: warranty.created_at.to_rfc3339(),
        updated_at: warranty.updated_at.to_rfc3339(),
    }
}

pub fn to_event_dto(event: &LifecycleEvent) -> shared::LifecycleEventDto {
    shared::LifecycleEventDto {
        action: event.action.as_str().to_string(),
        actor_email: event.actor_email.clone(),
        occurred_at: event.occurred_at.to_rfc3339(),
    }
}

pub fn to_verified_dto(verified: &VerifiedWarranty) -> shared::VerifiedWarranty {
    shared::VerifiedWarranty {
        product_model: verified.product_model.clone(),
        serial_number: verified.serial_number.clone(),
        seller_name: verified.seller_name.clone(),
        owner_name: verified.owner_name.clone(),
        duration_months: verified.duration_months,
        expiry_date: verified.expiry_date.format(DATE_FORMAT).to_string(),
        status: to_status_dto(verified.status),
    }
}

/// Dashboard headline counts over a listing.
pub fn summarize(warranties: &[Warranty], today: NaiveDate) -> shared::WarrantySummary {
    let mut summary = shared::WarrantySummary {
        total: warranties.len() as u32,
        active: 0,
        expiring_soon: 0,
        expired: 0,
    };
    for warranty in warranties {
        match expiry::coverage_status(warranty.expiry_date, today) {
            CoverageStatus::Active => summary.active += 1,
            CoverageStatus::ExpiringSoon => summary.expiring_soon += 1,
            CoverageStatus::Expired => summary.expired += 1,
        }
    }
    summary
}

fn to_kind_dto(kind: WarrantyKind) -> shared::WarrantyKind {
    match kind {
        WarrantyKind::Issued => shared::WarrantyKind::Issued,
        WarrantyKind::Manual => shared::WarrantyKind::Manual,
    }
}

fn to_verification_dto(status: VerificationStatus) -> shared::VerificationStatus {
    match status {
        VerificationStatus::Verified => shared::VerificationStatus::Verified,
        VerificationStatus::Unverified => shared::VerificationStatus::Unverified,
    }
}

fn to_status_dto(status: CoverageStatus) -> shared::CoverageStatus {
    match status {
        CoverageStatus::Active => shared::CoverageStatus::Active,
        CoverageStatus::ExpiringSoon => shared::CoverageStatus::ExpiringSoon,
        CoverageStatus::Expired => shared::CoverageStatus::Expired,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::domain::models::warranty::{VerificationStatus, WarrantyKind};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn warranty_expiring(expiry: NaiveDate) -> Warranty {
        let now = Utc::now();
        Warranty {
            id: Warranty::generate_id(),
            code: Some("CB-AAAA-2222".to_string()),
            kind: WarrantyKind::Issued,
            verification_status: VerificationStatus::Verified,
            seller_id: Some("seller-1".to_string()),
            seller_email: Some("shop@example.com".to_string()),
            seller_name: Some("Example Electronics".to_string()),
            buyer_id: None,
            buyer_email: None,
            customer_name: Some("Rahim Ahmed".to_string()),
            customer_phone: None,
            product_model: "AC".to_string(),
            brand: None,
            serial_number: "SN".to_string(),
            notes: None,
            purchase_date: date(2025, 1, 1),
            expiry_date: expiry,
            duration_months: 12,
            claimed_at: None,
            previous_owner: None,
            transferred_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_parse_request_date() {
        assert_eq!(parse_request_date(" 2025-06-01 ").unwrap(), date(2025, 6, 1));
        assert!(matches!(
            parse_request_date("06/01/2025"),
            Err(WarrantyValidationError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_status_is_derived_at_mapping_time() {
        let today = date(2025, 7, 1);
        let dto = to_warranty_dto(&warranty_expiring(date(2025, 7, 20)), today);
        assert_eq!(dto.status, shared::CoverageStatus::ExpiringSoon);
        assert_eq!(dto.expiry_date, "2025-07-20");

        let dto = to_warranty_dto(&warranty_expiring(date(2025, 6, 30)), today);
        assert_eq!(dto.status, shared::CoverageStatus::Expired);
    }

    #[test]
    fn test_summarize_counts() {
        let today = date(2025, 7, 1);
        let warranties = vec![
            warranty_expiring(date(2026, 7, 1)),
            warranty_expiring(date(2025, 7, 31)),
            warranty_expiring(date(2025, 6, 30)),
        ];
        let summary = summarize(&warranties, today);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.active, 1);
        assert_eq!(summary.expiring_soon, 1);
        assert_eq!(summary.expired, 1);
    }
}
