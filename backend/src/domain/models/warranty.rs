use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// How a warranty record entered the system. This is the only type-like
/// distinction that is persisted; coverage status is always derived from
/// the expiry date at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarrantyKind {
    /// Created by a seller, carries a claimable code
    Issued,
    /// Self-declared by a buyer, no code and no seller linkage
    Manual,
}

impl WarrantyKind {
    /// Convert to string for storage
    pub fn as_str(&self) -> &'static str {
        match self {
            WarrantyKind::Issued => "issued",
            WarrantyKind::Manual => "manual",
        }
    }

    /// Parse from a stored string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "issued" => Ok(WarrantyKind::Issued),
            "manual" => Ok(WarrantyKind::Manual),
            _ => Err(format!("Invalid warranty kind: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationStatus {
    Verified,
    Unverified,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Verified => "verified",
            VerificationStatus::Unverified => "unverified",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "verified" => Ok(VerificationStatus::Verified),
            "unverified" => Ok(VerificationStatus::Unverified),
            _ => Err(format!("Invalid verification status: {}", s)),
        }
    }
}

/// A warranty record: one product's coverage terms and current ownership.
///
/// `buyer_id` absent means the record is unclaimed and its code (if any) can
/// be redeemed. Records are never hard-deleted; ownership changes are
/// reflected by field updates plus append-only lifecycle events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warranty {
    pub id: String,
    /// Claim code in `CB-XXXX-XXXX` format; `None` for manual records
    pub code: Option<String>,
    pub kind: WarrantyKind,
    pub verification_status: VerificationStatus,
    pub seller_id: Option<String>,
    pub seller_email: Option<String>,
    pub seller_name: Option<String>,
    pub buyer_id: Option<String>,
    pub buyer_email: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub product_model: String,
    pub brand: Option<String>,
    pub serial_number: String,
    pub notes: Option<String>,
    pub purchase_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub duration_months: u32,
    pub claimed_at: Option<DateTime<Utc>>,
    /// Email of the owner who last released this record
    pub previous_owner: Option<String>,
    pub transferred_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Warranty {
    pub fn generate_id() -> String {
        format!("warranty::{}", uuid::Uuid::new_v4())
    }

    pub fn is_claimed(&self) -> bool {
        self.buyer_id.is_some()
    }
}

/// Lifecycle actions recorded in the append-only history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleAction {
    Issued,
    Claimed,
    Released,
}

impl LifecycleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleAction::Issued => "issued",
            LifecycleAction::Claimed => "claimed",
            LifecycleAction::Released => "released",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "issued" => Ok(LifecycleAction::Issued),
            "claimed" => Ok(LifecycleAction::Claimed),
            "released" => Ok(LifecycleAction::Released),
            _ => Err(format!("Invalid lifecycle action: {}", s)),
        }
    }
}

/// One append-only history entry for a warranty record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub id: String,
    pub warranty_id: String,
    pub action: LifecycleAction,
    pub actor_email: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl LifecycleEvent {
    pub fn new(
        warranty_id: &str,
        action: LifecycleAction,
        actor_email: Option<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: format!("event::{}", uuid::Uuid::new_v4()),
            warranty_id: warranty_id.to_string(),
            action,
            actor_email,
            occurred_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WarrantyValidationError {
    #[error("Customer name cannot be empty")]
    EmptyCustomerName,
    #[error("Product model cannot be empty")]
    EmptyProductModel,
    #[error("Unsupported warranty duration: {0} months")]
    UnsupportedDuration(u32),
    #[error("An expiry date is required for custom coverage")]
    MissingExpiryDate,
    #[error("Expiry date cannot be before the purchase date")]
    ExpiryBeforePurchase,
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in [WarrantyKind::Issued, WarrantyKind::Manual] {
            assert_eq!(WarrantyKind::from_str(kind.as_str()).unwrap(), kind);
        }
        assert!(WarrantyKind::from_str("bogus").is_err());
    }

    #[test]
    fn test_lifecycle_action_round_trip() {
        for action in [
            LifecycleAction::Issued,
            LifecycleAction::Claimed,
            LifecycleAction::Released,
        ] {
            assert_eq!(LifecycleAction::from_str(action.as_str()).unwrap(), action);
        }
    }

    #[test]
    fn test_generated_ids_are_prefixed_and_unique() {
        let a = Warranty::generate_id();
        let b = Warranty::generate_id();
        assert!(a.starts_with("warranty::"));
        assert_ne!(a, b);
    }
}
