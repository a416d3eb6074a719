use serde::{Deserialize, Serialize};

/// A warranty record as exposed over the public API.
///
/// Calendar dates (`purchase_date`, `expiry_date`) are `YYYY-MM-DD` strings;
/// timestamps are RFC 3339. The `status` field is derived from `expiry_date`
/// and the current date at response time and is never read back from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warranty {
    pub id: String,
    /// Human-shareable claim code in `CB-XXXX-XXXX` format.
    /// Absent for self-declared (manual) records.
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
    /// Purchase date (`YYYY-MM-DD`)
    pub purchase_date: String,
    /// End of coverage (`YYYY-MM-DD`)
    pub expiry_date: String,
    pub duration_months: u32,
    /// Coverage status derived at response time
    pub status: CoverageStatus,
    pub claimed_at: Option<String>,
    pub previous_owner: Option<String>,
    pub transferred_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// How a warranty record entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarrantyKind {
    /// Created by a seller with a claimable code
    Issued,
    /// Self-declared by a buyer, no code or seller linkage
    Manual,
}

/// Whether the record was seller-attested or self-declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Verified,
    Unverified,
}

/// Coverage status derived from the expiry date and "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageStatus {
    Active,
    /// Within 30 days (inclusive) of the expiry date, still in coverage
    ExpiringSoon,
    Expired,
}

/// One entry in a warranty's append-only lifecycle history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleEventDto {
    pub action: String,
    pub actor_email: Option<String>,
    /// RFC 3339 timestamp
    pub occurred_at: String,
}

/// Request body for the seller-side issue operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueWarrantyRequest {
    pub customer_name: String,
    pub customer_phone: String,
    pub product_model: String,
    pub serial_number: String,
    /// Purchase date (`YYYY-MM-DD`)
    pub purchase_date: String,
    pub duration_months: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueWarrantyResponse {
    pub warranty: Warranty,
    pub success_message: String,
}

/// Request body for the buyer-side claim-by-code operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimWarrantyRequest {
    pub code: String,
    /// Optional invoice-date cross-check (`YYYY-MM-DD`), informational only
    pub purchase_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimWarrantyResponse {
    pub warranty: Warranty,
    pub success_message: String,
}

/// Request body for the buyer-side manual (self-declared) add.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfDeclareWarrantyRequest {
    pub product_model: String,
    pub brand: Option<String>,
    pub serial_number: Option<String>,
    pub seller_name: Option<String>,
    pub notes: Option<String>,
    /// Purchase date (`YYYY-MM-DD`)
    pub purchase_date: String,
    /// Fixed duration in months; mutually exclusive with `custom_expiry_date`
    pub duration_months: Option<u32>,
    /// Explicit end of coverage (`YYYY-MM-DD`) when no fixed duration fits
    pub custom_expiry_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfDeclareWarrantyResponse {
    pub warranty: Warranty,
    pub success_message: String,
}

/// Response to a release/transfer. The transfer code is shown once so the
/// releasing owner can share it out-of-band with the new owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseWarrantyResponse {
    pub transfer_code: String,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarrantyListResponse {
    pub warranties: Vec<Warranty>,
    pub summary: WarrantySummary,
}

/// Dashboard headline counts, derived from expiry dates at response time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarrantySummary {
    pub total: u32,
    pub active: u32,
    pub expiring_soon: u32,
    pub expired: u32,
}

/// One warranty with its full lifecycle history, for the owner's detail and
/// transfer screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarrantyDetailResponse {
    pub warranty: Warranty,
    pub history: Vec<LifecycleEventDto>,
}

/// Public verification lookup result. Owner identity is redacted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedWarranty {
    pub product_model: String,
    pub serial_number: String,
    pub seller_name: String,
    /// Owner name masked per word, e.g. "John Doe" -> "J*** D**"
    pub owner_name: String,
    pub duration_months: u32,
    pub expiry_date: String,
    pub status: CoverageStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub result: Option<VerifiedWarranty>,
}
