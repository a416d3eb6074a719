//! Domain-level command and query types
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer is responsible for mapping the
//! public DTOs defined in the `shared` crate to these internal types.

pub mod warranty {
    use chrono::NaiveDate;

    use crate::domain::expiry::CoverageTerms;
    use crate::domain::models::principal::Principal;
    use crate::domain::models::warranty::{LifecycleEvent, Warranty};

    /// Input for the seller-side issue operation.
    #[derive(Debug, Clone)]
    pub struct IssueWarrantyCommand {
        pub seller: Principal,
        pub customer_name: String,
        pub customer_phone: String,
        pub product_model: String,
        pub serial_number: String,
        pub purchase_date: NaiveDate,
        pub duration_months: u32,
    }

    /// Result of issuing a warranty.
    #[derive(Debug, Clone)]
    pub struct IssueWarrantyResult {
        pub warranty: Warranty,
        pub success_message: String,
    }

    /// Input for the buyer-side claim-by-code operation.
    #[derive(Debug, Clone)]
    pub struct ClaimWarrantyCommand {
        pub buyer: Principal,
        pub code: String,
        /// Optional invoice-date cross-check; informational only
        pub purchase_date: Option<NaiveDate>,
    }

    /// Result of claiming a warranty.
    #[derive(Debug, Clone)]
    pub struct ClaimWarrantyResult {
        pub warranty: Warranty,
        pub success_message: String,
    }

    /// Input for the owner-side release/transfer operation.
    #[derive(Debug, Clone)]
    pub struct ReleaseWarrantyCommand {
        pub owner: Principal,
        pub warranty_id: String,
    }

    /// Result of releasing a warranty. The transfer code is the record's
    /// existing code, yielded back to the releasing owner to share.
    #[derive(Debug, Clone)]
    pub struct ReleaseWarrantyResult {
        pub transfer_code: String,
        pub success_message: String,
    }

    /// Input for the buyer-side manual (self-declared) add.
    #[derive(Debug, Clone)]
    pub struct SelfDeclareWarrantyCommand {
        pub buyer: Principal,
        pub product_model: String,
        pub brand: Option<String>,
        pub serial_number: Option<String>,
        pub seller_name: Option<String>,
        pub notes: Option<String>,
        pub purchase_date: NaiveDate,
        pub terms: CoverageTerms,
    }

    /// Result of a manual add.
    #[derive(Debug, Clone)]
    pub struct SelfDeclareWarrantyResult {
        pub warranty: Warranty,
        pub success_message: String,
    }

    /// Result of listing a principal's warranties.
    #[derive(Debug, Clone)]
    pub struct WarrantyListResult {
        pub warranties: Vec<Warranty>,
    }

    /// Result of fetching one warranty with its lifecycle history.
    #[derive(Debug, Clone)]
    pub struct WarrantyWithHistory {
        pub warranty: Warranty,
        pub history: Vec<LifecycleEvent>,
    }
}

pub mod verify {
    use chrono::NaiveDate;

    use crate::domain::expiry::CoverageStatus;

    /// Free-text query from the public verification page.
    #[derive(Debug, Clone)]
    pub struct VerifyLookupQuery {
        pub query: String,
    }

    /// Redacted view of a single matching record.
    #[derive(Debug, Clone, PartialEq)]
    pub struct VerifiedWarranty {
        pub product_model: String,
        pub serial_number: String,
        pub seller_name: String,
        /// Owner name masked per word
        pub owner_name: String,
        pub duration_months: u32,
        pub expiry_date: NaiveDate,
        pub status: CoverageStatus,
    }
}
