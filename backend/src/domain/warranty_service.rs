//! Warranty lifecycle service.
//!
//! This module contains the core business logic for warranty records: the
//! seller-side issue operation, the buyer-side claim and manual-add
//! operations, and the owner-side release/transfer.
//!
//! ## Business Rules
//!
//! - Codes are allocated by retrying generation against the store until an
//!   unused one is found (bounded; the code space makes exhaustion
//!   effectively unreachable)
//! - A warranty has at most one owner at any time; the claim transition is a
//!   single conditional update, so exactly one concurrent claimant wins
//! - Release returns the record to the unclaimed state and yields its
//!   existing code back to the releasing owner as the transfer token
//! - Self-declared records carry no code and never enter claim/release
//! - Every transition appends to the record's lifecycle history

use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};

use crate::domain::code;
use crate::domain::commands::warranty::{
    ClaimWarrantyCommand, ClaimWarrantyResult, IssueWarrantyCommand, IssueWarrantyResult,
    ReleaseWarrantyCommand, ReleaseWarrantyResult, SelfDeclareWarrantyCommand,
    SelfDeclareWarrantyResult, WarrantyListResult, WarrantyWithHistory,
};
use crate::domain::expiry::CoverageTerms;
use crate::domain::models::principal::Principal;
use crate::domain::models::warranty::{
    LifecycleAction, LifecycleEvent, VerificationStatus, Warranty, WarrantyKind,
    WarrantyValidationError,
};
use crate::storage::WarrantyStorage;

/// How many generation attempts the issue path makes before giving up.
/// With a 31^8 code space this cap exists for loop hygiene, not because it
/// is expected to be reached.
const MAX_CODE_ATTEMPTS: u32 = 5;

const DEFAULT_SELLER_NAME: &str = "Official Store";
const MANUAL_SELLER_NAME: &str = "Unknown Shop";
const MANUAL_SERIAL_PLACEHOLDER: &str = "N/A";

/// Errors surfaced by warranty lifecycle operations. All of these are
/// user-recoverable; the caller re-prompts rather than aborting.
#[derive(Debug, thiserror::Error)]
pub enum WarrantyError {
    #[error(transparent)]
    Validation(#[from] WarrantyValidationError),
    #[error("Warranty code not found. Please check and try again.")]
    CodeNotFound,
    #[error("Warranty not found")]
    NotFound,
    #[error("This warranty has already been claimed by another user.")]
    AlreadyClaimed,
    #[error("Only the current owner can release this warranty")]
    NotOwner,
    #[error("Self-declared warranties cannot be transferred")]
    NotTransferable,
    #[error("Could not allocate an unused warranty code")]
    CodeSpaceExhausted,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Service for warranty lifecycle operations
pub struct WarrantyService<S: WarrantyStorage> {
    storage: Arc<S>,
}

impl<S: WarrantyStorage> Clone for WarrantyService<S> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
        }
    }
}

impl<S: WarrantyStorage> WarrantyService<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// Issue a new warranty record on behalf of a seller.
    ///
    /// Creates the record unclaimed, with a freshly allocated code and a
    /// computed expiry, and appends the initial history entry.
    pub async fn issue_warranty(
        &self,
        command: IssueWarrantyCommand,
    ) -> Result<IssueWarrantyResult, WarrantyError> {
        info!(
            "Issuing warranty for product '{}' by seller {}",
            command.product_model, command.seller.uid
        );

        if command.customer_name.trim().is_empty() {
            return Err(WarrantyValidationError::EmptyCustomerName.into());
        }
        if command.product_model.trim().is_empty() {
            return Err(WarrantyValidationError::EmptyProductModel.into());
        }

        let coverage =
            CoverageTerms::Duration(command.duration_months).resolve(command.purchase_date)?;

        let warranty_code = self.allocate_code().await?;
        let now = Utc::now();

        let warranty = Warranty {
            id: Warranty::generate_id(),
            code: Some(warranty_code),
            kind: WarrantyKind::Issued,
            verification_status: VerificationStatus::Verified,
            seller_id: Some(command.seller.uid.clone()),
            seller_email: Some(command.seller.email.clone()),
            seller_name: Some(command.seller.display_name_or(DEFAULT_SELLER_NAME)),
            buyer_id: None,
            buyer_email: None,
            customer_name: Some(command.customer_name.trim().to_string()),
            customer_phone: Some(command.customer_phone.trim().to_string()),
            product_model: command.product_model.trim().to_string(),
            brand: None,
            serial_number: command.serial_number.trim().to_string(),
            notes: None,
            purchase_date: command.purchase_date,
            expiry_date: coverage.expiry_date,
            duration_months: coverage.duration_months,
            claimed_at: None,
            previous_owner: None,
            transferred_at: None,
            created_at: now,
            updated_at: now,
        };

        self.storage.store_warranty(&warranty).await?;
        self.storage
            .append_event(&LifecycleEvent::new(
                &warranty.id,
                LifecycleAction::Issued,
                Some(command.seller.email.clone()),
                now,
            ))
            .await?;

        info!("Successfully issued warranty: {}", warranty.id);

        Ok(IssueWarrantyResult {
            warranty,
            success_message: "Warranty activated".to_string(),
        })
    }

    /// Claim an issued warranty by its code, attaching the buyer as owner.
    pub async fn claim_warranty(
        &self,
        command: ClaimWarrantyCommand,
    ) -> Result<ClaimWarrantyResult, WarrantyError> {
        let normalized = code::normalize_code(&command.code);
        info!("Claim attempt for code {} by {}", normalized, command.buyer.uid);

        let warranty = self
            .storage
            .find_by_code(&normalized)
            .await?
            .ok_or(WarrantyError::CodeNotFound)?;

        // Advisory pre-check; the conditional update below is what actually
        // enforces single ownership.
        if warranty.is_claimed() {
            return Err(WarrantyError::AlreadyClaimed);
        }

        // The invoice date from the claim form is a cross-check for the
        // buyer's benefit, not a gate.
        if let Some(entered) = command.purchase_date {
            if entered != warranty.purchase_date {
                warn!(
                    "Claim for {} entered purchase date {} differing from record {}",
                    normalized, entered, warranty.purchase_date
                );
            }
        }

        let now = Utc::now();
        let won = self
            .storage
            .claim_if_unclaimed(&warranty.id, &command.buyer, now)
            .await?;
        if !won {
            return Err(WarrantyError::AlreadyClaimed);
        }

        self.storage
            .append_event(&LifecycleEvent::new(
                &warranty.id,
                LifecycleAction::Claimed,
                Some(command.buyer.email.clone()),
                now,
            ))
            .await?;

        let claimed = self
            .storage
            .get_warranty(&warranty.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Warranty {} vanished after claim", warranty.id))?;

        info!("Warranty {} claimed by {}", claimed.id, command.buyer.uid);

        Ok(ClaimWarrantyResult {
            warranty: claimed,
            success_message: "Warranty claimed successfully".to_string(),
        })
    }

    /// Release a warranty, returning it to the unclaimed state and yielding
    /// its code back to the releasing owner as the transfer token.
    ///
    /// Irreversible from the releasing owner's point of view: once released,
    /// anyone holding the code can claim the record.
    pub async fn release_warranty(
        &self,
        command: ReleaseWarrantyCommand,
    ) -> Result<ReleaseWarrantyResult, WarrantyError> {
        info!(
            "Release attempt for warranty {} by {}",
            command.warranty_id, command.owner.uid
        );

        let warranty = self
            .storage
            .get_warranty(&command.warranty_id)
            .await?
            .ok_or(WarrantyError::NotFound)?;

        if warranty.buyer_id.as_deref() != Some(command.owner.uid.as_str()) {
            return Err(WarrantyError::NotOwner);
        }

        // Self-declared records have no code to hand over.
        let transfer_code = match (&warranty.kind, &warranty.code) {
            (WarrantyKind::Issued, Some(code)) => code.clone(),
            _ => return Err(WarrantyError::NotTransferable),
        };

        let now = Utc::now();
        self.storage
            .release_warranty(&warranty.id, &command.owner.email, now)
            .await?;
        self.storage
            .append_event(&LifecycleEvent::new(
                &warranty.id,
                LifecycleAction::Released,
                Some(command.owner.email.clone()),
                now,
            ))
            .await?;

        info!("Warranty {} released by {}", warranty.id, command.owner.uid);

        Ok(ReleaseWarrantyResult {
            transfer_code,
            success_message: "Warranty released. Share the code with the new owner.".to_string(),
        })
    }

    /// Create a self-declared record: buyer-owned from the start, no code,
    /// no seller linkage, unverified by construction.
    pub async fn self_declare_warranty(
        &self,
        command: SelfDeclareWarrantyCommand,
    ) -> Result<SelfDeclareWarrantyResult, WarrantyError> {
        info!(
            "Self-declared warranty for product '{}' by {}",
            command.product_model, command.buyer.uid
        );

        if command.product_model.trim().is_empty() {
            return Err(WarrantyValidationError::EmptyProductModel.into());
        }

        let coverage = command.terms.resolve(command.purchase_date)?;

        let serial_number = command
            .serial_number
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| MANUAL_SERIAL_PLACEHOLDER.to_string());
        let seller_name = command
            .seller_name
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| MANUAL_SELLER_NAME.to_string());

        let now = Utc::now();
        let warranty = Warranty {
            id: Warranty::generate_id(),
            code: None,
            kind: WarrantyKind::Manual,
            verification_status: VerificationStatus::Unverified,
            seller_id: None,
            seller_email: None,
            seller_name: Some(seller_name),
            buyer_id: Some(command.buyer.uid.clone()),
            buyer_email: Some(command.buyer.email.clone()),
            customer_name: Some(command.buyer.display_name_or("Me")),
            customer_phone: None,
            product_model: command.product_model.trim().to_string(),
            brand: command.brand.filter(|s| !s.trim().is_empty()),
            serial_number,
            notes: command.notes.filter(|s| !s.trim().is_empty()),
            purchase_date: command.purchase_date,
            expiry_date: coverage.expiry_date,
            duration_months: coverage.duration_months,
            claimed_at: None,
            previous_owner: None,
            transferred_at: None,
            created_at: now,
            updated_at: now,
        };

        self.storage.store_warranty(&warranty).await?;
        self.storage
            .append_event(&LifecycleEvent::new(
                &warranty.id,
                LifecycleAction::Issued,
                Some(command.buyer.email.clone()),
                now,
            ))
            .await?;

        info!("Successfully added manual warranty: {}", warranty.id);

        Ok(SelfDeclareWarrantyResult {
            warranty,
            success_message: "Warranty added to your account".to_string(),
        })
    }

    /// List warranties currently owned by a buyer, most recent first.
    pub async fn list_for_buyer(
        &self,
        buyer: &Principal,
    ) -> Result<WarrantyListResult, WarrantyError> {
        let warranties = self.storage.list_by_buyer(&buyer.uid).await?;
        Ok(WarrantyListResult { warranties })
    }

    /// List warranties issued by a seller, most recent first.
    pub async fn list_for_seller(
        &self,
        seller: &Principal,
    ) -> Result<WarrantyListResult, WarrantyError> {
        let warranties = self.storage.list_by_seller(&seller.uid).await?;
        Ok(WarrantyListResult { warranties })
    }

    /// Fetch one warranty with its lifecycle history. Only the current
    /// owner or the issuing seller may see the full record.
    pub async fn get_warranty_for_principal(
        &self,
        warranty_id: &str,
        principal: &Principal,
    ) -> Result<WarrantyWithHistory, WarrantyError> {
        let warranty = self
            .storage
            .get_warranty(warranty_id)
            .await?
            .ok_or(WarrantyError::NotFound)?;

        let is_owner = warranty.buyer_id.as_deref() == Some(principal.uid.as_str());
        let is_seller = warranty.seller_id.as_deref() == Some(principal.uid.as_str());
        if !is_owner && !is_seller {
            return Err(WarrantyError::NotOwner);
        }

        let history = self.storage.list_events(warranty_id).await?;
        Ok(WarrantyWithHistory { warranty, history })
    }

    /// Allocate a code not present in the store, regenerating on collision.
    async fn allocate_code(&self) -> Result<String, WarrantyError> {
        for attempt in 0..MAX_CODE_ATTEMPTS {
            let candidate = code::generate_code();
            if !self.storage.code_exists(&candidate).await? {
                return Ok(candidate);
            }
            warn!(
                "Warranty code collision on attempt {}: {}",
                attempt + 1,
                candidate
            );
        }
        Err(WarrantyError::CodeSpaceExhausted)
    }
}
