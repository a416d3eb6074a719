//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer. The
//! contract mirrors what a hosted document store offers: whole-record create,
//! point lookup, exact-match queries on a handful of fields, and field-level
//! updates, plus one conditional update, which is the primitive the claim
//! transition needs to keep single ownership under concurrent claims.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::models::principal::Principal;
use crate::domain::models::warranty::{LifecycleEvent, Warranty};

/// Trait defining the interface for warranty storage operations
///
/// This trait abstracts away the specific storage implementation details,
/// allowing the domain layer to work with different storage backends
/// without modification.
#[async_trait]
pub trait WarrantyStorage: Send + Sync {
    /// Store a new warranty record
    async fn store_warranty(&self, warranty: &Warranty) -> Result<()>;

    /// Retrieve a specific warranty by ID
    async fn get_warranty(&self, warranty_id: &str) -> Result<Option<Warranty>>;

    /// Exact-match lookup by claim code
    async fn find_by_code(&self, code: &str) -> Result<Option<Warranty>>;

    /// Exact-match lookup by serial number
    async fn find_by_serial(&self, serial_number: &str) -> Result<Option<Warranty>>;

    /// Check whether a code is already taken (collision check at issue time)
    async fn code_exists(&self, code: &str) -> Result<bool>;

    /// List warranties issued by a seller, most recent first
    async fn list_by_seller(&self, seller_id: &str) -> Result<Vec<Warranty>>;

    /// List warranties currently owned by a buyer, most recent first
    async fn list_by_buyer(&self, buyer_id: &str) -> Result<Vec<Warranty>>;

    /// Atomically attach a buyer to an unclaimed record.
    ///
    /// The update applies only if `buyer_id` is still absent; returns false
    /// when another claimant won the race. This single conditional write is
    /// what guarantees at most one concurrent claim succeeds.
    async fn claim_if_unclaimed(
        &self,
        warranty_id: &str,
        buyer: &Principal,
        claimed_at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Detach the current owner: clears the buyer fields and stamps
    /// `previous_owner` and `transferred_at`, returning the record to the
    /// unclaimed state.
    async fn release_warranty(
        &self,
        warranty_id: &str,
        previous_owner: &str,
        transferred_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Append a lifecycle event to a warranty's history
    async fn append_event(&self, event: &LifecycleEvent) -> Result<()>;

    /// List a warranty's lifecycle events in chronological order
    async fn list_events(&self, warranty_id: &str) -> Result<Vec<LifecycleEvent>>;
}
