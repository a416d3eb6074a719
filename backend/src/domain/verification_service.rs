//! Public verification lookup.
//!
//! Backs the public verify page: a free-text query is matched against the
//! claim code first, then against the serial number, and at most one record
//! is returned as a redacted view. The owner's name is masked per word so a
//! stranger holding a serial number cannot learn who owns the product.

use std::sync::Arc;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use log::info;

use crate::domain::code;
use crate::domain::commands::verify::{VerifiedWarranty, VerifyLookupQuery};
use crate::domain::expiry;
use crate::domain::models::warranty::Warranty;
use crate::storage::WarrantyStorage;

/// Service for the public verification surface
pub struct VerificationService<S: WarrantyStorage> {
    storage: Arc<S>,
}

impl<S: WarrantyStorage> Clone for VerificationService<S> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
        }
    }
}

impl<S: WarrantyStorage> VerificationService<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// Look up a warranty by code, falling back to serial number.
    /// Returns `None` when nothing matches; the caller renders not-found.
    pub async fn lookup(&self, query: VerifyLookupQuery) -> Result<Option<VerifiedWarranty>> {
        let raw = query.query.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        info!("Public verification lookup: '{}'", raw);

        let by_code = self
            .storage
            .find_by_code(&code::normalize_code(raw))
            .await?;
        let matched = match by_code {
            Some(w) => Some(w),
            None => self.storage.find_by_serial(raw).await?,
        };

        Ok(matched.map(|w| Self::redact(&w, Utc::now().date_naive())))
    }

    fn redact(warranty: &Warranty, today: NaiveDate) -> VerifiedWarranty {
        let owner = warranty
            .customer_name
            .as_deref()
            .filter(|n| !n.trim().is_empty());
        VerifiedWarranty {
            product_model: warranty.product_model.clone(),
            serial_number: warranty.serial_number.clone(),
            seller_name: warranty
                .seller_name
                .clone()
                .unwrap_or_else(|| "Official Store".to_string()),
            owner_name: mask_owner_name(owner),
            duration_months: warranty.duration_months,
            expiry_date: warranty.expiry_date,
            status: expiry::coverage_status(warranty.expiry_date, today),
        }
    }
}

/// Mask an owner name per word: "John Doe" -> "J*** D**".
/// Words of two characters or fewer are kept whole.
pub fn mask_owner_name(name: Option<&str>) -> String {
    let name = match name {
        Some(n) => n,
        None => return "Unknown".to_string(),
    };
    name.split_whitespace()
        .map(|part| {
            let len = part.chars().count();
            if len <= 2 {
                part.to_string()
            } else {
                let mut masked: String = part.chars().take(1).collect();
                masked.extend(std::iter::repeat('*').take(len - 1));
                masked
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
