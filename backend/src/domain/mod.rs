//! # Domain Module
//!
//! Contains all business logic for the warranty registry.
//!
//! This module encapsulates the core business rules, entities, and services
//! that define how warranty records are created, claimed, and transferred.
//! It operates independently of any specific transport or storage backend.
//!
//! ## Module Organization
//!
//! - **code**: Warranty code generation and normalization
//! - **expiry**: Expiry calculation and derived coverage status
//! - **warranty_service**: Issue, claim, release/transfer, and manual-add operations
//! - **verification_service**: Public redacted lookup by code or serial number
//!
//! ## Core Concepts
//!
//! - **Warranty record**: One product's coverage terms and current ownership
//! - **Code**: The human-shareable identifier used to claim or verify a record
//! - **Claim**: A buyer attaching themselves as owner via an exact code match
//! - **Release/Transfer**: The owner detaching themselves, returning the
//!   record to the unclaimed state for a new owner to claim with the same code
//! - **Self-declared**: A buyer-created record with no code or seller linkage
//!
//! ## Business Rules
//!
//! - A warranty has at most one current owner; concurrent claims are settled
//!   by a conditional update in storage
//! - Coverage status (active / expiring soon / expired) is derived from the
//!   expiry date at read time and never persisted
//! - Lifecycle history is append-only

pub mod code;
pub mod commands;
pub mod expiry;
pub mod models;
pub mod verification_service;
pub mod warranty_service;

pub use expiry::{CoverageStatus, CoverageTerms};
pub use verification_service::VerificationService;
pub use warranty_service::{WarrantyError, WarrantyService};
