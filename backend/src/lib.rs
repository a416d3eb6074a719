//! # Warranty Registry Backend
//!
//! Backend for a warranty-registration service: sellers issue digital
//! warranty records with human-shareable codes, buyers claim, track, and
//! transfer them, and anyone can verify a record from its code or serial
//! number.
//!
//! The crate is layered the usual way:
//!
//! - [`domain`]: business logic, code generation, expiry calculation, and
//!   the issue/claim/release lifecycle
//! - [`storage`]: storage traits plus the SQLite repository
//! - [`io`]: the REST surface and DTO mapping
//! - [`config`]: environment-derived runtime settings

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;
