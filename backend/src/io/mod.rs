//! # IO Module
//!
//! Transport-facing code: the REST surface and the DTO mappers. Nothing in
//! here contains business rules; handlers translate between the `shared`
//! DTOs and domain commands.

pub mod mappers;
pub mod rest;
