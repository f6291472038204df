//! Core business logic for Campus.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//!
//! # Modules
//!
//! - `tuition` - Tuition model, lifecycle rules and payment reports
//! - `listing` - Generic table rendering for entity lists

pub mod listing;
pub mod tuition;
