//! Tuition model and reporting.
//!
//! This module provides pure business logic over tuition snapshots:
//! - Grouping by due month and responsible
//! - Late tuition detection
//! - Current month estimate
//! - On-time and late payer rankings
//! - Settlement and status recompute rules

pub mod error;
pub mod lifecycle;
pub mod service;
pub mod types;


pub use error::TuitionError;
pub use lifecycle::TuitionLifecycle;
pub use service::TuitionReportService;
pub use types::*;
