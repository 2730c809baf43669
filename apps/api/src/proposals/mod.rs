// Vendor proposals: multipart submission, listing, and AI evaluation.

pub mod handlers;

/// Status written onto a proposal once an evaluation is stored.
pub const STATUS_EVALUATED: &str = "evaluated";
/// Vendor company recorded when the submitting user has none on file.
pub const UNKNOWN_COMPANY: &str = "Unknown Company";
