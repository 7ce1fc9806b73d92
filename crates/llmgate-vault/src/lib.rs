//! PII detection and reversible tokenization for LLMGate
//!
//! This crate provides the pluggable PII detector abstraction and the
//! token vault: sensitive substrings are replaced with opaque,
//! deterministic tokens before input leaves the trust boundary, and the
//! vault restores (or partially redacts) them on the way back.

pub mod detector;
pub mod vault;

pub use detector::{DetectorRegistry, PiiDetector, RegexPiiDetector};
pub use vault::{mask_value, token_for, TokenVault};
