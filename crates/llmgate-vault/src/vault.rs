//! The reversible PII token vault.
//!
//! Detected sensitive substrings are replaced with deterministic tokens of
//! the form `PII_<TYPE>_<6-hex-digest>`; the vault owns the token → original
//! mapping for the lifetime of the gateway instance. Identical values of
//! the same type always produce the same token, so repeated occurrences
//! never grow the vault.
//!
//! The vault is unbounded and unencrypted, an acknowledged simplification.
//! Production hardening (encryption at rest, TTL eviction, access logs)
//! belongs in a storage backend behind this same interface.

use std::collections::HashMap;

use llmgate_core::{PiiType, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::detector::DetectorRegistry;

/// Compute the deterministic token for a value of the given type.
///
/// The digest is SHA-256 of the original value, hex-encoded and truncated
/// to 6 characters.
#[must_use]
pub fn token_for(pii_type: PiiType, value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    let hex = hex::encode(digest);
    format!("PII_{}_{}", pii_type.label(), &hex[..6])
}

/// Partially redact an original value for display.
///
/// Policy:
/// - values containing `@` keep the first character of the local part,
///   then `***@` and the full domain;
/// - values made up entirely of digits, uppercase letters, and separators
///   (phone numbers, IBANs) keep their last 4 characters, with preceding
///   alphanumerics masked and separators preserved;
/// - anything else keeps its first 2 characters followed by `***`.
#[must_use]
pub fn mask_value(original: &str) -> String {
    if let Some((local, domain)) = original.split_once('@') {
        let first: String = local.chars().take(1).collect();
        return format!("{first}***@{domain}");
    }

    let numeric_like = !original.is_empty()
        && original
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase() || is_separator(c));
    if numeric_like {
        let chars: Vec<char> = original.chars().collect();
        let keep_from = chars.len().saturating_sub(4);
        return chars
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                if i >= keep_from || is_separator(c) {
                    c
                } else {
                    '*'
                }
            })
            .collect();
    }

    let prefix: String = original.chars().take(2).collect();
    format!("{prefix}***")
}

/// Separator characters preserved by the numeric masking rule.
fn is_separator(c: char) -> bool {
    matches!(c, '-' | '.' | ' ' | '(' | ')' | '+' | '/')
}

/// How [`TokenVault::resolve`] rewrites a token it recognizes.
#[derive(Clone, Copy)]
enum ResolveMode {
    /// Restore the original value (trusted backend view).
    Restore,
    /// Substitute the partially redacted rendering (display view).
    Mask,
}

/// The reversible token ↔ original-value store.
///
/// Shared mutable state: every in-flight request reads and writes the same
/// vault, so the mapping lives behind an async `RwLock`. A token, once
/// stored, never changes its mapped value.
pub struct TokenVault {
    entries: RwLock<HashMap<String, String>>,
    detectors: DetectorRegistry,
}

impl TokenVault {
    /// Create a vault with the built-in detector registry.
    pub fn new() -> Result<Self> {
        Ok(Self::with_registry(DetectorRegistry::built_in()?))
    }

    /// Create a vault with a custom detector registry.
    #[must_use]
    pub fn with_registry(detectors: DetectorRegistry) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            detectors,
        }
    }

    /// Tokenize all occurrences of the requested PII types in `text`.
    ///
    /// Returns the tokenized text, the number of replacements performed
    /// (one per occurrence, so repeated identical values count each time),
    /// and the distinct tokens involved. Types without a registered
    /// detector are skipped.
    pub async fn tokenize(&self, text: &str, types: &[PiiType]) -> (String, usize, Vec<String>) {
        let mut working = text.to_string();
        let mut count = 0;
        let mut tokens: Vec<String> = Vec::new();

        let mut entries = self.entries.write().await;
        for &ty in types {
            let Some(detector) = self.detectors.get(ty) else {
                continue;
            };
            for value in detector.find_matches(&working) {
                let token = token_for(ty, &value);
                entries
                    .entry(token.clone())
                    .or_insert_with(|| value.clone());
                // Replace the first remaining occurrence of the literal value.
                working = working.replacen(&value, &token, 1);
                count += 1;
                if !tokens.contains(&token) {
                    tokens.push(token);
                }
            }
        }

        (working, count, tokens)
    }

    /// Restore original values in a structured output (backend view).
    ///
    /// String values that are vault keys are replaced by their stored
    /// originals; nested objects are walked recursively; everything else,
    /// including tokens the vault has never seen, passes through unchanged.
    pub async fn detokenize(&self, value: &Value) -> Value {
        let entries = self.entries.read().await;
        Self::resolve(&entries, value, ResolveMode::Restore)
    }

    /// Produce the partially redacted display view of a structured output.
    pub async fn mask_for_display(&self, value: &Value) -> Value {
        let entries = self.entries.read().await;
        Self::resolve(&entries, value, ResolveMode::Mask)
    }

    /// Recursive walk shared by both views. Total: never fails, never panics.
    fn resolve(entries: &HashMap<String, String>, value: &Value, mode: ResolveMode) -> Value {
        match value {
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::resolve(entries, v, mode)))
                    .collect(),
            ),
            Value::String(s) => match entries.get(s) {
                Some(original) => match mode {
                    ResolveMode::Restore => Value::String(original.clone()),
                    ResolveMode::Mask => Value::String(mask_value(original)),
                },
                None => value.clone(),
            },
            other => other.clone(),
        }
    }

    /// Look up the original value for a token.
    pub async fn get(&self, token: &str) -> Option<String> {
        self.entries.read().await.get(token).cloned()
    }

    /// Number of distinct tokens stored.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// `true` when no tokens are stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
