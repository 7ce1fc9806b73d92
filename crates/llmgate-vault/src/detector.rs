//! Pluggable PII detectors.
//!
//! A detector maps one [`PiiType`] to the literal substrings it finds in
//! free text. New PII categories are added by registering another detector;
//! the vault and the pipeline never change.

use llmgate_core::{GatewayError, PiiType, Result};
use regex::Regex;

/// Trait for PII detectors.
pub trait PiiDetector: Send + Sync {
    /// The category this detector finds.
    fn pii_type(&self) -> PiiType;

    /// All non-overlapping matches in `text`, in source order, as the
    /// literal matched substrings.
    fn find_matches(&self, text: &str) -> Vec<String>;
}

/// Regex-backed PII detector.
pub struct RegexPiiDetector {
    pii_type: PiiType,
    pattern: Regex,
}

impl RegexPiiDetector {
    /// Compile a detector from a regex pattern.
    pub fn new(pii_type: PiiType, pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| {
            GatewayError::Pattern(format!(
                "Failed to compile {} pattern '{}': {}",
                pii_type, pattern, e
            ))
        })?;
        Ok(Self { pii_type, pattern })
    }
}

impl PiiDetector for RegexPiiDetector {
    fn pii_type(&self) -> PiiType {
        self.pii_type
    }

    fn find_matches(&self, text: &str) -> Vec<String> {
        self.pattern
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

/// Registry mapping PII types to their detectors.
pub struct DetectorRegistry {
    detectors: Vec<Box<dyn PiiDetector>>,
}

impl DetectorRegistry {
    /// Build the registry with the built-in detectors: email, phone
    /// (US formats), and IBAN (two-letter country code + 20 digits).
    pub fn built_in() -> Result<Self> {
        let detectors: Vec<Box<dyn PiiDetector>> = vec![
            Box::new(RegexPiiDetector::new(
                PiiType::Email,
                r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
            )?),
            Box::new(RegexPiiDetector::new(
                PiiType::Phone,
                r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b",
            )?),
            Box::new(RegexPiiDetector::new(PiiType::Iban, r"\b[A-Z]{2}\d{20}\b")?),
        ];
        Ok(Self { detectors })
    }

    /// Create a registry from an explicit set of detectors.
    pub fn new(detectors: Vec<Box<dyn PiiDetector>>) -> Self {
        Self { detectors }
    }

    /// Look up the detector for a PII type, if one is registered.
    pub fn get(&self, pii_type: PiiType) -> Option<&dyn PiiDetector> {
        self.detectors
            .iter()
            .find(|d| d.pii_type() == pii_type)
            .map(|d| d.as_ref())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_detection() {
        let registry = DetectorRegistry::built_in().unwrap();
        let detector = registry.get(PiiType::Email).unwrap();
        let matches = detector.find_matches("reach me at john.doe@example.com please");
        assert_eq!(matches, vec!["john.doe@example.com"]);
    }

    #[test]
    fn test_phone_detection_with_and_without_separators() {
        let registry = DetectorRegistry::built_in().unwrap();
        let detector = registry.get(PiiType::Phone).unwrap();
        assert_eq!(
            detector.find_matches("call 555-123-4567 or 5551234567"),
            vec!["555-123-4567", "5551234567"]
        );
    }

    #[test]
    fn test_iban_detection() {
        let registry = DetectorRegistry::built_in().unwrap();
        let detector = registry.get(PiiType::Iban).unwrap();
        assert_eq!(
            detector.find_matches("IBAN: DE89370400440532013000"),
            vec!["DE89370400440532013000"]
        );
    }

    #[test]
    fn test_matches_are_in_source_order() {
        let registry = DetectorRegistry::built_in().unwrap();
        let detector = registry.get(PiiType::Email).unwrap();
        let matches = detector.find_matches("a@x.com then b@y.org");
        assert_eq!(matches, vec!["a@x.com", "b@y.org"]);
    }

    #[test]
    fn test_clean_text_has_no_matches() {
        let registry = DetectorRegistry::built_in().unwrap();
        for ty in [PiiType::Email, PiiType::Phone, PiiType::Iban] {
            let detector = registry.get(ty).unwrap();
            assert!(detector.find_matches("nothing sensitive here").is_empty());
        }
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let result = RegexPiiDetector::new(PiiType::Email, r"([unclosed");
        assert!(result.is_err());
    }
}
