//! Built-in use-case templates.
//!
//! Three production-shaped use cases ship with the gateway: a support
//! ticket classifier, an onboarding document extractor, and an employee
//! FAQ bot. Each declares its model, prompt, output schema, and the PII
//! categories to tokenize. External registries implement
//! [`TemplateRegistry`] the same way.

use std::collections::HashMap;

use llmgate_core::{OutputSchema, PiiType, TemplateKind, TemplateRegistry, UseCaseConfig};
use serde_json::{json, Map, Value};

/// Convert a `json!` object literal into a schema/properties map.
fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn support_ticket_classifier() -> UseCaseConfig {
    UseCaseConfig {
        template: TemplateKind::Classification,
        name: "support_ticket_classifier".to_string(),
        model: "gpt-4o-mini".to_string(),
        fallback_model: None,
        complexity_threshold: 100,
        system_prompt: "You are a support ticket classifier. Categorize the user's issue into \
                        one of the predefined categories. Respond ONLY with valid JSON."
            .to_string(),
        model_params: object(json!({ "temperature": 0.2 })),
        output_schema: OutputSchema {
            required: vec![
                "category".to_string(),
                "confidence".to_string(),
                "reasoning".to_string(),
            ],
            properties: object(json!({
                "category": { "type": "string", "enum": ["billing", "account_support", "technical_issue", "product_question"] },
                "confidence": { "type": "number", "minimum": 0, "maximum": 1 },
                "reasoning": { "type": "string" },
            })),
        },
        pii_masking: vec![PiiType::Email, PiiType::Phone],
        confidence_threshold: 0.85,
    }
}

fn onboarding_document_extractor() -> UseCaseConfig {
    UseCaseConfig {
        template: TemplateKind::Extraction,
        name: "onboarding_document_extractor".to_string(),
        model: "gpt-4o-mini".to_string(),
        fallback_model: Some("o1-mini".to_string()),
        complexity_threshold: 100,
        system_prompt: "Extract structured information from the onboarding document. Return \
                        ONLY valid JSON matching the schema. If a field is not found, use null."
            .to_string(),
        model_params: object(json!({ "temperature": 0.0 })),
        output_schema: OutputSchema {
            required: vec![
                "name".to_string(),
                "email".to_string(),
                "iban".to_string(),
                "risk_score".to_string(),
            ],
            properties: object(json!({
                "name": { "type": "string" },
                "email": { "type": "string" },
                "iban": { "type": "string" },
                "risk_score": { "type": "string", "enum": ["low", "medium", "high"] },
                "nationality": { "type": "string" },
            })),
        },
        pii_masking: vec![PiiType::Email, PiiType::Iban, PiiType::Phone],
        confidence_threshold: 0.90,
    }
}

fn employee_faq_bot() -> UseCaseConfig {
    UseCaseConfig {
        template: TemplateKind::Qa,
        name: "employee_faq_bot".to_string(),
        model: "gpt-4o-mini".to_string(),
        fallback_model: None,
        complexity_threshold: 100,
        system_prompt: "Answer employee questions based on company policies. Always cite the \
                        source. If you don't know, say so. Respond with valid JSON."
            .to_string(),
        model_params: object(json!({ "temperature": 0.3, "max_tokens": 500 })),
        output_schema: OutputSchema {
            required: vec![
                "answer".to_string(),
                "source".to_string(),
                "confidence".to_string(),
            ],
            properties: object(json!({
                "answer": { "type": "string" },
                "source": { "type": "string" },
                "confidence": { "type": "number", "minimum": 0, "maximum": 1 },
                "requires_human_review": { "type": "boolean" },
            })),
        },
        pii_masking: vec![PiiType::Email, PiiType::Phone],
        confidence_threshold: 0.80,
    }
}

/// In-memory template registry keyed by use-case name.
pub struct InMemoryTemplateRegistry {
    templates: HashMap<String, UseCaseConfig>,
}

impl InMemoryTemplateRegistry {
    /// Registry preloaded with the built-in use cases.
    #[must_use]
    pub fn built_in() -> Self {
        let mut templates = HashMap::new();
        for config in [
            support_ticket_classifier(),
            onboarding_document_extractor(),
            employee_faq_bot(),
        ] {
            templates.insert(config.name.clone(), config);
        }
        Self { templates }
    }

    /// Empty registry; templates are added with [`Self::register`].
    #[must_use]
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// Register (or replace) a use-case template.
    pub fn register(&mut self, config: UseCaseConfig) {
        self.templates.insert(config.name.clone(), config);
    }
}

impl TemplateRegistry for InMemoryTemplateRegistry {
    fn lookup(&self, use_case: &str) -> Option<UseCaseConfig> {
        self.templates.get(use_case).cloned()
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.templates.keys().cloned().collect();
        names.sort();
        names
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
