//! Core types, traits, and errors for LLMGate
//!
//! This crate contains the foundational types shared across all LLMGate
//! components: use-case configuration, the declarative output schema,
//! audit and result records, the error taxonomy, and the traits that seam
//! the gateway to its external collaborators (model invocation and
//! template lookup).

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Core error types.
#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    /// The requested use case has no registered template. Fatal to the call.
    #[error("Unknown use case: {use_case}")]
    ConfigNotFound { use_case: String },

    /// A PII detector pattern failed to compile.
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// The external model invocation failed. Recovered by the orchestrator
    /// via the deterministic fallback response.
    #[error("Invocation error: {0}")]
    Invocation(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, GatewayError>;

// ---------------------------------------------------------------------------
// Use-case configuration
// ---------------------------------------------------------------------------

/// The kind of prompt template a use case is built on. Determines the
/// deterministic fallback response when the model invocation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    Classification,
    Extraction,
    Qa,
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Classification => write!(f, "classification"),
            Self::Extraction => write!(f, "extraction"),
            Self::Qa => write!(f, "qa"),
        }
    }
}

/// Categories of sensitive content the vault can tokenize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiType {
    Email,
    Phone,
    Iban,
}

impl PiiType {
    /// The uppercase label embedded in vault tokens (`PII_<LABEL>_<digest>`).
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Email => "EMAIL",
            Self::Phone => "PHONE",
            Self::Iban => "IBAN",
        }
    }
}

impl std::fmt::Display for PiiType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Declarative output contract for a use case: the fields a model response
/// must carry, plus per-field constraints kept for documentation and future
/// type checking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSchema {
    /// Field names that must be present in the parsed response object.
    #[serde(default)]
    pub required: Vec<String>,
    /// Per-field constraint descriptors (type, enum, bounds).
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// Configuration for one use case, consumed read-only by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UseCaseConfig {
    /// Template kind, used to select the canned fallback response.
    pub template: TemplateKind,
    /// Registry name of the use case.
    pub name: String,
    /// Base model identifier.
    pub model: String,
    /// Optional fallback model for complex inputs.
    #[serde(default)]
    pub fallback_model: Option<String>,
    /// Word-count threshold above which input is considered complex.
    #[serde(default = "default_complexity_threshold")]
    pub complexity_threshold: usize,
    /// System prompt sent with every invocation.
    pub system_prompt: String,
    /// Extra sampling parameters forwarded to the invoker.
    #[serde(default)]
    pub model_params: Map<String, Value>,
    /// Output contract validated against the model response.
    #[serde(default)]
    pub output_schema: OutputSchema,
    /// PII categories to tokenize before the input leaves the trust boundary.
    #[serde(default)]
    pub pii_masking: Vec<PiiType>,
    /// Minimum self-reported confidence expected from the model.
    #[serde(default)]
    pub confidence_threshold: f64,
}

fn default_complexity_threshold() -> usize {
    100
}

// ---------------------------------------------------------------------------
// Validation outcome
// ---------------------------------------------------------------------------

/// Result of checking a raw model response against an [`OutputSchema`].
///
/// Missing fields are reported, never synthesized: `data` is the parsed
/// object exactly as the model returned it (or a structured error payload
/// when the response was not valid JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// Parsed response object, or a recovered error payload.
    pub data: Value,
    /// `true` when parsing succeeded and no required field is missing.
    pub validation_passed: bool,
    /// Required fields absent from the parsed object.
    pub missing_fields: Vec<String>,
}

// ---------------------------------------------------------------------------
// Audit records and statistics
// ---------------------------------------------------------------------------

/// One immutable record per processed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Correlation identifier for this request.
    pub request_id: Uuid,
    /// When the request was processed.
    pub timestamp: DateTime<Utc>,
    /// Use case name.
    pub use_case: String,
    /// Character length of the raw caller input.
    pub original_input_length: usize,
    /// Character length of the tokenized input sent to the model.
    pub cleaned_input_length: usize,
    /// Number of PII replacements performed (occurrences, not distinct tokens).
    pub pii_masked_count: usize,
    /// Model the router selected.
    pub model_used: String,
    /// Top-level keys of the validated output object.
    pub output_keys: Vec<String>,
    /// Estimated cost in USD.
    pub cost: f64,
    /// Wall-clock processing time in milliseconds.
    pub processing_time_ms: f64,
    /// Model-reported confidence in [0, 1], 0 when absent.
    pub confidence: f64,
    /// Whether the response satisfied the output schema.
    pub validation_passed: bool,
}

/// Aggregate gateway statistics.
///
/// `requests` and `total_cost` are lifetime counters; the averages are
/// computed over the audit entries currently retained in the bounded log.
/// The two views deliberately diverge once the log begins evicting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayStats {
    pub requests: u64,
    pub total_cost: f64,
    pub avg_cost_per_request: f64,
    pub avg_confidence: f64,
    pub avg_processing_time_ms: f64,
}

// ---------------------------------------------------------------------------
// Per-request result
// ---------------------------------------------------------------------------

/// The caller-facing result of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResult {
    /// The raw caller input, echoed back.
    pub original_input: String,
    /// The input after PII tokenization, exactly as the model saw it.
    pub tokenized_input: String,
    /// Model the router selected.
    pub model_used: String,
    /// Validated output with tokens partially redacted for display.
    pub display_output: ValidationOutcome,
    /// Validated output with original sensitive values restored.
    pub backend_output: ValidationOutcome,
    /// Estimated cost in USD.
    pub cost: f64,
    /// Wall-clock processing time in milliseconds.
    pub processing_time_ms: f64,
    /// Number of PII replacements performed on the input.
    pub pii_tokenized_count: usize,
    /// Distinct vault tokens minted or reused for this request.
    pub pii_tokens: Vec<String>,
}

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// Trait for model invocation collaborators.
///
/// Parameter filtering (e.g. dropping sampling parameters a model family
/// does not support) is the invoker's responsibility, not the pipeline's.
#[async_trait::async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Invoke the model and return the raw response text.
    async fn invoke(
        &self,
        model: &str,
        system_prompt: &str,
        user_text: &str,
        params: &Map<String, Value>,
    ) -> Result<String>;

    /// Store a caller-supplied credential for subsequent invocations.
    ///
    /// The credential must never be logged, echoed, or persisted in audit
    /// records or results. Invokers that need no credential ignore it.
    fn set_credential(&self, _secret: SecretString) {}

    /// Get the invoker name.
    fn name(&self) -> &'static str;
}

/// Trait for template registries.
pub trait TemplateRegistry: Send + Sync {
    /// Look up the configuration for a use case. `None` means the use case
    /// is unknown, which the pipeline treats as a caller error.
    fn lookup(&self, use_case: &str) -> Option<UseCaseConfig>;

    /// Names of all registered use cases.
    fn names(&self) -> Vec<String>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
