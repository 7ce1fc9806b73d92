//! The request-processing pipeline.
//!
//! One fixed stage sequence per request: tokenize → route → invoke →
//! validate → {detokenize, mask} → cost → audit → assemble. The gateway
//! owns the long-lived shared state (vault, audit log, cost totals); every
//! other value is created per request and dropped with the result.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use llmgate_core::{
    AuditEntry, GatewayError, GatewayStats, ModelInvoker, ProcessResult, Result, TemplateRegistry,
    UseCaseConfig, ValidationOutcome,
};
use llmgate_vault::TokenVault;
use secrecy::SecretString;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::audit::AuditLog;
use crate::cost::CostAccountant;
use crate::invoker::canned_response;
use crate::{router, validator};

/// The gateway: pipeline orchestration over long-lived shared state.
pub struct Gateway {
    vault: TokenVault,
    audit: AuditLog,
    accountant: CostAccountant,
    registry: Arc<dyn TemplateRegistry>,
    invoker: Arc<dyn ModelInvoker>,
}

impl Gateway {
    /// Create a gateway with the default audit capacity.
    pub fn new(
        registry: Arc<dyn TemplateRegistry>,
        invoker: Arc<dyn ModelInvoker>,
    ) -> Result<Self> {
        Self::with_audit_capacity(registry, invoker, crate::audit::AUDIT_CAPACITY)
    }

    /// Create a gateway with an explicit audit ring capacity.
    pub fn with_audit_capacity(
        registry: Arc<dyn TemplateRegistry>,
        invoker: Arc<dyn ModelInvoker>,
        audit_capacity: usize,
    ) -> Result<Self> {
        Ok(Self {
            vault: TokenVault::new()?,
            audit: AuditLog::with_capacity(audit_capacity),
            accountant: CostAccountant::new(),
            registry,
            invoker,
        })
    }

    /// Process one request for a registered use case.
    ///
    /// An unknown use case is a caller error and fails fast with
    /// [`GatewayError::ConfigNotFound`]; no partial result is produced and
    /// no state is touched. Every other failure mode degrades to a
    /// best-effort, fully-populated [`ProcessResult`].
    pub async fn process(&self, use_case: &str, input_text: &str) -> Result<ProcessResult> {
        let config = self
            .registry
            .lookup(use_case)
            .ok_or_else(|| GatewayError::ConfigNotFound {
                use_case: use_case.to_string(),
            })?;
        self.process_with_config(use_case, input_text, &config)
            .await
    }

    /// Process one request with an explicit configuration.
    pub async fn process_with_config(
        &self,
        use_case: &str,
        input_text: &str,
        config: &UseCaseConfig,
    ) -> Result<ProcessResult> {
        let started = Instant::now();

        // 1. Tokenize PII before anything leaves the trust boundary.
        let (tokenized_input, pii_count, pii_tokens) =
            self.vault.tokenize(input_text, &config.pii_masking).await;

        // 2. Route.
        let model = router::route(&tokenized_input, config).to_string();

        // 3. Invoke. A failed invocation is recovered with the canned
        //    response for this template kind; the pipeline continues so the
        //    result, cost, and audit record are produced exactly once.
        let raw_response = match self
            .invoker
            .invoke(
                &model,
                &config.system_prompt,
                &tokenized_input,
                &config.model_params,
            )
            .await
        {
            Ok(raw) => raw,
            Err(err) => {
                warn!(model = %model, use_case = %use_case, error = %err,
                      "model invocation failed, substituting canned response");
                canned_response(config.template).to_string()
            }
        };

        // 4. Validate against the declared schema.
        let outcome = validator::validate(&raw_response, &config.output_schema);
        if !outcome.validation_passed {
            debug!(use_case = %use_case, missing = ?outcome.missing_fields,
                   "response failed schema validation");
        }

        // 5. Two views of the output: restored for the backend, masked for display.
        let backend_data = self.vault.detokenize(&outcome.data).await;
        let display_data = self.vault.mask_for_display(&outcome.data).await;

        // 6. Cost, accumulated into the lifetime total.
        let cost = self
            .accountant
            .charge(
                &model,
                router::word_count(&tokenized_input),
                router::word_count(&raw_response),
            )
            .await;

        let processing_time_ms = started.elapsed().as_secs_f64() * 1000.0;
        let confidence = outcome
            .data
            .get("confidence")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        let output_keys = match &backend_data {
            Value::Object(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        };

        // 7. Audit. The append is atomic; entries are immutable once stored.
        self.audit
            .append(AuditEntry {
                request_id: Uuid::new_v4(),
                timestamp: Utc::now(),
                use_case: use_case.to_string(),
                original_input_length: input_text.chars().count(),
                cleaned_input_length: tokenized_input.chars().count(),
                pii_masked_count: pii_count,
                model_used: model.clone(),
                output_keys,
                cost,
                processing_time_ms,
                confidence,
                validation_passed: outcome.validation_passed,
            })
            .await;

        // 8. Assemble.
        Ok(ProcessResult {
            original_input: input_text.to_string(),
            tokenized_input,
            model_used: model,
            display_output: ValidationOutcome {
                data: display_data,
                validation_passed: outcome.validation_passed,
                missing_fields: outcome.missing_fields.clone(),
            },
            backend_output: ValidationOutcome {
                data: backend_data,
                validation_passed: outcome.validation_passed,
                missing_fields: outcome.missing_fields,
            },
            cost,
            processing_time_ms,
            pii_tokenized_count: pii_count,
            pii_tokens,
        })
    }

    /// Aggregate statistics (lifetime counters + retained-window averages).
    pub async fn stats(&self) -> GatewayStats {
        self.audit.stats(self.accountant.total_cost().await).await
    }

    /// The most recent `limit` audit entries, oldest first.
    pub async fn audit_log(&self, limit: usize) -> Vec<AuditEntry> {
        self.audit.recent(limit).await
    }

    /// Store a credential for the invocation collaborator. Never logged,
    /// echoed, or written to the audit trail.
    pub fn set_credential(&self, secret: SecretString) {
        self.invoker.set_credential(secret);
    }

    /// Number of distinct tokens in the vault.
    pub async fn vault_size(&self) -> usize {
        self.vault.len().await
    }

    /// Direct access to the vault (for detokenizing stored payloads).
    #[must_use]
    pub fn vault(&self) -> &TokenVault {
        &self.vault
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
