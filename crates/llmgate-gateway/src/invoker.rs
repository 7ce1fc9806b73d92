//! Model invocation collaborators.
//!
//! [`HttpInvoker`] talks to an OpenAI-compatible chat-completions endpoint;
//! [`StaticInvoker`] returns a fixed body for tests and demos. When any
//! invoker fails, the orchestrator substitutes the deterministic canned
//! response for the use case's template kind (see [`canned_response`]).

use async_trait::async_trait;
use llmgate_core::{GatewayError, ModelInvoker, Result, TemplateKind};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Map, Value};
use std::sync::RwLock;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Deterministic fallback responses
// ---------------------------------------------------------------------------

/// The canned response substituted when model invocation fails.
///
/// One fixed, schema-shaped body per template kind, so the pipeline always
/// degrades to the same fully-populated result for a given use case.
#[must_use]
pub fn canned_response(kind: TemplateKind) -> &'static str {
    match kind {
        TemplateKind::Classification => {
            r#"{"category": "account_support", "confidence": 0.92, "reasoning": "User mentions password issues which typically fall under account support"}"#
        }
        TemplateKind::Extraction => {
            r#"{"name": "John Smith", "email": "[EMAIL_REDACTED]", "iban": "[IBAN_REDACTED]", "risk_score": "low", "nationality": "German"}"#
        }
        TemplateKind::Qa => {
            r#"{"answer": "Primary caregivers receive 12 weeks of paid parental leave and secondary caregivers receive 4 weeks, in accordance with German law.", "source": "employee_handbook_section_4.2", "confidence": 0.87, "requires_human_review": false}"#
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP invoker (OpenAI-compatible)
// ---------------------------------------------------------------------------

/// Invoker for OpenAI-compatible `/v1/chat/completions` upstreams.
///
/// Holds the caller-supplied bearer credential; without one, every call
/// fails and the pipeline takes the canned-response path. Reasoning models
/// (`o1*`) do not accept a sampling temperature, so that parameter is
/// filtered here; parameter compatibility is this collaborator's concern,
/// not the pipeline's.
pub struct HttpInvoker {
    client: reqwest::Client,
    base_url: String,
    credential: RwLock<Option<SecretString>>,
}

impl HttpInvoker {
    /// Create an invoker for `base_url` with the given request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credential: RwLock::new(None),
        })
    }

    fn credential(&self) -> Option<SecretString> {
        self.credential.read().ok().and_then(|g| g.clone())
    }

    /// Build the request body, filtering parameters the model rejects.
    fn build_body(
        model: &str,
        system_prompt: &str,
        user_text: &str,
        params: &Map<String, Value>,
    ) -> Value {
        let mut body = json!({
            "model": model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_text },
            ],
        });
        for (key, value) in params {
            if model.starts_with("o1") && key == "temperature" {
                continue;
            }
            body[key] = value.clone();
        }
        body
    }
}

#[async_trait]
impl ModelInvoker for HttpInvoker {
    async fn invoke(
        &self,
        model: &str,
        system_prompt: &str,
        user_text: &str,
        params: &Map<String, Value>,
    ) -> Result<String> {
        let Some(credential) = self.credential() else {
            return Err(GatewayError::Invocation(
                "no credential configured".to_string(),
            ));
        };

        let body = Self::build_body(model, system_prompt, user_text, params);
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(credential.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Invocation(format!("upstream request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Invocation(format!(
                "upstream returned {status}"
            )));
        }

        let parsed: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Invocation(format!("unreadable upstream body: {e}")))?;

        parsed["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                GatewayError::Invocation("response missing message content".to_string())
            })
    }

    fn set_credential(&self, secret: SecretString) {
        if let Ok(mut guard) = self.credential.write() {
            *guard = Some(secret);
        }
    }

    fn name(&self) -> &'static str {
        "HttpInvoker"
    }
}

// ---------------------------------------------------------------------------
// Static invoker
// ---------------------------------------------------------------------------

/// Invoker that always returns the same body. Used in tests and offline
/// demos where the response shape matters but no upstream exists.
pub struct StaticInvoker {
    body: String,
}

impl StaticInvoker {
    /// Create an invoker that responds with `body` to every call.
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

#[async_trait]
impl ModelInvoker for StaticInvoker {
    async fn invoke(
        &self,
        _model: &str,
        _system_prompt: &str,
        _user_text: &str,
        _params: &Map<String, Value>,
    ) -> Result<String> {
        Ok(self.body.clone())
    }

    fn name(&self) -> &'static str {
        "StaticInvoker"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
