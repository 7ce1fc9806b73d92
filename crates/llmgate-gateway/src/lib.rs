//! LLMGate: a PII-safe gateway in front of LLM upstreams.
//!
//! Every request runs through one fixed pipeline: PII is tokenized into
//! opaque placeholders before the text leaves the trust boundary, a
//! deterministic router picks the model, the response is validated against
//! the use case's output schema, tokens are restored (or masked for
//! display), the request is costed, and an immutable audit record is
//! appended to a bounded ring.
//!
//! [`pipeline::Gateway`] is the embeddable core; [`api`] wraps it in an
//! HTTP server.

pub mod api;
pub mod audit;
pub mod config;
pub mod cost;
pub mod invoker;
pub mod pipeline;
pub mod router;
pub mod templates;
pub mod validator;

pub use api::{build_router, AppState};
pub use audit::AuditLog;
pub use config::{load_config, GatewayConfig};
pub use cost::CostAccountant;
pub use invoker::{HttpInvoker, StaticInvoker};
pub use pipeline::Gateway;
pub use templates::InMemoryTemplateRegistry;

pub use llmgate_core::{
    AuditEntry, GatewayError, GatewayStats, ModelInvoker, OutputSchema, PiiType, ProcessResult,
    Result, TemplateKind, TemplateRegistry, UseCaseConfig, ValidationOutcome,
};
pub use llmgate_vault::TokenVault;
