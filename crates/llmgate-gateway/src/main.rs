use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use llmgate_gateway::{
    build_router, AppState, Gateway, GatewayConfig, HttpInvoker, InMemoryTemplateRegistry,
    ModelInvoker,
};
use secrecy::SecretString;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "llmgate_gateway=info,llmgate_vault=info".into()),
        )
        .init();

    let config = match std::env::args()
        .nth(1)
        .or_else(|| std::env::var("LLMGATE_CONFIG").ok())
    {
        Some(path) => llmgate_gateway::load_config(Path::new(&path))?,
        None => GatewayConfig::default(),
    };
    info!(listen = %config.listen_addr, upstream = %config.upstream_url, "starting gateway");

    let invoker = Arc::new(HttpInvoker::new(
        &config.upstream_url,
        Duration::from_millis(config.timeout_ms),
    )?);
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => invoker.set_credential(SecretString::new(key)),
        _ => warn!("no OPENAI_API_KEY set; requests will use canned responses until a credential is provided"),
    }

    let gateway = Gateway::with_audit_capacity(
        Arc::new(InMemoryTemplateRegistry::built_in()),
        invoker,
        config.audit_capacity,
    )?;
    let app = build_router(AppState {
        gateway: Arc::new(gateway),
    });

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!(addr = %config.listen_addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
