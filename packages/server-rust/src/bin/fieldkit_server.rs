use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use fieldkit_server::backend::GraphqlBackend;
use fieldkit_server::config::{LogFormat, ServerConfig};
use fieldkit_server::network::NetworkModule;
use fieldkit_server::schema::SchemaRegistry;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_tracing(config.log_format);

    let schemas = SchemaRegistry::from_file(&config.schema)
        .with_context(|| format!("loading {}", config.schema.display()))?;
    let mut module = NetworkModule::new(config.network(), Arc::new(schemas));

    if let Some(url) = &config.backend_url {
        let backend = GraphqlBackend::new(url.as_str(), config.request_timeout())?;
        info!(endpoint = backend.endpoint(), "item backend configured");
        module = module.with_backend(Arc::new(backend));
    }

    let port = module.start().await?;
    info!(port, "fieldkit server started");
    module.serve(shutdown_signal()).await
}
