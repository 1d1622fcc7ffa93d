//! crewbook server binary
//!
//! Configuration comes from the YAML file named by `CREWBOOK_CONFIG` (optional)
//! with environment overrides on top. Logging honours `RUST_LOG`.

use anyhow::Result;
use crewbook::config::AppConfig;
use crewbook::server::ServerBuilder;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("crewbook=info,tower_http=info")),
        )
        .init();

    let config = match std::env::var("CREWBOOK_CONFIG") {
        Ok(path) => AppConfig::from_yaml_file(&path)?,
        Err(_) => AppConfig::default(),
    }
    .with_env_overrides(|key| std::env::var(key).ok())?;

    let builder = ServerBuilder::new().with_config(config.clone());
    let builder = with_storage(builder, &config).await?;
    builder.serve().await
}

#[cfg(feature = "postgres")]
async fn with_storage(builder: ServerBuilder, config: &AppConfig) -> Result<ServerBuilder> {
    use crewbook::storage::PostgresStore;

    if let Some(url) = &config.database.url {
        let store = PostgresStore::connect(url, config.database.max_connections).await?;
        store.ensure_schema().await?;
        tracing::info!("Using PostgreSQL storage");
        return Ok(builder.with_backend(store));
    }
    in_memory(builder)
}

#[cfg(not(feature = "postgres"))]
async fn with_storage(builder: ServerBuilder, config: &AppConfig) -> Result<ServerBuilder> {
    if config.database.url.is_some() {
        tracing::warn!("DATABASE_URL is set but crewbook was built without the postgres feature");
    }
    in_memory(builder)
}

#[cfg(feature = "in-memory")]
fn in_memory(builder: ServerBuilder) -> Result<ServerBuilder> {
    tracing::info!("Using in-memory storage; data is lost on restart");
    Ok(builder.with_backend(crewbook::storage::InMemoryStore::new()))
}

#[cfg(not(feature = "in-memory"))]
fn in_memory(_builder: ServerBuilder) -> Result<ServerBuilder> {
    anyhow::bail!("no database URL configured and the in-memory feature is disabled")
}
