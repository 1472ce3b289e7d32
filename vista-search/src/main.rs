//! VISTA Search Service Entry Point
//!
//! Reads search requests as JSON lines from stdin, searches Elasticsearch,
//! filters hits against the REST relationship graph and writes responses as
//! JSON lines to stdout. Logs go to stderr.

use std::sync::Arc;

use tokio::io::BufReader;
use tokio::sync::watch;
use vista_core::{ConfigError, VistaConfig, VistaResult};
use vista_events::{JsonLinesRequestSource, JsonLinesResponseSink};
use vista_search::{init_tracing, RequestListener, RequestPipeline};
use vista_storage::{ElasticsearchConfig, ElasticsearchIndex, RestPermissionStore, RestStoreConfig};

#[tokio::main]
async fn main() -> VistaResult<()> {
    init_tracing()?;

    let config = VistaConfig::from_env();
    config.validate()?;

    let es_config = ElasticsearchConfig::from_env();
    let store_config = RestStoreConfig::from_env().ok_or_else(|| ConfigError::InvalidValue {
        field: "VISTA_PERMISSION_URL".to_string(),
        value: String::new(),
        reason: "permission store URL must be set".to_string(),
    })?;

    tracing::info!(
        es_url = %es_config.base_url,
        permission_url = %store_config.base_url,
        index = %config.search.index_name,
        "Starting VISTA search service"
    );

    let pipeline = RequestPipeline::new(
        ElasticsearchIndex::new(es_config),
        RestPermissionStore::new(store_config),
        JsonLinesResponseSink::new(tokio::io::stdout()),
        config.search.clone(),
    );
    let listener = RequestListener::new(Arc::new(pipeline), config.listener.clone());
    let source = JsonLinesRequestSource::new(BufReader::new(tokio::io::stdin()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let run = listener.run(source, shutdown_rx);
    tokio::pin!(run);

    tokio::select! {
        _ = &mut run => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
            (&mut run).await;
        }
    }

    Ok(())
}
