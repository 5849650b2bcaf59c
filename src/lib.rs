pub mod api;
pub mod care;
pub mod classifier;
pub mod config;
pub mod lookup;
pub mod report;

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::api::ApiContext;
use crate::care::{CareResolver, CareTables};
use crate::classifier::Classifier;
use crate::config::{ConfigError, ServiceConfig};
use crate::lookup::{HospitalLocator, LookupError};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Lookup client setup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the service and block until Ctrl-C.
pub fn run() -> Result<(), ServiceError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = ServiceConfig::from_env()?;
    // Built outside the runtime and kept alive past it: the blocking lookup
    // clients must not be dropped on a runtime thread.
    let ctx = build_context(&config)?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let server = api::start_api_server(ctx.clone(), config.bind_addr).await?;
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Cannot listen for Ctrl-C: {e}");
        }
        server.shutdown().await;
        Ok::<_, ServiceError>(())
    })?;
    drop(runtime);
    drop(ctx);

    tracing::info!("{} stopped", config::APP_NAME);
    Ok(())
}

/// Wire tables, lookup chain, classifier and reports dir into the API context.
pub fn build_context(config: &ServiceConfig) -> Result<ApiContext, ServiceError> {
    let tables = Arc::new(CareTables::standard());
    let locator = HospitalLocator::standard(&config.lookup, tables.fallback())?;
    tracing::info!(sources = ?locator.source_names(), "Hospital lookup chain ready");
    let resolver = Arc::new(CareResolver::new(tables, locator));
    let classifier = load_classifier(&config.model_path);

    Ok(ApiContext::new(resolver, classifier, config.reports_dir.clone()))
}

#[cfg(feature = "onnx-classifier")]
fn load_classifier(model_path: &Path) -> Option<Arc<dyn Classifier>> {
    match classifier::OnnxClassifier::load(model_path) {
        Ok(c) => Some(Arc::new(c)),
        Err(e) => {
            tracing::warn!(error = %e, "Classifier unavailable, predictions disabled");
            None
        }
    }
}

#[cfg(not(feature = "onnx-classifier"))]
fn load_classifier(model_path: &Path) -> Option<Arc<dyn Classifier>> {
    tracing::warn!(
        path = %model_path.display(),
        "Built without `onnx-classifier`, predictions disabled"
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LookupConfig;

    #[test]
    fn context_builds_without_model() {
        let tmp = tempfile::tempdir().unwrap();
        let config = ServiceConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            model_path: tmp.path().join("missing.onnx"),
            reports_dir: tmp.path().join("reports"),
            lookup: LookupConfig::with_base_url("http://127.0.0.1:9"),
        };

        let ctx = build_context(&config).unwrap();
        assert!(ctx.classifier.is_none());
        assert_eq!(ctx.reports_dir, tmp.path().join("reports"));
    }
}
