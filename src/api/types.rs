//! Shared state for the API layer.

use std::path::PathBuf;
use std::sync::Arc;

use crate::care::CareResolver;
use crate::classifier::Classifier;

/// Shared context for all API routes. Read-only after construction; each
/// request works on its own data.
#[derive(Clone)]
pub struct ApiContext {
    pub resolver: Arc<CareResolver>,
    /// `None` when no model could be loaded; predictions then return 503.
    pub classifier: Option<Arc<dyn Classifier>>,
    pub reports_dir: PathBuf,
}

impl ApiContext {
    pub fn new(
        resolver: Arc<CareResolver>,
        classifier: Option<Arc<dyn Classifier>>,
        reports_dir: PathBuf,
    ) -> Self {
        Self {
            resolver,
            classifier,
            reports_dir,
        }
    }
}
