use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::lookup::UnnamedPoiPolicy;

/// Application-level constants
pub const APP_NAME: &str = "ChestCare";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Sent as `User-Agent` on every outbound lookup. Nominatim's usage policy
/// rejects anonymous clients.
pub const USER_AGENT: &str = concat!("chestcare/", env!("CARGO_PKG_VERSION"), " (hospital-lookup)");

pub const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const OVERPASS_INTERPRETER_URL: &str = "https://overpass-api.de/api/interpreter";

pub const GEOCODE_TIMEOUT: Duration = Duration::from_secs(10);
pub const POI_TIMEOUT: Duration = Duration::from_secs(25);

/// Search radius around the geocoded locality, in metres.
pub const POI_RADIUS_M: u32 = 20_000;

/// Upper bound on hospitals returned for a single locality.
pub const MAX_HOSPITALS: usize = 5;

/// Side length of the square image the classifier expects.
pub const MODEL_INPUT_SIZE: u32 = 224;

/// File name of the single generated report (overwritten per request).
pub const REPORT_FILE_NAME: &str = "chest_xray_report.pdf";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8501";

/// Default `tracing` filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "chestcare_lib=info,tower=warn,hyper=warn"
}

/// Get the application data directory
/// ~/ChestCare/ on all platforms. Falls back to the working directory when
/// no home directory can be determined (containers, CI).
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Get the reports directory
pub fn reports_dir() -> PathBuf {
    app_data_dir().join("reports")
}

/// Get the models directory (for the ONNX classifier)
pub fn models_dir() -> PathBuf {
    app_data_dir().join("models")
}

/// Default classifier model path
pub fn classifier_model_path() -> PathBuf {
    models_dir().join("chest_xray_classifier.onnx")
}

// ═══════════════════════════════════════════════════════════
// Lookup configuration
// ═══════════════════════════════════════════════════════════

/// Endpoints and limits for the remote hospital lookup.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub geocode_url: String,
    pub poi_url: String,
    pub user_agent: String,
    pub geocode_timeout: Duration,
    pub poi_timeout: Duration,
    pub radius_m: u32,
    pub max_results: usize,
    pub unnamed_policy: UnnamedPoiPolicy,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            geocode_url: NOMINATIM_SEARCH_URL.to_string(),
            poi_url: OVERPASS_INTERPRETER_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            geocode_timeout: GEOCODE_TIMEOUT,
            poi_timeout: POI_TIMEOUT,
            radius_m: POI_RADIUS_M,
            max_results: MAX_HOSPITALS,
            unnamed_policy: UnnamedPoiPolicy::Skip,
        }
    }
}

impl LookupConfig {
    /// Point both lookup stages at a single base URL (stub servers in tests).
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            geocode_url: format!("{base}/search"),
            poi_url: format!("{base}/api/interpreter"),
            ..Self::default()
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Service configuration
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid bind address '{value}': {reason}")]
    InvalidBindAddr { value: String, reason: String },
}

/// Process-wide settings for the HTTP service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    pub model_path: PathBuf,
    pub reports_dir: PathBuf,
    pub lookup: LookupConfig,
}

impl ServiceConfig {
    /// Defaults, overridden by `CHESTCARE_BIND`, `CHESTCARE_MODEL` and
    /// `CHESTCARE_REPORTS_DIR` when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind = std::env::var("CHESTCARE_BIND").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = parse_bind_addr(&bind)?;

        let model_path = std::env::var_os("CHESTCARE_MODEL")
            .map(PathBuf::from)
            .unwrap_or_else(classifier_model_path);
        let reports_dir = std::env::var_os("CHESTCARE_REPORTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(reports_dir);

        Ok(Self {
            bind_addr,
            model_path,
            reports_dir,
            lookup: LookupConfig::default(),
        })
    }
}

fn parse_bind_addr(value: &str) -> Result<SocketAddr, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|e: std::net::AddrParseError| ConfigError::InvalidBindAddr {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_ends_with_app_name() {
        assert!(app_data_dir().ends_with("ChestCare"));
    }

    #[test]
    fn reports_and_models_under_app_data() {
        let app = app_data_dir();
        assert!(reports_dir().starts_with(&app));
        assert!(models_dir().starts_with(&app));
        assert!(classifier_model_path().starts_with(models_dir()));
    }

    #[test]
    fn user_agent_identifies_caller() {
        assert!(USER_AGENT.starts_with("chestcare/"));
    }

    #[test]
    fn lookup_defaults_match_constants() {
        let cfg = LookupConfig::default();
        assert_eq!(cfg.geocode_timeout, Duration::from_secs(10));
        assert_eq!(cfg.poi_timeout, Duration::from_secs(25));
        assert_eq!(cfg.radius_m, 20_000);
        assert_eq!(cfg.max_results, 5);
        assert_eq!(cfg.unnamed_policy, UnnamedPoiPolicy::Skip);
    }

    #[test]
    fn base_url_override_strips_trailing_slash() {
        let cfg = LookupConfig::with_base_url("http://127.0.0.1:9000/");
        assert_eq!(cfg.geocode_url, "http://127.0.0.1:9000/search");
        assert_eq!(cfg.poi_url, "http://127.0.0.1:9000/api/interpreter");
    }

    #[test]
    fn bind_addr_parses() {
        let addr = parse_bind_addr(" 0.0.0.0:8080 ").unwrap();
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn bad_bind_addr_rejected() {
        let err = parse_bind_addr("localhost").unwrap_err();
        assert!(err.to_string().contains("localhost"));
    }
}
