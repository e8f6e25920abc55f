//! Process-wide configuration, collected once from the environment and
//! passed explicitly thereafter (spec.md §9's redesign note for
//! "module-level singletons"), grounded in the teacher's
//! `src/run/config.rs::RuntimeConfig` (typed struct built from env/CLI,
//! injected via constructor) and `src/api/db.rs::ensure_auth_secret`
//! (auto-generated secrets when absent).

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

#[derive(Debug, Clone)]
pub enum StorageBackend {
    Memory,
    File,
}

impl StorageBackend {
    fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "file" => StorageBackend::File,
            _ => StorageBackend::Memory,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub port: u16,
    pub host: String,
    pub base_url: String,
    pub cors_origins: Vec<String>,
    pub rate_limit_window_secs: u64,
    pub rate_limit_max: usize,
    pub enable_logging: bool,
    pub enable_security_headers: bool,
    pub enable_compression: bool,
    pub storage_backend: StorageBackend,
    pub storage_dir: String,
    pub jwt_secret: String,
    pub payment_secret: String,
    /// Gate for the `sim:`-prefixed signature bypass (spec.md §9 Open
    /// Question #1). Forced `false` whenever `RUST_ENV=production`.
    pub allow_simulated_auth: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        let env = |key: &str| std::env::var(key).ok();

        let port = env("HYPRCAT_PORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080);
        let host = env("HYPRCAT_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let base_url =
            env("HYPRCAT_BASE_URL").unwrap_or_else(|| format!("http://localhost:{port}"));
        let cors_origins = env("HYPRCAT_CORS_ORIGINS")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_default();
        let rate_limit_window_secs = env("HYPRCAT_RATE_LIMIT_WINDOW")
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);
        let rate_limit_max = env("HYPRCAT_RATE_LIMIT_MAX")
            .and_then(|v| v.parse().ok())
            .unwrap_or(120);
        let enable_logging = env("HYPRCAT_ENABLE_LOGGING")
            .map(|v| v != "0" && v.to_ascii_lowercase() != "false")
            .unwrap_or(true);
        let enable_security_headers = env("HYPRCAT_ENABLE_SECURITY_HEADERS")
            .map(|v| v != "0" && v.to_ascii_lowercase() != "false")
            .unwrap_or(true);
        let enable_compression = env("HYPRCAT_ENABLE_COMPRESSION")
            .map(|v| v == "1" || v.to_ascii_lowercase() == "true")
            .unwrap_or(false);
        let storage_backend = env("HYPRCAT_STORAGE_BACKEND")
            .map(|v| StorageBackend::parse(&v))
            .unwrap_or(StorageBackend::Memory);
        let storage_dir = env("HYPRCAT_STORAGE_DIR").unwrap_or_else(|| "./data".to_string());
        let jwt_secret = env("HYPRCAT_JWT_SECRET").unwrap_or_else(generate_secret);
        let payment_secret = env("HYPRCAT_PAYMENT_SECRET").unwrap_or_else(generate_secret);

        let is_production = env("RUST_ENV").is_some_and(|v| v.eq_ignore_ascii_case("production"));
        let allow_simulated_auth = if is_production {
            false
        } else {
            env("HYPRCAT_ALLOW_SIMULATED_AUTH")
                .map(|v| v != "0" && v.to_ascii_lowercase() != "false")
                .unwrap_or(true)
        };

        Self {
            port,
            host,
            base_url,
            cors_origins,
            rate_limit_window_secs,
            rate_limit_max,
            enable_logging,
            enable_security_headers,
            enable_compression,
            storage_backend,
            storage_dir,
            jwt_secret,
            payment_secret,
            allow_simulated_auth,
        }
    }

    /// A config suited to tests: in-memory storage, simulated auth allowed,
    /// fixed secrets so repeated runs are deterministic.
    pub fn for_tests() -> Self {
        Self {
            port: 0,
            host: "127.0.0.1".to_string(),
            base_url: "http://localhost".to_string(),
            cors_origins: Vec::new(),
            rate_limit_window_secs: 60,
            rate_limit_max: 1000,
            enable_logging: false,
            enable_security_headers: true,
            enable_compression: false,
            storage_backend: StorageBackend::Memory,
            storage_dir: "./data".to_string(),
            jwt_secret: "test-jwt-secret".to_string(),
            payment_secret: "test-payment-secret".to_string(),
            allow_simulated_auth: true,
        }
    }
}

fn generate_secret() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
