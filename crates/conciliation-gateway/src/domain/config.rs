//! Gateway configuration with validation.
//!
//! Built once at startup and shared read-only afterwards. An optional TOML
//! file named by `CONFIG_FILE` supplies the base settings; environment
//! variables are layered on top. Secrets and sheet names only ever come from
//! the environment, and missing required variables abort startup.
//!
//! ```toml
//! [http]
//! host = "127.0.0.1"
//! port = 8080
//!
//! [auth]
//! trusted_origin = "https://console.olivinha.site"
//! cookie_domain = ".olivinha.site"
//! session_ttl = "12h"
//!
//! [sheets]
//! backend = "google"
//! credentials_path = "/etc/olivia/credentials.json"
//! ```

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Origin trusted for CSRF checks when `APP_ORIGIN` is unset
pub const DEFAULT_TRUSTED_ORIGIN: &str = "https://console.olivinha.site";

/// Session lifetime; the cookies share it as their max-age
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Variable naming the optional TOML config file
pub const CONFIG_FILE_VAR: &str = "CONFIG_FILE";

/// Variables that must be present and non-blank
const REQUIRED_ENV_VARS: &[&str] = &[
    "SHEET_SPREADSHEET_ID",
    "ADMIN_USER",
    "ADMIN_PASS",
    "JWT_SECRET",
    "SHEET_ES",
    "SHEET_DIF",
    "SHEET_REJ",
];

/// Main gateway configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP server configuration
    pub http: HttpConfig,
    /// Session and CSRF configuration
    pub auth: AuthConfig,
    /// Spreadsheet store configuration
    pub sheets: SheetsConfig,
}

impl GatewayConfig {
    /// Load configuration from the process environment, on top of the
    /// `CONFIG_FILE` TOML file when one is named
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = match std::env::var(CONFIG_FILE_VAR)
            .ok()
            .filter(|path| !path.trim().is_empty())
        {
            Some(path) => Self::load_file(path.trim())?,
            None => Self::default(),
        };
        Self::layered(base, |key| std::env::var(key).ok())
    }

    /// Read a TOML config file. The result is a base for [`Self::layered`].
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse a TOML config document; absent keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from an arbitrary key lookup over the defaults.
    ///
    /// All missing required keys are reported together, sorted.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::layered(Self::default(), lookup)
    }

    /// Overlay looked-up variables on `base`, then validate.
    ///
    /// Required variables always win; optional ones replace the base value
    /// only when set and non-blank.
    pub fn layered<F>(base: Self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let missing = collect_missing(REQUIRED_ENV_VARS, &lookup);
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).unwrap_or_default();
        let optional = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let Self {
            mut http,
            auth: base_auth,
            sheets: base_sheets,
        } = base;
        if let Some(port) = optional("PORT") {
            http.port = port.parse().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                reason: format!("not a port number: {port}"),
            })?;
        }
        if let Some(host) = optional("HOST") {
            http.host = host.parse().map_err(|_| ConfigError::Invalid {
                var: "HOST",
                reason: format!("not an IP address: {host}"),
            })?;
        }

        let auth = AuthConfig {
            // Credentials are compared verbatim, only the presence check trims.
            admin_username: lookup("ADMIN_USER").unwrap_or_default(),
            admin_password: lookup("ADMIN_PASS").unwrap_or_default(),
            jwt_secret: lookup("JWT_SECRET").unwrap_or_default(),
            trusted_origin: optional("APP_ORIGIN").unwrap_or(base_auth.trusted_origin),
            cookie_domain: optional("COOKIE_DOMAIN").or(base_auth.cookie_domain),
            // Secure unless explicitly switched off.
            cookie_secure: match lookup("COOKIE_SECURE").as_deref() {
                Some("false") => false,
                Some(_) => true,
                None => base_auth.cookie_secure,
            },
            session_ttl: base_auth.session_ttl,
        };

        let backend = match optional("SHEETS_BACKEND").as_deref() {
            None => base_sheets.backend,
            Some("google") => SheetsBackend::Google,
            Some("memory") => SheetsBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "SHEETS_BACKEND",
                    reason: format!("unknown backend: {other}"),
                })
            }
        };

        let sheets = SheetsConfig {
            backend,
            spreadsheet_id: get("SHEET_SPREADSHEET_ID"),
            es_sheet: get("SHEET_ES"),
            dif_sheet: get("SHEET_DIF"),
            rej_sheet: get("SHEET_REJ"),
            credentials_path: optional("GOOGLE_APPLICATION_CREDENTIALS")
                .map(PathBuf::from)
                .unwrap_or(base_sheets.credentials_path),
            api_base: optional("SHEETS_API_BASE").unwrap_or(base_sheets.api_base),
        };

        let config = Self { http, auth, sheets };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::EmptySecret);
        }

        if self.auth.admin_username.is_empty() || self.auth.admin_password.is_empty() {
            return Err(ConfigError::MissingAdminIdentity);
        }

        if !is_bare_origin(&self.auth.trusted_origin) {
            return Err(ConfigError::InvalidOrigin(self.auth.trusted_origin.clone()));
        }

        if self.auth.session_ttl.as_secs() == 0 {
            return Err(ConfigError::ZeroTtl);
        }

        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 8080)
    pub port: u16,
    /// Max request body size in bytes
    pub max_body_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8080,
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Session credential and cookie configuration
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// The single administrative identity
    #[serde(skip)]
    pub admin_username: String,
    #[serde(skip)]
    pub admin_password: String,
    /// Symmetric signing secret for session credentials
    #[serde(skip)]
    pub jwt_secret: String,
    /// Scheme and host allowed as `Origin` on mutating requests
    pub trusted_origin: String,
    /// Shared cookie domain, host-only cookies when unset
    pub cookie_domain: Option<String>,
    /// Mark cookies `Secure`
    pub cookie_secure: bool,
    /// Credential lifetime and cookie max-age
    #[serde(with = "humantime_serde")]
    pub session_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_username: String::new(),
            admin_password: String::new(),
            jwt_secret: String::new(),
            trusted_origin: DEFAULT_TRUSTED_ORIGIN.to_string(),
            cookie_domain: None,
            cookie_secure: true,
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("admin_username", &self.admin_username)
            .field("admin_password", &"<redacted>")
            .field("jwt_secret", &"<redacted>")
            .field("trusted_origin", &self.trusted_origin)
            .field("cookie_domain", &self.cookie_domain)
            .field("cookie_secure", &self.cookie_secure)
            .field("session_ttl", &self.session_ttl)
            .finish()
    }
}

/// Which sheet store the binary wires in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetsBackend {
    #[default]
    Google,
    Memory,
}

/// Spreadsheet store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    pub backend: SheetsBackend,
    #[serde(skip)]
    pub spreadsheet_id: String,
    /// Bank statement entries (candidates)
    #[serde(skip)]
    pub es_sheet: String,
    /// Expected future entries carrying an installment id
    #[serde(skip)]
    pub dif_sheet: String,
    /// Rejected DIF rows
    #[serde(skip)]
    pub rej_sheet: String,
    /// Service account key file
    pub credentials_path: PathBuf,
    pub api_base: String,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            backend: SheetsBackend::Google,
            spreadsheet_id: String::new(),
            es_sheet: "ES".to_string(),
            dif_sheet: "DIF".to_string(),
            rej_sheet: "REJ".to_string(),
            credentials_path: PathBuf::from("credentials.json"),
            api_base: "https://sheets.googleapis.com/v4".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing or empty required env vars: {}", .0.join(", "))]
    Missing(Vec<String>),

    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("failed to read {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("failed to parse config file: {0}")]
    Parse(String),

    #[error("signing secret cannot be empty")]
    EmptySecret,

    #[error("admin username and password are required")]
    MissingAdminIdentity,

    #[error("trusted origin must be scheme://host without a path: {0}")]
    InvalidOrigin(String),

    #[error("session ttl cannot be 0")]
    ZeroTtl,
}

fn collect_missing<F>(names: &[&str], lookup: &F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut missing: Vec<String> = names
        .iter()
        .copied()
        .filter(|name| lookup(*name).map_or(true, |value| value.trim().is_empty()))
        .map(str::to_string)
        .collect();
    missing.sort();
    missing.dedup();
    missing
}

fn is_bare_origin(origin: &str) -> bool {
    let Some((scheme, rest)) = origin.split_once("://") else {
        return false;
    };
    matches!(scheme, "http" | "https") && !rest.is_empty() && !rest.contains('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("SHEET_SPREADSHEET_ID", "sheet-123"),
            ("ADMIN_USER", "admin"),
            ("ADMIN_PASS", "hunter2"),
            ("JWT_SECRET", "s3cret"),
            ("SHEET_ES", "ES"),
            ("SHEET_DIF", "DIF"),
            ("SHEET_REJ", "REJ"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<GatewayConfig, ConfigError> {
        GatewayConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults_applied() {
        let config = load(&base_env()).unwrap();
        assert_eq!(config.auth.trusted_origin, DEFAULT_TRUSTED_ORIGIN);
        assert!(config.auth.cookie_secure);
        assert_eq!(config.auth.cookie_domain, None);
        assert_eq!(config.auth.session_ttl, DEFAULT_SESSION_TTL);
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.sheets.backend, SheetsBackend::Google);
        assert_eq!(config.sheets.credentials_path, PathBuf::from("credentials.json"));
    }

    #[test]
    fn test_missing_vars_reported_sorted() {
        let mut env = base_env();
        env.remove("JWT_SECRET");
        env.insert("ADMIN_PASS", "   ");

        let err = load(&env).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Missing(vec!["ADMIN_PASS".to_string(), "JWT_SECRET".to_string()])
        );
        assert!(err.to_string().contains("ADMIN_PASS, JWT_SECRET"));
    }

    #[test]
    fn test_cookie_secure_requires_explicit_opt_out() {
        let mut env = base_env();
        env.insert("COOKIE_SECURE", "0");
        assert!(load(&env).unwrap().auth.cookie_secure);

        env.insert("COOKIE_SECURE", "FALSE");
        assert!(load(&env).unwrap().auth.cookie_secure);

        env.insert("COOKIE_SECURE", "false");
        assert!(!load(&env).unwrap().auth.cookie_secure);
    }

    #[test]
    fn test_optional_overrides() {
        let mut env = base_env();
        env.insert("APP_ORIGIN", "  https://app.example.com ");
        env.insert("COOKIE_DOMAIN", ".example.com");
        env.insert("PORT", "9090");
        env.insert("SHEETS_BACKEND", "memory");

        let config = load(&env).unwrap();
        assert_eq!(config.auth.trusted_origin, "https://app.example.com");
        assert_eq!(config.auth.cookie_domain.as_deref(), Some(".example.com"));
        assert_eq!(config.http.port, 9090);
        assert_eq!(config.sheets.backend, SheetsBackend::Memory);
    }

    #[test]
    fn test_invalid_port_rejected() {
        let mut env = base_env();
        env.insert("PORT", "eighty");
        assert!(matches!(
            load(&env),
            Err(ConfigError::Invalid { var: "PORT", .. })
        ));
    }

    #[test]
    fn test_origin_with_path_rejected() {
        let mut env = base_env();
        env.insert("APP_ORIGIN", "https://app.example.com/");
        assert!(matches!(load(&env), Err(ConfigError::InvalidOrigin(_))));

        env.insert("APP_ORIGIN", "app.example.com");
        assert!(matches!(load(&env), Err(ConfigError::InvalidOrigin(_))));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = load(&base_env()).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("s3cret"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_toml_document() {
        let config = GatewayConfig::from_toml_str(
            r#"
            [http]
            host = "127.0.0.1"
            port = 9000

            [auth]
            cookie_domain = ".olivinha.site"
            cookie_secure = false
            session_ttl = "12h"

            [sheets]
            backend = "memory"
            "#,
        )
        .unwrap();

        assert_eq!(config.http.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.http.port, 9000);
        assert_eq!(config.http.max_body_bytes, 64 * 1024);
        assert_eq!(config.auth.session_ttl, Duration::from_secs(12 * 60 * 60));
        assert_eq!(config.auth.cookie_domain.as_deref(), Some(".olivinha.site"));
        assert!(!config.auth.cookie_secure);
        assert_eq!(config.auth.trusted_origin, DEFAULT_TRUSTED_ORIGIN);
        assert_eq!(config.sheets.backend, SheetsBackend::Memory);
    }

    #[test]
    fn test_toml_rejects_bad_duration() {
        let err = GatewayConfig::from_toml_str("[auth]\nsession_ttl = \"soon\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_toml_never_supplies_secrets() {
        let config = GatewayConfig::from_toml_str(
            "[auth]\njwt_secret = \"from-file\"\nadmin_password = \"from-file\"\n",
        )
        .unwrap();
        assert!(config.auth.jwt_secret.is_empty());
        assert!(config.auth.admin_password.is_empty());
    }

    #[test]
    fn test_env_layered_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            b"[http]\nport = 9000\n\n[auth]\nsession_ttl = \"2h\"\ncookie_secure = false\n",
        )
        .unwrap();
        let base = GatewayConfig::load_file(file.path()).unwrap();

        let env = base_env();
        let config =
            GatewayConfig::layered(base.clone(), |key| env.get(key).map(|v| v.to_string()))
                .unwrap();
        assert_eq!(config.http.port, 9000);
        assert_eq!(config.auth.session_ttl, Duration::from_secs(2 * 60 * 60));
        assert!(!config.auth.cookie_secure);
        assert_eq!(config.auth.jwt_secret, "s3cret");

        let mut env = base_env();
        env.insert("PORT", "7000");
        env.insert("COOKIE_SECURE", "true");
        let config =
            GatewayConfig::layered(base, |key| env.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.http.port, 7000);
        assert!(config.auth.cookie_secure);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = GatewayConfig::load_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut config = load(&base_env()).unwrap();
        config.auth.session_ttl = Duration::ZERO;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTtl));
    }
}
