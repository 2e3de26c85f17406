//! Configuration resolution for `OTTclaim`.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Settings file (explicit `--config` path, else `<config dir>/ottclaim/settings.json`)
//! 3. Environment variables (`OTTCLAIM_*`)
//! 4. CLI arguments (applied by the binary, highest priority)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// JWT secret used when nothing else is configured. Only fit for development.
pub const DEV_JWT_SECRET: &str = "dev-secret-change-me";

/// Complete `OTTclaim` configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub fulfillment: FulfillmentConfig,
    pub email: EmailConfig,
    pub whatsapp: WhatsAppConfig,
    pub payment: PaymentConfig,
    pub admin: AdminConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    pub database_path: Option<PathBuf>,
    pub log_level: String,
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
            database_path: None,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

/// `SQLite` pool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub busy_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: 5,
            busy_timeout_secs: 5,
        }
    }
}

/// Claim fulfillment automation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FulfillmentConfig {
    /// Seconds between background batch runs. `0` disables the loop.
    pub automation_interval_secs: u64,
    /// Maximum number of claims handled per batch run.
    pub batch_size: u32,
    /// Hand out a key for any platform when no matching key is left.
    pub allow_any_platform_fallback: bool,
    /// Run the workflow immediately after a payment is verified.
    pub auto_fulfill_on_payment: bool,
}

impl Default for FulfillmentConfig {
    fn default() -> Self {
        Self {
            automation_interval_secs: 60,
            batch_size: 25,
            allow_any_platform_fallback: true,
            auto_fulfill_on_payment: true,
        }
    }
}

/// Transactional email API settings. Email is disabled without `api_url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub from_address: String,
    pub from_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            from_address: "support@ottclaim.local".to_string(),
            from_name: "OTT Rewards".to_string(),
        }
    }
}

/// WhatsApp Cloud API settings. WhatsApp is disabled without a token and
/// phone number id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhatsAppConfig {
    pub api_url: String,
    pub access_token: Option<String>,
    pub phone_number_id: Option<String>,
    pub success_template: String,
    pub failure_template: String,
    pub language_code: String,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            api_url: "https://graph.facebook.com/v19.0".to_string(),
            access_token: None,
            phone_number_id: None,
            success_template: "ott_code_delivered".to_string(),
            failure_template: "ott_claim_failed".to_string(),
            language_code: "en".to_string(),
        }
    }
}

/// Payment gateway settings. Amounts are in minor currency units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentConfig {
    pub api_url: String,
    pub key_id: Option<String>,
    pub key_secret: Option<String>,
    pub processing_fee: i64,
    pub currency: String,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.razorpay.com/v1".to_string(),
            key_id: None,
            key_secret: None,
            processing_fee: 4900,
            currency: "INR".to_string(),
        }
    }
}

/// Admin authentication settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub username: String,
    /// Argon2 PHC string. Admin login is refused while this is unset.
    pub password_hash: Option<String>,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password_hash: None,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_secs: 3600,
        }
    }
}

impl Config {
    /// True while the admin JWT secret is still the development default.
    pub fn uses_dev_jwt_secret(&self) -> bool {
        self.admin.jwt_secret == DEV_JWT_SECRET
    }
}

/// Load configuration with hierarchical resolution.
///
/// An explicit path must exist; the global settings file is optional.
pub fn load_config(explicit_path: Option<&Path>) -> Result<Config> {
    let mut config = match explicit_path {
        Some(path) => load_config_file(path)?,
        None => match global_config_path() {
            Some(path) if path.exists() => load_config_file(&path)?,
            _ => Config::default(),
        },
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    Ok(config)
}

/// Get the global settings file path.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("ottclaim").join("settings.json"))
}

/// Get the default database path.
pub fn database_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("ottclaim").join("claims.db"))
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

/// Apply `OTTCLAIM_*` overrides. `lookup` abstracts the environment so the
/// precedence rules can be exercised without touching process state.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("OTTCLAIM_ADDR") {
        config.server.addr = val;
    }
    if let Some(val) = lookup("OTTCLAIM_DB_PATH") {
        config.server.database_path = Some(PathBuf::from(val));
    }
    if let Some(val) = lookup("OTTCLAIM_LOG_LEVEL") {
        config.server.log_level = val;
    }
    if let Some(val) = lookup("OTTCLAIM_AUTOMATION_INTERVAL_SECS") {
        if let Ok(n) = val.parse() {
            config.fulfillment.automation_interval_secs = n;
        }
    }
    if let Some(val) = lookup("OTTCLAIM_BATCH_SIZE") {
        if let Ok(n) = val.parse() {
            config.fulfillment.batch_size = n;
        }
    }
    if let Some(val) = lookup("OTTCLAIM_EMAIL_API_URL") {
        config.email.api_url = Some(val);
    }
    if let Some(val) = lookup("OTTCLAIM_EMAIL_API_KEY") {
        config.email.api_key = Some(val);
    }
    if let Some(val) = lookup("OTTCLAIM_WHATSAPP_TOKEN") {
        config.whatsapp.access_token = Some(val);
    }
    if let Some(val) = lookup("OTTCLAIM_WHATSAPP_PHONE_NUMBER_ID") {
        config.whatsapp.phone_number_id = Some(val);
    }
    if let Some(val) = lookup("OTTCLAIM_PAYMENT_KEY_ID") {
        config.payment.key_id = Some(val);
    }
    if let Some(val) = lookup("OTTCLAIM_PAYMENT_KEY_SECRET") {
        config.payment.key_secret = Some(val);
    }
    if let Some(val) = lookup("OTTCLAIM_PROCESSING_FEE") {
        if let Ok(n) = val.parse() {
            config.payment.processing_fee = n;
        }
    }
    if let Some(val) = lookup("OTTCLAIM_ADMIN_USERNAME") {
        config.admin.username = val;
    }
    if let Some(val) = lookup("OTTCLAIM_ADMIN_PASSWORD_HASH") {
        config.admin.password_hash = Some(val);
    }
    if let Some(val) = lookup("OTTCLAIM_JWT_SECRET") {
        config.admin.jwt_secret = val;
    }
}
