use athwatch_domain::entities::alert_policy::{AlertConfig, AlertPolicy};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

pub const ENV_BOT_TOKEN: &str = "ATHWATCH_BOT_TOKEN";
pub const ENV_CHAT_ID: &str = "ATHWATCH_CHAT_ID";

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Yahoo,
    Csv,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub run: RunConfig,
    pub alert: AlertSection,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    pub symbols: Vec<String>,
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct AlertSection {
    pub policy: AlertPolicy,
    pub threshold_pct: f64,
    #[serde(default)]
    pub min_candles_since_ath: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub kind: SourceKind,
    #[serde(default = "default_yahoo_base")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_auto_adjust")]
    pub auto_adjust: bool,
    pub dir: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Yahoo,
            base_url: default_yahoo_base(),
            timeout_ms: default_timeout_ms(),
            auto_adjust: default_auto_adjust(),
            dir: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    #[serde(default = "default_telegram_base")]
    pub api_base: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            api_base: default_telegram_base(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    #[serde(default = "default_log_path")]
    pub path: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: default_log_path(),
        }
    }
}

fn default_pause_ms() -> u64 {
    1000
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_auto_adjust() -> bool {
    true
}

fn default_yahoo_base() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_telegram_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_log_path() -> String {
    "ath_alert_log.csv".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramCredentials {
    pub bot_token: String,
    pub chat_id: String,
}

impl Config {
    pub fn validate(&self) -> Result<(), String> {
        if self.run.symbols.is_empty() {
            return Err("run.symbols must list at least one symbol".to_string());
        }
        if let Some(pos) = self.run.symbols.iter().position(|s| s.trim().is_empty()) {
            return Err(format!("run.symbols[{pos}] is blank"));
        }
        if !self.alert.threshold_pct.is_finite() || self.alert.threshold_pct < 0.0 {
            return Err(format!(
                "alert.threshold_pct must be a finite, non-negative percent (got {})",
                self.alert.threshold_pct
            ));
        }
        if self.source.kind == SourceKind::Csv
            && self.source.dir.as_deref().map_or(true, |d| d.trim().is_empty())
        {
            return Err("source.dir is required when source.kind = \"csv\"".to_string());
        }
        Ok(())
    }

    pub fn alert_config(&self) -> AlertConfig {
        AlertConfig {
            policy: self.alert.policy,
            threshold_pct: self.alert.threshold_pct,
            min_candles_since_ath: self.alert.min_candles_since_ath,
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config, String> {
    let (config, _source) = load_config_with_source(path)?;
    Ok(config)
}

pub fn load_config_with_source(path: &Path) -> Result<(Config, String), String> {
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("failed to read config {}: {}", path.display(), err))?;
    let config: Config = toml::from_str(&contents)
        .map_err(|err| format!("failed to parse TOML {}: {}", path.display(), err))?;
    config
        .validate()
        .map_err(|err| format!("invalid config {}: {}", path.display(), err))?;
    Ok((config, contents))
}

/// Short SHA-256 of the raw config text, logged with each run.
pub fn config_fingerprint(source: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let digest = Sha256::digest(source.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0x0f) as usize] as char);
    }
    out
}

pub fn resolve_telegram_credentials(config: &Config) -> Result<TelegramCredentials, String> {
    resolve_telegram_credentials_with(config, |key| std::env::var(key).ok())
}

/// File values win over the environment; blank values count as missing.
pub fn resolve_telegram_credentials_with(
    config: &Config,
    env: impl Fn(&str) -> Option<String>,
) -> Result<TelegramCredentials, String> {
    let pick = |value: Option<&String>, key: &str, field: &str| -> Result<String, String> {
        value
            .filter(|v| !v.trim().is_empty())
            .cloned()
            .or_else(|| env(key).filter(|v| !v.trim().is_empty()))
            .ok_or_else(|| format!("missing telegram.{field} in config and env {key} is not set"))
    };

    Ok(TelegramCredentials {
        bot_token: pick(config.telegram.bot_token.as_ref(), ENV_BOT_TOKEN, "bot_token")?,
        chat_id: pick(config.telegram.chat_id.as_ref(), ENV_CHAT_ID, "chat_id")?,
    })
}
