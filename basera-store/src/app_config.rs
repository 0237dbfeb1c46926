use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub media: MediaConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
    #[serde(default = "default_otp_ttl")]
    pub otp_ttl_minutes: i64,
}

fn default_otp_ttl() -> i64 {
    15
}

#[derive(Debug, Deserialize, Clone)]
pub struct MediaConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Root folder under which per-listing folders are created.
    #[serde(default = "default_media_folder")]
    pub folder: String,
}

fn default_media_folder() -> String {
    "basera".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    /// "console" logs codes instead of sending; "smtp" delivers for real.
    #[serde(default = "default_mail_mode")]
    pub mode: String,
    #[serde(default)]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub smtp_username: String,
    #[serde(default)]
    pub smtp_password: String,
    #[serde(default = "default_mail_from")]
    pub from: String,
}

fn default_mail_mode() -> String {
    "console".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_mail_from() -> String {
    "Basera <no-reply@basera.in>".to_string()
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file
            // Default to 'development' env
            // Note that this file is _optional_
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of BASERA)
            // Eg.. `BASERA__SERVER__PORT=9000` would set the server port
            .add_source(config::Environment::with_prefix("BASERA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
