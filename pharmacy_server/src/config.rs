use std::env;

use chrono::Duration;
use log::*;
use ppg_common::Secret;
use razorpay_tools::RazorpayConfig;

const DEFAULT_PPG_HOST: &str = "127.0.0.1";
const DEFAULT_PPG_PORT: u16 = 8360;
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::hours(24);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// Gateway credentials. Loaded once at startup and injected into the payment flow; nothing reads the
    /// environment after boot.
    pub razorpay: RazorpayConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_PPG_HOST.to_string(),
            port: DEFAULT_PPG_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            razorpay: RazorpayConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("PPG_HOST").ok().unwrap_or_else(|| DEFAULT_PPG_HOST.into());
        let port = env::var("PPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for PPG_PORT. {e} Using the default, {DEFAULT_PPG_PORT}, instead."
                    );
                    DEFAULT_PPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_PPG_PORT);
        let database_url = env::var("PPG_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ PPG_DATABASE_URL is not set. Please set it to the URL for the pharmacy database.");
            String::default()
        });
        let auth = AuthConfig::from_env_or_default();
        let razorpay = RazorpayConfig::new_from_env_or_default();
        Self { host, port, database_url, auth, razorpay }
    }
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The HS256 shared secret used to validate inbound bearer tokens and to sign newly issued ones.
    pub jwt_secret: Secret<String>,
    pub token_lifetime: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { jwt_secret: Secret::default(), token_lifetime: DEFAULT_TOKEN_LIFETIME }
    }
}

impl AuthConfig {
    pub fn from_env_or_default() -> Self {
        let jwt_secret = Secret::new(env::var("PPG_JWT_SECRET").unwrap_or_else(|_| {
            warn!("🪛️ PPG_JWT_SECRET is not set. Tokens signed with the default empty secret are worthless.");
            String::default()
        }));
        let token_lifetime = env::var("PPG_JWT_LIFETIME_HOURS")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Duration::hours)
            .unwrap_or(DEFAULT_TOKEN_LIFETIME);
        Self { jwt_secret, token_lifetime }
    }
}
