//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `AQUAMON_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `AQUAMON_` override YAML values
//! 3. **DATABASE_URL** - Special case: overrides `database_url` if set
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `AQUAMON_SESSION__COOKIE_NAME=session` sets the `session.cookie_name` field.
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use aquamon::config::{Args, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Parse CLI arguments
//! let args = Args::parse();
//!
//! // Load configuration from file and environment
//! let config = Config::load(&args)?;
//!
//! println!("Server will bind to {}:{}", config.host, config.port);
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! # Override server port
//! AQUAMON_PORT=8080
//!
//! # Set database connection (preferred method)
//! DATABASE_URL="sqlite://data/aquamon.db"
//!
//! # Override nested values
//! AQUAMON_SESSION__COOKIE_SECURE=false
//! AQUAMON_PASSWORD__MIN_LENGTH=12
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::Error;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "AQUAMON_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines to catch config errors before deployment.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// This is the root configuration structure loaded from YAML and environment variables.
/// All fields have sensible defaults defined in the `Default` implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// SQLite connection string (e.g., "sqlite://aquamon.db")
    pub database_url: String,
    /// Session cookie configuration
    pub session: SessionConfig,
    /// Password validation and hashing configuration
    pub password: PasswordConfig,
    /// CORS configuration for browser clients
    pub cors: CorsConfig,
    /// Initial admin maintainer (created on startup if the email is absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_admin: Option<InitialAdminConfig>,
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Session timeout duration (cookie Max-Age)
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Cookie name for the bearer token
    pub cookie_name: String,
    /// Set Secure flag on cookies (HTTPS only)
    pub cookie_secure: bool,
    /// SameSite cookie attribute ("Strict", "Lax", or "None")
    pub cookie_same_site: String,
}

/// Password validation rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordConfig {
    /// Minimum password length
    pub min_length: usize,
    /// Maximum password length
    pub max_length: usize,
    /// Argon2 memory cost in KiB (default: 19456 KiB = 19 MB, secure for production)
    pub argon2_memory_kib: u32,
    /// Argon2 iterations (default: 2, secure for production)
    pub argon2_iterations: u32,
    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

/// CORS (Cross-Origin Resource Sharing) configuration.
///
/// The session rides on a cookie, so browser clients need `allow_credentials`
/// and explicit origins (a wildcard origin cannot be combined with
/// credentials).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests ("*" for any, not valid with credentials)
    pub allowed_origins: Vec<String>,
    /// Allow credentials (cookies) in CORS requests
    pub allow_credentials: bool,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
}

/// Initial admin maintainer created at startup when configured.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InitialAdminConfig {
    /// Email address for the admin account
    pub email: String,
    /// Display name for the admin account
    pub name: String,
    /// Password for the admin account
    pub password: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            database_url: "sqlite://aquamon.db".to_string(),
            session: SessionConfig::default(),
            password: PasswordConfig::default(),
            cors: CorsConfig::default(),
            initial_admin: None,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(7 * 24 * 60 * 60), // 7 days
            cookie_name: "auth_token".to_string(),
            cookie_secure: true,
            cookie_same_site: "None".to_string(),
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            // Secure defaults for production (Argon2id RFC recommendations)
            argon2_memory_kib: 19456, // 19 MB
            argon2_iterations: 2,
            argon2_parallelism: 1,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:5173".to_string()], // Development frontend (Vite)
            allow_credentials: true,
            max_age: Some(3600), // Cache preflight for 1 hour
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.port == 0 {
            return Err(Error::Internal {
                operation: "Config validation: port cannot be 0".to_string(),
            });
        }

        if self.database_url.is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: database_url cannot be empty".to_string(),
            });
        }

        // Validate password requirements
        if self.password.min_length > self.password.max_length {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: Invalid password configuration: min_length ({}) cannot be greater than max_length ({})",
                    self.password.min_length, self.password.max_length
                ),
            });
        }

        if self.password.min_length < 1 {
            return Err(Error::Internal {
                operation: "Config validation: Invalid password configuration: min_length must be at least 1".to_string(),
            });
        }

        if self.password.argon2_iterations < 1 || self.password.argon2_parallelism < 1 {
            return Err(Error::Internal {
                operation: "Config validation: Argon2 iterations and parallelism must be at least 1".to_string(),
            });
        }

        // Argon2 requires at least 8 KiB of memory per lane
        if self.password.argon2_memory_kib < 8 * self.password.argon2_parallelism {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: Argon2 memory ({} KiB) is too low for parallelism {}",
                    self.password.argon2_memory_kib, self.password.argon2_parallelism
                ),
            });
        }

        if !["Strict", "Lax", "None"]
            .iter()
            .any(|v| v.eq_ignore_ascii_case(&self.session.cookie_same_site))
        {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: Invalid cookie_same_site value '{}'. Use 'Strict', 'Lax', or 'None'.",
                    self.session.cookie_same_site
                ),
            });
        }

        // Validate CORS configuration
        if self.cors.allowed_origins.is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: CORS allowed_origins cannot be empty. Add at least one allowed origin.".to_string(),
            });
        }

        // Validate that wildcard is not used with credentials
        let has_wildcard = self.cors.allowed_origins.iter().any(|origin| origin == "*");
        if has_wildcard && self.cors.allow_credentials {
            return Err(Error::Internal {
                operation: "Config validation: CORS cannot use wildcard origin '*' with allow_credentials=true. Specify explicit origins."
                    .to_string(),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values
            .merge(Env::prefixed("AQUAMON_").split("__"))
            // Common DATABASE_URL pattern
            .merge(Env::raw().only(&["DATABASE_URL"]))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
