use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub gate: GateConfig,
    pub security: SecurityConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// When unset the server runs against the in-memory store.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    pub lookup_timeout_ms: u64,
    pub root_workspace_id: Uuid,
    /// Optional JSON file replacing the default dashboard route table.
    pub routes_file: Option<String>,
    /// Optional JSON seed for the in-memory store used when no database is set.
    pub seed_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_file_count: usize,
    pub max_file_size_bytes: u64,
    pub timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("WSGATE_PORT").or_else(|_| env::var("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Gate overrides
        if let Ok(v) = env::var("GATE_LOOKUP_TIMEOUT_MS") {
            self.gate.lookup_timeout_ms = v.parse().unwrap_or(self.gate.lookup_timeout_ms);
        }
        if let Ok(v) = env::var("GATE_ROOT_WORKSPACE_ID") {
            self.gate.root_workspace_id = v.parse().unwrap_or(self.gate.root_workspace_id);
        }
        if let Ok(v) = env::var("GATE_ROUTES_FILE") {
            self.gate.routes_file = Some(v);
        }
        if let Ok(v) = env::var("GATE_SEED_FILE") {
            self.gate.seed_file = Some(v);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Upload overrides
        if let Ok(v) = env::var("UPLOAD_MAX_FILE_COUNT") {
            self.upload.max_file_count = v.parse().unwrap_or(self.upload.max_file_count);
        }
        if let Ok(v) = env::var("UPLOAD_MAX_FILE_SIZE_BYTES") {
            self.upload.max_file_size_bytes = v.parse().unwrap_or(self.upload.max_file_size_bytes);
        }
        if let Ok(v) = env::var("UPLOAD_TIMEOUT_SECS") {
            self.upload.timeout_secs = v.parse().unwrap_or(self.upload.timeout_secs);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
                connection_timeout: 30,
            },
            gate: GateConfig {
                lookup_timeout_ms: 5_000,
                root_workspace_id: Uuid::nil(),
                routes_file: None,
                seed_file: None,
            },
            security: SecurityConfig {
                jwt_secret: "development-secret".to_string(),
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:7803".to_string()],
            },
            upload: UploadConfig::default(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 8080 },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            gate: GateConfig {
                lookup_timeout_ms: 2_000,
                root_workspace_id: Uuid::nil(),
                routes_file: None,
                seed_file: None,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            upload: UploadConfig::default(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 8080 },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            gate: GateConfig {
                lookup_timeout_ms: 1_000,
                root_workspace_id: Uuid::nil(),
                routes_file: None,
                seed_file: None,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            upload: UploadConfig::default(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_count: 10,
            max_file_size_bytes: 50 * 1024 * 1024, // 50MB
            timeout_secs: 120,
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}
