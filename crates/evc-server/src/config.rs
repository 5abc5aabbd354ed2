//! Loading and validation of the server's environment-sourced configuration.

use anyhow::{Context, Result};
use config::Environment;

/// Complete configuration for the HTTP server and its collaborators.
#[derive(Clone, Debug)]
pub struct Config {
    host: String,
    port: u16,
    jwt_secret: String,
    turn_seconds: f64,
    db_backend: String,
    db_path: String,
    firebase_credentials: Option<String>,
    groq_api_key: String,
    groq_analyzer_model: String,
    groq_chat_model: String,
    google_client_id: Option<String>,
    frontend_origin: Option<String>,
    rate_limit_requests_per_minute: u32,
}

impl Config {
    /// Loads configuration from the process environment (`.env` included).
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(Environment::default().try_parsing(true))
            .build()
            .context("failed to build configuration")?;

        let host = settings
            .get_string("HOST")
            .unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = settings
            .get_int("PORT")
            .map(|value| value as u16)
            .unwrap_or(8080);

        let jwt_secret = settings.get_string("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using an insecure development default");
            "evc-dev-secret-change-in-production".to_string()
        });

        let turn_seconds = settings
            .get_float("TURN_SECONDS")
            .unwrap_or(300.0);

        let db_backend = settings
            .get_string("DB_BACKEND")
            .unwrap_or_else(|_| "sqlite".to_string());
        let db_path = settings
            .get_string("DB_PATH")
            .unwrap_or_else(|_| "evc.db".to_string());
        let firebase_credentials = settings.get_string("FIREBASE_CREDENTIALS").ok();

        let groq_api_key = settings.get_string("GROQ_API_KEY").unwrap_or_default();
        let groq_analyzer_model = settings
            .get_string("GROQ_ANALYZER_MODEL")
            .unwrap_or_else(|_| "llama-3.1-8b-instant".to_string());
        let groq_chat_model = settings
            .get_string("GROQ_CHAT_MODEL")
            .unwrap_or_else(|_| "llama-3.3-70b-versatile".to_string());

        let google_client_id = settings.get_string("GOOGLE_CLIENT_ID").ok();
        let frontend_origin = settings.get_string("FRONTEND_ORIGIN").ok();

        let rate_limit_requests_per_minute = settings
            .get_int("RATE_LIMIT_REQUESTS_PER_MINUTE")
            .map(|value| value.max(1) as u32)
            .unwrap_or(120);

        Ok(Self {
            host,
            port,
            jwt_secret,
            turn_seconds,
            db_backend,
            db_path,
            firebase_credentials,
            groq_api_key,
            groq_analyzer_model,
            groq_chat_model,
            google_client_id,
            frontend_origin,
            rate_limit_requests_per_minute,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub fn turn_seconds(&self) -> f64 {
        self.turn_seconds
    }

    pub fn db_backend(&self) -> &str {
        &self.db_backend
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    pub fn firebase_credentials(&self) -> Option<&str> {
        self.firebase_credentials.as_deref()
    }

    pub fn groq_api_key(&self) -> &str {
        &self.groq_api_key
    }

    pub fn groq_analyzer_model(&self) -> &str {
        &self.groq_analyzer_model
    }

    pub fn groq_chat_model(&self) -> &str {
        &self.groq_chat_model
    }

    pub fn google_client_id(&self) -> Option<&str> {
        self.google_client_id.as_deref()
    }

    pub fn frontend_origin(&self) -> Option<&str> {
        self.frontend_origin.as_deref()
    }

    pub fn rate_limit_requests_per_minute(&self) -> u32 {
        self.rate_limit_requests_per_minute
    }
}
