/// Backend client configuration
use crate::error::{FirebaseError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FirebaseConfig {
    /// Web API key of the project
    pub api_key: String,

    /// Realtime database root, e.g. `https://<project>.firebaseio.com`
    pub database_url: String,

    /// Storage bucket, e.g. `<project>.appspot.com`
    pub storage_bucket: String,

    #[serde(default = "default_identity_url")]
    pub identity_url: String,

    #[serde(default = "default_secure_token_url")]
    pub secure_token_url: String,

    #[serde(default = "default_storage_url")]
    pub storage_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl FirebaseConfig {
    /// Config for a project with the public service endpoints
    pub fn new(
        api_key: impl Into<String>,
        database_url: impl Into<String>,
        storage_bucket: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            database_url: database_url.into(),
            storage_bucket: storage_bucket.into(),
            identity_url: default_identity_url(),
            secure_token_url: default_secure_token_url(),
            storage_url: default_storage_url(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Route every service to one base URL (emulators and tests)
    #[must_use]
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.identity_url = base.to_string();
        self.secure_token_url = base.to_string();
        self.storage_url = base.to_string();
        self.database_url = base.to_string();
        self
    }

    /// Load configuration from `verse.toml` (if present) and environment
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("verse.toml"))
    }

    /// Load configuration from a file (if present) and environment
    ///
    /// Environment variables use the `VERSE_` prefix, e.g.
    /// `VERSE_API_KEY`, `VERSE_DATABASE_URL`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut settings = config::Config::builder();

        if path.exists() {
            settings = settings.add_source(config::File::from(path));
        }

        settings = settings.add_source(
            config::Environment::with_prefix("VERSE")
                .prefix_separator("_")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(FirebaseError::Config("api_key must be set".to_string()));
        }
        if self.storage_bucket.trim().is_empty() {
            return Err(FirebaseError::Config(
                "storage_bucket must be set".to_string(),
            ));
        }

        for (name, value) in [
            ("database_url", &self.database_url),
            ("identity_url", &self.identity_url),
            ("secure_token_url", &self.secure_token_url),
            ("storage_url", &self.storage_url),
        ] {
            let url = url::Url::parse(value)
                .map_err(|e| FirebaseError::Config(format!("{name} is not a valid URL: {e}")))?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(FirebaseError::Config(format!(
                    "{name} must start with http:// or https://"
                )));
            }
        }

        if self.timeout_secs == 0 {
            return Err(FirebaseError::Config(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

fn default_identity_url() -> String {
    "https://identitytoolkit.googleapis.com".to_string()
}

fn default_secure_token_url() -> String {
    "https://securetoken.googleapis.com".to_string()
}

fn default_storage_url() -> String {
    "https://firebasestorage.googleapis.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
