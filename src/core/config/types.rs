use thiserror::Error;

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(super) server: ServerSettings,
    pub(super) runtime: RuntimeSettings,
    pub(super) api: ApiSettings,
    pub(super) security: SecuritySettings,
    pub(super) cors: CorsSettings,
    pub(super) database: DatabaseSettings,
    pub(super) learning: LearningSettings,
    pub(super) attachments: AttachmentSettings,
    pub(super) admin: AdminSettings,
    pub(super) telemetry: TelemetrySettings,
}

#[derive(Debug, Clone)]
pub(crate) struct ServerSettings {
    pub(super) host: String,
    pub(super) port: u16,
}

#[derive(Debug, Clone)]
pub(crate) struct ApiSettings {
    pub(crate) project_name: String,
    pub(crate) version: String,
    pub(crate) api_v1_str: String,
}

#[derive(Debug, Clone)]
pub(crate) struct SecuritySettings {
    pub(crate) secret_key: String,
    pub(crate) access_token_expire_minutes: u64,
    pub(crate) algorithm: String,
}

#[derive(Debug, Clone)]
pub(crate) struct CorsSettings {
    pub(crate) origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct DatabaseSettings {
    pub(crate) postgres_server: String,
    pub(crate) postgres_port: u16,
    pub(crate) postgres_user: String,
    pub(crate) postgres_password: String,
    pub(crate) postgres_db: String,
    pub(crate) database_url: Option<String>,
    pub(crate) max_connections: u32,
}

/// Progression policy knobs.
#[derive(Debug, Clone)]
pub(crate) struct LearningSettings {
    /// Reject completions and quiz submissions for content that is still locked.
    pub(crate) enforce_lock_state: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct AttachmentSettings {
    pub(crate) allowed_extensions: Vec<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct AdminSettings {
    pub(crate) first_superuser_email: String,
    pub(crate) first_superuser_password: String,
}

#[derive(Debug, Clone)]
pub(crate) struct TelemetrySettings {
    pub(crate) log_level: String,
    pub(crate) json: bool,
    pub(crate) prometheus_enabled: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct RuntimeSettings {
    pub(crate) environment: Environment,
    pub(crate) strict_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Environment {
    Development,
    Production,
    Staging,
    Test,
}

impl Environment {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Staging => "staging",
            Self::Test => "test",
        }
    }

    pub(super) fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("LEARNPATH_HOST must not be empty")]
    EmptyHost,
    #[error("LEARNPATH_PORT must be a port number between 1 and 65535, got {0:?}")]
    InvalidPort(String),
    #[error("{field} has an invalid value {value:?}")]
    InvalidValue { field: &'static str, value: String },
    #[error("BACKEND_CORS_ORIGINS is not a valid JSON list: {0}")]
    InvalidCors(String),
    #[error("{0} must be set when strict configuration is enabled")]
    MissingSecret(&'static str),
}

impl ServerSettings {
    pub(super) fn parse(host: String, port: String) -> Result<Self, ConfigError> {
        if host.is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        match port.parse::<u16>() {
            Ok(port) if port > 0 => Ok(Self { host, port }),
            _ => Err(ConfigError::InvalidPort(port)),
        }
    }
}

impl DatabaseSettings {
    /// Explicit `DATABASE_URL`, else one assembled from the `POSTGRES_*` parts.
    pub(crate) fn database_url(&self) -> String {
        self.database_url.clone().unwrap_or_else(|| {
            let Self {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                ..
            } = self;
            format!(
                "postgresql://{postgres_user}:{postgres_password}@{postgres_server}:{postgres_port}/{postgres_db}"
            )
        })
    }
}
