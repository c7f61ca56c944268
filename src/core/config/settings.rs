use super::parsing::{
    env_flag, env_optional, env_or_default, parse_cors_origins, parse_environment,
    parse_extensions, parse_number,
};
use super::secret::SecretFile;
use super::types::{
    AdminSettings, ApiSettings, AttachmentSettings, ConfigError, CorsSettings, DatabaseSettings,
    LearningSettings, RuntimeSettings, SecuritySettings, ServerSettings, Settings,
    TelemetrySettings,
};

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("LEARNPATH_HOST", "0.0.0.0");
        let port = env_or_default("LEARNPATH_PORT", "8000");

        let environment = parse_environment(
            env_optional("LEARNPATH_ENV").or_else(|| env_optional("ENVIRONMENT")),
        );
        let strict_config =
            env_flag("LEARNPATH_STRICT_CONFIG", false) || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "Learnpath API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let api_v1_str = env_or_default("API_V1_STR", "/api/v1");

        let secret_key = match env_optional("SECRET_KEY") {
            Some(value) => value,
            None => SecretFile::next_to_manifest().load_or_create(),
        };
        let access_token_expire_minutes = parse_number(
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            env_or_default("ACCESS_TOKEN_EXPIRE_MINUTES", "10080"),
        )?;
        let algorithm = env_or_default("ALGORITHM", "HS256");

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port = parse_number("POSTGRES_PORT", env_or_default("POSTGRES_PORT", "5432"))?;
        let postgres_user = env_or_default("POSTGRES_USER", "learnpath");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "learnpath_db");
        let database_url = env_optional("DATABASE_URL");
        let max_connections =
            parse_number("DATABASE_MAX_CONNECTIONS", env_or_default("DATABASE_MAX_CONNECTIONS", "20"))?;

        let enforce_lock_state = env_flag("LEARNPATH_ENFORCE_LOCKS", true);
        let allowed_extensions = parse_extensions(env_optional("ALLOWED_ATTACHMENT_EXTENSIONS"));

        let first_superuser_email =
            env_or_default("FIRST_SUPERUSER_EMAIL", "admin@learnpath.local");
        let first_superuser_password = env_or_default("FIRST_SUPERUSER_PASSWORD", "");

        let log_level = env_or_default("LEARNPATH_LOG_LEVEL", "info");
        let json = env_flag("LEARNPATH_LOG_JSON", false);
        let prometheus_enabled = env_flag("PROMETHEUS_ENABLED", false);

        let settings = Self {
            server: ServerSettings::parse(host, port)?,
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, api_v1_str },
            security: SecuritySettings { secret_key, access_token_expire_minutes, algorithm },
            cors: CorsSettings { origins: cors_origins },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
                max_connections,
            },
            learning: LearningSettings { enforce_lock_state },
            attachments: AttachmentSettings { allowed_extensions },
            admin: AdminSettings { first_superuser_email, first_superuser_password },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn security(&self) -> &SecuritySettings {
        &self.security
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn learning(&self) -> &LearningSettings {
        &self.learning
    }

    pub(crate) fn attachments(&self) -> &AttachmentSettings {
        &self.attachments
    }

    pub(crate) fn admin(&self) -> &AdminSettings {
        &self.admin
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.attachments.allowed_extensions.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "ALLOWED_ATTACHMENT_EXTENSIONS",
                value: String::from("<empty>"),
            });
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "DATABASE_MAX_CONNECTIONS",
                value: "0".to_string(),
            });
        }

        if !self.api.api_v1_str.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "API_V1_STR",
                value: self.api.api_v1_str.clone(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.database.database_url.is_none() && self.database.postgres_password.is_empty() {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }
        if self.admin.first_superuser_password.is_empty() {
            return Err(ConfigError::MissingSecret("FIRST_SUPERUSER_PASSWORD"));
        }

        Ok(())
    }
}
