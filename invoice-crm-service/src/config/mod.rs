use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone)]
pub struct CrmConfig {
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub store: StoreBackend,
    pub mode: DeploymentMode,
    pub http: HttpConfig,
    pub crm: CrmRules,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Prefix for the API routes, e.g. `/api`. Empty mounts them at the root.
    pub api_prefix: String,
}

#[derive(Debug, Clone)]
pub struct CrmRules {
    /// Reject invoices whose company id does not resolve. Off by default.
    pub verify_invoice_company: bool,
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongodb,
    Memory,
}

/// How the process hands requests to the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentMode {
    /// Bind a TCP listener and serve until shutdown.
    Server,
    /// Expose the router to an external invoker without binding.
    Handler,
}

impl CrmConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common = core_config::Config::load()?;
        Self::load_from(common, |key| env::var(key).ok())
    }

    /// Applies the CRM variables, read through `lookup`, on top of `common`.
    pub fn load_from<F>(mut common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_prod = lookup("ENVIRONMENT").as_deref() == Some("prod");
        let var = |key: &str, default: Option<&str>| get_env(&lookup, key, default, is_prod);

        if let Some(port) = lookup("PORT") {
            common.port = port.parse().map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Invalid PORT '{}': {}", port, e))
            })?;
        }

        let uri = match lookup("MONGODB_URI").or_else(|| lookup("MONGO_DB")) {
            Some(uri) => uri,
            None => var("MONGODB_URI", Some("mongodb://localhost:27017"))?,
        };

        Ok(CrmConfig {
            common,
            mongodb: MongoConfig {
                uri,
                database: var("MONGODB_DATABASE", Some("invoiceCRM"))?,
            },
            store: var("STORE_BACKEND", Some("mongodb"))?
                .parse()
                .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
            mode: var("DEPLOYMENT_MODE", Some("server"))?
                .parse()
                .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
            http: HttpConfig {
                api_prefix: normalize_prefix(&var("API_PREFIX", Some("/api"))?),
            },
            crm: CrmRules {
                verify_invoice_company: parse_flag(
                    "VERIFY_INVOICE_COMPANY",
                    &var("VERIFY_INVOICE_COMPANY", Some("false"))?,
                )?,
            },
            telemetry: TelemetryConfig {
                log_level: var("LOG_LEVEL", Some("info"))?,
                otlp_endpoint: lookup("OTLP_ENDPOINT").filter(|s| !s.is_empty()),
            },
        })
    }

    /// In-memory configuration for tests and embedding: memory store,
    /// handler mode, random port.
    pub fn in_memory() -> Self {
        CrmConfig {
            common: core_config::Config { port: 0 },
            mongodb: MongoConfig {
                uri: "mongodb://localhost:27017".to_string(),
                database: "invoiceCRM".to_string(),
            },
            store: StoreBackend::Memory,
            mode: DeploymentMode::Handler,
            http: HttpConfig {
                api_prefix: "/api".to_string(),
            },
            crm: CrmRules {
                verify_invoice_company: false,
            },
            telemetry: TelemetryConfig {
                log_level: "info".to_string(),
                otlp_endpoint: None,
            },
        }
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(StoreBackend::Mongodb),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(format!("Invalid store backend: {}", s)),
        }
    }
}

impl std::str::FromStr for DeploymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "server" => Ok(DeploymentMode::Server),
            "handler" => Ok(DeploymentMode::Handler),
            _ => Err(format!("Invalid deployment mode: {}", s)),
        }
    }
}

impl std::fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeploymentMode::Server => write!(f, "server"),
            DeploymentMode::Handler => write!(f, "handler"),
        }
    }
}

/// `api`, `/api/` and `/api` all become `/api`; `/` and empty become empty.
pub fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, AppError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => Err(AppError::ConfigError(anyhow::anyhow!(
            "{} must be a boolean, got '{}'",
            key,
            other
        ))),
    }
}

fn get_env<F>(lookup: &F, key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => Ok(val),
        None => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load_with(vars: &[(&str, &str)], common_port: u16) -> Result<CrmConfig, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CrmConfig::load_from(core_config::Config { port: common_port }, |key| {
            vars.get(key).cloned()
        })
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = load_with(&[], core_config::Config::default().port).unwrap();

        assert_eq!(config.common.port, 5000);
        assert_eq!(config.mongodb.uri, "mongodb://localhost:27017");
        assert_eq!(config.mongodb.database, "invoiceCRM");
        assert_eq!(config.store, StoreBackend::Mongodb);
        assert_eq!(config.mode, DeploymentMode::Server);
        assert_eq!(config.http.api_prefix, "/api");
        assert!(!config.crm.verify_invoice_company);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.telemetry.otlp_endpoint.is_none());
    }

    #[test]
    fn port_variable_overrides_common_port() {
        // 8081 stands in for APP__PORT, already applied to the common config
        let config = load_with(&[("PORT", "9000")], 8081).unwrap();
        assert_eq!(config.common.port, 9000);

        let config = load_with(&[], 8081).unwrap();
        assert_eq!(config.common.port, 8081);

        assert!(load_with(&[("PORT", "not-a-port")], 8081).is_err());
    }

    #[test]
    fn mongo_db_is_an_alias_for_the_uri() {
        let config = load_with(&[("MONGO_DB", "mongodb://alias:27017")], 5000).unwrap();
        assert_eq!(config.mongodb.uri, "mongodb://alias:27017");

        let config = load_with(
            &[
                ("MONGODB_URI", "mongodb://primary:27017"),
                ("MONGO_DB", "mongodb://alias:27017"),
            ],
            5000,
        )
        .unwrap();
        assert_eq!(config.mongodb.uri, "mongodb://primary:27017");
    }

    #[test]
    fn production_requires_every_variable() {
        let err = load_with(&[("ENVIRONMENT", "prod")], 5000).unwrap_err();
        assert!(err.to_string().contains("MONGODB_URI"));

        let config = load_with(
            &[
                ("ENVIRONMENT", "prod"),
                ("MONGODB_URI", "mongodb://db:27017"),
                ("MONGODB_DATABASE", "crm"),
                ("STORE_BACKEND", "mongodb"),
                ("DEPLOYMENT_MODE", "server"),
                ("API_PREFIX", "/api"),
                ("VERIFY_INVOICE_COMPANY", "true"),
                ("LOG_LEVEL", "warn"),
            ],
            5000,
        )
        .unwrap();
        assert_eq!(config.mongodb.database, "crm");
        assert!(config.crm.verify_invoice_company);
    }

    #[test]
    fn overrides_are_applied() {
        let config = load_with(
            &[
                ("STORE_BACKEND", "memory"),
                ("DEPLOYMENT_MODE", "handler"),
                ("API_PREFIX", "v1/"),
                ("OTLP_ENDPOINT", "http://collector:4317"),
            ],
            5000,
        )
        .unwrap();

        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.mode, DeploymentMode::Handler);
        assert_eq!(config.http.api_prefix, "/v1");
        assert_eq!(
            config.telemetry.otlp_endpoint.as_deref(),
            Some("http://collector:4317")
        );
    }

    #[test]
    fn prefix_normalization() {
        assert_eq!(normalize_prefix("/api"), "/api");
        assert_eq!(normalize_prefix("api/"), "/api");
        assert_eq!(normalize_prefix("/v1/crm/"), "/v1/crm");
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix(""), "");
    }

    #[test]
    fn store_backend_parsing() {
        assert_eq!("mongodb".parse::<StoreBackend>(), Ok(StoreBackend::Mongodb));
        assert_eq!("Memory".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert!("redis".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn deployment_mode_parsing() {
        assert_eq!("server".parse::<DeploymentMode>(), Ok(DeploymentMode::Server));
        assert_eq!("HANDLER".parse::<DeploymentMode>(), Ok(DeploymentMode::Handler));
        assert!("lambda".parse::<DeploymentMode>().is_err());
        assert_eq!(DeploymentMode::Handler.to_string(), "handler");
    }

    #[test]
    fn flag_parsing() {
        assert!(parse_flag("X", "true").unwrap());
        assert!(parse_flag("X", "1").unwrap());
        assert!(!parse_flag("X", "off").unwrap());
        assert!(parse_flag("X", "maybe").is_err());
    }

    #[test]
    fn in_memory_config_uses_memory_store() {
        let config = CrmConfig::in_memory();
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.mode, DeploymentMode::Handler);
        assert_eq!(config.http.api_prefix, "/api");
        assert!(!config.crm.verify_invoice_company);
    }
}
