//! Configuration loading
//!
//! Settings come from three layers: command line options, a YAML config file
//! and environment variables (optionally read from a .env file first). Earlier
//! layers win; anything still unset falls back to a default.

use std::path::{Path, PathBuf};
use std::{env, fs};

use serde::Deserialize;
use tracing::{debug, error, trace, warn};

use crate::introspect::TableFilter;
use crate::prelude::GormgenError;
use crate::typemap::TagOptions;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 3306;
const DEFAULT_USER: &str = "root";
const DEFAULT_OUTPUT: &str = "internal/models";
const DEFAULT_PACKAGE: &str = "models";
const SERVICE_DIR: &str = "services";
const ROUTER_DIR: &str = "router";

/// Database connection configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl ConnectionSettings {
    /// Connection description with the password redacted (for logs and errors)
    pub fn redacted_dsn(&self) -> String {
        format!(
            "{}:***@tcp({}:{})/{}",
            self.user, self.host, self.port, self.database
        )
    }
}

/// Import paths written verbatim into generated Go files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportPaths {
    /// Package holding the generated models
    pub model: String,
    /// Package holding the generated services
    pub service: String,
    /// Storage root; services import `<storage>/mysql`
    pub storage: String,
}

/// Switches for optional parts of the generated code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationOptions {
    pub generate_base_model: bool,
    pub use_soft_delete: bool,
    pub generate_json_tags: bool,
    pub generate_gorm_tags: bool,
    pub generate_comments: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            generate_base_model: true,
            use_soft_delete: true,
            generate_json_tags: true,
            generate_gorm_tags: true,
            generate_comments: true,
        }
    }
}

impl GenerationOptions {
    pub fn tag_options(&self) -> TagOptions {
        TagOptions {
            gorm: self.generate_gorm_tags,
            json: self.generate_json_tags,
        }
    }
}

/// Fully resolved generator settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub connection: ConnectionSettings,
    pub output: PathBuf,
    pub package: String,
    pub tables: TableFilter,
    pub generate_service: bool,
    pub generate_router: bool,
    pub service_output: PathBuf,
    pub router_output: PathBuf,
    pub imports: ImportPaths,
    pub options: GenerationOptions,
}

/// Values given on the command line; `None`/`false` means "not given"
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub output: Option<PathBuf>,
    pub package: Option<String>,
    pub tables: Option<String>,
    pub generate_service: bool,
    pub generate_router: bool,
    pub service_output: Option<PathBuf>,
    pub router_output: Option<PathBuf>,
    pub model_import: Option<String>,
    pub service_import: Option<String>,
    pub storage_import: Option<String>,
}

/// YAML configuration file layout
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub database: DatabaseSection,
    pub output: OutputSection,
    pub tables: Option<String>,
    pub options: OptionsSection,
    pub router: LayerSection,
    pub service: LayerSection,
    pub imports: ImportsSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub path: Option<PathBuf>,
    pub package: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OptionsSection {
    pub generate_base_model: Option<bool>,
    pub use_soft_delete: Option<bool>,
    pub generate_json_tags: Option<bool>,
    pub generate_gorm_tags: Option<bool>,
    pub generate_comments: Option<bool>,
    pub generate_router: Option<bool>,
    pub generate_service: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LayerSection {
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImportsSection {
    pub model: Option<String>,
    pub service: Option<String>,
    pub storage: Option<String>,
}

impl FileConfig {
    /// Parse a YAML config document
    pub fn from_yaml(content: &str) -> Result<Self, GormgenError> {
        serde_yaml::from_str(content)
            .map_err(|e| GormgenError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Load the config file if it exists
    pub fn load(path: &Path) -> Result<Option<Self>, GormgenError> {
        if !path.exists() {
            warn!(path = ?path, "Config file not found, using command line options");
            return Ok(None);
        }

        debug!(path = ?path, "Loading config file");
        let content = fs::read_to_string(path).map_err(|e| {
            error!(path = ?path, error = ?e, "Failed to read config file");
            GormgenError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::from_yaml(&content).map(Some)
    }
}

/// Directory next to `output` named `name` (`internal/models` -> `internal/router`)
fn sibling_dir(output: &Path, name: &str) -> PathBuf {
    match output.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl Settings {
    /// Merge command line, config file and environment into final settings
    ///
    /// `env` looks up environment variables; it is a parameter so callers
    /// (and tests) control where they come from.
    pub fn resolve<F>(
        overrides: Overrides,
        file: Option<FileConfig>,
        env: F,
    ) -> Result<Self, GormgenError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = file.unwrap_or_default();
        let env = |key: &str| non_empty(env(key));

        let env_port = match env("DB_PORT") {
            Some(port_str) => Some(port_str.parse::<u16>().map_err(|e| {
                error!(port = ?port_str, error = ?e, "Invalid DB_PORT value");
                GormgenError::Config("DB_PORT must be a valid port number".to_string())
            })?),
            None => None,
        };

        let database = non_empty(overrides.database)
            .or(non_empty(file.database.database))
            .or_else(|| env("DB_NAME"))
            .ok_or_else(|| {
                error!("No database name given");
                GormgenError::Config(
                    "database name is required (--database, config file or DB_NAME)".to_string(),
                )
            })?;

        let connection = ConnectionSettings {
            host: non_empty(overrides.host)
                .or(non_empty(file.database.host))
                .or_else(|| env("DB_HOST"))
                .unwrap_or_else(|| {
                    trace!("Host not set, using default");
                    DEFAULT_HOST.to_string()
                }),
            port: overrides
                .port
                .filter(|port| *port != 0)
                .or(file.database.port.filter(|port| *port != 0))
                .or(env_port)
                .unwrap_or(DEFAULT_PORT),
            user: non_empty(overrides.user)
                .or(non_empty(file.database.user))
                .or_else(|| env("DB_USER"))
                .unwrap_or_else(|| DEFAULT_USER.to_string()),
            password: non_empty(overrides.password)
                .or(non_empty(file.database.password))
                .or_else(|| env("DB_PASSWORD"))
                .unwrap_or_default(),
            database,
        };

        let output = overrides
            .output
            .or(file.output.path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

        let service_output = overrides
            .service_output
            .or(file.service.output)
            .unwrap_or_else(|| sibling_dir(&output, SERVICE_DIR));
        let router_output = overrides
            .router_output
            .or(file.router.output)
            .unwrap_or_else(|| sibling_dir(&output, ROUTER_DIR));

        let defaults = GenerationOptions::default();
        let options = GenerationOptions {
            generate_base_model: file
                .options
                .generate_base_model
                .unwrap_or(defaults.generate_base_model),
            use_soft_delete: file.options.use_soft_delete.unwrap_or(defaults.use_soft_delete),
            generate_json_tags: file
                .options
                .generate_json_tags
                .unwrap_or(defaults.generate_json_tags),
            generate_gorm_tags: file
                .options
                .generate_gorm_tags
                .unwrap_or(defaults.generate_gorm_tags),
            generate_comments: file
                .options
                .generate_comments
                .unwrap_or(defaults.generate_comments),
        };

        let settings = Self {
            connection,
            output,
            package: non_empty(overrides.package)
                .or(non_empty(file.output.package))
                .unwrap_or_else(|| DEFAULT_PACKAGE.to_string()),
            tables: TableFilter::parse(
                &non_empty(overrides.tables)
                    .or(file.tables)
                    .unwrap_or_default(),
            ),
            generate_service: overrides.generate_service
                || file.options.generate_service.unwrap_or(false),
            generate_router: overrides.generate_router
                || file.options.generate_router.unwrap_or(false),
            service_output,
            router_output,
            imports: ImportPaths {
                model: non_empty(overrides.model_import)
                    .or(file.imports.model)
                    .unwrap_or_default(),
                service: non_empty(overrides.service_import)
                    .or(file.imports.service)
                    .unwrap_or_default(),
                storage: non_empty(overrides.storage_import)
                    .or(file.imports.storage)
                    .unwrap_or_default(),
            },
            options,
        };

        for (layer, import) in settings.missing_imports() {
            warn!(
                layer = layer,
                import = import,
                "Import path not set; generated code will not compile"
            );
        }

        debug!(
            connection = ?settings.connection.redacted_dsn(),
            output = ?settings.output,
            package = ?settings.package,
            tables = ?settings.tables,
            "Configuration resolved"
        );

        Ok(settings)
    }

    /// Empty import paths that an enabled layer writes into its imports
    ///
    /// Services import the models and `<storage>/mysql`; routers import the
    /// models and the services.
    pub fn missing_imports(&self) -> Vec<(&'static str, &'static str)> {
        let mut missing = Vec::new();
        if self.generate_service {
            if self.imports.model.is_empty() {
                missing.push(("service", "model"));
            }
            if self.imports.storage.is_empty() {
                missing.push(("service", "storage"));
            }
        }
        if self.generate_router {
            if self.imports.model.is_empty() {
                missing.push(("router", "model"));
            }
            if self.imports.service.is_empty() {
                missing.push(("router", "service"));
            }
        }
        missing
    }

    /// Load a .env file and the config file, then resolve against the process environment
    pub fn load(
        overrides: Overrides,
        config_file: &Path,
        env_file: &Path,
    ) -> Result<Self, GormgenError> {
        if env_file.exists() {
            debug!(path = ?env_file, "Loading environment file");
            dotenvy::from_path(env_file).map_err(|e| {
                error!(path = ?env_file, error = ?e, "Failed to load environment file");
                GormgenError::Config(format!("Failed to load {}: {}", env_file.display(), e))
            })?;
        } else {
            warn!(path = ?env_file, "Environment file not found, using existing environment");
        }

        let file = FileConfig::load(config_file)?;
        Self::resolve(overrides, file, |key| env::var(key).ok())
    }
}
