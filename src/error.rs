use std::path::PathBuf;

use thiserror::Error;

/// gormgen errors
#[derive(Error, Debug)]
pub enum GormgenError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to connect to database: {0}")]
    Connection(String),

    #[error("Failed to create output directory '{}': {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to introspect schema '{schema}': {message}")]
    Introspection { schema: String, message: String },

    #[error("Code generation failed for table '{table}': {message}")]
    CodeGen { table: String, message: String },

    #[error("Failed to write '{}': {source}", path.display())]
    Emit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GormgenError {
    /// Whether this error ends the whole run rather than a single table
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::CodeGen { .. } | Self::Emit { .. })
    }
}
