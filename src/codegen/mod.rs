//! Code generation
//!
//! This module turns one introspected table into the Go source of its record,
//! service and router layers. Every template of a table is fed the same
//! [`ResolvedTableModel`], which is what keeps cross-layer references in sync.

use serde::Serialize;

use crate::config::Settings;
use crate::prelude::GormgenError;
use crate::typemap::TagOptions;

pub mod go;
pub mod model;

pub use go::GoRenderer;
pub use model::{FieldView, ResolvedTableModel};

/// The generated layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    /// GORM model struct
    Record,
    /// Data access service
    Service,
    /// gin handlers and route registration
    Router,
}

impl Artifact {
    pub fn as_str(self) -> &'static str {
        match self {
            Artifact::Record => "record",
            Artifact::Service => "service",
            Artifact::Router => "router",
        }
    }

    /// File name of this layer's artifact for a table
    pub fn file_name(self, model: &ResolvedTableModel) -> String {
        match self {
            Artifact::Record => format!("{}.go", model.file_stem),
            Artifact::Service => format!("{}_service.go", model.file_stem),
            Artifact::Router => format!("{}_router.go", model.file_stem),
        }
    }

    /// File name of the shared base file of this layer
    pub fn base_file_name(self) -> &'static str {
        "base.go"
    }
}

/// Settings every template sees, besides the table model
#[derive(Debug, Clone, Serialize)]
pub struct LayerConfig {
    /// Go package name of the generated models
    pub package: String,
    pub model_import: String,
    pub service_import: String,
    pub storage_import: String,
    pub soft_delete: bool,
    pub comments: bool,
    #[serde(skip)]
    pub embed_base: bool,
    #[serde(skip)]
    pub tags: TagOptions,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            package: "models".to_string(),
            model_import: String::new(),
            service_import: String::new(),
            storage_import: String::new(),
            soft_delete: true,
            comments: true,
            embed_base: true,
            tags: TagOptions::default(),
        }
    }
}

impl From<&Settings> for LayerConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            package: settings.package.clone(),
            model_import: settings.imports.model.clone(),
            service_import: settings.imports.service.clone(),
            storage_import: settings.imports.storage.clone(),
            soft_delete: settings.options.use_soft_delete,
            comments: settings.options.generate_comments,
            embed_base: settings.options.generate_base_model,
            tags: settings.options.tag_options(),
        }
    }
}

/// Renders generated source text
pub trait Renderer {
    /// Render one table's artifact
    fn render(
        &self,
        artifact: Artifact,
        model: &ResolvedTableModel,
        layer: &LayerConfig,
    ) -> Result<String, GormgenError>;

    /// Render the shared base file of a layer
    fn render_base(&self, artifact: Artifact, layer: &LayerConfig) -> Result<String, GormgenError>;
}
