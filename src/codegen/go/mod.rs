//! Go code generator
//!
//! Renders GORM models, GORM-backed services and gin routers.

use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;
use tracing::trace;

use crate::codegen::{Artifact, LayerConfig, Renderer, ResolvedTableModel};
use crate::error::GormgenError;

/// Go code generator
pub struct GoRenderer {
    env: Environment<'static>,
}

/// Template context of a per-table artifact
#[derive(Serialize)]
struct TableContext<'a> {
    #[serde(flatten)]
    model: &'a ResolvedTableModel,
    #[serde(flatten)]
    layer: &'a LayerConfig,
}

fn template_name(artifact: Artifact) -> &'static str {
    match artifact {
        Artifact::Record => "record",
        Artifact::Service => "service",
        Artifact::Router => "router",
    }
}

fn base_template_name(artifact: Artifact) -> &'static str {
    match artifact {
        Artifact::Record => "base_record",
        Artifact::Service => "base_service",
        Artifact::Router => "base_router",
    }
}

impl GoRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        // Register templates
        env.add_template("record", include_str!("templates/record.go.jinja"))
            .expect("Failed to load record template");
        env.add_template("service", include_str!("templates/service.go.jinja"))
            .expect("Failed to load service template");
        env.add_template("router", include_str!("templates/router.go.jinja"))
            .expect("Failed to load router template");
        env.add_template("base_record", include_str!("templates/base_record.go.jinja"))
            .expect("Failed to load base record template");
        env.add_template("base_service", include_str!("templates/base_service.go.jinja"))
            .expect("Failed to load base service template");
        env.add_template("base_router", include_str!("templates/base_router.go.jinja"))
            .expect("Failed to load base router template");

        Self { env }
    }

    fn render_template<S: Serialize>(
        &self,
        name: &str,
        owner: &str,
        ctx: S,
    ) -> Result<String, GormgenError> {
        let template = self
            .env
            .get_template(name)
            .map_err(|e| GormgenError::CodeGen {
                table: owner.to_string(),
                message: format!("Template error: {}", e),
            })?;

        template.render(ctx).map_err(|e| GormgenError::CodeGen {
            table: owner.to_string(),
            message: format!("Render error in {}: {}", name, e),
        })
    }
}

impl Default for GoRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for GoRenderer {
    fn render(
        &self,
        artifact: Artifact,
        model: &ResolvedTableModel,
        layer: &LayerConfig,
    ) -> Result<String, GormgenError> {
        trace!(table = ?model.table_name, artifact = artifact.as_str(), "Rendering");

        if model.type_name.is_empty() {
            return Err(GormgenError::CodeGen {
                table: model.table_name.clone(),
                message: "Table name does not produce a Go identifier".to_string(),
            });
        }

        if let Some(field) = model.fields.iter().find(|f| f.go_name.is_empty()) {
            return Err(GormgenError::CodeGen {
                table: model.table_name.clone(),
                message: format!("Column '{}' does not produce a Go identifier", field.name),
            });
        }

        let ctx = TableContext { model, layer };
        self.render_template(template_name(artifact), &model.table_name, ctx)
    }

    fn render_base(&self, artifact: Artifact, layer: &LayerConfig) -> Result<String, GormgenError> {
        self.render_template(base_template_name(artifact), base_template_name(artifact), layer)
    }
}
