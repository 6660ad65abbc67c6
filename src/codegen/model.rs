use serde::Serialize;

use super::LayerConfig;
use crate::classify::classify;
use crate::naming::{to_delimited, to_type_name, to_variable_name};
use crate::schema::{Column, Table};

/// Columns already declared by the shared `BaseModel`
const BASE_MODEL_COLUMNS: &[&str] = &["id", "created_at", "updated_at"];
const SOFT_DELETE_COLUMN: &str = "deleted_at";

/// One struct field as the templates see it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldView {
    /// Column name
    pub name: String,
    pub go_name: String,
    pub go_type: String,
    /// Struct tag without backticks; empty when tags are disabled
    pub tag: String,
    pub comment: String,
    pub zero_value: String,
    /// Type refers to `time.Time`, directly or through a pointer
    pub uses_time: bool,
    /// The zero value literal refers to the `time` package
    pub zero_value_uses_time: bool,
}

impl FieldView {
    fn new(column: &Column, layer: &LayerConfig) -> Self {
        Self {
            name: column.name.clone(),
            go_name: to_type_name(&column.name),
            go_type: column.go_type.to_string(),
            tag: column.annotation.render(layer.tags),
            comment: column.comment.clone(),
            zero_value: column.go_type.zero_value().to_string(),
            uses_time: column.go_type.uses_time(),
            zero_value_uses_time: column.go_type.zero_value_uses_time(),
        }
    }
}

/// Everything the templates need to render one table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedTableModel {
    pub table_name: String,
    pub comment: String,
    pub type_name: String,
    pub var_name: String,
    /// Delimited table name used for file names and route paths
    pub file_stem: String,
    pub route_path: String,
    pub service_name: String,
    pub service_var_name: String,
    pub handler_name: String,
    pub route_group: String,
    pub embed_base: bool,
    /// Fields declared by the record struct itself
    pub fields: Vec<FieldView>,
    pub unique_fields: Vec<FieldView>,
    pub search_fields: Vec<FieldView>,
    pub updateable_fields: Vec<FieldView>,
    pub record_needs_time: bool,
    pub router_needs_time: bool,
}

impl ResolvedTableModel {
    /// Derive names and field subsets for a table
    ///
    /// With the base model embedded, its columns are not redeclared and the
    /// classified subsets only keep fields the record declares.
    pub fn build(table: &Table, layer: &LayerConfig) -> Self {
        let type_name = to_type_name(&table.name);
        let var_name = to_variable_name(&table.name);
        let file_stem = to_delimited(&table.name);
        let embed_base = layer.embed_base;

        let declared = |column: &Column| !embed_base || !is_base_column(column, layer.soft_delete);
        let views = |columns: Vec<&Column>| -> Vec<FieldView> {
            columns
                .into_iter()
                .filter(|col| declared(*col))
                .map(|col| FieldView::new(col, layer))
                .collect()
        };

        let classes = classify(&table.columns);
        let fields = views(table.columns.iter().collect());
        let unique_fields = views(classes.unique);
        let search_fields = views(classes.searchable);
        let updateable_fields = views(classes.updateable);

        let record_needs_time = fields.iter().any(|f| f.uses_time);
        // the router only names `time` in zero value comparisons
        let router_needs_time = unique_fields
            .iter()
            .chain(&updateable_fields)
            .any(|f| f.zero_value_uses_time);

        Self {
            table_name: table.name.clone(),
            comment: table.comment.clone(),
            service_name: format!("{}Service", type_name),
            handler_name: format!("{}Handler", type_name),
            service_var_name: format!("{}Service", var_name),
            route_group: format!("{}Group", var_name),
            route_path: file_stem.clone(),
            type_name,
            var_name,
            file_stem,
            embed_base,
            fields,
            unique_fields,
            search_fields,
            updateable_fields,
            record_needs_time,
            router_needs_time,
        }
    }
}

fn is_base_column(column: &Column, soft_delete: bool) -> bool {
    let name = column.name.to_lowercase();
    BASE_MODEL_COLUMNS.contains(&name.as_str()) || (soft_delete && name == SOFT_DELETE_COLUMN)
}
