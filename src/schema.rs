//! Schema data structures
//!
//! These types represent database schema information and form the contract
//! between introspection (produces) and code generation (consumes).

use crate::typemap::{build_annotation, map_type, Annotation, GoType};

/// An introspected database schema
#[derive(Debug, Clone)]
pub struct Schema {
    pub name: String,
    pub tables: Vec<Table>,
}

/// Database table
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub comment: String,
    pub columns: Vec<Column>,
    /// Column names that form the primary key (in key ordinal order)
    pub primary_key: Vec<String>,
}

impl Table {
    /// A table with only its name and comment; columns and keys are loaded later
    pub fn new(name: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: comment.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
        }
    }

    /// Get primary key columns in key order
    pub fn primary_key_columns(&self) -> Vec<&Column> {
        self.primary_key
            .iter()
            .filter_map(|pk_name| self.columns.iter().find(|col| &col.name == pk_name))
            .collect()
    }
}

/// Column metadata exactly as the metadata store reports it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawColumn {
    pub name: String,
    pub data_type: String,
    pub comment: String,
    pub is_nullable: bool,
    pub is_primary_key: bool,
    pub is_auto_increment: bool,
    pub default_value: String,
}

impl RawColumn {
    /// Interpret the textual flags of an information_schema COLUMNS row
    pub fn from_metadata(
        name: String,
        data_type: Option<String>,
        comment: Option<String>,
        is_nullable: Option<String>,
        column_key: Option<String>,
        extra: Option<String>,
        default_value: Option<String>,
    ) -> Self {
        Self {
            name,
            data_type: data_type.unwrap_or_default(),
            comment: comment.unwrap_or_default(),
            is_nullable: is_nullable.as_deref() == Some("YES"),
            is_primary_key: column_key.as_deref() == Some("PRI"),
            is_auto_increment: extra
                .as_deref()
                .is_some_and(|extra| extra.to_lowercase().contains("auto_increment")),
            default_value: default_value.unwrap_or_default(),
        }
    }
}

/// A table column with its resolved Go type and struct tag annotation
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data_type: String,
    pub comment: String,
    pub is_nullable: bool,
    pub is_primary_key: bool,
    pub is_auto_increment: bool,
    pub default_value: String,
    pub go_type: GoType,
    pub annotation: Annotation,
}

impl From<RawColumn> for Column {
    fn from(raw: RawColumn) -> Self {
        let go_type = map_type(&raw.data_type, raw.is_nullable);
        let annotation = build_annotation(&raw);
        Self {
            name: raw.name,
            data_type: raw.data_type,
            comment: raw.comment,
            is_nullable: raw.is_nullable,
            is_primary_key: raw.is_primary_key,
            is_auto_increment: raw.is_auto_increment,
            default_value: raw.default_value,
            go_type,
            annotation,
        }
    }
}
