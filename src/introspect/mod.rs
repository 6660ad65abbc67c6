//! Database introspection
//!
//! This module builds the [`Schema`] model from information_schema style
//! metadata. The raw queries live behind [`MetadataSource`] so each supported
//! driver only has to answer three questions; type resolution happens here.

use tracing::{debug, info, trace};

use crate::prelude::{Column, GormgenError, RawColumn, Schema, Table};

/// Explicit list of tables to generate
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TableFilter {
    /// Only include these tables (if Some)
    pub include: Option<Vec<String>>,
}

impl TableFilter {
    /// Parse a comma-separated table list; blank input selects every table
    pub fn parse(tables: &str) -> Self {
        let names: Vec<String> = tables
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            include: (!names.is_empty()).then_some(names),
        }
    }

    /// Check if a table should be included
    pub fn should_include(&self, table_name: &str) -> bool {
        match &self.include {
            Some(include) => include.iter().any(|t| t == table_name),
            None => true,
        }
    }
}

/// Raw metadata queries a database driver must answer
pub trait MetadataSource {
    /// Tables in `schema` (name and comment only), in the store's natural order
    fn query_tables(
        &mut self,
        schema: &str,
        filter: &TableFilter,
    ) -> Result<Vec<Table>, GormgenError>;

    /// Columns of one table, ordered by physical position
    fn query_columns(&mut self, schema: &str, table: &str) -> Result<Vec<RawColumn>, GormgenError>;

    /// Primary key column names of one table, ordered by key ordinal
    fn query_primary_keys(&mut self, schema: &str, table: &str) -> Result<Vec<String>, GormgenError>;
}

/// List tables without their columns or keys
pub fn list_tables<S: MetadataSource + ?Sized>(
    source: &mut S,
    schema: &str,
    filter: &TableFilter,
) -> Result<Vec<Table>, GormgenError> {
    let tables = source.query_tables(schema, filter)?;
    debug!(schema = ?schema, count = ?tables.len(), "Found tables");
    Ok(tables)
}

/// List a table's columns with their Go types and annotations resolved
pub fn list_columns<S: MetadataSource + ?Sized>(
    source: &mut S,
    schema: &str,
    table: &str,
) -> Result<Vec<Column>, GormgenError> {
    let columns: Vec<Column> = source
        .query_columns(schema, table)?
        .into_iter()
        .map(Column::from)
        .collect();

    for col in &columns {
        trace!(
            table = ?table,
            column = ?col.name,
            data_type = ?col.data_type,
            go_type = %col.go_type,
            is_nullable = ?col.is_nullable,
            "Resolved column"
        );
    }

    Ok(columns)
}

/// List a table's primary key columns in key order
///
/// Composite keys come back complete, but generated code only addresses rows
/// by a single id.
pub fn list_primary_keys<S: MetadataSource + ?Sized>(
    source: &mut S,
    schema: &str,
    table: &str,
) -> Result<Vec<String>, GormgenError> {
    let primary_key = source.query_primary_keys(schema, table)?;
    trace!(table = ?table, primary_key = ?primary_key, "Found primary key");
    Ok(primary_key)
}

/// Load every selected table with its columns and primary key
///
/// Any failing query aborts the whole introspection.
pub fn introspect<S: MetadataSource + ?Sized>(
    source: &mut S,
    schema_name: &str,
    filter: &TableFilter,
) -> Result<Schema, GormgenError> {
    info!(schema = ?schema_name, "Starting schema introspection");

    let mut tables = list_tables(source, schema_name, filter)?;
    for table in &mut tables {
        debug!(table = ?table.name, "Introspecting table");
        table.columns = list_columns(source, schema_name, &table.name)?;
        table.primary_key = list_primary_keys(source, schema_name, &table.name)?;

        if table.primary_key.len() > 1 {
            debug!(
                table = ?table.name,
                primary_key = ?table.primary_key,
                "Composite primary key; generated lookups use a single id"
            );
        }
    }

    info!(
        schema = ?schema_name,
        tables = ?tables.len(),
        "Schema introspection complete"
    );

    Ok(Schema {
        name: schema_name.to_string(),
        tables,
    })
}

// Feature-gated database implementations
#[cfg(feature = "mysql")]
mod mysql;

#[cfg(feature = "mysql")]
pub use mysql::MysqlSource;
