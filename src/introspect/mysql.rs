use mysql::prelude::Queryable;
use mysql::{Conn, OptsBuilder, Value};
use tracing::{error, info, trace};

use super::{MetadataSource, TableFilter};
use crate::config::ConnectionSettings;
use crate::prelude::{GormgenError, RawColumn, Table};

/// MySQL metadata source backed by one connection held for the whole run
pub struct MysqlSource {
    conn: Conn,
}

impl MysqlSource {
    pub fn new(conn: Conn) -> Self {
        Self { conn }
    }

    /// Open and verify a connection
    pub fn connect(settings: &ConnectionSettings) -> Result<Self, GormgenError> {
        info!(connection = ?settings.redacted_dsn(), "Connecting to MySQL");

        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(settings.host.clone()))
            .tcp_port(settings.port)
            .user(Some(settings.user.clone()))
            .pass(Some(settings.password.clone()))
            .db_name(Some(settings.database.clone()));

        let mut conn = Conn::new(opts).map_err(|e| {
            error!(connection = ?settings.redacted_dsn(), error = ?e, "Failed to connect");
            GormgenError::Connection(format!("{}: {}", settings.redacted_dsn(), e))
        })?;

        conn.query_drop("SELECT 1").map_err(|e| {
            error!(error = ?e, "Connection check failed");
            GormgenError::Connection(format!("{}: {}", settings.redacted_dsn(), e))
        })?;

        info!("Connected to database");
        Ok(Self::new(conn))
    }
}

impl MetadataSource for MysqlSource {
    fn query_tables(
        &mut self,
        schema: &str,
        filter: &TableFilter,
    ) -> Result<Vec<Table>, GormgenError> {
        trace!(schema = ?schema, filter = ?filter, "Querying tables");

        let mut sql = String::from(
            r#"
            SELECT TABLE_NAME, TABLE_COMMENT
            FROM INFORMATION_SCHEMA.TABLES
            WHERE TABLE_SCHEMA = ?"#,
        );
        let mut params: Vec<Value> = vec![schema.into()];

        if let Some(include) = &filter.include {
            let placeholders = vec!["?"; include.len()].join(", ");
            sql.push_str(&format!(" AND TABLE_NAME IN ({})", placeholders));
            params.extend(include.iter().map(|name| Value::from(name.as_str())));
        }
        sql.push_str(" ORDER BY TABLE_NAME");

        self.conn
            .exec_map(
                sql,
                params,
                |(name, comment): (String, Option<String>)| {
                    Table::new(name, comment.unwrap_or_default())
                },
            )
            .map_err(|e| {
                error!(schema = ?schema, error = ?e, "Failed to query tables");
                GormgenError::Introspection {
                    schema: schema.to_string(),
                    message: format!("Failed to query tables: {}", e),
                }
            })
    }

    fn query_columns(&mut self, schema: &str, table: &str) -> Result<Vec<RawColumn>, GormgenError> {
        trace!(schema = ?schema, table = ?table, "Querying columns");

        let sql = r#"
            SELECT
                COLUMN_NAME,
                COLUMN_TYPE,
                COLUMN_COMMENT,
                IS_NULLABLE,
                COLUMN_KEY,
                EXTRA,
                COLUMN_DEFAULT
            FROM INFORMATION_SCHEMA.COLUMNS
            WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
            ORDER BY ORDINAL_POSITION
        "#;

        #[allow(clippy::type_complexity)]
        let rows: Vec<(
            String,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
        )> = self.conn.exec(sql, (schema, table)).map_err(|e| {
            error!(schema = ?schema, table = ?table, error = ?e, "Failed to query columns");
            GormgenError::Introspection {
                schema: schema.to_string(),
                message: format!("Failed to query columns for table '{}': {}", table, e),
            }
        })?;

        Ok(rows
            .into_iter()
            .map(|(name, data_type, comment, is_nullable, column_key, extra, default_value)| {
                RawColumn::from_metadata(
                    name,
                    data_type,
                    comment,
                    is_nullable,
                    column_key,
                    extra,
                    default_value,
                )
            })
            .collect())
    }

    fn query_primary_keys(
        &mut self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<String>, GormgenError> {
        trace!(schema = ?schema, table = ?table, "Querying primary key");

        let sql = r#"
            SELECT COLUMN_NAME
            FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE
            WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? AND CONSTRAINT_NAME = 'PRIMARY'
            ORDER BY ORDINAL_POSITION
        "#;

        self.conn.exec(sql, (schema, table)).map_err(|e| {
            error!(schema = ?schema, table = ?table, error = ?e, "Failed to query primary key");
            GormgenError::Introspection {
                schema: schema.to_string(),
                message: format!("Failed to query primary key for table '{}': {}", table, e),
            }
        })
    }
}
