//! Field classification heuristics
//!
//! Decides which columns get lookup accessors, which take part in keyword
//! search and which are copied on update. All of it is name/comment/type
//! matching, not real index metadata, so false positives are expected (a
//! `phone_type` column counts as unique, a `paid` column is never updateable).

use crate::schema::Column;
use crate::typemap::BaseType;

/// Name fragments that suggest a column holds unique values
const UNIQUE_NAME_TOKENS: &[&str] = &["username", "email", "phone"];

/// Comment fragments that mark a column as unique
const UNIQUE_COMMENT_MARKERS: &[&str] = &["unique", "唯一"];

/// Audit timestamp columns that are never updated by clients
const AUDIT_TOKENS: &[&str] = &["created_at"];

/// Identifier-like fragment excluded from updates
const IDENTIFIER_TOKEN: &str = "id";

/// Column subsets that drive optional generated methods and routes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification<'a> {
    pub unique: Vec<&'a Column>,
    pub searchable: Vec<&'a Column>,
    pub updateable: Vec<&'a Column>,
}

/// Classify a table's columns, preserving column order in each subset
pub fn classify(columns: &[Column]) -> Classification<'_> {
    Classification {
        unique: columns.iter().filter(|col| is_unique_candidate(col)).collect(),
        searchable: columns.iter().filter(|col| is_searchable(col)).collect(),
        updateable: columns.iter().filter(|col| is_updateable(col)).collect(),
    }
}

/// Whether a column likely holds unique values (login names, contact details)
pub fn is_unique_candidate(column: &Column) -> bool {
    let name = column.name.to_lowercase();
    let comment = column.comment.to_lowercase();

    UNIQUE_NAME_TOKENS.iter().any(|token| name.contains(token))
        || UNIQUE_COMMENT_MARKERS
            .iter()
            .any(|marker| comment.contains(marker))
}

/// Whether a column can take part in a LIKE keyword search
pub fn is_searchable(column: &Column) -> bool {
    column.go_type.base == BaseType::String
}

/// Whether a column is copied from an update request
///
/// Any name containing "id" is excluded, not only key columns.
pub fn is_updateable(column: &Column) -> bool {
    let name = column.name.to_lowercase();

    !column.is_primary_key
        && !AUDIT_TOKENS.iter().any(|token| name.contains(token))
        && !name.contains(IDENTIFIER_TOKEN)
}
