//! Database type to Go type mapping
//!
//! Column types are matched by substring against an ordered rule list, so more
//! specific patterns must come before the broader ones they contain
//! (`bigint` before `int`, `datetime` before `date`).

use std::fmt;

use crate::naming::to_delimited;
use crate::schema::RawColumn;

/// Go base types the generator emits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Int,
    Int64,
    Float64,
    Time,
    String,
    Bytes,
    Bool,
}

impl BaseType {
    /// Go spelling of the type
    pub fn as_str(self) -> &'static str {
        match self {
            BaseType::Int => "int",
            BaseType::Int64 => "int64",
            BaseType::Float64 => "float64",
            BaseType::Time => "time.Time",
            BaseType::String => "string",
            BaseType::Bytes => "[]byte",
            BaseType::Bool => "bool",
        }
    }

    /// Types that already have a usable "absent" value and are never pointer-wrapped
    pub fn is_nullable_safe(self) -> bool {
        matches!(self, BaseType::String | BaseType::Bytes)
    }
}

/// Ordered (pattern, type) rules; first substring match wins
const TYPE_RULES: &[(&str, BaseType)] = &[
    ("bigint", BaseType::Int64),
    ("int", BaseType::Int),
    ("decimal", BaseType::Float64),
    ("numeric", BaseType::Float64),
    ("float", BaseType::Float64),
    ("double", BaseType::Float64),
    ("datetime", BaseType::Time),
    ("timestamp", BaseType::Time),
    ("date", BaseType::Time),
    ("text", BaseType::String),
    ("varchar", BaseType::String),
    ("char", BaseType::String),
    ("blob", BaseType::Bytes),
    ("bool", BaseType::Bool),
];

/// A resolved Go field type, possibly pointer-wrapped for nullable columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoType {
    pub base: BaseType,
    pub optional: bool,
}

impl GoType {
    /// Go zero value literal used when comparing incoming fields
    pub fn zero_value(&self) -> &'static str {
        if self.optional {
            return "nil";
        }
        match self.base {
            BaseType::String => r#""""#,
            BaseType::Int | BaseType::Int64 => "0",
            BaseType::Float64 => "0.0",
            BaseType::Bool => "false",
            // composite literals must be parenthesized inside an if condition
            BaseType::Time => "(time.Time{})",
            BaseType::Bytes => "nil",
        }
    }

    /// Whether the type needs the `time` package
    pub fn uses_time(&self) -> bool {
        self.base == BaseType::Time
    }

    /// Whether [`GoType::zero_value`] spells out a `time` package literal
    ///
    /// Pointer fields compare against `nil` and need no import.
    pub fn zero_value_uses_time(&self) -> bool {
        self.uses_time() && !self.optional
    }
}

impl fmt::Display for GoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional {
            write!(f, "*{}", self.base.as_str())
        } else {
            f.write_str(self.base.as_str())
        }
    }
}

/// Map a raw column type to its Go type
pub fn map_type(raw_type: &str, is_nullable: bool) -> GoType {
    let lower = raw_type.to_lowercase();

    let base = TYPE_RULES
        .iter()
        .find(|(pattern, _)| lower.contains(pattern))
        .map(|(_, base)| *base)
        .unwrap_or(BaseType::String);

    GoType {
        base,
        optional: is_nullable && !base.is_nullable_safe(),
    }
}

/// Which struct tag families end up in generated code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagOptions {
    pub gorm: bool,
    pub json: bool,
}

impl Default for TagOptions {
    fn default() -> Self {
        Self {
            gorm: true,
            json: true,
        }
    }
}

/// Struct tag contents for one column
///
/// `storage` is the GORM tag body (`column:name;primarykey;...`) and
/// `serialization` the JSON field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub storage: String,
    pub serialization: String,
}

impl Annotation {
    /// Render the Go struct tag, without the surrounding backticks
    ///
    /// Empty when every tag family is disabled.
    pub fn render(&self, options: TagOptions) -> String {
        let mut tags = Vec::with_capacity(2);
        if options.gorm {
            tags.push(format!(r#"gorm:"{}""#, self.storage));
        }
        if options.json {
            tags.push(format!(r#"json:"{}""#, self.serialization));
        }
        tags.join(" ")
    }
}

/// Build the GORM and JSON annotation for a column
pub fn build_annotation(column: &RawColumn) -> Annotation {
    let mut storage = vec![format!("column:{}", column.name)];

    if column.is_primary_key {
        storage.push("primarykey".to_string());
    }

    if column.is_auto_increment {
        storage.push("autoIncrement".to_string());
    }

    if !column.is_nullable {
        storage.push("not null".to_string());
    }

    let lower_type = column.data_type.to_lowercase();
    if lower_type.contains("char") {
        if let Some(size) = extract_size(&lower_type) {
            storage.push(format!("size:{}", size));
        }
    }

    if !column.comment.is_empty() {
        storage.push(format!("comment:{}", column.comment));
    }

    Annotation {
        storage: storage.join(";"),
        serialization: to_delimited(&column.name),
    }
}

/// Extract a `(<digits>)` size suffix like the one in "varchar(255)"
fn extract_size(type_str: &str) -> Option<u32> {
    let start = type_str.find('(')?;
    let end = start + type_str[start..].find(')')?;
    let digits = &type_str[start + 1..end];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|size| *size > 0)
}
