//! # gormgen
//!
//! Generate Go data access layers from MySQL schemas
//!
//! This crate provides a CLI tool and library for introspecting a MySQL schema
//! and generating GORM models, services and gin routers for each table.

pub mod classify;
pub mod codegen;
pub mod config;
pub mod emit;
pub mod error;
pub mod introspect;
pub mod naming;
pub mod pipeline;
pub mod schema;
pub mod typemap;

pub mod prelude {
    pub use crate::codegen::{Artifact, GoRenderer, LayerConfig, Renderer, ResolvedTableModel};
    pub use crate::config::{ConnectionSettings, Overrides, Settings};
    pub use crate::emit::{FsSink, Sink};
    pub use crate::error::GormgenError;
    pub use crate::introspect::{MetadataSource, TableFilter};
    pub use crate::pipeline::{Pipeline, Report, RunState, TableOutcome};
    pub use crate::schema::{Column, RawColumn, Schema, Table};
    pub use crate::typemap::{GoType, TagOptions};
}

#[cfg(feature = "mysql")]
pub use introspect::MysqlSource;
