//! Output sinks
//!
//! Generated files are handed to a [`Sink`] by layer and file name; the sink
//! decides where they end up.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::codegen::Artifact;
use crate::config::Settings;
use crate::prelude::GormgenError;

/// Destination of generated files
pub trait Sink {
    /// Make sure a layer's output location exists
    fn prepare(&mut self, layer: Artifact) -> Result<(), GormgenError>;

    /// Store one generated file, replacing any previous version
    fn emit(&mut self, layer: Artifact, file_name: &str, contents: &str)
        -> Result<PathBuf, GormgenError>;
}

/// Writes each layer into its own directory
///
/// Files are written in place; a failed write can leave a truncated file
/// behind until the next run overwrites it.
#[derive(Debug, Clone)]
pub struct FsSink {
    pub record_dir: PathBuf,
    pub service_dir: PathBuf,
    pub router_dir: PathBuf,
}

impl FsSink {
    pub fn new(settings: &Settings) -> Self {
        Self {
            record_dir: settings.output.clone(),
            service_dir: settings.service_output.clone(),
            router_dir: settings.router_output.clone(),
        }
    }

    fn dir(&self, layer: Artifact) -> &PathBuf {
        match layer {
            Artifact::Record => &self.record_dir,
            Artifact::Service => &self.service_dir,
            Artifact::Router => &self.router_dir,
        }
    }
}

impl Sink for FsSink {
    fn prepare(&mut self, layer: Artifact) -> Result<(), GormgenError> {
        let dir = self.dir(layer);
        fs::create_dir_all(dir).map_err(|source| GormgenError::OutputDir {
            path: dir.clone(),
            source,
        })?;
        debug!(layer = layer.as_str(), path = ?dir, "Created output directory");
        Ok(())
    }

    fn emit(
        &mut self,
        layer: Artifact,
        file_name: &str,
        contents: &str,
    ) -> Result<PathBuf, GormgenError> {
        let path = self.dir(layer).join(file_name);
        fs::write(&path, contents).map_err(|source| GormgenError::Emit {
            path: path.clone(),
            source,
        })?;
        debug!(layer = layer.as_str(), path = ?path, "Wrote file");
        Ok(path)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn sink(root: &std::path::Path) -> FsSink {
        FsSink {
            record_dir: root.join("internal/models"),
            service_dir: root.join("internal/services"),
            router_dir: root.join("internal/router"),
        }
    }

    #[test]
    fn test_prepare_creates_nested_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let mut sink = sink(tmp.path());

        sink.prepare(Artifact::Record).unwrap();
        sink.prepare(Artifact::Router).unwrap();

        assert!(tmp.path().join("internal/models").is_dir());
        assert!(tmp.path().join("internal/router").is_dir());
        assert!(!tmp.path().join("internal/services").exists());
    }

    #[test]
    fn test_emit_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let mut sink = sink(tmp.path());
        sink.prepare(Artifact::Service).unwrap();

        sink.emit(Artifact::Service, "users_service.go", "old").unwrap();
        let path = sink
            .emit(Artifact::Service, "users_service.go", "package services\n")
            .unwrap();

        assert_eq!(path, tmp.path().join("internal/services/users_service.go"));
        assert_eq!(fs::read_to_string(path).unwrap(), "package services\n");
    }

    #[test]
    fn test_emit_into_missing_dir_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let mut sink = sink(tmp.path());

        let err = sink.emit(Artifact::Record, "users.go", "x").unwrap_err();
        assert!(matches!(err, GormgenError::Emit { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_prepare_over_a_file_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("internal");
        fs::write(&blocker, "not a directory").unwrap();
        let mut sink = sink(tmp.path());

        let err = sink.prepare(Artifact::Record).unwrap_err();
        assert!(matches!(err, GormgenError::OutputDir { .. }));
    }
}
