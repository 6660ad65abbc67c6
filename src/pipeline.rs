//! Generation run
//!
//! A run moves through `Idle -> Connected -> TablesLoaded -> Generating -> Done`.
//! Any failure before the per-table loop aborts the run; inside the loop a
//! failing table only loses its remaining artifacts.

use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use crate::codegen::{Artifact, LayerConfig, Renderer, ResolvedTableModel};
use crate::config::{ConnectionSettings, Settings};
use crate::emit::Sink;
use crate::introspect::{introspect, MetadataSource};
use crate::prelude::{GormgenError, Table};

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Connected,
    TablesLoaded,
    Generating,
    Done,
    Aborted,
}

/// What happened to one table
#[derive(Debug)]
pub struct TableOutcome {
    pub table: String,
    /// Files written for this table, in layer order
    pub emitted: Vec<PathBuf>,
    /// The artifact that failed, if any; later layers were skipped
    pub failure: Option<(Artifact, GormgenError)>,
}

impl TableOutcome {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Per-table outcomes of a finished run
#[derive(Debug, Default)]
pub struct Report {
    pub base_files: Vec<PathBuf>,
    pub outcomes: Vec<TableOutcome>,
}

impl Report {
    pub fn succeeded(&self) -> impl Iterator<Item = &TableOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &TableOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn files_written(&self) -> usize {
        self.base_files.len() + self.outcomes.iter().map(|o| o.emitted.len()).sum::<usize>()
    }
}

/// Drives one generation run
pub struct Pipeline<R> {
    settings: Settings,
    layer: LayerConfig,
    renderer: R,
    state: RunState,
}

impl<R: Renderer> Pipeline<R> {
    pub fn new(settings: Settings, renderer: R) -> Self {
        let layer = LayerConfig::from(&settings);
        Self {
            settings,
            layer,
            renderer,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Layers this run generates, in emission order
    pub fn layers(&self) -> Vec<Artifact> {
        let mut layers = vec![Artifact::Record];
        if self.settings.generate_service {
            layers.push(Artifact::Service);
        }
        if self.settings.generate_router {
            layers.push(Artifact::Router);
        }
        layers
    }

    /// Run the generator
    ///
    /// `connect` opens the metadata source, which is dropped when the run ends.
    /// Nothing is written, not even output directories, until the schema has
    /// been loaded.
    pub fn run<S, C, K>(&mut self, connect: C, sink: &mut K) -> Result<Report, GormgenError>
    where
        S: MetadataSource,
        C: FnOnce(&ConnectionSettings) -> Result<S, GormgenError>,
        K: Sink + ?Sized,
    {
        self.state = RunState::Idle;
        let result = self.execute(connect, sink);
        if let Err(e) = &result {
            error!(state = ?self.state, error = %e, "Run aborted");
            self.state = RunState::Aborted;
        }
        result
    }

    fn execute<S, C, K>(&mut self, connect: C, sink: &mut K) -> Result<Report, GormgenError>
    where
        S: MetadataSource,
        C: FnOnce(&ConnectionSettings) -> Result<S, GormgenError>,
        K: Sink + ?Sized,
    {
        let mut source = connect(&self.settings.connection)?;
        self.transition(RunState::Connected);

        let schema = introspect(
            &mut source,
            &self.settings.connection.database,
            &self.settings.tables,
        )?;
        self.transition(RunState::TablesLoaded);

        if schema.tables.is_empty() {
            warn!(schema = ?schema.name, "No tables found after filtering");
        }

        let layers = self.layers();
        for layer in &layers {
            sink.prepare(*layer)?;
        }

        let mut report = Report::default();
        for layer in &layers {
            let code = self.renderer.render_base(*layer, &self.layer)?;
            let path = sink.emit(*layer, layer.base_file_name(), &code)?;
            report.base_files.push(path);
        }
        self.transition(RunState::Generating);

        let report = schema.tables.iter().fold(report, |mut report, table| {
            report.outcomes.push(self.generate_table(table, &layers, sink));
            report
        });

        self.transition(RunState::Done);
        Ok(report)
    }

    fn transition(&mut self, next: RunState) {
        debug!(from = ?self.state, to = ?next, "Run state");
        self.state = next;
    }

    /// Render and emit every layer of one table, stopping at the first failure
    fn generate_table<K: Sink + ?Sized>(
        &self,
        table: &Table,
        layers: &[Artifact],
        sink: &mut K,
    ) -> TableOutcome {
        let model = ResolvedTableModel::build(table, &self.layer);
        let mut outcome = TableOutcome {
            table: table.name.clone(),
            emitted: Vec::new(),
            failure: None,
        };

        for layer in layers {
            let written = self
                .renderer
                .render(*layer, &model, &self.layer)
                .and_then(|code| sink.emit(*layer, &layer.file_name(&model), &code));

            match written {
                Ok(path) => outcome.emitted.push(path),
                Err(e) => {
                    error!(
                        table = ?table.name,
                        layer = layer.as_str(),
                        error = %e,
                        "Generation failed, skipping remaining layers"
                    );
                    outcome.failure = Some((*layer, e));
                    break;
                }
            }
        }

        if outcome.is_success() {
            info!(table = ?table.name, files = ?outcome.emitted.len(), "Generated");
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::GoRenderer;
    use crate::config::{GenerationOptions, ImportPaths};
    use crate::emit::memory::MemorySink;
    use crate::introspect::memory::{MemorySource, MemoryTable};
    use crate::introspect::TableFilter;

    fn settings(tables: &str) -> Settings {
        Settings {
            connection: ConnectionSettings {
                host: "localhost".to_string(),
                port: 3306,
                user: "root".to_string(),
                password: String::new(),
                database: "shop".to_string(),
            },
            output: PathBuf::from("internal/models"),
            package: "models".to_string(),
            tables: TableFilter::parse(tables),
            generate_service: true,
            generate_router: true,
            service_output: PathBuf::from("internal/services"),
            router_output: PathBuf::from("internal/router"),
            imports: ImportPaths {
                model: "example.com/shop/internal/models".to_string(),
                service: "example.com/shop/internal/services".to_string(),
                storage: "example.com/shop/internal/storage".to_string(),
            },
            options: GenerationOptions::default(),
        }
    }

    fn users() -> MemoryTable {
        MemoryTable::new("users")
            .comment("registered users")
            .primary_key("id", "int(11)")
            .column("username", "varchar(50)", false)
            .column("email", "varchar(100)", true)
            .column("created_at", "datetime", true)
    }

    fn orders() -> MemoryTable {
        MemoryTable::new("orders")
            .primary_key("id", "bigint(20)")
            .column("amount", "decimal(10,2)", false)
            .column("quantity", "int(11)", false)
    }

    fn shop() -> MemorySource {
        MemorySource::new(vec![users(), orders(), MemoryTable::new("audit_log")])
    }

    fn connect_to(
        source: MemorySource,
    ) -> impl FnOnce(&ConnectionSettings) -> Result<MemorySource, GormgenError> {
        move |_| Ok(source)
    }

    /// Fails the router of one table, renders everything else normally
    struct FailingRouter {
        inner: GoRenderer,
        table: String,
    }

    impl Renderer for FailingRouter {
        fn render(
            &self,
            artifact: Artifact,
            model: &ResolvedTableModel,
            layer: &LayerConfig,
        ) -> Result<String, GormgenError> {
            if artifact == Artifact::Router && model.table_name == self.table {
                return Err(GormgenError::CodeGen {
                    table: model.table_name.clone(),
                    message: "Render error in router".to_string(),
                });
            }
            self.inner.render(artifact, model, layer)
        }

        fn render_base(
            &self,
            artifact: Artifact,
            layer: &LayerConfig,
        ) -> Result<String, GormgenError> {
            self.inner.render_base(artifact, layer)
        }
    }

    #[test]
    fn test_users_end_to_end() {
        let mut pipeline = Pipeline::new(settings("users"), GoRenderer::new());
        let mut sink = MemorySink::default();

        let report = pipeline.run(connect_to(shop()), &mut sink).unwrap();
        assert_eq!(pipeline.state(), RunState::Done);
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.files_written(), 6);

        let record = sink.file(Artifact::Record, "users.go").unwrap();
        assert!(record.contains("type Users struct"));
        assert!(record.contains("\tBaseModel\n"));
        assert!(record.contains("\tUsername string"));
        assert!(record.contains("\tEmail string"));

        let service = sink.file(Artifact::Service, "users_service.go").unwrap();
        assert!(service.contains("func (s *UsersService) GetByUsername("));
        assert!(service.contains("func (s *UsersService) Search("));

        let router = sink.file(Artifact::Router, "users_router.go").unwrap();
        assert!(router.contains("/search"));
        assert!(router.contains("updateData.Username"));
        assert!(!router.contains("updateData.ID"));
    }

    #[test]
    fn test_filter_loads_only_listed_tables() {
        let mut pipeline = Pipeline::new(settings("users,orders"), GoRenderer::new());
        let mut sink = MemorySink::default();

        let report = pipeline.run(connect_to(shop()), &mut sink).unwrap();
        let tables: Vec<&str> = report.outcomes.iter().map(|o| o.table.as_str()).collect();

        assert_eq!(tables, ["orders", "users"]);
        assert!(sink.file(Artifact::Record, "audit_log.go").is_none());
    }

    #[test]
    fn test_table_without_text_columns_has_no_search() {
        let mut pipeline = Pipeline::new(settings("orders"), GoRenderer::new());
        let mut sink = MemorySink::default();

        pipeline.run(connect_to(shop()), &mut sink).unwrap();

        let service = sink.file(Artifact::Service, "orders_service.go").unwrap();
        assert!(!service.contains("Search("));
        let router = sink.file(Artifact::Router, "orders_router.go").unwrap();
        assert!(!router.contains("search"));
    }

    #[test]
    fn test_router_failure_skips_only_that_artifact() {
        let renderer = FailingRouter {
            inner: GoRenderer::new(),
            table: "orders".to_string(),
        };
        let mut pipeline = Pipeline::new(settings("users,orders"), renderer);
        let mut sink = MemorySink::default();

        let report = pipeline.run(connect_to(shop()), &mut sink).unwrap();
        assert_eq!(pipeline.state(), RunState::Done);

        let failed: Vec<&TableOutcome> = report.failed().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].table, "orders");
        assert_eq!(failed[0].emitted.len(), 2);
        assert!(matches!(
            failed[0].failure,
            Some((Artifact::Router, GormgenError::CodeGen { .. }))
        ));

        assert!(sink.file(Artifact::Record, "orders.go").is_some());
        assert!(sink.file(Artifact::Router, "orders_router.go").is_none());
        assert!(sink.file(Artifact::Router, "users_router.go").is_some());
        assert_eq!(report.succeeded().count(), 1);
    }

    #[test]
    fn test_emit_failure_skips_remaining_layers() {
        let mut pipeline = Pipeline::new(settings("users,orders"), GoRenderer::new());
        let mut sink = MemorySink {
            fail_files: vec!["orders.go".to_string()],
            ..Default::default()
        };

        let report = pipeline.run(connect_to(shop()), &mut sink).unwrap();
        let orders = &report.outcomes[0];

        assert!(orders.emitted.is_empty());
        assert!(matches!(
            orders.failure,
            Some((Artifact::Record, GormgenError::Emit { .. }))
        ));
        assert!(sink.file(Artifact::Service, "orders_service.go").is_none());
        assert_eq!(sink.names(Artifact::Service), ["base.go", "users_service.go"]);
    }

    #[test]
    fn test_disabled_layers_are_not_generated() {
        let mut settings = settings("users");
        settings.generate_service = false;
        settings.generate_router = false;
        let mut pipeline = Pipeline::new(settings, GoRenderer::new());
        let mut sink = MemorySink::default();

        pipeline.run(connect_to(shop()), &mut sink).unwrap();

        assert_eq!(sink.prepared, [Artifact::Record]);
        assert_eq!(sink.names(Artifact::Record), ["base.go", "users.go"]);
        assert!(sink.names(Artifact::Service).is_empty());
        assert!(sink.names(Artifact::Router).is_empty());
    }

    #[test]
    fn test_output_dir_failure_aborts_before_any_file() {
        let mut pipeline = Pipeline::new(settings(""), GoRenderer::new());
        let mut sink = MemorySink {
            fail_prepare: Some(Artifact::Router),
            ..Default::default()
        };

        let err = pipeline.run(connect_to(shop()), &mut sink).unwrap_err();

        assert!(matches!(err, GormgenError::OutputDir { .. }));
        assert_eq!(pipeline.state(), RunState::Aborted);
        assert!(sink.files.is_empty());
    }

    #[test]
    fn test_connection_failure_aborts() {
        let mut pipeline = Pipeline::new(settings(""), GoRenderer::new());
        let mut sink = MemorySink::default();

        let err = pipeline
            .run(
                |_: &ConnectionSettings| -> Result<MemorySource, GormgenError> {
                    Err(GormgenError::Connection("refused".to_string()))
                },
                &mut sink,
            )
            .unwrap_err();

        assert!(matches!(err, GormgenError::Connection(_)));
        assert_eq!(pipeline.state(), RunState::Aborted);
        assert!(sink.prepared.is_empty());
        assert!(sink.files.is_empty());
    }

    #[test]
    fn test_introspection_failure_aborts_without_output() {
        let mut source = shop();
        source.fail_columns_of = Some("users".to_string());
        let mut pipeline = Pipeline::new(settings(""), GoRenderer::new());
        let mut sink = MemorySink::default();

        let err = pipeline.run(connect_to(source), &mut sink).unwrap_err();

        assert!(matches!(err, GormgenError::Introspection { .. }));
        assert_eq!(pipeline.state(), RunState::Aborted);
        assert!(sink.prepared.is_empty());
        assert!(sink.files.is_empty());
    }

    #[test]
    fn test_base_file_failure_aborts() {
        let mut pipeline = Pipeline::new(settings("users"), GoRenderer::new());
        let mut sink = MemorySink {
            fail_files: vec!["base.go".to_string()],
            ..Default::default()
        };

        let err = pipeline.run(connect_to(shop()), &mut sink).unwrap_err();

        assert!(matches!(err, GormgenError::Emit { .. }));
        assert_eq!(pipeline.state(), RunState::Aborted);
        assert!(sink.file(Artifact::Record, "users.go").is_none());
    }

    #[test]
    fn test_empty_schema_still_emits_base_files() {
        let mut pipeline = Pipeline::new(settings("missing"), GoRenderer::new());
        let mut sink = MemorySink::default();

        let report = pipeline.run(connect_to(shop()), &mut sink).unwrap();

        assert!(report.outcomes.is_empty());
        assert_eq!(report.base_files.len(), 3);
        assert_eq!(pipeline.state(), RunState::Done);
    }
}
