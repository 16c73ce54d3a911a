//! Ingest pipeline orchestrator
//!
//! Drives one import from rows to committed chunks:
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌─────────┐   ┌────────────┐   ┌──────────┐
//! │   Rows   │──>│  Render   │──>│  Chunk  │──>│  Resolve   │──>│  Commit  │
//! │ (CSV)    │   │+aggregate │   │         │   │ blank nodes│   │ w/ retry │
//! └──────────┘   └───────────┘   └─────────┘   └────────────┘   └──────────┘
//! ```
//!
//! Chunks are resolved and committed strictly one after another, so the
//! identifier cache learned from chunk N is visible to chunk N+1.

use crate::error::{PipelineError, PipelineResult};
use crate::loader::TransactionalLoader;
use crate::preseed::preseed_identifier_cache;
use crate::report::{ChunkReport, IngestReport};
use crate::resolution::BlankNodeResolver;
use crate::schema::{install_schema, install_xid_schema};
use ingot_config::{ChunkErrorPolicy, IngotConfig};
use ingot_core::{
    rewrite_blank_references, Chunk, Chunker, CsvRows, GraphStore, IdentifierCache, Renderer,
    Row, RowError, Template, TripleMap,
};
use std::io::{Read, Write};
use tracing::{debug, info, warn};

/// Template-driven import into a graph store
pub struct IngestPipeline {
    template: Template,
    config: IngotConfig,
    renderer: Renderer,
    resolver: BlankNodeResolver,
    loader: TransactionalLoader,
    schema: Option<String>,
}

impl IngestPipeline {
    pub fn new(template: Template, config: IngotConfig) -> Self {
        let renderer = Renderer::from_config(&config.template);
        let resolver = BlankNodeResolver::from_config(&config.resolution);
        let loader = TransactionalLoader::new(config.loader.clone());
        Self {
            template,
            config,
            renderer,
            resolver,
            loader,
            schema: None,
        }
    }

    /// Replace the renderer, e.g. with a seeded one
    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Schema uploaded by [`run`](Self::run) before anything is loaded
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn config(&self) -> &IngotConfig {
        &self.config
    }

    /// Render every row and aggregate the statements
    ///
    /// Template columns are checked against the first row; an absent
    /// column fails before anything is rendered.
    pub fn transform<I>(&mut self, rows: I) -> PipelineResult<TripleMap>
    where
        I: IntoIterator<Item = Result<Row, RowError>>,
    {
        let mut map = TripleMap::new();
        let mut row_count = 0usize;
        for row in rows {
            let row = row?;
            if row_count == 0 {
                self.template.check_columns(row.columns())?;
            }
            for line in self.renderer.render_row(&self.template, &row)? {
                map.accumulate(&line);
            }
            row_count += 1;
        }

        info!(
            rows = row_count,
            keys = map.len(),
            statements = map.statement_count(),
            malformed = map.malformed_count(),
            skipped_null = map.null_count(),
            "Rows transformed"
        );
        Ok(map)
    }

    /// [`transform`](Self::transform) over a CSV source read with the
    /// configured delimiter and null markers
    pub fn transform_csv<R: Read>(&mut self, reader: R) -> PipelineResult<TripleMap> {
        let rows = CsvRows::from_reader(reader, &self.config.rows)?;
        self.template.check_columns(rows.columns())?;
        self.transform(rows)
    }

    /// Split the aggregated statements into chunks
    pub fn chunks<'a>(&self, map: &'a TripleMap) -> impl Iterator<Item = Chunk> + 'a {
        Chunker::new(map.statements(), self.config.pipeline.chunk_size)
    }

    /// Resolve and commit every chunk of `map`
    pub async fn load(
        &self,
        map: &TripleMap,
        store: &dyn GraphStore,
        cache: &mut IdentifierCache,
    ) -> PipelineResult<IngestReport> {
        let policy = self.config.pipeline.on_chunk_error;
        let mut report = IngestReport::default();

        for chunk in self.chunks(map) {
            let resolved = self.resolver.resolve(&chunk, cache, store).await?;
            debug!(chunk = chunk.index, statements = chunk.len(), "Chunk resolved");

            match self.loader.commit(&resolved, store).await {
                Ok(receipt) => report.chunks.push(ChunkReport::committed(chunk.index, receipt)),
                Err(source) => match policy {
                    ChunkErrorPolicy::Abort => {
                        return Err(PipelineError::Chunk {
                            index: chunk.index,
                            statements: chunk.len(),
                            source,
                        });
                    }
                    ChunkErrorPolicy::Continue => {
                        warn!("Skipping chunk {} after failure: {}", chunk.index, source);
                        report
                            .chunks
                            .push(ChunkReport::failed(chunk.index, chunk.len(), source));
                    }
                },
            }
        }

        info!(
            chunks = report.chunks.len(),
            committed = report.committed_chunks(),
            failed = report.failed_chunks(),
            statements = report.statements_committed(),
            latency = ?report.total_latency(),
            "Load finished"
        );
        Ok(report)
    }

    /// Write the chunks of `map` without touching a store
    ///
    /// Cached identifiers are substituted; other blank references are left
    /// as they are. Returns the number of statements written.
    pub fn write<W: Write>(
        &self,
        map: &TripleMap,
        cache: &IdentifierCache,
        mut writer: W,
    ) -> PipelineResult<usize> {
        let mut written = 0;
        for chunk in self.chunks(map) {
            for line in &chunk.lines {
                let line = rewrite_blank_references(line, |label| cache.get(label));
                writeln!(writer, "{line}")?;
            }
            written += chunk.len();
        }
        writer.flush()?;
        debug!(statements = written, "Dry run written");
        Ok(written)
    }

    /// Prepare the store, then transform and load `rows`
    ///
    /// The identifier schema and the user schema are installed when
    /// configured. The cache is pre-seeded from the store only when it
    /// starts empty.
    pub async fn run<I>(
        &mut self,
        rows: I,
        store: &dyn GraphStore,
        cache: &mut IdentifierCache,
    ) -> PipelineResult<IngestReport>
    where
        I: IntoIterator<Item = Result<Row, RowError>>,
    {
        let resolution = &self.config.resolution;
        if resolution.install_xid_schema {
            install_xid_schema(store, &resolution.xid_predicate).await?;
        }
        if let Some(schema) = &self.schema {
            install_schema(store, schema).await?;
        }
        if resolution.preseed && cache.is_empty() {
            preseed_identifier_cache(
                store,
                cache,
                &resolution.xid_predicate,
                resolution.preseed_batch_size,
            )
            .await?;
        }

        let map = self.transform(rows)?;
        self.load(&map, store, cache).await
    }
}
