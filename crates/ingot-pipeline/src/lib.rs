//! # Ingot Pipeline
//!
//! Store-facing stages of an import: blank node resolution, transactional
//! chunk commits with conflict retry, and the [`IngestPipeline`] that runs
//! everything end to end against any [`ingot_core::GraphStore`].
//!
//! ```rust,ignore
//! use ingot_pipeline::IngestPipeline;
//!
//! let mut pipeline = IngestPipeline::new(template, config);
//! let map = pipeline.transform_csv(File::open("people.csv")?)?;
//! let report = pipeline.load(&map, &store, &mut cache).await?;
//! println!("{} statements committed", report.statements_committed());
//! ```

pub mod error;
pub mod ingest;
pub mod loader;
pub mod preseed;
pub mod report;
pub mod resolution;
pub mod schema;

pub use error::{LoadError, PipelineError, PipelineResult, ResolutionError};
pub use ingest::IngestPipeline;
pub use loader::{CommitReceipt, TransactionalLoader};
pub use preseed::preseed_identifier_cache;
pub use report::{ChunkOutcome, ChunkReport, IngestReport};
pub use resolution::BlankNodeResolver;
pub use schema::{install_schema, install_xid_schema, xid_schema};
