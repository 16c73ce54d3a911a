//! # Ingot Core
//!
//! Pure building blocks of the tabular-to-graph pipeline, plus the store
//! abstraction that backends implement.
//!
//! ## Architecture
//!
//! ```text
//! rows ──> template (render) ──> aggregate (TripleMap) ──> chunk (Chunker)
//!                                                              │
//!                                    identifier cache <── blank refs
//! ```
//!
//! Backends (`ingot-dgraph`) implement [`store::GraphStore`]; the orchestration
//! of resolution and commits lives in `ingot-pipeline`. Following the
//! dependency-inversion layout, this crate never talks to a network itself.

pub mod aggregate;
pub mod blank;
pub mod chunk;
pub mod identifier;
pub mod row;
pub mod store;
pub mod template;
pub mod triple;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

pub use aggregate::{ObjectValue, TripleMap};
pub use blank::{blank_references, rewrite_blank_references};
pub use chunk::{Chunk, Chunker, StatementLine};
pub use identifier::IdentifierCache;
pub use row::{Cell, CsvRows, Row, RowError, LINE_NUMBER_COLUMN};
pub use store::{
    GraphStore, Mutation, MutationResponse, StoreError, StoreResult, StoreTransaction,
};
pub use template::{Renderer, Template, TemplateError, TemplateLine};
pub use triple::{Statement, StatementMarker};
