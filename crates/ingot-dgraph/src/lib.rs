//! # Ingot Dgraph backend
//!
//! Implements [`ingot_core::GraphStore`] over Dgraph's HTTP API:
//!
//! | operation | endpoint |
//! |---|---|
//! | query | `POST /query` (`application/dql`) |
//! | alter | `POST /alter` |
//! | mutate | `POST /mutate[?startTs=]` (`application/rdf`) |
//! | commit | `POST /commit?startTs=` |
//! | discard | `POST /commit?startTs=&abort=true` |
//!
//! Aborted transactions surface as [`ingot_core::StoreError::Aborted`] so the
//! loader can retry them.

mod client;
mod response;
mod transaction;

pub use client::DgraphStore;
pub use transaction::DgraphTransaction;
