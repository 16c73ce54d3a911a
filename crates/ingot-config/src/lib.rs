//! # Ingot Configuration Library
//!
//! Typed configuration for the Ingot tabular-to-graph loader.
//!
//! ## Features
//!
//! - Multi-format support (TOML, YAML, JSON), selected by file extension
//! - Sensible defaults for every section, so an empty file is a valid config
//! - Validation of numeric bounds and identifier-like settings
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ingot_config::ConfigLoader;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::load_from_file("ingot.toml")?;
//!     println!("chunk size: {}", config.pipeline.chunk_size);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod components;
mod config;
mod error;
mod loader;

pub use components::*;
pub use config::*;
pub use error::*;
pub use loader::*;
