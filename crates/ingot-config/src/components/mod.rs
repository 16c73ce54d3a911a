//! Configuration components, one per pipeline stage

pub mod commit;
pub mod pipeline;
pub mod resolution;
pub mod rows;
pub mod store;
pub mod template;

pub use commit::*;
pub use pipeline::*;
pub use resolution::*;
pub use rows::*;
pub use store::*;
pub use template::*;
