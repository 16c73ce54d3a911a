//! Shared fixtures for pipeline integration tests

#![allow(dead_code)]

use ingot_config::{ChunkErrorPolicy, IngotConfig, RowsConfig};
use ingot_core::{CsvRows, Renderer, Row, RowError, Template};
use ingot_pipeline::IngestPipeline;

pub const PERSON_TEMPLATE: &str = "\
# one node per person, linked to their city
<_:Person_[id]> <dgraph.type> \"Person\" .
<_:Person_[id]> <Person.name> \"[name]\" .
<_:Person_[id]> <Person.city> <_:City_[city,nospace]> .
<_:City_[city,nospace]> <City.name> \"[city]\" .
";

pub const PEOPLE_CSV: &str = "\
id,name,city
1,Ada,New York
2,Bo,Paris
3,Cy,New York
";

pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Config with instant retries and no store preparation
pub fn test_config(chunk_size: usize, policy: ChunkErrorPolicy) -> IngotConfig {
    let mut config = IngotConfig::default();
    config.pipeline.chunk_size = chunk_size;
    config.pipeline.on_chunk_error = policy;
    config.loader.retry_delay_ms = 0;
    config.loader.max_retry_delay_ms = 0;
    config.resolution.preseed = false;
    config.resolution.install_xid_schema = false;
    config
}

pub fn person_pipeline(config: IngotConfig) -> IngestPipeline {
    let template = Template::parse(PERSON_TEMPLATE).expect("fixture template parses");
    IngestPipeline::new(template, config).with_renderer(Renderer::seeded(7))
}

pub fn csv_rows(csv: &str) -> Vec<Result<Row, RowError>> {
    CsvRows::from_reader(csv.as_bytes(), &RowsConfig::default())
        .expect("fixture csv opens")
        .collect()
}
