//! roiscout-features — Feature engineering from raw SEIFA and census tables.
//!
//! Raw tables are loaded by [`sources`], joined on a normalised suburb code
//! by [`join`], checked against the derivation schema by [`schema`], and
//! turned into ratio features, price/yield proxies and the synthetic
//! training target by [`derive`] and [`target`]. [`pipeline`] wires the
//! steps together.

pub mod columns;
pub mod sources;
pub mod join;
pub mod schema;
pub mod derive;
pub mod target;
pub mod pipeline;

pub use pipeline::{FeaturePipeline, PipelineOutput, RawTables};
pub use schema::{DerivedFeature, SchemaReport};
