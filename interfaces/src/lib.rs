pub mod defs;

pub use defs::{Extractor, Record, RecordSink, ValidationError};
