pub mod json;

pub use json::{CardBatch, export_collection, import_batch, read_batch, write_batch};
