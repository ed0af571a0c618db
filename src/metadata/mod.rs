//! Metadata processing: front-matter fields applied to entities.

pub mod processor;

pub use processor::MetadataProcessor;
