//! YAML helpers shared by the metadata store

pub mod diagnostics;

pub use diagnostics::MetadataSyntaxError;
