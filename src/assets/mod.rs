//! Asset I/O: file-format import and export.
//!
//! Importers build scene objects from interchange files and report exactly
//! which objects they created; exporters serialize the whole scene. The
//! orchestrators in [`crate::pipeline`] never inspect file formats
//! themselves.

pub mod exporters;
pub mod loaders;

pub use exporters::{GlbExporter, VrmExporter};
pub use loaders::{GlbImporter, ImportReport};
