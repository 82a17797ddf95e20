pub mod gltf;

pub use gltf::{GlbImporter, ImportReport};
