pub mod glb;
pub mod vrm;

pub use glb::GlbExporter;
pub use vrm::VrmExporter;
