//! VRM 0.x avatar format support.
//!
//! - `extension`: serde model of the `VRM` root extension written into the
//!   exported glTF document
//! - `humanoid`: the standardized humanoid bone set and the name-heuristic
//!   auto-assignment used by the conversion pipeline

pub mod extension;
pub mod humanoid;

pub use extension::VrmExtension;
pub use humanoid::{HumanBone, HumanoidMap, auto_assign};

/// VRM specification version tagged onto an armature before export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecVersion {
    /// VRM 0.x
    V0,
}

impl SpecVersion {
    /// The version string written into the `VRM` extension.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SpecVersion::V0 => "0.0",
        }
    }
}
