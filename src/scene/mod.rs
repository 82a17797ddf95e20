//! Scene graph module.
//!
//! Owns the object hierarchy and its component data:
//! - Node: scene object (name, hierarchy, transform, kind tag)
//! - Transform: TRS plus the parent-inverse correction matrix
//! - Armature: bone-table component
//! - Scene: object container and component pools

pub mod armature;
pub mod node;
pub mod scene;
pub mod transform;

pub use armature::{Armature, Bone};
pub use node::{Node, ObjectKind, ParentKind, ParentLink};
pub use scene::Scene;
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct MeshKey;
    pub struct ArmatureKey;
}
