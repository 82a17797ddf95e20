//! VRM 0.x writer.
//!
//! A VRM file is the same GLB container with a `VRM` root extension. The
//! document comes from the shared builder; this layer fills the extension
//! from the scene's first armature and the humanoid assignment, then packs
//! the container.

use std::path::Path;

use serde_json::json;

use crate::assets::exporters::glb::{DocumentBuilder, write_glb};
use crate::errors::Result;
use crate::scene::Scene;
use crate::vrm::{HumanoidMap, SpecVersion, VrmExtension};

pub struct VrmExporter;

impl VrmExporter {
    pub fn export(scene: &Scene, path: &Path, humanoid: &HumanoidMap) -> Result<()> {
        let mut document = DocumentBuilder::build(scene);

        let armature_handle = scene.first_armature();
        let armature = armature_handle.and_then(|h| scene.node_armature(h));

        let spec_version = armature
            .and_then(|a| a.vrm_spec_version)
            .unwrap_or(SpecVersion::V0);
        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("avatar");

        let mut extension = VrmExtension::new(spec_version.as_str(), title);

        if let (Some(handle), Some(armature)) = (armature_handle, armature) {
            for (slot, bone_name) in humanoid.iter() {
                let Some(bone_index) = armature.bone_index(bone_name) else {
                    log::warn!(
                        "Humanoid slot '{}' names bone '{}' which is not in armature '{}'",
                        slot.vrm_name(),
                        bone_name,
                        armature.name
                    );
                    continue;
                };
                if let Some(&node) = document.bone_nodes.get(&(handle, bone_index)) {
                    extension.bind_human_bone(slot, node);
                }
            }
        }

        for name in &document.material_names {
            extension.push_gltf_material(name);
        }

        let root = document
            .json
            .as_object_mut()
            .expect("document root is an object");
        root.insert("extensionsUsed".to_string(), json!(["VRM"]));
        root.insert(
            "extensions".to_string(),
            json!({ "VRM": serde_json::to_value(&extension)? }),
        );

        write_glb(path, &document.json, &document.bin)
    }
}
