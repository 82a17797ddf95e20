//! Serde model of the `VRM` 0.x root extension.
//!
//! Only the blocks a consumer requires structurally are emitted; everything
//! carries the add-on's defaults. The humanoid block is the one part filled
//! from real data: one entry per assigned bone, pointing at the glTF node
//! index of that bone.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::vrm::humanoid::HumanBone;

/// Root `VRM` extension object.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VrmExtension {
    pub exporter_version: String,
    pub spec_version: String,
    pub meta: Meta,
    pub humanoid: Humanoid,
    pub first_person: FirstPerson,
    pub blend_shape_master: BlendShapeMaster,
    pub secondary_animation: SecondaryAnimation,
    pub material_properties: Vec<MaterialProperty>,
}

impl VrmExtension {
    /// Builds the extension with default meta and permission blocks.
    #[must_use]
    pub fn new(spec_version: &str, title: &str) -> Self {
        Self {
            exporter_version: format!("kitbash-{}", env!("CARGO_PKG_VERSION")),
            spec_version: spec_version.to_string(),
            meta: Meta::new(title),
            humanoid: Humanoid::default(),
            first_person: FirstPerson::default(),
            blend_shape_master: BlendShapeMaster::default(),
            secondary_animation: SecondaryAnimation::default(),
            material_properties: Vec::new(),
        }
    }

    /// Adds one humanoid bone binding.
    pub fn bind_human_bone(&mut self, slot: HumanBone, node: usize) {
        self.humanoid.human_bones.push(HumanBoneBinding {
            bone: slot.vrm_name().to_string(),
            node,
            use_default_values: true,
        });
        // The first-person reference bone is the head when one is assigned.
        if slot == HumanBone::Head {
            self.first_person.first_person_bone = node as i64;
        }
    }

    /// Adds the glTF-shader fallback material property for one material.
    pub fn push_gltf_material(&mut self, name: &str) {
        self.material_properties.push(MaterialProperty::gltf(name));
    }
}

/// Avatar metadata and usage permissions, add-on defaults.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub title: String,
    pub version: String,
    pub author: String,
    pub contact_information: String,
    pub reference: String,
    /// Thumbnail texture index; -1 when absent.
    pub texture: i64,
    pub allowed_user_name: String,
    // Field names below carry the spelling of the VRM 0.x specification.
    pub violent_ussage_name: String,
    pub sexual_ussage_name: String,
    pub commercial_ussage_name: String,
    pub other_permission_url: String,
    pub license_name: String,
    pub other_license_url: String,
}

impl Meta {
    #[must_use]
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            version: String::new(),
            author: String::new(),
            contact_information: String::new(),
            reference: String::new(),
            texture: -1,
            allowed_user_name: "OnlyAuthor".to_string(),
            violent_ussage_name: "Disallow".to_string(),
            sexual_ussage_name: "Disallow".to_string(),
            commercial_ussage_name: "Disallow".to_string(),
            other_permission_url: String::new(),
            license_name: "Redistribution_Prohibited".to_string(),
            other_license_url: String::new(),
        }
    }
}

/// Humanoid block: bone table plus retargeting parameters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Humanoid {
    pub human_bones: Vec<HumanBoneBinding>,
    pub arm_stretch: f64,
    pub leg_stretch: f64,
    pub upper_arm_twist: f64,
    pub lower_arm_twist: f64,
    pub upper_leg_twist: f64,
    pub lower_leg_twist: f64,
    pub feet_spacing: f64,
    pub has_translation_do_f: bool,
}

impl Default for Humanoid {
    fn default() -> Self {
        Self {
            human_bones: Vec::new(),
            arm_stretch: 0.05,
            leg_stretch: 0.05,
            upper_arm_twist: 0.5,
            lower_arm_twist: 0.5,
            upper_leg_twist: 0.5,
            lower_leg_twist: 0.5,
            feet_spacing: 0.0,
            has_translation_do_f: false,
        }
    }
}

/// One humanoid bone assignment: VRM bone name to glTF node index.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanBoneBinding {
    pub bone: String,
    pub node: usize,
    pub use_default_values: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FirstPerson {
    /// glTF node index of the head bone; -1 when no humanoid head exists.
    pub first_person_bone: i64,
    pub first_person_bone_offset: Offset,
    pub mesh_annotations: Vec<Value>,
    pub look_at_type_name: String,
}

impl Default for FirstPerson {
    fn default() -> Self {
        Self {
            first_person_bone: -1,
            first_person_bone_offset: Offset::default(),
            mesh_annotations: Vec::new(),
            look_at_type_name: "Bone".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlendShapeMaster {
    pub blend_shape_groups: Vec<Value>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecondaryAnimation {
    pub bone_groups: Vec<Value>,
    pub collider_groups: Vec<Value>,
}

/// Per-material shader binding. Without a VRM-specific shader everything
/// falls back to the glTF PBR shader.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialProperty {
    pub name: String,
    pub shader: String,
    pub render_queue: i64,
    pub float_properties: BTreeMap<String, Value>,
    pub vector_properties: BTreeMap<String, Value>,
    pub texture_properties: BTreeMap<String, Value>,
    pub keyword_map: BTreeMap<String, Value>,
    pub tag_map: BTreeMap<String, Value>,
}

impl MaterialProperty {
    #[must_use]
    pub fn gltf(name: &str) -> Self {
        Self {
            name: name.to_string(),
            shader: "VRM_USE_GLTFSHADER".to_string(),
            render_queue: 2000,
            float_properties: BTreeMap::new(),
            vector_properties: BTreeMap::new(),
            texture_properties: BTreeMap::new(),
            keyword_map: BTreeMap::new(),
            tag_map: BTreeMap::new(),
        }
    }
}
