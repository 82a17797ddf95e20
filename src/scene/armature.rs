use glam::{Mat4, Quat, Vec3};

use crate::vrm::SpecVersion;

/// One bone of an armature.
///
/// `parent` indexes into the owning armature's bone list; root bones carry
/// `None`. The local TRS is the bind-pose transform relative to the parent
/// bone (or the armature object for roots). The inverse bind matrix
/// transforms mesh space into this bone's space, as read from the source
/// file's skin.
#[derive(Debug, Clone)]
pub struct Bone {
    pub name: String,
    pub parent: Option<usize>,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub inverse_bind_matrix: Mat4,
}

impl Bone {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            inverse_bind_matrix: Mat4::IDENTITY,
        }
    }

    #[must_use]
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// Armature component: an ordered bone table.
///
/// Bone order is the joint order of the source skin and is preserved through
/// export, so vertex-group indices computed against it stay stable.
#[derive(Debug, Clone, Default)]
pub struct Armature {
    pub name: String,
    pub bones: Vec<Bone>,
    /// VRM spec version tagged onto this armature before VRM export.
    pub vrm_spec_version: Option<SpecVersion>,
}

impl Armature {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            bones: Vec::new(),
            vrm_spec_version: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Index of the bone with the given name.
    #[must_use]
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    pub fn bone_names(&self) -> impl Iterator<Item = &str> {
        self.bones.iter().map(|b| b.name.as_str())
    }

    /// Indices of bones without a parent.
    #[must_use]
    pub fn root_bones(&self) -> Vec<usize> {
        (0..self.bones.len())
            .filter(|&i| self.bones[i].parent.is_none())
            .collect()
    }

    /// Names of this armature's bones that have no counterpart in `other`.
    ///
    /// Used before an imported armature is discarded in favor of the base
    /// one: vertex groups weighted to these bones will not deform after the
    /// merge.
    #[must_use]
    pub fn bones_missing_from(&self, other: &Armature) -> Vec<&str> {
        self.bones
            .iter()
            .map(|b| b.name.as_str())
            .filter(|name| other.bone_index(name).is_none())
            .collect()
    }
}
