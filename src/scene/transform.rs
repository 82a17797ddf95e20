use glam::{Mat4, Quat, Vec3};

/// Transform component.
///
/// TRS properties plus the parent-inverse matrix: a correction applied
/// between the parent's world transform and this object's local TRS,
/// recorded when an object is parented without moving it. Re-parenting a
/// mesh onto a new armature resets it to identity so the geometry is not
/// transformed twice.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    pub(crate) parent_inverse: Mat4,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            parent_inverse: Mat4::IDENTITY,
        }
    }

    #[must_use]
    pub fn from_trs(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
            parent_inverse: Mat4::IDENTITY,
        }
    }

    /// Local matrix from the TRS properties alone.
    #[must_use]
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Matrix applied below the parent: `parent_inverse * TRS`.
    #[must_use]
    pub fn effective_local_matrix(&self) -> Mat4 {
        self.parent_inverse * self.local_matrix()
    }

    #[inline]
    #[must_use]
    pub fn parent_inverse(&self) -> &Mat4 {
        &self.parent_inverse
    }

    /// Resets the parent-inverse matrix to identity.
    #[inline]
    pub fn reset_parent_inverse(&mut self) {
        self.parent_inverse = Mat4::IDENTITY;
    }

    pub fn set_parent_inverse(&mut self, mat: Mat4) {
        self.parent_inverse = mat;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
