use crate::resources::Material;
use crate::scene::NodeHandle;

/// One glTF-style primitive: a vertex stream plus optional attribute
/// channels. Skin influences (`joints`/`weights`) index into the owning
/// mesh's vertex-group list, not directly into any armature.
#[derive(Debug, Clone, Default)]
pub struct Primitive {
    pub positions: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub tex_coords: Option<Vec<[f32; 2]>>,
    pub indices: Option<Vec<u32>>,
    /// Per-vertex vertex-group indices (four influences per vertex)
    pub joints: Option<Vec<[u16; 4]>>,
    /// Per-vertex weights, paired with `joints`
    pub weights: Option<Vec<[f32; 4]>>,
    pub material: Option<Material>,
}

impl Primitive {
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Whether this primitive carries per-vertex skin influences.
    #[inline]
    #[must_use]
    pub fn has_skin_data(&self) -> bool {
        self.joints.is_some() && self.weights.is_some()
    }
}

/// A typed effect attached to a mesh. Closed set: the only modifier this
/// pipeline carries is the armature binding that determines skinning at
/// export time.
#[derive(Debug, Clone)]
pub enum Modifier {
    Armature(ArmatureModifier),
}

/// Binds a mesh to one armature object. Vertex groups are resolved against
/// the target's bone names when the scene is exported.
#[derive(Debug, Clone)]
pub struct ArmatureModifier {
    pub name: String,
    pub target: NodeHandle,
}

/// Mesh data component.
///
/// `vertex_groups` is the ordered list of group names; group `i` is the
/// channel behind joint index `i` in every primitive. A non-empty list
/// signals the mesh was authored for skeletal deformation.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: String,
    pub primitives: Vec<Primitive>,
    pub vertex_groups: Vec<String>,
    pub modifiers: Vec<Modifier>,
}

impl Mesh {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn has_vertex_groups(&self) -> bool {
        !self.vertex_groups.is_empty()
    }

    /// Removes every armature modifier, returning how many were dropped.
    pub fn remove_armature_modifiers(&mut self) -> usize {
        let before = self.modifiers.len();
        self.modifiers.retain(|m| match m {
            Modifier::Armature(_) => false,
        });
        before - self.modifiers.len()
    }

    /// Appends an armature modifier targeting `target`.
    pub fn add_armature_modifier(&mut self, target: NodeHandle) {
        self.modifiers.push(Modifier::Armature(ArmatureModifier {
            name: "Armature".to_string(),
            target,
        }));
    }

    /// The armature object targeted by the first armature modifier, if any.
    #[must_use]
    pub fn armature_target(&self) -> Option<NodeHandle> {
        self.modifiers.iter().find_map(|m| match m {
            Modifier::Armature(a) => Some(a.target),
        })
    }

    /// Total vertex count across all primitives.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.primitives.iter().map(Primitive::vertex_count).sum()
    }
}
