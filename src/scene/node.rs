use crate::scene::transform::Transform;
use crate::scene::{ArmatureKey, MeshKey, NodeHandle};

/// What a scene object is. Closed set with exhaustive matching; the keys
/// point into the scene's component pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Mesh(MeshKey),
    Armature(ArmatureKey),
    /// Plain transform node (empties, group nodes) with no component data.
    Other,
}

impl ObjectKind {
    #[inline]
    #[must_use]
    pub fn is_mesh(&self) -> bool {
        matches!(self, ObjectKind::Mesh(_))
    }

    #[inline]
    #[must_use]
    pub fn is_armature(&self) -> bool {
        matches!(self, ObjectKind::Armature(_))
    }
}

/// How an object is attached to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentKind {
    /// Plain hierarchy parenting.
    Object,
    /// Deform parenting to an armature object: the child's vertex groups
    /// are resolved against the parent's bones at export time.
    Armature,
}

/// Parent reference of a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentLink {
    pub node: NodeHandle,
    pub kind: ParentKind,
}

/// A scene object.
///
/// Hierarchy bookkeeping (`parent`, `children`) is kept in sync by
/// [`Scene::attach`] and [`Scene::detach`]; the fields are crate-private so
/// callers cannot desynchronize the two sides.
///
/// [`Scene::attach`]: crate::scene::Scene::attach
/// [`Scene::detach`]: crate::scene::Scene::detach
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub kind: ObjectKind,

    pub(crate) parent: Option<ParentLink>,
    pub(crate) children: Vec<NodeHandle>,
}

impl Node {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            transform: Transform::new(),
            kind: ObjectKind::Other,
            parent: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_kind(name: &str, kind: ObjectKind) -> Self {
        Self {
            kind,
            ..Self::new(name)
        }
    }

    /// Returns the parent link, if any.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<ParentLink> {
        self.parent
    }

    /// Returns a read-only slice of child handles.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }
}
