use slotmap::SlotMap;

use crate::resources::Mesh;
use crate::scene::armature::Armature;
use crate::scene::node::{Node, ObjectKind, ParentKind, ParentLink};
use crate::scene::{ArmatureKey, MeshKey, NodeHandle};

/// Scene graph container.
///
/// Pure data layer: objects live in a keyed pool, hierarchy is explicit
/// (`root_nodes` plus per-node child lists), and mesh/armature data sit in
/// component pools referenced by [`ObjectKind`] tags. The scene is owned and
/// passed by `&mut` through the orchestrators; there is no ambient global
/// state.
pub struct Scene {
    nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,

    // ==== Component pools ====
    meshes: SlotMap<MeshKey, Mesh>,
    armatures: SlotMap<ArmatureKey, Armature>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),
            meshes: SlotMap::with_key(),
            armatures: SlotMap::with_key(),
        }
    }

    /// Removes every object and component. Each orchestrator run starts
    /// here, guarding against contamination from a previous run in the same
    /// process.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root_nodes.clear();
        self.meshes.clear();
        self.armatures.clear();
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.nodes.len()
    }

    // ========================================================================
    // Object creation & hierarchy
    // ========================================================================

    /// Adds a node at the scene root.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    /// Adds a mesh object: the mesh data goes into the component pool, the
    /// node is tagged with its key.
    pub fn add_mesh_object(&mut self, mesh: Mesh) -> NodeHandle {
        let name = mesh.name.clone();
        let key = self.meshes.insert(mesh);
        self.add_node(Node::with_kind(&name, ObjectKind::Mesh(key)))
    }

    /// Adds an armature object.
    pub fn add_armature_object(&mut self, armature: Armature) -> NodeHandle {
        let name = armature.name.clone();
        let key = self.armatures.insert(armature);
        self.add_node(Node::with_kind(&name, ObjectKind::Armature(key)))
    }

    /// Attaches `child` under `parent` with the given parent kind, keeping
    /// both sides of the relationship in sync.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle, kind: ParentKind) {
        if child == parent {
            log::warn!("Cannot attach an object to itself");
            return;
        }
        if !self.nodes.contains_key(parent) {
            log::warn!("Parent object not found during attach");
            return;
        }

        self.unlink(child);

        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(ParentLink { node: parent, kind });
        }
    }

    /// Clears the parent link of `child` and moves it back to the scene
    /// root. The parent-inverse matrix is left untouched; callers that
    /// re-parent reset it explicitly.
    pub fn detach(&mut self, child: NodeHandle) {
        if !self.nodes.contains_key(child) {
            return;
        }
        self.unlink(child);
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = None;
        }
        self.root_nodes.push(child);
    }

    // Removes `child` from its parent's child list or from the root list,
    // without touching the child's own parent field.
    fn unlink(&mut self, child: NodeHandle) {
        let old_parent = self.nodes.get(child).and_then(|n| n.parent);
        if let Some(link) = old_parent {
            if let Some(p) = self.nodes.get_mut(link.node)
                && let Some(i) = p.children.iter().position(|&x| x == child)
            {
                p.children.remove(i);
            }
        } else if let Some(i) = self.root_nodes.iter().position(|&x| x == child) {
            self.root_nodes.remove(i);
        }
    }

    /// Removes an object and its component data.
    ///
    /// Children are *detached*, never deleted: removal here is the host's
    /// "unlink object", and deleting a skeleton must never take re-parented
    /// meshes with it. Any modifier elsewhere that still targets the removed
    /// object simply stops resolving.
    pub fn remove_node(&mut self, handle: NodeHandle) {
        let Some(node) = self.nodes.get(handle) else {
            return;
        };

        for child in node.children.clone() {
            self.detach(child);
        }

        self.unlink(handle);

        if let Some(node) = self.nodes.remove(handle) {
            match node.kind {
                ObjectKind::Mesh(key) => {
                    self.meshes.remove(key);
                }
                ObjectKind::Armature(key) => {
                    self.armatures.remove(key);
                }
                ObjectKind::Other => {}
            }
        }
    }

    // ========================================================================
    // Access
    // ========================================================================

    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[must_use]
    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[must_use]
    pub fn name(&self, handle: NodeHandle) -> Option<&str> {
        self.nodes.get(handle).map(|n| n.name.as_str())
    }

    #[must_use]
    pub fn mesh(&self, key: MeshKey) -> Option<&Mesh> {
        self.meshes.get(key)
    }

    #[must_use]
    pub fn mesh_mut(&mut self, key: MeshKey) -> Option<&mut Mesh> {
        self.meshes.get_mut(key)
    }

    #[must_use]
    pub fn armature(&self, key: ArmatureKey) -> Option<&Armature> {
        self.armatures.get(key)
    }

    #[must_use]
    pub fn armature_mut(&mut self, key: ArmatureKey) -> Option<&mut Armature> {
        self.armatures.get_mut(key)
    }

    /// Mesh data of a mesh object.
    #[must_use]
    pub fn node_mesh(&self, handle: NodeHandle) -> Option<&Mesh> {
        match self.nodes.get(handle)?.kind {
            ObjectKind::Mesh(key) => self.meshes.get(key),
            _ => None,
        }
    }

    /// Mutable mesh data of a mesh object.
    #[must_use]
    pub fn node_mesh_mut(&mut self, handle: NodeHandle) -> Option<&mut Mesh> {
        match self.nodes.get(handle)?.kind {
            ObjectKind::Mesh(key) => self.meshes.get_mut(key),
            _ => None,
        }
    }

    /// Armature data of an armature object.
    #[must_use]
    pub fn node_armature(&self, handle: NodeHandle) -> Option<&Armature> {
        match self.nodes.get(handle)?.kind {
            ObjectKind::Armature(key) => self.armatures.get(key),
            _ => None,
        }
    }

    /// Mutable armature data of an armature object.
    #[must_use]
    pub fn node_armature_mut(&mut self, handle: NodeHandle) -> Option<&mut Armature> {
        match self.nodes.get(handle)?.kind {
            ObjectKind::Armature(key) => self.armatures.get_mut(key),
            _ => None,
        }
    }

    // ========================================================================
    // Traversal & queries
    // ========================================================================

    /// All objects in deterministic depth-first order, roots first in
    /// insertion order. Export and "first armature" selection both rely on
    /// this ordering being stable between runs.
    #[must_use]
    pub fn traverse(&self) -> Vec<NodeHandle> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeHandle> = self.root_nodes.iter().rev().copied().collect();
        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            out.push(handle);
            for &child in node.children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Mesh objects in traversal order.
    #[must_use]
    pub fn mesh_objects(&self) -> Vec<NodeHandle> {
        self.traverse()
            .into_iter()
            .filter(|&h| self.nodes[h].kind.is_mesh())
            .collect()
    }

    /// Armature objects in traversal order.
    #[must_use]
    pub fn armature_objects(&self) -> Vec<NodeHandle> {
        self.traverse()
            .into_iter()
            .filter(|&h| self.nodes[h].kind.is_armature())
            .collect()
    }

    /// First armature object in traversal order, if any.
    #[must_use]
    pub fn first_armature(&self) -> Option<NodeHandle> {
        self.traverse()
            .into_iter()
            .find(|&h| self.nodes[h].kind.is_armature())
    }

    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    #[must_use]
    pub fn armature_count(&self) -> usize {
        self.armatures.len()
    }
}
